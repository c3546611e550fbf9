//! Remote-fetch ingestion
//!
//! Downloads a sound from a URL straight into the library. The body is
//! streamed to disk chunk by chunk; memory use is bounded by the chunk size
//! and the total by [`IngestConfig::max_bytes`].

use crate::collision::reserve;
use crate::manager::{discard, LibraryManager, StoredSound};
use crate::sanitize::sanitize_filename;
use futures_util::StreamExt;
use percent_encoding::percent_decode_str;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response};
use soundboard_core::{BoardError, Result, MAIN_FOLDER};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Limits applied to every remote fetch
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Connect + wait for response headers
    pub header_timeout: Duration,
    /// Whole body transfer, after headers arrived
    pub transfer_timeout: Duration,
    /// Largest body accepted
    pub max_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header_timeout: Duration::from_secs(10),
            transfer_timeout: Duration::from_secs(120),
            max_bytes: 200 * 1024 * 1024,
        }
    }
}

/// Fetches remote audio into a [`LibraryManager`]
#[derive(Debug, Clone)]
pub struct UrlIngestor {
    http: Client,
    library: LibraryManager,
    config: IngestConfig,
}

impl UrlIngestor {
    pub fn new(library: LibraryManager, config: IngestConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.header_timeout)
            .user_agent(format!("Soundboard/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BoardError::download_failed(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            library,
            config,
        })
    }

    /// Download `url` into `target_folder` (root when `None`)
    pub async fn ingest(&self, url: &str, target_folder: Option<&str>) -> Result<StoredSound> {
        let url = parse_url(url)?;
        tracing::debug!(url = %url, "Fetching remote sound");

        let response = self.fetch(&url).await?;

        let content_type = header_str(&response, CONTENT_TYPE.as_str());
        let filename = choose_filename(
            header_str(&response, CONTENT_DISPOSITION.as_str()).as_deref(),
            &url,
            content_type.as_deref(),
        )?;
        let filename = self.library.validate_audio_name(&filename)?;

        let folder = target_folder.unwrap_or(MAIN_FOLDER).to_string();
        let library = self.library.clone();
        let (folder, final_name, path, file) = tokio::task::spawn_blocking(move || {
            let (folder, dir) = library.prepare_folder(&folder)?;
            let (final_name, file) = reserve(&dir, &filename)
                .map_err(|e| BoardError::storage("Failed to save download", e))?;
            let path = dir.join(&final_name);
            Ok::<_, BoardError>((folder, final_name, path, file))
        })
        .await
        .map_err(|e| BoardError::download_failed(format!("Worker failed: {}", e)))??;

        let transfer = tokio::time::timeout(
            self.config.transfer_timeout,
            stream_to_file(response, tokio::fs::File::from_std(file), self.config.max_bytes),
        )
        .await;

        let bytes = match transfer {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                discard_async(path).await;
                return Err(e);
            }
            Err(_) => {
                discard_async(path).await;
                return Err(BoardError::Timeout(format!(
                    "Transfer exceeded {}s",
                    self.config.transfer_timeout.as_secs()
                )));
            }
        };

        let stored = self.library.stored(&folder, final_name, &path);
        tracing::info!(
            url = %url,
            path = %stored.relative_path,
            bytes,
            "Downloaded sound"
        );
        Ok(stored)
    }

    /// Send the request and wait (bounded) for a successful response
    async fn fetch(&self, url: &Url) -> Result<Response> {
        let response = tokio::time::timeout(
            self.config.header_timeout,
            self.http.get(url.clone()).send(),
        )
        .await
        .map_err(|_| {
            BoardError::Timeout(format!(
                "No response within {}s",
                self.config.header_timeout.as_secs()
            ))
        })?
        .map_err(|e| {
            if e.is_timeout() {
                BoardError::Timeout(e.to_string())
            } else {
                BoardError::download_failed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BoardError::DownloadFailed {
                message: format!("Remote server answered {}", status),
                status: Some(status.as_u16()),
            });
        }

        Ok(response)
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| BoardError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BoardError::InvalidUrl(format!(
            "Unsupported scheme: {}",
            other
        ))),
    }
}

fn header_str(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

async fn stream_to_file(response: Response, mut file: tokio::fs::File, max_bytes: u64) -> Result<u64> {
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            if e.is_timeout() {
                BoardError::Timeout(e.to_string())
            } else {
                BoardError::download_failed(e.to_string())
            }
        })?;

        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(BoardError::download_failed(format!(
                "Download exceeds the {} byte limit",
                max_bytes
            )));
        }

        file.write_all(&chunk)
            .await
            .map_err(|e| BoardError::storage("Failed to save download", e))?;
    }

    file.flush()
        .await
        .map_err(|e| BoardError::storage("Failed to save download", e))?;
    Ok(written)
}

async fn discard_async(path: PathBuf) {
    let _ = tokio::task::spawn_blocking(move || discard(&path)).await;
}

/// Pick a filename: Content-Disposition, then the URL path, then a
/// generated name with an extension inferred from the content type
fn choose_filename(
    content_disposition: Option<&str>,
    url: &Url,
    content_type: Option<&str>,
) -> Result<String> {
    if let Some(name) = content_disposition.and_then(filename_from_content_disposition) {
        return Ok(name);
    }

    if let Some(name) = filename_from_url(url) {
        return Ok(name);
    }

    if let Some(ct) = content_type {
        let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if !(mime.is_empty() || mime.starts_with("audio/") || mime == "application/octet-stream") {
            return Err(BoardError::invalid_file_type(format!(
                "Remote content is {}",
                mime
            )));
        }
    }

    Ok(format!(
        "download_{}{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        extension_for_content_type(content_type)
    ))
}

/// Extract the filename parameter, preferring the RFC 5987 `filename*` form
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in value.split(';').skip(1) {
        let Some((key, val)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let val = val.trim();

        match key.as_str() {
            "filename*" => {
                // charset'language'percent-encoded
                let encoded = val.splitn(3, '\'').nth(2).unwrap_or(val);
                extended = percent_decode_str(encoded)
                    .decode_utf8()
                    .ok()
                    .map(|s| s.into_owned());
            }
            "filename" => {
                plain = Some(val.trim_matches('"').to_string());
            }
            _ => {}
        }
    }

    extended
        .or(plain)
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or_default().to_string())
        .filter(|name| !name.trim().is_empty())
}

/// Last path segment of the URL, if it looks like a filename
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.rev().find(|s| !s.is_empty())?;
    let decoded = percent_decode_str(segment).decode_utf8().ok()?.into_owned();
    let has_extension = std::path::Path::new(&decoded).extension().is_some();
    (has_extension && !sanitize_filename(&decoded).is_empty()).then_some(decoded)
}

/// Extension (with dot) for a declared content type; `.mp3` when unknown
pub fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    let ct = content_type.unwrap_or_default().to_ascii_lowercase();
    if ct.contains("mpeg") || ct.contains("mp3") {
        ".mp3"
    } else if ct.contains("wav") {
        ".wav"
    } else if ct.contains("ogg") {
        ".ogg"
    } else if ct.contains("flac") {
        ".flac"
    } else {
        ".mp3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_rejects_garbage() {
        assert!(matches!(parse_url("not a url"), Err(BoardError::InvalidUrl(_))));
        assert!(matches!(
            parse_url("ftp://example.com/a.mp3"),
            Err(BoardError::InvalidUrl(_))
        ));
        assert!(parse_url("https://example.com/a.mp3").is_ok());
    }

    #[test]
    fn test_content_disposition_plain() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=\"horn.mp3\""),
            Some("horn.mp3".to_string())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=horn.wav"),
            Some("horn.wav".to_string())
        );
    }

    #[test]
    fn test_content_disposition_extended_wins() {
        assert_eq!(
            filename_from_content_disposition(
                "attachment; filename=\"fallback.mp3\"; filename*=UTF-8''caf%C3%A9%20horn.ogg"
            ),
            Some("café horn.ogg".to_string())
        );
    }

    #[test]
    fn test_content_disposition_strips_directories() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=\"../../evil.mp3\""),
            Some("evil.mp3".to_string())
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
    }

    #[test]
    fn test_filename_from_url() {
        let url = Url::parse("https://cdn.example.com/sounds/air%20horn.mp3?x=1").unwrap();
        assert_eq!(filename_from_url(&url), Some("air horn.mp3".to_string()));

        let url = Url::parse("https://cdn.example.com/stream").unwrap();
        assert_eq!(filename_from_url(&url), None);

        let url = Url::parse("https://cdn.example.com/").unwrap();
        assert_eq!(filename_from_url(&url), None);
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type(Some("audio/mpeg")), ".mp3");
        assert_eq!(extension_for_content_type(Some("audio/mp3")), ".mp3");
        assert_eq!(extension_for_content_type(Some("audio/wav")), ".wav");
        assert_eq!(extension_for_content_type(Some("audio/x-wav")), ".wav");
        assert_eq!(extension_for_content_type(Some("audio/ogg; codecs=vorbis")), ".ogg");
        assert_eq!(extension_for_content_type(Some("audio/flac")), ".flac");
        assert_eq!(extension_for_content_type(Some("application/octet-stream")), ".mp3");
        assert_eq!(extension_for_content_type(None), ".mp3");
    }

    #[test]
    fn test_choose_filename_generated_requires_audio_type() {
        let url = Url::parse("https://example.com/stream").unwrap();

        let name = choose_filename(None, &url, Some("audio/ogg")).unwrap();
        assert!(name.starts_with("download_"));
        assert!(name.ends_with(".ogg"));

        assert!(matches!(
            choose_filename(None, &url, Some("text/html; charset=utf-8")),
            Err(BoardError::InvalidFileType(_))
        ));
    }
}
