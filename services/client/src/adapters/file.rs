//! services/client/src/adapters/file.rs
//!
//! A file on local disk that is about to be uploaded. Reading it is the only
//! suspension point in the client tied to a local resource instead of the network.

use bytes::Bytes;
use podscript_core::ports::ErrorKind;
use std::path::{Path, PathBuf};

/// MIME type used when neither the caller nor the extension says otherwise.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// A local file plus the MIME type it is declared as.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
}

impl LocalFile {
    /// A file with an explicitly declared MIME type.
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: file_name(&path),
            path,
            mime: mime.into(),
        }
    }

    /// A file whose MIME type is inferred from its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime = mime_for_extension(&path);
        Self::new(path, mime)
    }

    /// Reads the whole file as text. Invalid UTF-8 is replaced rather than rejected.
    ///
    /// There is no size limit: the file is held in memory in full.
    pub async fn read_text(&self) -> Result<String, ErrorKind> {
        let raw = self.read_bytes().await?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    pub async fn read_bytes(&self) -> Result<Bytes, ErrorKind> {
        tokio::fs::read(&self.path)
            .await
            .map(Bytes::from)
            .map_err(|e| ErrorKind::LocalFile(format!("{}: {}", self.path.display(), e)))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn mime_for_extension(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "txt" => "text/plain",
        "vtt" => "text/vtt",
        "srt" => "application/x-subrip",
        "json" => "application/json",
        _ => FALLBACK_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podscript_core::MediaType;

    #[test]
    fn extension_drives_media_type() {
        let cases = [
            ("episode.MP3", MediaType::Audio),
            ("episode.mp4", MediaType::Video),
            ("episode.txt", MediaType::Transcript),
            ("episode", MediaType::Transcript),
        ];
        for (name, expected) in cases {
            let file = LocalFile::from_path(name);
            assert_eq!(MediaType::from_mime(&file.mime), expected, "{name}");
        }
    }

    #[tokio::test]
    async fn reads_text_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ep1.txt");
        std::fs::write(&path, b"hello \xff world").unwrap();

        let file = LocalFile::from_path(&path);
        assert_eq!(file.name, "ep1.txt");
        assert_eq!(file.read_text().await.unwrap(), "hello \u{fffd} world");
    }

    #[tokio::test]
    async fn missing_file_is_a_local_file_error() {
        let file = LocalFile::new("/definitely/not/here.txt", "text/plain");
        assert!(matches!(file.read_text().await, Err(ErrorKind::LocalFile(_))));
    }
}
