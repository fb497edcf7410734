//! crates/podscript_core/src/domain.rs
//!
//! Defines the pure, core data structures for the podscript client.
//! These structs are independent of the wire format; the service crate maps
//! API records onto them.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::ports::ErrorKind;

/// How long a "remember me" credential stays valid.
pub const REMEMBER_FOR_DAYS: i64 = 7;

//=========================================================================================
// Session Credential
//=========================================================================================

/// The bearer token representing an authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// A credential bound to the lifetime of the current process.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// A credential that stays valid for seven days after `now`.
    pub fn remembered(token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(now + Duration::days(REMEMBER_FOR_DAYS)),
        }
    }

    /// Rebuilds a credential with an explicit expiry, e.g. when read back from disk.
    pub fn with_expiry(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

// Tokens never end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

//=========================================================================================
// Entities
//=========================================================================================

/// Anything a repository can hold in its list, identified by a backend-assigned id.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// The authenticated user, as returned by `auth/me`.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A container of scripts owned by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub file_count: u64,
    pub last_updated: Option<String>,
    pub owner: String,
}

impl Entity for Project {
    fn id(&self) -> &str {
        &self.id
    }
}

/// What kind of media a script was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    Audio,
    Video,
    #[default]
    Transcript,
}

impl MediaType {
    /// Derives the media type from a declared MIME type by its prefix.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("audio/") {
            MediaType::Audio
        } else if mime.starts_with("video/") {
            MediaType::Video
        } else {
            MediaType::Transcript
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Transcript => "transcript",
        }
    }

    /// Parses the wire name; unknown names are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "audio" => Some(MediaType::Audio),
            "video" => Some(MediaType::Video),
            "transcript" => Some(MediaType::Transcript),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One podcast transcript, always scoped to exactly one project.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub id: String,
    pub name: String,
    pub transcript: String,
    pub platform: String,
    pub media_type: MediaType,
    pub status: String,
    pub tags: Vec<String>,
    pub upload_date: Option<String>,
    pub upload_time: Option<String>,
    pub project_id: String,
}

impl Entity for Script {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A file attached to a project through the project-level upload endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFile {
    pub id: String,
    pub name: String,
    pub media_type: Option<MediaType>,
    pub transcript: Option<String>,
    pub upload_date: Option<String>,
}

impl Entity for ProjectFile {
    fn id(&self) -> &str {
        &self.id
    }
}

//=========================================================================================
// Drafts and Edits
//=========================================================================================

/// A named external source a script can be entered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    RssFeed,
    YouTubeVideo,
}

impl SourceKind {
    pub fn platform(&self) -> &'static str {
        match self {
            SourceKind::RssFeed => "RSS Feed",
            SourceKind::YouTubeVideo => "YouTube Video",
        }
    }
}

/// Platform label given to scripts created from an uploaded file.
pub const UPLOAD_PLATFORM: &str = "Upload Files";

/// A user-entered script that the backend has not assigned an id to yet.
///
/// All three entry paths (manual form, named source, file upload) normalize
/// into this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDraft {
    pub name: String,
    pub platform: String,
    pub transcript: String,
    pub media_type: Option<MediaType>,
}

impl ScriptDraft {
    pub fn manual(
        platform: impl Into<String>,
        name: impl Into<String>,
        transcript: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            transcript: transcript.into(),
            media_type: None,
        }
    }

    pub fn from_source(
        source: SourceKind,
        name: impl Into<String>,
        transcript: impl Into<String>,
    ) -> Self {
        Self::manual(source.platform(), name, transcript)
    }

    /// Builds the draft for an uploaded file; the media type comes from its MIME type.
    pub fn from_upload(
        file_name: impl Into<String>,
        mime: &str,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: file_name.into(),
            platform: UPLOAD_PLATFORM.to_string(),
            transcript: content.into(),
            media_type: Some(MediaType::from_mime(mime)),
        }
    }

    /// Checks the identifying fields before anything is sent.
    pub fn validate(&self) -> Result<(), ErrorKind> {
        if self.name.trim().is_empty() {
            return Err(ErrorKind::ValidationFailed("name".to_string()));
        }
        if self.platform.trim().is_empty() {
            return Err(ErrorKind::ValidationFailed("platform".to_string()));
        }
        Ok(())
    }
}

/// Status a script is saved with when the editor leaves it blank.
pub const DEFAULT_STATUS: &str = "active";

/// The editor's view of a script: tags are a single comma-separated string.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEdit {
    pub name: String,
    pub transcript: String,
    pub status: String,
    pub tags: String,
}

impl ScriptEdit {
    /// Seeds an edit from a stored script.
    pub fn from_script(script: &Script) -> Self {
        Self {
            name: script.name.clone(),
            transcript: script.transcript.clone(),
            status: script.status.clone(),
            tags: script.tags.join(", "),
        }
    }

    /// Converts the edit into the payload the update endpoint accepts.
    pub fn into_update(self) -> ScriptUpdate {
        let status = if self.status.trim().is_empty() {
            DEFAULT_STATUS.to_string()
        } else {
            self.status
        };
        ScriptUpdate {
            tags: normalize_tags(&self.tags),
            name: self.name,
            transcript: self.transcript,
            status,
        }
    }
}

/// The fields sent when saving an edited script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptUpdate {
    pub name: String,
    pub transcript: String,
    pub status: String,
    pub tags: Vec<String>,
}

/// Splits a comma-separated tag string into trimmed, non-empty tags.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
