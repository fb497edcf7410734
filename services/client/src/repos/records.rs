//! services/client/src/repos/records.rs
//!
//! "Impure" wire records for the REST API and their mapping onto the domain
//! structs. Backends are loose about optional fields, so almost everything
//! here defaults; only ids are mandatory.

use podscript_core::domain::{MediaType, Project, ProjectFile, Script, User, DEFAULT_STATUS};
use serde::Deserialize;

/// A reference that may arrive as a bare id or as an embedded document.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum IdRef {
    Id(String),
    Embedded {
        #[serde(rename = "_id", alias = "id")]
        id: String,
    },
}

impl IdRef {
    fn into_id(self) -> String {
        match self {
            IdRef::Id(id) | IdRef::Embedded { id } => id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScriptRecord {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    name: Option<String>,
    transcript: Option<String>,
    platform: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
    status: Option<String>,
    tags: Option<Vec<String>>,
    upload_date: Option<String>,
    upload_time: Option<String>,
    project: Option<IdRef>,
}

impl ScriptRecord {
    /// Falls back to the scope the script was requested under when the
    /// backend leaves out its project.
    pub(crate) fn into_domain(self, scope_id: &str) -> Script {
        Script {
            id: self.id,
            name: self.name.unwrap_or_default(),
            transcript: self.transcript.unwrap_or_default(),
            platform: self.platform.unwrap_or_default(),
            media_type: self
                .media_type
                .as_deref()
                .and_then(MediaType::parse)
                .unwrap_or_default(),
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            tags: self.tags.unwrap_or_default(),
            upload_date: self.upload_date,
            upload_time: self.upload_time,
            project_id: self
                .project
                .map(IdRef::into_id)
                .unwrap_or_else(|| scope_id.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectRecord {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    name: Option<String>,
    file_count: Option<u64>,
    last_updated: Option<String>,
    owner: Option<IdRef>,
}

impl ProjectRecord {
    pub(crate) fn into_domain(self) -> Project {
        Project {
            id: self.id,
            name: self.name.unwrap_or_default(),
            file_count: self.file_count.unwrap_or(0),
            last_updated: self.last_updated,
            owner: self.owner.map(IdRef::into_id).unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileRecord {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    name: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
    transcript: Option<String>,
    upload_date: Option<String>,
}

impl FileRecord {
    pub(crate) fn into_domain(self) -> ProjectFile {
        ProjectFile {
            id: self.id,
            name: self.name.unwrap_or_default(),
            media_type: self.media_type.as_deref().and_then(MediaType::parse),
            transcript: self.transcript,
            upload_date: self.upload_date,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct UserRecord {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    name: Option<String>,
    email: Option<String>,
}

impl UserRecord {
    pub(crate) fn into_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
        }
    }
}

/// The `data` of a successful login or registration.
#[derive(Deserialize)]
pub(crate) struct TokenRecord {
    pub(crate) token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn script_record_accepts_embedded_project() {
        let record: ScriptRecord = serde_json::from_value(json!({
            "_id": "s1",
            "name": "Ep1",
            "type": "audio",
            "tags": ["podcast"],
            "uploadDate": "2024-05-01",
            "project": {"_id": "p9", "name": "Other"}
        }))
        .unwrap();

        let script = record.into_domain("p1");
        assert_eq!(script.project_id, "p9");
        assert_eq!(script.media_type, MediaType::Audio);
        assert_eq!(script.status, DEFAULT_STATUS);
        assert_eq!(script.upload_date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn script_without_project_belongs_to_scope() {
        let record: ScriptRecord =
            serde_json::from_value(json!({"id": "s2", "tags": null})).unwrap();
        let script = record.into_domain("p1");
        assert_eq!(script.project_id, "p1");
        assert!(script.tags.is_empty());
    }

    #[test]
    fn project_record_maps_camel_case_fields() {
        let record: ProjectRecord = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Show",
            "fileCount": 4,
            "lastUpdated": "2024-05-02",
            "owner": "u1"
        }))
        .unwrap();
        let project = record.into_domain();
        assert_eq!(project.file_count, 4);
        assert_eq!(project.owner, "u1");
    }

    #[test]
    fn record_without_id_is_rejected() {
        assert!(serde_json::from_value::<ScriptRecord>(json!({"name": "x"})).is_err());
    }
}
