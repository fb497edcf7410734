//! services/client/src/repos/files.rs
//!
//! The project-file repository: files attached to a project through the
//! project-level endpoints, either as a multipart upload or as an inline
//! transcript.

use podscript_core::domain::{ProjectFile, ScriptDraft};
use podscript_core::ports::{ApiRequest, ErrorKind, RequestBody};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::records::FileRecord;
use super::scripts::draft_body;
use super::state::{prepend, remove_by_id, ResourceState};
use super::{cancellable, decode_list, decode_one, Gateway};
use crate::adapters::LocalFile;

/// Data access for the files of a project.
pub struct FileRepository {
    gateway: Gateway,
    state: ResourceState<ProjectFile>,
}

impl FileRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: ResourceState::new(),
        }
    }

    pub fn state(&self) -> &ResourceState<ProjectFile> {
        &self.state
    }

    pub fn items(&self) -> Vec<ProjectFile> {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.state.error()
    }

    pub async fn load(
        &self,
        project_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProjectFile>, ErrorKind> {
        let op = self.state.begin_load();
        let result = async {
            let request = ApiRequest::get(format!("projects/{}", project_id));
            let envelope = self
                .gateway
                .authorized(request, "Failed to load files", cancel)
                .await?;
            let records: Vec<FileRecord> = decode_list(envelope)?;
            Ok(records
                .into_iter()
                .map(FileRecord::into_domain)
                .collect::<Vec<_>>())
        }
        .await;

        op.settle("load files", result, |items, loaded| {
            *items = loaded.clone()
        })
    }

    /// Uploads the raw file as a multipart form under the upload budget.
    pub async fn upload_file(
        &self,
        project_id: &str,
        file: &LocalFile,
        cancel: &CancellationToken,
    ) -> Result<ProjectFile, ErrorKind> {
        let op = self.state.begin();
        let result = async {
            self.gateway.credential()?;
            let data = cancellable(cancel, file.read_bytes()).await?;
            let request = ApiRequest::post(format!("projects/{}", project_id))
                .body(RequestBody::Multipart {
                    file_name: file.name.clone(),
                    mime: file.mime.clone(),
                    data,
                })
                .upload();
            self.submit(request, "Failed to upload file", cancel).await
        }
        .await;
        op.settle("upload file", result, prepend)
    }

    /// Attaches an inline transcript to the project.
    pub async fn add_script(
        &self,
        project_id: &str,
        draft: &ScriptDraft,
        cancel: &CancellationToken,
    ) -> Result<ProjectFile, ErrorKind> {
        let op = self.state.begin();
        let mut body = draft_body(project_id, draft);
        body["type"] = json!("transcript");
        let request = ApiRequest::post(format!("projects/{}", project_id)).json(body);
        let result = self.submit(request, "Failed to add script", cancel).await;
        op.settle("add script", result, prepend)
    }

    /// Deletes one file of the project and drops it from the cached list.
    pub async fn delete(
        &self,
        project_id: &str,
        file_id: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, ErrorKind> {
        let op = self.state.begin();
        let request = ApiRequest::delete(format!("projects/{}", project_id))
            .query("fileId", Some(file_id));
        let result = self
            .gateway
            .authorized(request, "Failed to delete file", cancel)
            .await
            .map(|_| true);
        op.settle("delete file", result, |items, _| remove_by_id(items, file_id))
    }

    async fn submit(
        &self,
        request: ApiRequest,
        fallback: &str,
        cancel: &CancellationToken,
    ) -> Result<ProjectFile, ErrorKind> {
        let envelope = self.gateway.authorized(request, fallback, cancel).await?;
        let record: FileRecord = decode_one(envelope)?;
        Ok(record.into_domain())
    }
}
