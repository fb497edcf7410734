//! services/client/src/repos/scripts.rs
//!
//! The script repository: loads, creates, uploads, edits and deletes the
//! transcripts of one project and keeps the cached list in step.

use podscript_core::domain::{Script, ScriptDraft, ScriptEdit};
use podscript_core::ports::{ApiRequest, ErrorKind};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use super::records::ScriptRecord;
use super::state::{prepend, remove_by_id, replace_by_id, ResourceState};
use super::{cancellable, decode_list, decode_one, Gateway};
use crate::adapters::LocalFile;

/// The JSON body for a draft scoped to `project_id`.
pub(crate) fn draft_body(project_id: &str, draft: &ScriptDraft) -> Value {
    let mut body = json!({
        "name": draft.name,
        "platform": draft.platform,
        "transcript": draft.transcript,
        "project": project_id,
    });
    if let Some(media_type) = draft.media_type {
        body["type"] = json!(media_type.as_str());
    }
    body
}

/// Data access for the scripts of a project.
pub struct ScriptRepository {
    gateway: Gateway,
    state: ResourceState<Script>,
}

impl ScriptRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: ResourceState::new(),
        }
    }

    pub fn state(&self) -> &ResourceState<Script> {
        &self.state
    }

    pub fn items(&self) -> Vec<Script> {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.state.error()
    }

    /// Replaces the cached list with the scripts of `project_id`.
    pub async fn load(
        &self,
        project_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Script>, ErrorKind> {
        let op = self.state.begin_load();
        let result = async {
            let request = ApiRequest::get(format!("scripts/project/{}", project_id));
            let envelope = self
                .gateway
                .authorized(request, "Failed to load scripts", cancel)
                .await?;
            let records: Vec<ScriptRecord> = decode_list(envelope)?;
            Ok(records
                .into_iter()
                .map(|record| record.into_domain(project_id))
                .collect::<Vec<_>>())
        }
        .await;

        op.settle("load scripts", result, |items, loaded| {
            *items = loaded.clone()
        })
    }

    /// Sends a draft to the backend and puts the stored script at the front of the list.
    ///
    /// The draft is sent as is; callers validate it first.
    pub async fn create(
        &self,
        project_id: &str,
        draft: &ScriptDraft,
        cancel: &CancellationToken,
    ) -> Result<Script, ErrorKind> {
        let op = self.state.begin();
        let request = ApiRequest::post("scripts").json(draft_body(project_id, draft));
        let result = self
            .submit(project_id, request, "Failed to create script", cancel)
            .await;
        op.settle("create script", result, prepend)
    }

    /// Reads a local file in full and creates a script from its text.
    ///
    /// The script's type comes from the file's declared MIME type.
    pub async fn upload_file(
        &self,
        project_id: &str,
        file: &LocalFile,
        cancel: &CancellationToken,
    ) -> Result<Script, ErrorKind> {
        let op = self.state.begin();
        let result = async {
            // No point reading a large file for a request that cannot be sent.
            self.gateway.credential()?;
            let content = cancellable(cancel, file.read_text()).await?;
            let draft = ScriptDraft::from_upload(file.name.clone(), &file.mime, content);
            let request = ApiRequest::post("scripts")
                .json(draft_body(project_id, &draft))
                .upload();
            self.submit(project_id, request, "Failed to upload file", cancel)
                .await
        }
        .await;
        op.settle("upload file", result, prepend)
    }

    /// Saves an edited script of `project_id`; the cached copy is swapped in
    /// place if present.
    pub async fn update(
        &self,
        project_id: &str,
        script_id: &str,
        edit: ScriptEdit,
        cancel: &CancellationToken,
    ) -> Result<Script, ErrorKind> {
        let op = self.state.begin();
        let update = edit.into_update();
        let request = ApiRequest::put(format!("scripts/{}", script_id)).json(json!({
            "name": update.name,
            "transcript": update.transcript,
            "status": update.status,
            "tags": update.tags,
        }));
        let result = self
            .submit(project_id, request, "Failed to save transcript", cancel)
            .await;
        op.settle("update script", result, |items, updated| {
            replace_by_id(items, updated)
        })
    }

    /// Deletes a script and drops it from the cached list.
    pub async fn delete(
        &self,
        script_id: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, ErrorKind> {
        let op = self.state.begin();
        let request = ApiRequest::delete(format!("scripts/{}", script_id));
        let result = self
            .gateway
            .authorized(request, "Failed to delete script", cancel)
            .await
            .map(|_| true);
        op.settle("delete script", result, |items, _| {
            remove_by_id(items, script_id)
        })
    }

    async fn submit(
        &self,
        scope_id: &str,
        request: ApiRequest,
        fallback: &str,
        cancel: &CancellationToken,
    ) -> Result<Script, ErrorKind> {
        let envelope = self.gateway.authorized(request, fallback, cancel).await?;
        let record: ScriptRecord = decode_one(envelope)?;
        Ok(record.into_domain(scope_id))
    }
}
