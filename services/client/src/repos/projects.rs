//! services/client/src/repos/projects.rs
//!
//! The project repository: the user's projects plus the backend's running
//! total.

use podscript_core::domain::Project;
use podscript_core::ports::{ApiRequest, ErrorKind};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

use super::auth::current_user;
use super::records::ProjectRecord;
use super::state::{prepend, ResourceState};
use super::{decode_list, decode_one, Gateway};

/// Optional filters for listing projects. Empty values are not sent.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Data access for the user's projects.
pub struct ProjectRepository {
    gateway: Gateway,
    state: ResourceState<Project>,
    total: AtomicU64,
}

impl ProjectRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: ResourceState::new(),
            total: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &ResourceState<Project> {
        &self.state
    }

    pub fn items(&self) -> Vec<Project> {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.state.error()
    }

    /// Total number of projects as last reported by the backend.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Replaces the cached list and returns the backend's total.
    pub async fn load(
        &self,
        filter: &ProjectFilter,
        cancel: &CancellationToken,
    ) -> Result<u64, ErrorKind> {
        let op = self.state.begin_load();
        let result = async {
            let request = ApiRequest::get("projects")
                .query("status", filter.status.as_deref())
                .query("search", filter.search.as_deref());
            let envelope = self
                .gateway
                .authorized(request, "Failed to load projects", cancel)
                .await?;
            let total = envelope.total.unwrap_or(0);
            let records: Vec<ProjectRecord> = decode_list(envelope)?;
            let projects = records
                .into_iter()
                .map(ProjectRecord::into_domain)
                .collect::<Vec<_>>();
            Ok((projects, total))
        }
        .await;

        op.settle("load projects", result, |items, (projects, total)| {
            *items = projects.clone();
            self.total.store(*total, Ordering::SeqCst);
        })
        .map(|(_, total)| total)
    }

    /// Creates a project owned by the current user.
    pub async fn create(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Project, ErrorKind> {
        let op = self.state.begin();
        let result = async {
            let name = name.trim();
            if name.is_empty() {
                return Err(ErrorKind::ValidationFailed("name".to_string()));
            }
            let owner = current_user(&self.gateway, cancel).await?;
            let request = ApiRequest::post("projects").json(json!({
                "name": name,
                "owner": owner.id,
            }));
            let envelope = self
                .gateway
                .authorized(request, "Failed to create project", cancel)
                .await?;
            let record: ProjectRecord = decode_one(envelope)?;
            Ok(record.into_domain())
        }
        .await;

        op.settle("create project", result, |items, project| {
            prepend(items, project);
            self.total.fetch_add(1, Ordering::SeqCst);
        })
    }
}
