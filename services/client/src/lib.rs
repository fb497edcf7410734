pub mod adapters;
pub mod config;
pub mod error;
pub mod repos;

pub use config::Config;
pub use error::ClientError;
pub use repos::{
    AuthClient, FileRepository, Gateway, ProjectFilter, ProjectRepository, ResourceState,
    ScriptRepository,
};
