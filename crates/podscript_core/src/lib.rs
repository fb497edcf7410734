pub mod domain;
pub mod ports;

pub use domain::{
    normalize_tags, Credential, Entity, MediaType, Project, ProjectFile, Script, ScriptDraft,
    ScriptEdit, ScriptUpdate, SourceKind, User,
};
pub use ports::{
    ApiRequest, ApiResponse, Envelope, ErrorKind, Method, RequestBody, RequestClass,
    SessionStore, StorageError, Transport, TransportError,
};
