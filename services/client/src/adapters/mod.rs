pub mod file;
pub mod http;
pub mod session;

pub use file::LocalFile;
pub use http::HttpTransport;
pub use session::{FileSessionStore, MemorySessionStore};
