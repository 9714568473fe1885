// Adapters layer: the clinic portal over HTTP, its markup, and the report file system.

pub mod http;
pub mod parser;
pub mod storage;

pub use http::PortalClient;
pub use storage::LocalStorage;
