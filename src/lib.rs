pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod server;
pub mod storage;
pub mod view;

pub use error::PortalError;
