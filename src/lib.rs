pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use audit::AuditKind;
pub use db::sqlite::HotlineStorage;
pub use error::HotlineError;
