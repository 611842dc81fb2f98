// Documents: uploaded files, their storage and single-use downloads

pub mod cleanup;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod storage;

pub use cleanup::*;
pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
pub use storage::*;
