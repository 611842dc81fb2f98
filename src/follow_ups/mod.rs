// Treatment follow-ups: review lifecycle of a treatment calculation

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod workflow;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
pub use workflow::*;
