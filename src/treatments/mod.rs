// Implant treatments

pub mod handlers;
pub mod models;
pub mod repository;

pub use handlers::*;
pub use models::*;
pub use repository::*;
