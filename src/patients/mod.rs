// Patients of the practitioners using the platform

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
