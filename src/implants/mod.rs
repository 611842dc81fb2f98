// Implant catalogue: dimensions, material and 3D model of each reference

pub mod handlers;
pub mod models;
pub mod repository;

pub use handlers::*;
pub use models::*;
pub use repository::*;
