pub mod auth;
pub mod course;
pub mod discussion;
pub mod quiz;
pub mod shared;
pub mod simplify;

pub use shared::ApiResponse;
