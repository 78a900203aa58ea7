// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which injects the
// caller's `Identity` as a request extension.

pub mod dashboard;
pub mod projects;
pub mod tasks;
pub mod users;

pub use dashboard::dashboard;
