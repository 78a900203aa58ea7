// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation, token acquisition and the health probe.

pub mod health;
pub mod login;
pub mod register;

pub use health::health;
pub use login::login;
pub use register::create_user;
