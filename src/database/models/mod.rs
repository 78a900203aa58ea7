pub mod project;
pub mod task;
pub mod user;

pub use project::Project;
pub use task::{Task, TaskStatus};
pub use user::{Role, User};
