//! Role-scoped dashboard: who sees what, and the joined view built from it.

pub mod assembler;
pub mod view;
pub mod visibility;

pub use assembler::DashboardService;
pub use view::DashboardView;
pub use visibility::{scope, Selector};
