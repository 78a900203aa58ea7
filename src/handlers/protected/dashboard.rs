use axum::extract::{Extension, State};

use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dashboard::DashboardView;
use crate::state::AppState;

/// GET /dashboard - Role-scoped view of users, projects and tasks
///
/// The caller's verified identity decides the scope:
/// - super_admin: everything
/// - admin: owned projects, their tasks and their members
/// - employee: member projects and tasks assigned to the caller
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<DashboardView> {
    let view = state.dashboard.assemble(&identity).await?;
    Ok(ApiResponse::success("Dashboard data fetched successfully", view))
}
