use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::models::Role;
use crate::database::store::EntityStore;
use crate::services::{DashboardService, ProjectService, TaskService, UserService};

/// Shared handler state; every field is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub tokens: TokenService,
    pub users: UserService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, tokens: TokenService, default_role: Role) -> Self {
        Self {
            users: UserService::new(store.clone(), default_role),
            projects: ProjectService::new(store.clone()),
            tasks: TaskService::new(store.clone()),
            dashboard: DashboardService::new(store.clone()),
            tokens,
            store,
        }
    }

    pub fn from_config(config: &AppConfig, store: Arc<dyn EntityStore>) -> Self {
        Self::new(
            store,
            TokenService::from_config(&config.security),
            config.accounts.default_role,
        )
    }
}
