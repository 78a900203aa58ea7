use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::database::models::{Project, Task, User};
use crate::database::store::{EntityStore, StoreResult, TaskFilter, UserFilter};
use crate::services::error::{ServiceError, ServiceResult};

use super::view::{DashboardProject, DashboardTask, DashboardUser, DashboardView};
use super::visibility::{scope, Selector};

/// Records fetched for one selector, before joining
#[derive(Debug, Default)]
pub struct Scoped {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

/// Builds the role-scoped dashboard for a verified identity
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn EntityStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn assemble(&self, identity: &Identity) -> ServiceResult<DashboardView> {
        let current_user = self
            .store
            .find_user(identity.user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Dashboard requested by unknown user {}", identity.user_id);
                ServiceError::Unauthenticated("caller is not a known user".to_string())
            })?;

        // The stored role wins over the one baked into the token
        if current_user.role != identity.role {
            tracing::info!(
                "Token role {} for {} is stale; scoping by stored role {}",
                identity.role,
                current_user.id,
                current_user.role
            );
        }
        let caller = Identity {
            user_id: current_user.id,
            role: current_user.role,
        };

        let selector = scope(&caller);
        let scoped = self.fetch(&selector, &current_user).await.map_err(|e| {
            tracing::error!("Dashboard fetch failed for {}: {}", caller.user_id, e);
            e
        })?;

        tracing::debug!(
            "Dashboard for {} ({}): {} users, {} projects, {} tasks",
            caller.user_id,
            caller.role,
            scoped.users.len(),
            scoped.projects.len(),
            scoped.tasks.len()
        );

        Ok(build_view(selector, current_user, scoped))
    }

    async fn fetch(&self, selector: &Selector, current: &User) -> StoreResult<Scoped> {
        let Some(project_filter) = selector.project_filter() else {
            return Ok(Scoped {
                users: vec![current.clone()],
                ..Default::default()
            });
        };

        match selector {
            // Task and user scopes do not depend on the project result here
            Selector::Everything | Selector::MemberOf(_) => {
                let (projects, tasks, users) = futures::try_join!(
                    self.store.list_projects(project_filter),
                    self.fetch_tasks(selector.task_filter(&[])),
                    self.fetch_users(selector.user_filter(&[]), current),
                )?;
                Ok(Scoped { users, projects, tasks })
            }
            _ => {
                let projects = self.store.list_projects(project_filter).await?;
                let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
                let (tasks, users) = futures::try_join!(
                    self.fetch_tasks(selector.task_filter(&ids)),
                    self.fetch_users(selector.user_filter(&projects), current),
                )?;
                Ok(Scoped { users, projects, tasks })
            }
        }
    }

    async fn fetch_tasks(&self, filter: Option<TaskFilter>) -> StoreResult<Vec<Task>> {
        match filter {
            Some(filter) => self.store.list_tasks(filter).await,
            None => Ok(vec![]),
        }
    }

    async fn fetch_users(&self, filter: Option<UserFilter>, current: &User) -> StoreResult<Vec<User>> {
        match filter {
            Some(filter) => self.store.list_users(filter).await,
            None => Ok(vec![current.clone()]),
        }
    }
}

fn creation_order<T>(items: &mut Vec<T>, key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid)) {
    items.sort_by_key(|item| key(item));
    items.dedup_by_key(|item| key(item).1);
}

/// Join fetched records into the nested view.
///
/// Every record is re-checked against the selector, so a store returning
/// more than asked for cannot widen what the caller sees. Tasks whose
/// project is not visible are never nested.
pub fn build_view(selector: Selector, current_user: User, scoped: Scoped) -> DashboardView {
    let Scoped {
        mut users,
        mut projects,
        mut tasks,
    } = scoped;

    projects.retain(|p| selector.admits_project(p));
    creation_order(&mut projects, |p| (p.created_at, p.id));

    let project_index: HashMap<Uuid, &Project> = projects.iter().map(|p| (p.id, p)).collect();
    tasks.retain(|t| selector.admits_task(t, project_index.get(&t.project_id).copied()));
    creation_order(&mut tasks, |t| (t.created_at, t.id));

    users.retain(|u| selector.admits_user(u, &projects));
    creation_order(&mut users, |u| (u.created_at, u.id));

    let tree = users
        .iter()
        .map(|user| {
            let nested = projects
                .iter()
                .filter(|p| p.has_member(user.id))
                .map(|p| DashboardProject {
                    id: p.id,
                    name: p.name.clone(),
                    tasks: tasks
                        .iter()
                        .filter(|t| t.project_id == p.id && selector.nests_task(t))
                        .map(DashboardTask::from)
                        .collect(),
                })
                .collect();
            DashboardUser::new(user, nested)
        })
        .collect();

    DashboardView {
        scope: selector,
        current_user,
        users: tree,
        projects: projects.iter().map(Into::into).collect(),
        tasks: tasks.iter().map(Into::into).collect(),
    }
}
