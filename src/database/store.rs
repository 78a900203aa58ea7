use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Project, Task, TaskStatus, User};

/// Errors surfaced by an entity store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Duplicate value for unique field '{0}'")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Ids(Vec<Uuid>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    All,
    OwnedBy(Uuid),
    MemberOf(Uuid),
    /// Owned by or listing the user as a member
    Involving(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    InProject(Uuid),
    InProjects(Vec<Uuid>),
    AssignedTo(Uuid),
    WithStatus(TaskStatus),
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserFilter::All => true,
            UserFilter::Ids(ids) => ids.contains(&user.id),
        }
    }
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        match self {
            ProjectFilter::All => true,
            ProjectFilter::OwnedBy(owner) => project.is_owned_by(*owner),
            ProjectFilter::MemberOf(member) => project.has_member(*member),
            ProjectFilter::Involving(user) => {
                project.is_owned_by(*user) || project.has_member(*user)
            }
        }
    }
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::InProject(project) => task.project_id == *project,
            TaskFilter::InProjects(projects) => projects.contains(&task.project_id),
            TaskFilter::AssignedTo(user) => task.is_assigned_to(*user),
            TaskFilter::WithStatus(status) => task.status == *status,
        }
    }
}

/// Persistence port for users, projects and tasks.
///
/// Writes are single-record operations. `update_*` replaces the stored
/// record and returns `false` when no record with that id exists; `delete_*`
/// behaves the same way. Unique violations on a user's handle or email
/// surface as `StoreError::Conflict`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_handle(&self, user_id: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self, filter: UserFilter) -> StoreResult<Vec<User>>;
    async fn update_user(&self, user: &User) -> StoreResult<bool>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_project(&self, project: &Project) -> StoreResult<()>;
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;
    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>>;
    async fn update_project(&self, project: &Project) -> StoreResult<bool>;
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_task(&self, task: &Task) -> StoreResult<()>;
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;
    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>>;
    async fn update_task(&self, task: &Task) -> StoreResult<bool>;
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
}
