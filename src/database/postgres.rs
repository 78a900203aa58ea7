use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::models::{Project, Role, Task, TaskStatus, User};
use crate::database::store::{
    EntityStore, ProjectFilter, StoreError, StoreResult, TaskFilter, UserFilter,
};

const USER_COLUMNS: &str = "id, user_id, name, email, role, created_at";
const PROJECT_COLUMNS: &str = "id, name, description, owner_id, member_ids, created_at";
const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, project_id, \
                            assigned_to, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    user_id: String,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            role: Role::parse_lenient(&row.role),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: String,
    owner_id: Uuid,
    member_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            owner_id: row.owner_id,
            member_ids: row.member_ids,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    status: String,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    project_id: Uuid,
    assigned_to: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TaskStatus>()
            .map_err(|e| StoreError::QueryError(format!("task {}: {}", row.id, e)))?;
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status,
            priority: row.priority,
            due_date: row.due_date,
            project_id: row.project_id,
            assigned_to: row.assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map unique violations on the users table to `StoreError::Conflict`
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            let field = match db.constraint() {
                Some("idx_user_email") => "email",
                Some("idx_user_user_id") => "user_id",
                Some(other) => other,
                None => "unknown",
            };
            return StoreError::Conflict(field.to_string());
        }
    }
    StoreError::Sqlx(err)
}

/// PostgreSQL-backed entity store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, user_id, name, email, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_handle(&self, user_id: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self, filter: UserFilter) -> StoreResult<Vec<User>> {
        let rows = match filter {
            UserFilter::All => {
                let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id");
                sqlx::query_as::<_, UserRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
            UserFilter::Ids(ids) => {
                if ids.is_empty() {
                    return Ok(vec![]);
                }
                let sql = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY created_at, id"
                );
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(ids)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, user: &User) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET user_id = $2, name = $3, email = $4, role = $5 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_project(&self, project: &Project) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO projects (id, name, description, owner_id, member_ids, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.owner_id)
        .bind(&project.member_ids)
        .bind(project.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Project::from))
    }

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let (predicate, param) = match filter {
            ProjectFilter::All => ("TRUE", None),
            ProjectFilter::OwnedBy(owner) => ("owner_id = $1", Some(owner)),
            ProjectFilter::MemberOf(member) => ("$1 = ANY(member_ids)", Some(member)),
            ProjectFilter::Involving(user) => {
                ("owner_id = $1 OR $1 = ANY(member_ids)", Some(user))
            }
        };
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE {predicate} ORDER BY created_at, id"
        );
        let mut query = sqlx::query_as::<_, ProjectRow>(&sql);
        if let Some(param) = param {
            query = query.bind(param);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn update_project(&self, project: &Project) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE projects SET name = $2, description = $3, member_ids = $4 WHERE id = $1",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.member_ids)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_task(&self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, status, priority, due_date, project_id, \
             assigned_to, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(&task.priority)
        .bind(task.due_date)
        .bind(task.project_id)
        .bind(task.assigned_to)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let base = format!("SELECT {TASK_COLUMNS} FROM tasks");
        let order = "ORDER BY created_at, id";
        let rows = match filter {
            TaskFilter::All => {
                sqlx::query_as::<_, TaskRow>(&format!("{base} {order}"))
                    .fetch_all(&self.pool)
                    .await?
            }
            TaskFilter::InProject(project) => {
                sqlx::query_as::<_, TaskRow>(&format!("{base} WHERE project_id = $1 {order}"))
                    .bind(project)
                    .fetch_all(&self.pool)
                    .await?
            }
            TaskFilter::InProjects(projects) => {
                if projects.is_empty() {
                    return Ok(vec![]);
                }
                sqlx::query_as::<_, TaskRow>(&format!(
                    "{base} WHERE project_id = ANY($1) {order}"
                ))
                .bind(projects)
                .fetch_all(&self.pool)
                .await?
            }
            TaskFilter::AssignedTo(user) => {
                sqlx::query_as::<_, TaskRow>(&format!("{base} WHERE assigned_to = $1 {order}"))
                    .bind(user)
                    .fetch_all(&self.pool)
                    .await?
            }
            TaskFilter::WithStatus(status) => {
                sqlx::query_as::<_, TaskRow>(&format!("{base} WHERE status = $1 {order}"))
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn update_task(&self, task: &Task) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE tasks SET title = $2, description = $3, status = $4, priority = $5, \
             due_date = $6, project_id = $7, assigned_to = $8, updated_at = $9 WHERE id = $1",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(&task.priority)
        .bind(task.due_date)
        .bind(task.project_id)
        .bind(task.assigned_to)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
