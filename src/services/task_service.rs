use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::task::DEFAULT_PRIORITY;
use crate::database::models::{Task, TaskStatus};
use crate::database::store::{EntityStore, TaskFilter};
use crate::services::error::{require_text, ServiceError, ServiceResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
}

/// Partial update. `id`, `createdAt` and `updatedAt` are not part of the
/// payload; `updatedAt` is always set by the service.
///
/// `dueDate` and `assignedTo` distinguish an absent key (`None`, keep) from
/// an explicit `null` (`Some(None)`, clear).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub project_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable")]
    pub assigned_to: Option<Option<Uuid>>,
}

/// Present keys become `Some`, with `null` as `Some(None)`
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn EntityStore>,
}

pub fn parse_status(raw: &str) -> ServiceResult<TaskStatus> {
    raw.trim()
        .parse::<TaskStatus>()
        .map_err(|_| ServiceError::validation("status", "invalid status"))
}

fn check_due_date(due: Option<DateTime<Utc>>, created_at: DateTime<Utc>) -> ServiceResult<()> {
    match due {
        Some(due) if due < created_at => Err(ServiceError::validation(
            "dueDate",
            "dueDate cannot be in the past",
        )),
        _ => Ok(()),
    }
}

impl TaskService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn ensure_project_exists(&self, project_id: Uuid) -> ServiceResult<()> {
        if self.store.find_project(project_id).await?.is_none() {
            return Err(ServiceError::validation(
                "projectId",
                "projectId does not reference an existing project",
            ));
        }
        Ok(())
    }

    pub async fn create(&self, input: NewTask) -> ServiceResult<Task> {
        let title = require_text("title", &input.title)?;
        let project_id = input
            .project_id
            .ok_or_else(|| ServiceError::validation("projectId", "projectId is required"))?;

        let status = match input.status.as_deref().map(str::trim) {
            None | Some("") => TaskStatus::default(),
            Some(raw) => parse_status(raw)?,
        };
        let priority = match input.priority.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PRIORITY.to_string(),
            Some(p) => p.to_string(),
        };

        let now = Utc::now();
        check_due_date(input.due_date, now)?;
        self.ensure_project_exists(project_id).await?;

        let task = Task {
            id: Uuid::new_v4(),
            title,
            description: input.description.trim().to_string(),
            status,
            priority,
            due_date: input.due_date,
            project_id,
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_task(&task).await?;

        tracing::info!("Created task {} in project {}", task.id, task.project_id);
        Ok(task)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Task> {
        self.store
            .find_task(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("task", id))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.store.list_tasks(TaskFilter::All).await?)
    }

    pub async fn list_by_project(&self, project_id: Uuid) -> ServiceResult<Vec<Task>> {
        Ok(self.store.list_tasks(TaskFilter::InProject(project_id)).await?)
    }

    pub async fn list_by_assignee(&self, user_id: Uuid) -> ServiceResult<Vec<Task>> {
        Ok(self.store.list_tasks(TaskFilter::AssignedTo(user_id)).await?)
    }

    pub async fn list_by_status(&self, raw: &str) -> ServiceResult<Vec<Task>> {
        let status = parse_status(raw)?;
        Ok(self.store.list_tasks(TaskFilter::WithStatus(status)).await?)
    }

    pub async fn update(&self, id: Uuid, patch: TaskUpdate) -> ServiceResult<Task> {
        let mut task = self.get(id).await?;

        if let Some(title) = patch.title {
            task.title = require_text("title", &title)?;
        }
        if let Some(description) = patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(raw) = patch.status {
            task.status = parse_status(&raw)?;
        }
        if let Some(priority) = patch.priority {
            let priority = priority.trim();
            task.priority = if priority.is_empty() {
                DEFAULT_PRIORITY.to_string()
            } else {
                priority.to_string()
            };
        }
        if let Some(due) = patch.due_date {
            check_due_date(due, task.created_at)?;
            task.due_date = due;
        }
        if let Some(project_id) = patch.project_id {
            if project_id != task.project_id {
                self.ensure_project_exists(project_id).await?;
            }
            task.project_id = project_id;
        }
        if let Some(assignee) = patch.assigned_to {
            task.assigned_to = assignee;
        }
        task.updated_at = Utc::now();

        if !self.store.update_task(&task).await? {
            return Err(ServiceError::not_found("task", id));
        }
        Ok(task)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_task(id).await? {
            return Err(ServiceError::not_found("task", id));
        }
        tracing::info!("Deleted task {}", id);
        Ok(())
    }
}
