use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Project, Role, Task, TaskStatus, User};

use super::visibility::Selector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardTask {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardProject {
    pub id: Uuid,
    pub name: String,
    pub tasks: Vec<DashboardTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUser {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub projects: Vec<DashboardProject>,
}

/// Flat entry for a visible project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub member_ids: Vec<Uuid>,
}

/// Flat entry for a visible task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub project_id: Uuid,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Visibility rule the view was built under
    pub scope: Selector,
    pub current_user: User,
    pub users: Vec<DashboardUser>,
    pub projects: Vec<ProjectSummary>,
    pub tasks: Vec<TaskSummary>,
}

impl From<&Task> for DashboardTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            status: task.status,
        }
    }
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            owner_id: project.owner_id,
            member_ids: project.member_ids.clone(),
        }
    }
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            status: task.status,
            project_id: task.project_id,
            assigned_to: task.assigned_to,
        }
    }
}

impl DashboardUser {
    pub fn new(user: &User, projects: Vec<DashboardProject>) -> Self {
        Self {
            id: user.id,
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            projects,
        }
    }
}
