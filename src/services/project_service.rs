use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::project::dedup_members;
use crate::database::models::Project;
use crate::database::store::{EntityStore, ProjectFilter};
use crate::services::error::{require_text, ServiceError, ServiceResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

/// Partial update. The owner is fixed at creation and cannot be patched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub member_ids: Option<Vec<Uuid>>,
}

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn EntityStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: NewProject) -> ServiceResult<Project> {
        let name = require_text("name", &input.name)?;
        let owner_id = input
            .owner_id
            .ok_or_else(|| ServiceError::validation("ownerId", "ownerId is required"))?;

        if self.store.find_user(owner_id).await?.is_none() {
            return Err(ServiceError::validation(
                "ownerId",
                "ownerId does not reference an existing user",
            ));
        }

        let project = Project {
            id: Uuid::new_v4(),
            name,
            description: input.description.trim().to_string(),
            owner_id,
            member_ids: dedup_members(input.member_ids),
            created_at: Utc::now(),
        };
        self.store.insert_project(&project).await?;

        tracing::info!("Created project {} owned by {}", project.id, project.owner_id);
        Ok(project)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Project> {
        self.store
            .find_project(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("project", id))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.store.list_projects(ProjectFilter::All).await?)
    }

    /// Projects the user owns or is a member of
    pub async fn list_for_user(&self, user_id: Uuid) -> ServiceResult<Vec<Project>> {
        Ok(self.store.list_projects(ProjectFilter::Involving(user_id)).await?)
    }

    pub async fn update(&self, id: Uuid, patch: ProjectUpdate) -> ServiceResult<Project> {
        let mut project = self.get(id).await?;

        if let Some(name) = patch.name {
            project.name = require_text("name", &name)?;
        }
        if let Some(description) = patch.description {
            project.description = description.trim().to_string();
        }
        if let Some(member_ids) = patch.member_ids {
            project.member_ids = dedup_members(member_ids);
        }

        if !self.store.update_project(&project).await? {
            return Err(ServiceError::not_found("project", id));
        }
        Ok(project)
    }

    /// Tasks referencing the project are left in place.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_project(id).await? {
            return Err(ServiceError::not_found("project", id));
        }
        tracing::info!("Deleted project {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::{Role, Task, TaskStatus, User};
    use crate::database::store::TaskFilter;

    async fn seeded() -> (Arc<MemoryStore>, ProjectService, User) {
        let store = Arc::new(MemoryStore::new());
        let owner = User {
            id: Uuid::new_v4(),
            user_id: "owner".to_string(),
            name: "Owner".to_string(),
            email: "owner@example.com".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        store.insert_user(&owner).await.unwrap();
        (store.clone(), ProjectService::new(store), owner)
    }

    #[tokio::test]
    async fn create_requires_existing_owner_and_name() {
        let (_, projects, owner) = seeded().await;

        let err = projects
            .create(NewProject { name: "  ".to_string(), owner_id: Some(owner.id), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "name"));

        let err = projects
            .create(NewProject { name: "Apollo".to_string(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "ownerId"));

        let err = projects
            .create(NewProject {
                name: "Apollo".to_string(),
                owner_id: Some(Uuid::new_v4()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "ownerId"));
    }

    #[tokio::test]
    async fn members_are_deduplicated() {
        let (_, projects, owner) = seeded().await;
        let member = Uuid::new_v4();
        let project = projects
            .create(NewProject {
                name: "Apollo".to_string(),
                owner_id: Some(owner.id),
                member_ids: vec![member, member],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(project.member_ids, vec![member]);

        let updated = projects
            .update(project.id, ProjectUpdate { member_ids: Some(vec![member, owner.id, member]), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.member_ids, vec![member, owner.id]);
        assert_eq!(updated.owner_id, owner.id);
    }

    #[tokio::test]
    async fn delete_does_not_cascade_to_tasks() {
        let (store, projects, owner) = seeded().await;
        let project = projects
            .create(NewProject { name: "Apollo".to_string(), owner_id: Some(owner.id), ..Default::default() })
            .await
            .unwrap();
        let now = Utc::now();
        store
            .insert_task(&Task {
                id: Uuid::new_v4(),
                title: "Orphan me".to_string(),
                description: String::new(),
                status: TaskStatus::Todo,
                priority: "Medium".to_string(),
                due_date: None,
                project_id: project.id,
                assigned_to: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        projects.delete(project.id).await.unwrap();
        assert_eq!(store.list_tasks(TaskFilter::InProject(project.id)).await.unwrap().len(), 1);
        assert!(matches!(projects.get(project.id).await, Err(ServiceError::NotFound(_))));
    }
}
