use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Project, Task, User};
use crate::database::store::{
    EntityStore, ProjectFilter, StoreError, StoreResult, TaskFilter, UserFilter,
};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
}

/// Process-local store used for development runs and tests.
///
/// Each collection lives behind one lock; every trait method takes the lock
/// once, so single-record writes are atomic with respect to each other.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_user_conflict(users: &HashMap<Uuid, User>, candidate: &User) -> Option<&'static str> {
    users
        .values()
        .filter(|existing| existing.id != candidate.id)
        .find_map(|existing| {
            if existing.user_id == candidate.user_id {
                Some("user_id")
            } else if existing.email.eq_ignore_ascii_case(&candidate.email) {
                Some("email")
            } else {
                None
            }
        })
}

fn sorted_by_creation<T, K>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T>
where
    K: Ord,
{
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        if let Some(field) = unique_user_conflict(&data.users, user) {
            return Err(StoreError::Conflict(field.to_string()));
        }
        data.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_handle(&self, user_id: &str) -> StoreResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.values().find(|u| u.user_id == user_id).cloned())
    }

    async fn list_users(&self, filter: UserFilter) -> StoreResult<Vec<User>> {
        let data = self.inner.read().await;
        let users = data
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        Ok(sorted_by_creation(users, |u: &User| (u.created_at, u.id)))
    }

    async fn update_user(&self, user: &User) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        if !data.users.contains_key(&user.id) {
            return Ok(false);
        }
        if let Some(field) = unique_user_conflict(&data.users, user) {
            return Err(StoreError::Conflict(field.to_string()));
        }
        data.users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    async fn insert_project(&self, project: &Project) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(())
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let data = self.inner.read().await;
        let projects = data
            .projects
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(sorted_by_creation(projects, |p: &Project| (p.created_at, p.id)))
    }

    async fn update_project(&self, project: &Project) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        match data.projects.get_mut(&project.id) {
            Some(slot) => {
                *slot = project.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.projects.remove(&id).is_some())
    }

    async fn insert_task(&self, task: &Task) -> StoreResult<()> {
        self.inner.write().await.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let data = self.inner.read().await;
        let tasks = data
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        Ok(sorted_by_creation(tasks, |t: &Task| (t.created_at, t.id)))
    }

    async fn update_task(&self, task: &Task) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        match data.tasks.get_mut(&task.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.tasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Role, TaskStatus};
    use chrono::Utc;

    fn user(handle: &str, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            user_id: handle.to_string(),
            name: handle.to_string(),
            email: email.to_string(),
            role: Role::Employee,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_handle_and_email() {
        let store = MemoryStore::new();
        store.insert_user(&user("ada", "ada@example.com")).await.unwrap();

        let err = store
            .insert_user(&user("ada", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref f) if f == "user_id"));

        let err = store
            .insert_user(&user("grace", "ADA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref f) if f == "email"));
    }

    #[tokio::test]
    async fn filters_projects_by_owner_and_member() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let project = Project {
            id: Uuid::new_v4(),
            name: "Apollo".to_string(),
            description: String::new(),
            owner_id: owner,
            member_ids: vec![member],
            created_at: Utc::now(),
        };
        store.insert_project(&project).await.unwrap();

        assert_eq!(store.list_projects(ProjectFilter::OwnedBy(owner)).await.unwrap().len(), 1);
        assert!(store.list_projects(ProjectFilter::MemberOf(owner)).await.unwrap().is_empty());
        assert_eq!(store.list_projects(ProjectFilter::MemberOf(member)).await.unwrap().len(), 1);
        assert_eq!(store.list_projects(ProjectFilter::Involving(owner)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_records() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: "Medium".to_string(),
            due_date: None,
            project_id: Uuid::new_v4(),
            assigned_to: None,
            created_at: now,
            updated_at: now,
        };
        assert!(!store.update_task(&task).await.unwrap());
        store.insert_task(&task).await.unwrap();
        assert!(store.update_task(&task).await.unwrap());
        assert!(store.delete_task(task.id).await.unwrap());
        assert!(!store.delete_task(task.id).await.unwrap());
    }
}
