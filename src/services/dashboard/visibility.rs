//! Role-scoped visibility.
//!
//! `scope` maps a verified identity to a `Selector`. The selector drives the
//! store queries the assembler issues, and its `admits_*` predicates are the
//! in-memory definition of what may be shown. Both must agree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::database::models::{Project, Role, Task, User};
use crate::database::store::{ProjectFilter, TaskFilter, UserFilter};

/// What an identity may see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "subject", rename_all = "snake_case")]
pub enum Selector {
    /// Every user, project and task
    Everything,
    /// Projects owned by the subject, their tasks and their members
    OwnedBy(Uuid),
    /// Projects listing the subject as a member, tasks assigned to the subject
    MemberOf(Uuid),
    /// The subject's own user record and nothing else
    SelfOnly(Uuid),
}

/// Total over `Role`; anything not explicitly granted falls to `SelfOnly`.
pub fn scope(identity: &Identity) -> Selector {
    match identity.role {
        Role::SuperAdmin => Selector::Everything,
        Role::Admin => Selector::OwnedBy(identity.user_id),
        Role::Employee => Selector::MemberOf(identity.user_id),
        Role::Unrecognized => Selector::SelfOnly(identity.user_id),
    }
}

impl Selector {
    /// Store query for the visible projects; `None` means no projects at all
    pub fn project_filter(&self) -> Option<ProjectFilter> {
        match *self {
            Selector::Everything => Some(ProjectFilter::All),
            Selector::OwnedBy(owner) => Some(ProjectFilter::OwnedBy(owner)),
            Selector::MemberOf(member) => Some(ProjectFilter::MemberOf(member)),
            Selector::SelfOnly(_) => None,
        }
    }

    /// Store query for the visible tasks, given the visible project ids
    pub fn task_filter(&self, visible_projects: &[Uuid]) -> Option<TaskFilter> {
        match *self {
            Selector::Everything => Some(TaskFilter::All),
            Selector::OwnedBy(_) => Some(TaskFilter::InProjects(visible_projects.to_vec())),
            Selector::MemberOf(member) => Some(TaskFilter::AssignedTo(member)),
            Selector::SelfOnly(_) => None,
        }
    }

    /// Store query for the visible users other than the caller, given the
    /// visible projects. `None` means the caller alone.
    pub fn user_filter(&self, visible_projects: &[Project]) -> Option<UserFilter> {
        match *self {
            Selector::Everything => Some(UserFilter::All),
            Selector::OwnedBy(_) => {
                let mut ids: Vec<Uuid> = visible_projects
                    .iter()
                    .flat_map(|p| p.member_ids.iter().copied())
                    .collect();
                ids.sort();
                ids.dedup();
                Some(UserFilter::Ids(ids))
            }
            Selector::MemberOf(_) | Selector::SelfOnly(_) => None,
        }
    }

    pub fn admits_project(&self, project: &Project) -> bool {
        match *self {
            Selector::Everything => true,
            Selector::OwnedBy(owner) => project.is_owned_by(owner),
            Selector::MemberOf(member) => project.has_member(member),
            Selector::SelfOnly(_) => false,
        }
    }

    /// `project` is the task's project when it is known to the caller
    pub fn admits_task(&self, task: &Task, project: Option<&Project>) -> bool {
        match *self {
            Selector::Everything => true,
            Selector::OwnedBy(owner) => project
                .map_or(false, |p| p.id == task.project_id && p.is_owned_by(owner)),
            Selector::MemberOf(member) => task.is_assigned_to(member),
            Selector::SelfOnly(_) => false,
        }
    }

    /// `projects` must contain at least every project the selector admits
    pub fn admits_user(&self, user: &User, projects: &[Project]) -> bool {
        match *self {
            Selector::Everything => true,
            Selector::OwnedBy(owner) => projects
                .iter()
                .any(|p| p.is_owned_by(owner) && p.has_member(user.id)),
            Selector::MemberOf(subject) | Selector::SelfOnly(subject) => user.id == subject,
        }
    }

    /// Extra condition for nesting a task under a project in the user tree
    pub fn nests_task(&self, task: &Task) -> bool {
        match *self {
            Selector::MemberOf(member) => task.is_assigned_to(member),
            _ => true,
        }
    }
}
