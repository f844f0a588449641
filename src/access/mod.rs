//! Owner scoping for every task read and write.
//!
//! An `OwnerScope` is the only way to reach the task store, so a request can
//! never observe rows belonging to another user. A row outside the scope is
//! reported as absent rather than forbidden.

use crate::database::models::Task;
use crate::middleware::CurrentUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    owner_id: i64,
}

impl OwnerScope {
    pub fn new(owner_id: i64) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn permits(&self, task: &Task) -> bool {
        task.owner_id == self.owner_id
    }

    /// Drop a row that falls outside the scope
    pub fn visible(&self, task: Option<Task>) -> Option<Task> {
        task.filter(|t| self.permits(t))
    }
}

impl From<&CurrentUser> for OwnerScope {
    fn from(user: &CurrentUser) -> Self {
        Self::new(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task_owned_by(owner_id: i64) -> Task {
        let now = Utc::now();
        Task {
            id: 1,
            owner_id,
            title: "t".to_string(),
            description: "d".to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn permits_only_the_owner() {
        let scope = OwnerScope::new(1);
        assert!(scope.permits(&task_owned_by(1)));
        assert!(!scope.permits(&task_owned_by(2)));
    }

    #[test]
    fn foreign_rows_become_absent() {
        let scope = OwnerScope::new(1);
        assert!(scope.visible(Some(task_owned_by(2))).is_none());
        assert!(scope.visible(Some(task_owned_by(1))).is_some());
        assert!(scope.visible(None).is_none());
    }

    #[test]
    fn scope_from_current_user() {
        let user = CurrentUser { id: 42, username: "ana".to_string() };
        assert_eq!(OwnerScope::from(&user).owner_id(), 42);
    }
}
