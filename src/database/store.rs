use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::access::OwnerScope;
use crate::database::models::{NewTask, NewUser, Task, TaskChanges, User};
use crate::filter::{Page, TaskFilter};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Task persistence. Every call is scoped to a single owner.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError>;

    async fn find_task(&self, scope: OwnerScope, id: i64) -> Result<Option<Task>, StoreError>;

    async fn count_tasks(&self, scope: OwnerScope, filter: &TaskFilter) -> Result<i64, StoreError>;

    /// Newest first, ties broken by id descending
    async fn list_tasks(
        &self,
        scope: OwnerScope,
        filter: &TaskFilter,
        page: &Page,
    ) -> Result<Vec<Task>, StoreError>;

    /// Apply `changes` and refresh `updated_at` in one write
    async fn update_task(
        &self,
        scope: OwnerScope,
        id: i64,
        changes: TaskChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, StoreError>;

    /// Flip `completed` and refresh `updated_at` in one write
    async fn toggle_task(
        &self,
        scope: OwnerScope,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns false when nothing in scope matched
    async fn delete_task(&self, scope: OwnerScope, id: i64) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// User persistence. Deleting a user removes their tasks.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;
}

/// Next `updated_at`: never behind the previous stamp, even when the clock steps back.
/// The previous stamp is itself >= `created_at`.
pub(crate) fn stamp_after(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous)
}
