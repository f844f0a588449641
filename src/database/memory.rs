use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::access::OwnerScope;
use crate::database::models::{NewTask, NewUser, Task, TaskChanges, User};
use crate::database::store::{stamp_after, StoreError, TaskStore, UserStore};
use crate::filter::{Page, TaskFilter};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_task_id: i64,
}

/// In-process store with the same semantics as `PgStore`
/// (owner scoping, newest-first ordering, cascade on user delete)
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(task: &Task, scope: OwnerScope, filter: &TaskFilter) -> bool {
    scope.permits(task)
        && filter.completed.map_or(true, |c| task.completed == c)
        && filter.title.as_deref().map_or(true, |t| task.title == t)
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&task.owner_id) {
            return Err(StoreError::Conflict(format!("User {} does not exist", task.owner_id)));
        }

        tables.next_task_id += 1;
        let row = Task {
            id: tables.next_task_id,
            owner_id: task.owner_id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            created_at: task.created_at,
            updated_at: task.created_at,
        };
        tables.tasks.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_task(&self, scope: OwnerScope, id: i64) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(scope.visible(tables.tasks.get(&id).cloned()))
    }

    async fn count_tasks(&self, scope: OwnerScope, filter: &TaskFilter) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let count = tables.tasks.values().filter(|t| matches(t, scope, filter)).count();
        Ok(count as i64)
    }

    async fn list_tasks(
        &self,
        scope: OwnerScope,
        filter: &TaskFilter,
        page: &Page,
    ) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| matches(t, scope, filter))
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(rows
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect())
    }

    async fn update_task(
        &self,
        scope: OwnerScope,
        id: i64,
        changes: TaskChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(task) = tables.tasks.get_mut(&id).filter(|t| scope.permits(t)) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(completed) = changes.completed {
            task.completed = completed;
        }
        task.updated_at = stamp_after(task.updated_at, now);

        Ok(Some(task.clone()))
    }

    async fn toggle_task(
        &self,
        scope: OwnerScope,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(task) = tables.tasks.get_mut(&id).filter(|t| scope.permits(t)) else {
            return Ok(None);
        };

        task.completed = !task.completed;
        task.updated_at = stamp_after(task.updated_at, now);

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, scope: OwnerScope, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let owned = tables.tasks.get(&id).map_or(false, |t| scope.permits(t));
        if owned {
            tables.tasks.remove(&id);
        }
        Ok(owned)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!("User '{}' already exists", user.username)));
        }

        tables.next_user_id += 1;
        let row = User {
            id: tables.next_user_id,
            username: user.username,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.tasks.retain(|_, t| t.owner_id != id);
        Ok(true)
    }
}
