use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::access::OwnerScope;
use crate::api::{parse_payload, Paginated, PayloadMode, TaskView};
use crate::database::models::{NewTask, Task};
use crate::database::TaskStore;
use crate::filter::ListQuery;
use crate::middleware::CurrentUser;
use crate::services::ServiceError;
use crate::types::Operation;

/// CRUD and toggle over the caller's tareas
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    page_size: u32,
    audit: bool,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, page_size: u32, audit: bool) -> Self {
        Self { store, page_size, audit }
    }

    pub async fn create(&self, caller: &CurrentUser, body: &Value) -> Result<TaskView, ServiceError> {
        let fields = parse_payload(body, PayloadMode::Full).inspect_err(|e| debug!("Rejected create: {}", e))?;

        let task = self
            .store
            .insert_task(NewTask {
                owner_id: caller.id,
                // Full mode guarantees both text fields
                title: fields.title.unwrap_or_default(),
                description: fields.description.unwrap_or_default(),
                completed: fields.completed.unwrap_or(false),
                created_at: Utc::now(),
            })
            .await?;

        self.audit(Operation::Create, caller, task.id);
        Ok(self.present(task, caller))
    }

    pub async fn list(
        &self,
        caller: &CurrentUser,
        query: &ListQuery,
        base_path: &str,
    ) -> Result<Paginated<TaskView>, ServiceError> {
        let scope = OwnerScope::from(caller);
        let filter = query.filter()?;
        let request = query.page()?;

        let count = self.store.count_tasks(scope, &filter).await?;
        let page = request.resolve(count, self.page_size)?;
        let rows = self.store.list_tasks(scope, &filter, &page).await?;

        debug!(
            "Listed {} of {} tareas for user {} (page {}/{})",
            rows.len(),
            count,
            caller.id,
            page.number,
            page.total_pages
        );

        let results = rows.into_iter().map(|t| self.present(t, caller)).collect();
        Ok(Paginated::new(results, count, &page, &filter, base_path))
    }

    pub async fn retrieve(&self, caller: &CurrentUser, id: i64) -> Result<TaskView, ServiceError> {
        let task = self.find_owned(caller, id).await?;
        Ok(self.present(task, caller))
    }

    /// PUT: title and description required
    pub async fn update(&self, caller: &CurrentUser, id: i64, body: &Value) -> Result<TaskView, ServiceError> {
        self.apply(caller, id, body, PayloadMode::Full, Operation::Update).await
    }

    /// PATCH: any subset of fields
    pub async fn partial_update(
        &self,
        caller: &CurrentUser,
        id: i64,
        body: &Value,
    ) -> Result<TaskView, ServiceError> {
        self.apply(caller, id, body, PayloadMode::Partial, Operation::PartialUpdate).await
    }

    pub async fn delete(&self, caller: &CurrentUser, id: i64) -> Result<(), ServiceError> {
        if !self.store.delete_task(OwnerScope::from(caller), id).await? {
            return Err(ServiceError::NotFound);
        }

        self.audit(Operation::Delete, caller, id);
        Ok(())
    }

    /// Flip `completado`; two calls restore the original value
    pub async fn toggle_completed(&self, caller: &CurrentUser, id: i64) -> Result<TaskView, ServiceError> {
        let task = self
            .store
            .toggle_task(OwnerScope::from(caller), id, Utc::now())
            .await?
            .ok_or(ServiceError::NotFound)?;

        self.audit(Operation::Toggle, caller, task.id);
        Ok(self.present(task, caller))
    }

    async fn apply(
        &self,
        caller: &CurrentUser,
        id: i64,
        body: &Value,
        mode: PayloadMode,
        operation: Operation,
    ) -> Result<TaskView, ServiceError> {
        // Ownership is checked before the payload so foreign ids stay indistinguishable
        self.find_owned(caller, id).await?;

        let fields = parse_payload(body, mode).inspect_err(|e| debug!("Rejected update of {}: {}", id, e))?;
        let task = self
            .store
            .update_task(OwnerScope::from(caller), id, fields.into(), Utc::now())
            .await?
            .ok_or(ServiceError::NotFound)?;

        self.audit(operation, caller, task.id);
        Ok(self.present(task, caller))
    }

    async fn find_owned(&self, caller: &CurrentUser, id: i64) -> Result<Task, ServiceError> {
        self.store
            .find_task(OwnerScope::from(caller), id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Every visible row belongs to the caller, so the caller's username is the owner's
    fn present(&self, task: Task, caller: &CurrentUser) -> TaskView {
        TaskView::new(task, &caller.username)
    }

    fn audit(&self, operation: Operation, caller: &CurrentUser, task_id: i64) {
        if self.audit {
            info!(target: "tareas_api::audit", %operation, user_id = caller.id, task_id, "tarea changed");
        }
    }
}
