use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::access::OwnerScope;
use crate::database::models::{NewTask, NewUser, Task, TaskChanges, User};
use crate::database::store::{StoreError, TaskStore, UserStore};
use crate::filter::{Page, TaskFilter};

const TASK_COLUMNS: &str =
    "id, usuario_id, titulo, descripcion, completado, fecha_creacion, fecha_actualizacion";

const USER_COLUMNS: &str = "id, username, password_hash, fecha_registro";

/// Postgres-backed store over the `usuarios` and `tareas` tables
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `WHERE usuario_id = $1 [AND completado = $2] [AND titulo = $3]`
    fn push_scope<'a>(qb: &mut QueryBuilder<'a, Postgres>, scope: OwnerScope, filter: &'a TaskFilter) {
        qb.push(" WHERE usuario_id = ").push_bind(scope.owner_id());
        if let Some(completed) = filter.completed {
            qb.push(" AND completado = ").push_bind(completed);
        }
        if let Some(title) = &filter.title {
            qb.push(" AND titulo = ").push_bind(title.as_str());
        }
    }
}

fn map_insert_error(err: sqlx::Error, what: &str) -> StoreError {
    let unique_violation = err
        .as_database_error()
        .and_then(|e| e.code())
        .map(|code| code == "23505")
        .unwrap_or(false);

    if unique_violation {
        StoreError::Conflict(format!("{} already exists", what))
    } else {
        StoreError::Sqlx(err)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tareas (usuario_id, titulo, descripcion, completado, fecha_creacion, fecha_actualizacion)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {}",
            TASK_COLUMNS
        );

        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(task.owner_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_task(&self, scope: OwnerScope, id: i64) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tareas WHERE id = $1 AND usuario_id = $2",
            TASK_COLUMNS
        );

        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn count_tasks(&self, scope: OwnerScope, filter: &TaskFilter) -> Result<i64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS count FROM tareas");
        Self::push_scope(&mut qb, scope, filter);

        let row = qb.build().fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn list_tasks(
        &self,
        scope: OwnerScope,
        filter: &TaskFilter,
        page: &Page,
    ) -> Result<Vec<Task>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM tareas", TASK_COLUMNS));
        Self::push_scope(&mut qb, scope, filter);
        qb.push(" ORDER BY fecha_creacion DESC, id DESC");
        qb.push(" LIMIT ").push_bind(page.limit);
        qb.push(" OFFSET ").push_bind(page.offset);

        let rows = qb.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn update_task(
        &self,
        scope: OwnerScope,
        id: i64,
        changes: TaskChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tareas SET
                titulo = COALESCE($3, titulo),
                descripcion = COALESCE($4, descripcion),
                completado = COALESCE($5, completado),
                fecha_actualizacion = GREATEST($6, fecha_actualizacion)
             WHERE id = $1 AND usuario_id = $2
             RETURNING {}",
            TASK_COLUMNS
        );

        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.completed)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn toggle_task(
        &self,
        scope: OwnerScope,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tareas SET
                completado = NOT completado,
                fecha_actualizacion = GREATEST($3, fecha_actualizacion)
             WHERE id = $1 AND usuario_id = $2
             RETURNING {}",
            TASK_COLUMNS
        );

        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete_task(&self, scope: OwnerScope, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tareas WHERE id = $1 AND usuario_id = $2")
            .bind(id)
            .bind(scope.owner_id())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO usuarios (username, password_hash, fecha_registro)
             VALUES ($1, $2, $3)
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &format!("User '{}'", user.username)))
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM usuarios WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM usuarios WHERE username = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        // tareas.usuario_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
