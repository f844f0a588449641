use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the `tareas` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    #[sqlx(rename = "usuario_id")]
    pub owner_id: i64,
    #[sqlx(rename = "titulo")]
    pub title: String,
    #[sqlx(rename = "descripcion")]
    pub description: String,
    #[sqlx(rename = "completado")]
    pub completed: bool,
    #[sqlx(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "fecha_actualizacion")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Human readable status derived from the completion flag
    pub fn status(&self) -> &'static str {
        if self.completed {
            "Completada"
        } else {
            "Pendiente"
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.title, self.id)
    }
}

/// Validated insert; owner comes from the caller, never the payload
#[derive(Debug, Clone)]
pub struct NewTask {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated set of changes. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> Task {
        let now = Utc::now();
        Task {
            id: 7,
            owner_id: 1,
            title: "Comprar leche".to_string(),
            description: "2 litros".to_string(),
            completed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_follows_completed_flag() {
        assert_eq!(task(false).status(), "Pendiente");
        assert_eq!(task(true).status(), "Completada");
    }

    #[test]
    fn display_includes_title_and_id() {
        assert_eq!(task(false).to_string(), "Comprar leche (#7)");
    }
}
