use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::Task;

/// Public representation of a tarea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: i64,
    /// Owner's username, resolved by the service at response time
    pub usuario: String,
    pub titulo: String,
    pub descripcion: String,
    pub completado: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
    pub estado: String,
}

impl TaskView {
    pub fn new(task: Task, owner_username: &str) -> Self {
        let estado = task.status().to_string();
        Self {
            id: task.id,
            usuario: owner_username.to_string(),
            titulo: task.title,
            descripcion: task.description,
            completado: task.completed,
            fecha_creacion: task.created_at,
            fecha_actualizacion: task.updated_at,
            estado,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_spanish_field_names() {
        let ts = "2026-01-02T03:04:05Z".parse::<DateTime<Utc>>().unwrap();
        let task = Task {
            id: 3,
            owner_id: 1,
            title: "Buy milk".to_string(),
            description: "2 liters".to_string(),
            completed: true,
            created_at: ts,
            updated_at: ts,
        };

        let value = serde_json::to_value(TaskView::new(task, "A")).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "usuario": "A",
                "titulo": "Buy milk",
                "descripcion": "2 liters",
                "completado": true,
                "fecha_creacion": "2026-01-02T03:04:05Z",
                "fecha_actualizacion": "2026-01-02T03:04:05Z",
                "estado": "Completada"
            })
        );
    }
}
