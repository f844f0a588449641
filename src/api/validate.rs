//! Inbound payload checks for tareas.
//!
//! Turns a raw JSON body into a validated field set. Read-only fields
//! (`id`, `usuario`, `fecha_creacion`, `fecha_actualizacion`, `estado`) and
//! unknown keys are ignored, so a client can never set the owner or the
//! timestamps.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::database::models::TaskChanges;

pub const TITLE_MAX_CHARS: usize = 200;

pub const FIELD_TITLE: &str = "titulo";
pub const FIELD_DESCRIPTION: &str = "descripcion";
pub const FIELD_COMPLETED: &str = "completado";
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Required,
    EmptyField,
    TooLong,
    TooShort,
    BadType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: ValidationKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, kind: ValidationKind, message: impl Into<String>) -> Self {
        Self { field, kind, message: message.into() }
    }
}

/// One or more rejected fields
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid task payload: {}", summary(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn kind_of(&self, field: &str) -> Option<ValidationKind> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.kind)
    }

    pub fn field_messages(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .map(|e| (e.field.to_string(), e.message.clone()))
            .collect()
    }
}

impl From<FieldError> for ValidationError {
    fn from(error: FieldError) -> Self {
        Self { errors: vec![error] }
    }
}

/// Trim and check a title: non-empty, at most 200 characters
pub fn clean_title(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(
            FIELD_TITLE,
            ValidationKind::EmptyField,
            "El título no puede estar vacío",
        ));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(FieldError::new(
            FIELD_TITLE,
            ValidationKind::TooLong,
            format!("Asegúrese de que este campo no tenga más de {} caracteres.", TITLE_MAX_CHARS),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trim and check a description: non-empty, unbounded
pub fn clean_description(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(
            FIELD_DESCRIPTION,
            ValidationKind::EmptyField,
            "La descripción no puede estar vacía",
        ));
    }
    Ok(trimmed.to_string())
}

/// Create and PUT require title and description; PATCH accepts any subset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    Full,
    Partial,
}

/// Validated, trimmed input fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<TaskFields> for TaskChanges {
    fn from(fields: TaskFields) -> Self {
        TaskChanges {
            title: fields.title,
            description: fields.description,
            completed: fields.completed,
        }
    }
}

pub fn parse_payload(body: &Value, mode: PayloadMode) -> Result<TaskFields, ValidationError> {
    let Value::Object(map) = body else {
        return Err(FieldError::new(
            NON_FIELD_ERRORS,
            ValidationKind::BadType,
            format!("Datos inválidos. Se esperaba un diccionario, pero se recibió {}.", type_name(body)),
        )
        .into());
    };

    let mut errors = Vec::new();
    let mut fields = TaskFields::default();

    match text_field(map, FIELD_TITLE, mode) {
        Ok(Some(raw)) => match clean_title(raw) {
            Ok(title) => fields.title = Some(title),
            Err(e) => errors.push(e),
        },
        Ok(None) => {}
        Err(e) => errors.push(e),
    }

    match text_field(map, FIELD_DESCRIPTION, mode) {
        Ok(Some(raw)) => match clean_description(raw) {
            Ok(description) => fields.description = Some(description),
            Err(e) => errors.push(e),
        },
        Ok(None) => {}
        Err(e) => errors.push(e),
    }

    match map.get(FIELD_COMPLETED) {
        None => {}
        Some(Value::Bool(b)) => fields.completed = Some(*b),
        Some(Value::Null) => errors.push(null_error(FIELD_COMPLETED)),
        Some(_) => errors.push(FieldError::new(
            FIELD_COMPLETED,
            ValidationKind::BadType,
            "Debe ser un valor booleano válido.",
        )),
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(ValidationError { errors })
    }
}

fn text_field<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
    mode: PayloadMode,
) -> Result<Option<&'a str>, FieldError> {
    match map.get(field) {
        None if mode == PayloadMode::Full => Err(FieldError::new(
            field,
            ValidationKind::Required,
            "Este campo es requerido.",
        )),
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(Value::Null) => Err(null_error(field)),
        Some(_) => Err(FieldError::new(field, ValidationKind::BadType, "No es una cadena válida.")),
    }
}

fn null_error(field: &'static str) -> FieldError {
    FieldError::new(field, ValidationKind::BadType, "Este campo no puede ser nulo.")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trims_title_and_description() {
        let fields = parse_payload(
            &json!({"titulo": "  Buy milk ", "descripcion": "\t2 liters\n"}),
            PayloadMode::Full,
        )
        .unwrap();
        assert_eq!(fields.title.as_deref(), Some("Buy milk"));
        assert_eq!(fields.description.as_deref(), Some("2 liters"));
        assert_eq!(fields.completed, None);
    }

    #[test]
    fn whitespace_only_fields_are_empty() {
        for blank in ["", " ", "\t\n  "] {
            let err = parse_payload(&json!({"titulo": blank, "descripcion": blank}), PayloadMode::Full)
                .unwrap_err();
            assert_eq!(err.kind_of(FIELD_TITLE), Some(ValidationKind::EmptyField));
            assert_eq!(err.kind_of(FIELD_DESCRIPTION), Some(ValidationKind::EmptyField));
        }
    }

    #[test]
    fn title_limit_counts_characters_after_trim() {
        let exact = "á".repeat(TITLE_MAX_CHARS);
        assert_eq!(clean_title(&format!("  {}  ", exact)).unwrap(), exact);

        let over = "a".repeat(TITLE_MAX_CHARS + 1);
        assert_eq!(clean_title(&over).unwrap_err().kind, ValidationKind::TooLong);
    }

    #[test]
    fn full_mode_requires_text_fields() {
        let err = parse_payload(&json!({"completado": true}), PayloadMode::Full).unwrap_err();
        assert_eq!(err.kind_of(FIELD_TITLE), Some(ValidationKind::Required));
        assert_eq!(err.kind_of(FIELD_DESCRIPTION), Some(ValidationKind::Required));
    }

    #[test]
    fn partial_mode_accepts_any_subset() {
        assert_eq!(parse_payload(&json!({}), PayloadMode::Partial).unwrap(), TaskFields::default());

        let fields = parse_payload(&json!({"completado": true}), PayloadMode::Partial).unwrap();
        assert_eq!(fields.completed, Some(true));
        assert_eq!(fields.title, None);
    }

    #[test]
    fn partial_mode_still_validates_supplied_fields() {
        let err = parse_payload(&json!({"titulo": "   "}), PayloadMode::Partial).unwrap_err();
        assert_eq!(err.kind_of(FIELD_TITLE), Some(ValidationKind::EmptyField));
    }

    #[test]
    fn completed_must_be_boolean() {
        for bad in [json!("true"), json!(1), json!(null)] {
            let err = parse_payload(&json!({"completado": bad}), PayloadMode::Partial).unwrap_err();
            assert_eq!(err.kind_of(FIELD_COMPLETED), Some(ValidationKind::BadType));
        }
    }

    #[test]
    fn text_fields_must_be_strings() {
        let err = parse_payload(&json!({"titulo": 5, "descripcion": null}), PayloadMode::Full).unwrap_err();
        assert_eq!(err.kind_of(FIELD_TITLE), Some(ValidationKind::BadType));
        assert_eq!(err.kind_of(FIELD_DESCRIPTION), Some(ValidationKind::BadType));
    }

    #[test]
    fn read_only_fields_are_ignored() {
        let fields = parse_payload(
            &json!({
                "titulo": "t",
                "descripcion": "d",
                "usuario": "mallory",
                "id": 99,
                "fecha_creacion": "2000-01-01T00:00:00Z",
                "estado": "Completada"
            }),
            PayloadMode::Full,
        )
        .unwrap();
        assert_eq!(
            fields,
            TaskFields {
                title: Some("t".to_string()),
                description: Some("d".to_string()),
                completed: None,
            }
        );
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = parse_payload(&json!(["titulo"]), PayloadMode::Full).unwrap_err();
        assert_eq!(err.kind_of(NON_FIELD_ERRORS), Some(ValidationKind::BadType));
        assert!(err.field_messages()[NON_FIELD_ERRORS].contains("list"));
    }

    #[test]
    fn collects_every_field_error() {
        let err = parse_payload(
            &json!({"titulo": "", "descripcion": " ", "completado": "no"}),
            PayloadMode::Full,
        )
        .unwrap_err();
        assert_eq!(err.errors.len(), 3);
    }
}
