mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn owner_is_forced_to_the_caller() -> Result<()> {
    let app = TestApp::new();
    let ana = app.login_as("ana").await?;
    app.login_as("bob").await?;

    let (status, body) = app
        .post("/tareas/", &ana, json!({ "titulo": "t", "descripcion": "d", "usuario": "bob", "id": 999 }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["usuario"], "ana");
    assert_ne!(body["id"], 999);
    Ok(())
}

#[tokio::test]
async fn foreign_tasks_are_not_found() -> Result<()> {
    let app = TestApp::new();
    let ana = app.login_as("ana").await?;
    let bob = app.login_as("bob").await?;
    let id = app.create_task(&ana, "private", "ana only").await?;
    let uri = format!("/tareas/{}/", id);

    let (status, body) = app.get(&uri, &bob).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("titulo").is_none());

    let (status, _) = app
        .request(Method::PUT, &uri, Some(&bob), Some(json!({ "titulo": "x", "descripcion": "y" })))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Invalid payload on a foreign id still answers 404
    let (status, _) = app
        .request(Method::PATCH, &uri, Some(&bob), Some(json!({ "titulo": "" })))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::POST, &format!("/tareas/{}/toggle_completado/", id), Some(&bob), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&bob), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get("/tareas/", &bob).await?;
    assert_eq!(list["count"], 0);

    let (status, untouched) = app.get(&uri, &ana).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(untouched["titulo"], "private");
    assert_eq!(untouched["completado"], false);
    Ok(())
}

#[tokio::test]
async fn missing_and_unknown_ids_are_not_found() -> Result<()> {
    let app = TestApp::new();
    let ana = app.login_as("ana").await?;

    let (status, _) = app.get("/tareas/424242/", &ana).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/tareas/not-a-number/", &ana).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected_without_side_effects() -> Result<()> {
    let app = TestApp::new();
    let ana = app.login_as("ana").await?;
    let id = app.create_task(&ana, "t", "d").await?;
    let record = format!("/tareas/{}/", id);
    let toggle = format!("/tareas/{}/toggle_completado/", id);
    let body = json!({ "titulo": "hijacked", "descripcion": "hijacked" });

    let attempts = [
        (Method::GET, "/tareas/", None),
        (Method::POST, "/tareas/", Some(body.clone())),
        (Method::GET, record.as_str(), None),
        (Method::PUT, record.as_str(), Some(body.clone())),
        (Method::PATCH, record.as_str(), Some(body.clone())),
        (Method::DELETE, record.as_str(), None),
        (Method::POST, toggle.as_str(), None),
    ];

    for (method, uri, payload) in attempts {
        let (status, err) = app.request(method.clone(), uri, None, payload.clone()).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(err["code"], "UNAUTHORIZED");

        let (status, _) = app.request(method.clone(), uri, Some("not-a-jwt"), payload).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} with bad token", method, uri);
    }

    let (_, list) = app.get("/tareas/", &ana).await?;
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["titulo"], "t");
    assert_eq!(list["results"][0]["completado"], false);
    Ok(())
}
