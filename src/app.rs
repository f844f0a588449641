//! Router assembly.
//!
//! Routes are declared once in [`routes`] as `(path, methods, requires_auth, handler)`
//! entries. The same table drives the router and the `GET /` descriptor, and
//! entries flagged `requires_auth` are wrapped in [`require_auth`].

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::{TaskStore, UserStore};
use crate::handlers::{protected::tareas, public};
use crate::middleware::require_auth;
use crate::services::{TaskService, UserService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tasks: TaskService,
    pub users: UserService,
    /// Backs the health check
    pub store: Arc<dyn TaskStore>,
    pub routes: Arc<Vec<RouteInfo>>,
}

impl AppState {
    pub fn new<S>(config: AppConfig, store: S) -> Self
    where
        S: TaskStore + UserStore + 'static,
    {
        let store = Arc::new(store);
        let task_store: Arc<dyn TaskStore> = store.clone();
        let user_store: Arc<dyn UserStore> = store;

        let tasks = TaskService::new(
            task_store.clone(),
            config.pagination.page_size,
            config.security.enable_audit_logging,
        );
        let users = UserService::new(user_store, config.security.clone());
        let routes = routes().into_iter().map(|entry| entry.info).collect();

        Self {
            config: Arc::new(config),
            tasks,
            users,
            store: task_store,
            routes: Arc::new(routes),
        }
    }
}

/// Public description of one route
#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub path: &'static str,
    pub methods: &'static [&'static str],
    pub requires_auth: bool,
}

pub struct RouteEntry {
    pub info: RouteInfo,
    pub handler: MethodRouter<AppState>,
}

fn entry(
    path: &'static str,
    methods: &'static [&'static str],
    requires_auth: bool,
    handler: MethodRouter<AppState>,
) -> RouteEntry {
    RouteEntry {
        info: RouteInfo { path, methods, requires_auth },
        handler,
    }
}

pub fn routes() -> Vec<RouteEntry> {
    use public::auth;

    vec![
        entry("/", &["GET"], false, get(public::root)),
        entry("/health", &["GET"], false, get(public::health)),
        entry("/auth/register/", &["POST"], false, post(auth::register_post)),
        entry("/auth/login/", &["POST"], false, post(auth::login_post)),
        entry(
            "/tareas/",
            &["GET", "POST"],
            true,
            get(tareas::collection_get).post(tareas::collection_post),
        ),
        entry(
            "/tareas/:id/",
            &["GET", "PUT", "PATCH", "DELETE"],
            true,
            get(tareas::record_get)
                .put(tareas::record_put)
                .patch(tareas::record_patch)
                .delete(tareas::record_delete),
        ),
        entry("/tareas/:id/toggle_completado/", &["POST"], true, post(tareas::toggle_post)),
    ]
}

pub fn app(state: AppState) -> Router {
    let mut open = Router::new();
    let mut protected = Router::new();

    for RouteEntry { info, handler } in routes() {
        if info.requires_auth {
            protected = protected.route(info.path, handler);
        } else {
            open = open.route(info.path, handler);
        }
    }

    let protected = protected.route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.server.max_request_size_bytes))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
