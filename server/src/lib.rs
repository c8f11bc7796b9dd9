//! HTTP surface for the todo service.
//!
//! Every route is a thin adapter around [`TodoHandler`]: extract the path id
//! and JSON body, call the handler, serialize the result. POST and PUT share
//! one axum handler per path so the two verbs cannot diverge.

pub mod config;
pub mod error;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use todo_core::{KeyValueStore, MemoryStore, Read, Todo, TodoHandler, UNASSIGNED_ID};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError, StoreBackend};
pub use error::ServerError;

/// Served on `/`.
pub const SERVICE_NAME: &str = "Backbone.js TODO";

/// Build the router over an already constructed handler.
pub fn app<S>(handler: TodoHandler<S>) -> Router
where
    S: KeyValueStore<Todo> + Clone + 'static,
{
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health::<S>))
        .route(
            "/todos",
            get(list_todos::<S>).post(write_todo::<S>).put(write_todo::<S>),
        )
        .route(
            "/todos/{id}",
            get(get_todo::<S>)
                .post(write_todo_at::<S>)
                .put(write_todo_at::<S>)
                .delete(delete_todo::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

/// Serve `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Serve the API over a fresh in-memory store.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app(TodoHandler::new(MemoryStore::<Todo>::new()))).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn banner() -> &'static str {
    SERVICE_NAME
}

async fn health<S>(State(handler): State<TodoHandler<S>>) -> Response
where
    S: KeyValueStore<Todo> + Clone + 'static,
{
    match handler.store().health_check().await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}

async fn list_todos<S>(State(handler): State<TodoHandler<S>>) -> Result<Response, ServerError>
where
    S: KeyValueStore<Todo> + Clone + 'static,
{
    Ok(read_response(handler.read(UNASSIGNED_ID).await?))
}

async fn get_todo<S>(
    State(handler): State<TodoHandler<S>>,
    Path(id): Path<i64>,
) -> Result<Response, ServerError>
where
    S: KeyValueStore<Todo> + Clone + 'static,
{
    Ok(read_response(handler.read(id).await?))
}

async fn write_todo<S>(
    State(handler): State<TodoHandler<S>>,
    Json(todo): Json<Todo>,
) -> Result<Json<Todo>, ServerError>
where
    S: KeyValueStore<Todo> + Clone + 'static,
{
    Ok(Json(handler.write(todo).await?))
}

/// The path id replaces whatever id the body carried.
async fn write_todo_at<S>(
    State(handler): State<TodoHandler<S>>,
    Path(id): Path<i64>,
    Json(todo): Json<Todo>,
) -> Result<Json<Todo>, ServerError>
where
    S: KeyValueStore<Todo> + Clone + 'static,
{
    Ok(Json(handler.write(Todo { id, ..todo }).await?))
}

async fn delete_todo<S>(
    State(handler): State<TodoHandler<S>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError>
where
    S: KeyValueStore<Todo> + Clone + 'static,
{
    handler.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// An absent todo is an empty success, not a 404.
fn read_response(read: Read<Todo>) -> Response {
    match read {
        Read::All(todos) => Json(todos).into_response(),
        Read::One(Some(todo)) => Json(todo).into_response(),
        Read::One(None) => StatusCode::NO_CONTENT.into_response(),
    }
}
