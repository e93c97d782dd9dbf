use std::{future::Future, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod repository;

pub use repository::{MemoryRepository, RepositoryError, Todo, TodoRepository};

/// Origin of the browser dev server allowed through CORS.
pub const DEV_ORIGIN: &str = "http://localhost:5173";

pub type Repo = Arc<dyn TodoRepository>;

/// Body accepted by create and update. Missing fields default to empty so
/// they reach validation instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct TodoBody {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoBody {
    fn into_todo(self, id: String) -> Todo {
        Todo {
            id,
            title: self.title,
            completed: self.completed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Repository(RepositoryError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ServerError::InvalidBody(rejection) => {
                tracing::debug!(%rejection, "rejected request body");
                StatusCode::BAD_REQUEST
            }
        };
        tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Router over a fresh in-memory store.
pub fn app() -> Router {
    app_with(Arc::new(MemoryRepository::new()))
}

pub fn app_with(repo: Repo) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(repo)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(HeaderValue::from_static(DEV_ORIGIN))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve until `shutdown` resolves, letting in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown)
        .await
}

async fn list_todos(State(repo): State<Repo>) -> Result<Json<Vec<Todo>>, ServerError> {
    Ok(Json(repo.list().await?))
}

async fn create_todo(
    State(repo): State<Repo>,
    payload: Result<Json<TodoBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ServerError> {
    let Json(input) = payload?;
    let id = input.id.clone();
    let todo = repo.create(input.into_todo(id)).await?;
    tracing::info!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(repo): State<Repo>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ServerError> {
    Ok(Json(repo.get(&id).await?))
}

/// The path id wins over any id in the body.
async fn update_todo(
    State(repo): State<Repo>,
    Path(id): Path<String>,
    payload: Result<Json<TodoBody>, JsonRejection>,
) -> Result<Json<Todo>, ServerError> {
    let Json(input) = payload?;
    let todo = repo.update(input.into_todo(id)).await?;
    tracing::info!(id = %todo.id, completed = todo.completed, "updated todo");
    Ok(Json(todo))
}

async fn delete_todo(
    State(repo): State<Repo>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ServerError> {
    repo.delete(&id).await?;
    tracing::info!(%id, "deleted todo");
    Ok(Json(MessageBody {
        message: "Todo deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_to_json() {
        let todo = Todo {
            id: "1700000000000".to_string(),
            title: "Test".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], "1700000000000");
        assert_eq!(json["title"], "Test");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn body_defaults_missing_fields() {
        let input: TodoBody = serde_json::from_str(r#"{"title":"No id"}"#).unwrap();
        assert_eq!(input.id, "");
        assert_eq!(input.title, "No id");
        assert!(!input.completed);
    }

    #[test]
    fn body_ignores_unknown_fields() {
        let input: TodoBody =
            serde_json::from_str(r#"{"id":"1","title":"t","completed":true,"extra":1}"#).unwrap();
        assert!(input.completed);
    }

    #[test]
    fn repository_errors_keep_their_message() {
        let err = ServerError::from(RepositoryError::InvalidInput("title cannot be empty".into()));
        assert_eq!(err.to_string(), "invalid input: title cannot be empty");
    }
}
