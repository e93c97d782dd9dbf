//! Storage behind the todo routes.
//!
//! `TodoRepository` is the seam the handlers talk to; `MemoryRepository`
//! keeps records in insertion order so `list` answers in the order todos
//! were created.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    fn validate(&self) -> Result<(), RepositoryError> {
        if self.id.trim().is_empty() {
            return Err(RepositoryError::InvalidInput("id cannot be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(RepositoryError::InvalidInput("title cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("todo with id {0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Todo>, RepositoryError>;
    async fn get(&self, id: &str) -> Result<Todo, RepositoryError>;
    async fn create(&self, todo: Todo) -> Result<Todo, RepositoryError>;
    async fn update(&self, todo: Todo) -> Result<Todo, RepositoryError>;
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    todos: RwLock<Vec<Todo>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn require_id(id: &str) -> Result<(), RepositoryError> {
    if id.trim().is_empty() {
        return Err(RepositoryError::InvalidInput("id cannot be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl TodoRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Todo>, RepositoryError> {
        Ok(self.todos.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Todo, RepositoryError> {
        require_id(id)?;
        self.todos
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn create(&self, todo: Todo) -> Result<Todo, RepositoryError> {
        todo.validate()?;
        let mut todos = self.todos.write().await;
        if todos.iter().any(|t| t.id == todo.id) {
            return Err(RepositoryError::InvalidInput(
                "todo with this ID already exists".to_string(),
            ));
        }
        todos.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, todo: Todo) -> Result<Todo, RepositoryError> {
        todo.validate()?;
        let mut todos = self.todos.write().await;
        let slot = todos
            .iter_mut()
            .find(|t| t.id == todo.id)
            .ok_or_else(|| RepositoryError::NotFound(todo.id.clone()))?;
        *slot = todo.clone();
        Ok(todo)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        require_id(id)?;
        let mut todos = self.todos.write().await;
        let index = todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        todos.remove(index);
        Ok(())
    }
}
