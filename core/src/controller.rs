//! View-state controller that keeps the local todo list in step with the API.
//!
//! # Design
//! The controller never performs I/O. Each user action that needs the server
//! returns a `PendingCall`: the request to send plus the `Operation` it
//! belongs to. The host executes the request however it likes and hands the
//! outcome back through `complete`, which reconciles it into view state.
//!
//! Calls are fire-and-report. A failed call is logged and leaves the view
//! untouched, with one exception: a failed load clears the list. Completions
//! are applied in arrival order, so when two writes to the same record race,
//! whichever response lands last wins locally.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{time_id, Todo};

/// How the list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Cards,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Cards,
            ViewMode::Cards => ViewMode::List,
        }
    }
}

/// An in-progress title edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: String,
    pub buffer: String,
}

/// The controller action a remote call was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create { id: String },
    Toggle { id: String },
    Rename { id: String },
    Delete { id: String },
}

/// A request waiting to be executed, tagged with what to do with its outcome.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub operation: Operation,
    pub request: HttpRequest,
}

#[derive(Debug)]
pub struct TodoController {
    client: TodoClient,
    todos: Vec<Todo>,
    new_title: String,
    loading: bool,
    editing: Option<EditState>,
    pending_delete: Option<String>,
    /// Id of the confirmed delete still awaiting its response.
    deleting: Option<String>,
    view_mode: ViewMode,
    last_created_millis: i64,
}

impl TodoController {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            todos: Vec::new(),
            new_title: String::new(),
            loading: false,
            editing: None,
            pending_delete: None,
            deleting: None,
            view_mode: ViewMode::default(),
            last_created_millis: i64::MIN,
        }
    }

    // -----------------------------------------------------------------------
    // View state
    // -----------------------------------------------------------------------

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn new_title(&self) -> &str {
        &self.new_title
    }

    pub fn new_title_mut(&mut self) -> &mut String {
        &mut self.new_title
    }

    pub fn set_new_title(&mut self, title: impl Into<String>) {
        self.new_title = title.into();
    }

    /// Whether `create` would issue a call right now.
    pub fn can_submit(&self) -> bool {
        !self.new_title.trim().is_empty()
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing.as_ref().is_some_and(|e| e.id == id)
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        self.editing.as_mut().map(|e| &mut e.buffer)
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Fetch the whole collection. Marks the view as loading until the call
    /// completes either way.
    pub fn load(&mut self) -> PendingCall {
        self.loading = true;
        PendingCall {
            operation: Operation::Load,
            request: self.client.build_list_todos(),
        }
    }

    /// Submit the add-task input. A blank title is a silent no-op.
    ///
    /// The id comes from `now`, nudged forward a millisecond at a time past
    /// any id already in the list or handed out by an earlier create.
    pub fn create(&mut self, now: DateTime<Utc>) -> Option<PendingCall> {
        let title = self.new_title.trim();
        if title.is_empty() {
            return None;
        }

        let mut at = now;
        if at.timestamp_millis() <= self.last_created_millis {
            at += Duration::milliseconds(self.last_created_millis - at.timestamp_millis() + 1);
        }
        while self.get(&time_id(at)).is_some() {
            at += Duration::milliseconds(1);
        }
        let todo = Todo::new(title, at);

        match self.client.build_create_todo(&todo) {
            Ok(request) => {
                self.last_created_millis = at.timestamp_millis();
                Some(PendingCall {
                    operation: Operation::Create { id: todo.id },
                    request,
                })
            }
            Err(e) => {
                error!(error = %e, "failed to build create request");
                None
            }
        }
    }

    /// Send `id` back with its completion flag inverted.
    pub fn toggle(&self, id: &str) -> Option<PendingCall> {
        let todo = self.get(id)?;
        match self.client.build_update_todo(&todo.toggled()) {
            Ok(request) => Some(PendingCall {
                operation: Operation::Toggle { id: id.to_string() },
                request,
            }),
            Err(e) => {
                error!(id, error = %e, "failed to build toggle request");
                None
            }
        }
    }

    /// Enter edit mode for `id`, seeding the buffer with its current title.
    /// Returns false when `id` is not in the list.
    pub fn start_editing(&mut self, id: &str) -> bool {
        let Some(todo) = self.get(id) else {
            return false;
        };
        self.editing = Some(EditState {
            id: todo.id.clone(),
            buffer: todo.title.clone(),
        });
        true
    }

    /// Leave edit mode, dropping the buffer. The title is untouched.
    pub fn cancel_editing(&mut self) {
        self.editing = None;
    }

    /// Send the trimmed edit buffer as the new title. Edit mode stays on
    /// until the server confirms; a blank buffer is a silent no-op.
    pub fn commit_edit(&self) -> Option<PendingCall> {
        let edit = self.editing.as_ref()?;
        let title = edit.buffer.trim();
        if title.is_empty() {
            return None;
        }
        let todo = self.get(&edit.id)?;
        match self.client.build_update_todo(&todo.renamed(title)) {
            Ok(request) => Some(PendingCall {
                operation: Operation::Rename {
                    id: edit.id.clone(),
                },
                request,
            }),
            Err(e) => {
                error!(id = %edit.id, error = %e, "failed to build rename request");
                None
            }
        }
    }

    /// Open the delete confirmation for `id`, replacing any earlier pending
    /// id. Returns false when `id` is not in the list.
    pub fn request_delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.pending_delete = Some(id.to_string());
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issue the delete the confirmation prompt is holding. The prompt stays
    /// open until the server confirms; confirming again while that delete is
    /// in flight issues nothing.
    pub fn confirm_delete(&mut self) -> Option<PendingCall> {
        let id = self.pending_delete.as_deref()?;
        if self.deleting.as_deref() == Some(id) {
            debug!(%id, "delete already in flight");
            return None;
        }
        self.deleting = Some(id.to_string());
        Some(PendingCall {
            operation: Operation::Delete { id: id.to_string() },
            request: self.client.build_delete_todo(id),
        })
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Fold the outcome of a call issued for `operation` into view state.
    pub fn complete(&mut self, operation: Operation, outcome: Result<HttpResponse, ApiError>) {
        match operation {
            Operation::Load => {
                self.loading = false;
                match outcome.and_then(|r| self.client.parse_list_todos(r)) {
                    Ok(todos) => {
                        debug!(count = todos.len(), "loaded todos");
                        self.todos = todos;
                    }
                    Err(e) => {
                        error!(error = %e, "error fetching todos");
                        self.todos.clear();
                    }
                }
            }
            Operation::Create { id } => {
                match outcome.and_then(|r| self.client.parse_create_todo(r)) {
                    Ok(todo) => {
                        debug!(id = %todo.id, "created todo");
                        self.merge(todo);
                        self.new_title.clear();
                    }
                    Err(e) => warn!(%id, error = %e, "error adding todo"),
                }
            }
            Operation::Toggle { id } => {
                match outcome.and_then(|r| self.client.parse_update_todo(r)) {
                    Ok(todo) => {
                        debug!(%id, completed = todo.completed, "toggled todo");
                        self.replace(&id, todo);
                    }
                    Err(e) => warn!(%id, error = %e, "error updating todo"),
                }
            }
            Operation::Rename { id } => {
                match outcome.and_then(|r| self.client.parse_update_todo(r)) {
                    Ok(todo) => {
                        debug!(%id, "renamed todo");
                        self.replace(&id, todo);
                        if self.is_editing(&id) {
                            self.editing = None;
                        }
                    }
                    Err(e) => warn!(%id, error = %e, "error updating todo"),
                }
            }
            Operation::Delete { id } => {
                if self.deleting.as_deref() == Some(id.as_str()) {
                    self.deleting = None;
                }
                let outcome = match outcome.and_then(|r| self.client.parse_delete_todo(r)) {
                    // Already gone on the server; drop it here too.
                    Err(ApiError::NotFound) => {
                        debug!(%id, "todo already deleted on server");
                        Ok(())
                    }
                    other => other,
                };
                match outcome {
                    Ok(()) => {
                        debug!(%id, "deleted todo");
                        self.todos.retain(|t| t.id != id);
                        if self.pending_delete.as_deref() == Some(id.as_str()) {
                            self.pending_delete = None;
                        }
                        if self.is_editing(&id) {
                            self.editing = None;
                        }
                    }
                    Err(e) => warn!(%id, error = %e, "error deleting todo"),
                }
            }
        }
    }

    /// Execute `call` on `transport` and reconcile the outcome in one step.
    pub fn dispatch<T: Transport>(&mut self, call: PendingCall, transport: T) {
        let PendingCall { operation, request } = call;
        let outcome = transport.execute(request);
        self.complete(operation, outcome);
    }

    fn merge(&mut self, todo: Todo) {
        match self.todos.iter_mut().find(|t| t.id == todo.id) {
            Some(existing) => *existing = todo,
            None => self.todos.push(todo),
        }
    }

    fn replace(&mut self, id: &str, todo: Todo) {
        if let Some(existing) = self.todos.iter_mut().find(|t| t.id == id) {
            *existing = todo;
        }
    }
}
