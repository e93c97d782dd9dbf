//! TUI application state and event loop

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use todo_core::{
    ApiError, HttpResponse, Operation, PendingCall, Todo, TodoClient, TodoController, ViewMode,
};
use tracing::{debug, info};

use crate::config::Config;
use crate::transport::HttpExecutor;
use crate::ui;

/// How long to wait for a key before checking for finished calls.
const TICK: Duration = Duration::from_millis(50);

/// Which pane receives plain keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

/// A finished remote call on its way back to the UI loop.
#[derive(Debug)]
pub struct Completion {
    pub operation: Operation,
    pub outcome: Result<HttpResponse, ApiError>,
}

pub struct App {
    pub controller: TodoController,
    pub focus: Focus,
    /// Index into the controller's todos; meaningful only when non-empty.
    pub selected: usize,
    pub should_quit: bool,
    in_flight: usize,
    executor: HttpExecutor,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            controller: TodoController::new(TodoClient::new(&config.api_url)),
            focus: Focus::Input,
            selected: 0,
            should_quit: false,
            in_flight: 0,
            executor: HttpExecutor::new()?,
            tx,
            rx,
        })
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.controller.todos().get(self.selected)
    }

    /// Number of calls spawned whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Load once, then alternate between drawing, keys, and completions
    /// until the user quits.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let call = self.controller.load();
        self.spawn(call);

        loop {
            terminal.draw(|f| ui::draw(f, self))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(call) = self.handle_key_event(key) {
                            self.spawn(call);
                        }
                    }
                }
            }

            self.drain_completions();

            if self.should_quit {
                info!(in_flight = self.in_flight, "quitting");
                break;
            }
        }

        Ok(())
    }

    /// Execute `call` off the UI loop; its outcome arrives via the channel.
    fn spawn(&mut self, call: PendingCall) {
        let PendingCall { operation, request } = call;
        debug!(?operation, method = %request.method, url = %request.url, "sending request");
        self.in_flight += 1;
        let executor = self.executor.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = executor.execute(request).await;
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(Completion { operation, outcome });
        });
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(completion);
        }
    }

    /// Reconcile one finished call and keep the selection in range.
    pub fn apply(&mut self, completion: Completion) {
        self.controller
            .complete(completion.operation, completion.outcome);
        let len = self.controller.todos().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Route a key press to the active mode. Returns the remote call the key
    /// triggered, if any.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<PendingCall> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        if self.controller.pending_delete().is_some() {
            return self.handle_delete_prompt(key);
        }
        if self.controller.editing().is_some() {
            return self.handle_edit(key);
        }
        match self.focus {
            Focus::Input => self.handle_input(key),
            Focus::List => self.handle_list(key),
        }
    }

    fn handle_input(&mut self, key: KeyEvent) -> Option<PendingCall> {
        match key.code {
            KeyCode::Enter => return self.controller.create(Utc::now()),
            KeyCode::Char(c) => self.controller.new_title_mut().push(c),
            KeyCode::Backspace => {
                self.controller.new_title_mut().pop();
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Esc => self.focus = Focus::List,
            _ => {}
        }
        None
    }

    fn handle_list(&mut self, key: KeyEvent) -> Option<PendingCall> {
        match key.code {
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char(' ') => {
                let id = self.selected_todo()?.id.clone();
                return self.controller.toggle(&id);
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let id = self.selected_todo()?.id.clone();
                self.controller.start_editing(&id);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let id = self.selected_todo()?.id.clone();
                self.controller.request_delete(&id);
            }
            KeyCode::Char('v') => self.controller.toggle_view_mode(),
            KeyCode::Char('r') => return Some(self.controller.load()),
            KeyCode::Tab | KeyCode::Char('i') => self.focus = Focus::Input,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
        None
    }

    fn handle_edit(&mut self, key: KeyEvent) -> Option<PendingCall> {
        match key.code {
            KeyCode::Enter => return self.controller.commit_edit(),
            KeyCode::Esc => self.controller.cancel_editing(),
            KeyCode::Char(c) => {
                if let Some(buffer) = self.controller.edit_buffer_mut() {
                    buffer.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.controller.edit_buffer_mut() {
                    buffer.pop();
                }
            }
            _ => {}
        }
        None
    }

    fn handle_delete_prompt(&mut self, key: KeyEvent) -> Option<PendingCall> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => self.controller.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Esc => {
                self.controller.cancel_delete();
                None
            }
            _ => None,
        }
    }

    fn select_next(&mut self) {
        let len = self.controller.todos().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    fn select_previous(&mut self) {
        let len = self.controller.todos().len();
        if len > 0 {
            self.selected = if self.selected == 0 {
                len - 1
            } else {
                self.selected - 1
            };
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.controller.view_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::HttpMethod;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key_event(key(KeyCode::Char(c))).is_none());
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new(&Config::default()).unwrap();
        let call = app.controller.load();
        app.apply(Completion {
            operation: call.operation,
            outcome: Ok(HttpResponse::new(
                200,
                r#"[{"id":"1","title":"Buy milk","completed":false},
                    {"id":"2","title":"Walk dog","completed":false}]"#,
            )),
        });
        app
    }

    #[test]
    fn enter_on_blank_input_issues_nothing() {
        let mut app = loaded_app();
        type_text(&mut app, "   ");
        assert!(app.handle_key_event(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn typing_then_enter_issues_create() {
        let mut app = loaded_app();
        type_text(&mut app, "Water plants");
        let call = app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(call.request.method, HttpMethod::Post);
        assert!(matches!(call.operation, Operation::Create { .. }));
    }

    #[test]
    fn space_toggles_selected_record() {
        let mut app = loaded_app();
        app.handle_key_event(key(KeyCode::Tab));
        app.handle_key_event(key(KeyCode::Down));
        let call = app.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(call.operation, Operation::Toggle { id: "2".to_string() });
    }

    #[test]
    fn delete_prompt_can_be_cancelled() {
        let mut app = loaded_app();
        app.focus = Focus::List;
        app.handle_key_event(key(KeyCode::Char('d')));
        assert_eq!(app.controller.pending_delete(), Some("1"));

        // Other keys are swallowed while the prompt is open.
        assert!(app.handle_key_event(key(KeyCode::Char('v'))).is_none());
        assert_eq!(app.view_mode(), ViewMode::List);

        assert!(app.handle_key_event(key(KeyCode::Char('n'))).is_none());
        assert!(app.controller.pending_delete().is_none());
        assert_eq!(app.controller.todos().len(), 2);
    }

    #[test]
    fn confirmed_delete_removes_and_clamps_selection() {
        let mut app = loaded_app();
        app.focus = Focus::List;
        app.selected = 1;
        app.handle_key_event(key(KeyCode::Char('d')));
        let call = app.handle_key_event(key(KeyCode::Char('y'))).unwrap();
        app.apply(Completion {
            operation: call.operation,
            outcome: Ok(HttpResponse::new(200, r#"{"message":"Todo deleted successfully"}"#)),
        });
        assert_eq!(app.controller.todos().len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn repeated_confirm_sends_one_delete() {
        let mut app = loaded_app();
        app.focus = Focus::List;
        app.handle_key_event(key(KeyCode::Char('d')));
        assert!(app.handle_key_event(key(KeyCode::Char('y'))).is_some());
        assert!(app.handle_key_event(key(KeyCode::Char('y'))).is_none());
        assert!(app.handle_key_event(key(KeyCode::Enter)).is_none());
        assert_eq!(app.controller.pending_delete(), Some("1"));
    }

    #[test]
    fn escape_abandons_edit() {
        let mut app = loaded_app();
        app.focus = Focus::List;
        app.handle_key_event(key(KeyCode::Char('e')));
        type_text(&mut app, " and eggs");
        assert_eq!(app.controller.editing().unwrap().buffer, "Buy milk and eggs");
        app.handle_key_event(key(KeyCode::Esc));
        assert!(app.controller.editing().is_none());
        assert_eq!(app.controller.todos()[0].title, "Buy milk");
    }

    #[test]
    fn enter_in_edit_mode_issues_rename() {
        let mut app = loaded_app();
        app.focus = Focus::List;
        app.handle_key_event(key(KeyCode::Char('e')));
        app.handle_key_event(key(KeyCode::Backspace));
        let call = app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(call.operation, Operation::Rename { id: "1".to_string() });
        assert!(call.request.body.unwrap().contains("Buy mil"));
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut app = loaded_app();
        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(app.controller.new_title(), "");
    }

    #[test]
    fn selection_wraps() {
        let mut app = loaded_app();
        app.focus = Focus::List;
        app.handle_key_event(key(KeyCode::Up));
        assert_eq!(app.selected, 1);
        app.handle_key_event(key(KeyCode::Down));
        assert_eq!(app.selected, 0);
    }
}
