//! Application state and event handling.
//!
//! A single `App` struct owns everything the UI shows: the current release
//! plan, the filter form, the in-app log ring, and the connection state.
//! The plan is only ever replaced wholesale; a rejected or failed response
//! leaves the chart exactly as it was.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{ApiCommand, ApiMessage};
use crate::models::{CustomizeViewRequest, ReleasePlan, ViewType};
use crate::scale;

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal navigation mode.
    #[default]
    Normal,
    /// Editing the filter bar.
    Filtering,
}

/// Which filter-bar field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    #[default]
    ViewType,
    Name,
}

/// State of the filter bar: the view-type selector and the free-text name
/// filter, submitted together to the customize-view endpoint.
#[derive(Debug, Clone, Default)]
pub struct FilterForm {
    pub view_type: ViewType,
    pub name: String,
    pub focused: FilterField,
}

impl FilterForm {
    pub fn next_field(&mut self) {
        self.focused = match self.focused {
            FilterField::ViewType => FilterField::Name,
            FilterField::Name => FilterField::ViewType,
        };
    }

    pub fn to_request(&self) -> CustomizeViewRequest {
        CustomizeViewRequest::new(self.view_type, self.name.trim())
    }
}

/// Log entry for the message area.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: Instant,
    pub message: String,
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(message, LogLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(message, LogLevel::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(message, LogLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(message, LogLevel::Error)
    }

    fn with_level(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            timestamp: Instant::now(),
            message: message.into(),
            level,
        }
    }
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Whether the application should quit.
    pub should_quit: bool,

    /// Current input mode.
    pub input_mode: InputMode,

    /// The plan currently on screen. `None` until the first valid payload.
    pub plan: Option<ReleasePlan>,

    /// Filter bar state.
    pub filter: FilterForm,

    /// Log messages shown in the message area.
    pub logs: Vec<LogEntry>,
    max_logs: usize,

    /// Backend connection status.
    pub api_connected: bool,

    /// Whether a fetch is in flight.
    pub is_loading: bool,

    /// Last successful plan replacement.
    pub last_refresh: Option<Instant>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            plan: None,
            filter: FilterForm::default(),
            logs: Vec::new(),
            max_logs: 100,
            api_connected: false,
            is_loading: true,
            last_refresh: None,
        };

        app.log(LogEntry::info("Release plan viewer initialized"));
        app.log(LogEntry::info("Connecting to backend..."));
        app
    }

    /// Add a log entry, dropping the oldest past the ring size.
    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        if self.logs.len() > self.max_logs {
            self.logs.remove(0);
        }
    }

    /// Handle a message from the API worker.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::PlanLoaded(plan) => {
                self.is_loading = false;
                // Validate before accepting: a structurally invalid or
                // dateless payload never replaces the chart on screen.
                match scale::validate_plan(&plan) {
                    Ok(()) => {
                        let count = plan.item_count();
                        self.plan = Some(plan);
                        self.last_refresh = Some(Instant::now());
                        self.log(LogEntry::success(format!(
                            "Loaded release plan ({} items)",
                            count
                        )));
                    }
                    Err(e) => {
                        log::error!("rejecting release plan payload: {}", e);
                        self.log(LogEntry::error(format!("Rejected payload: {}", e)));
                    }
                }
            }
            ApiMessage::Error(error) => {
                self.is_loading = false;
                log::error!("api error: {}", error);
                self.log(LogEntry::error(error));
            }
            ApiMessage::ConnectionStatus(connected) => {
                let was_connected = self.api_connected;
                self.api_connected = connected;

                if connected && !was_connected {
                    self.log(LogEntry::success("Connected to backend"));
                } else if !connected && was_connected {
                    self.log(LogEntry::warning("Disconnected from backend"));
                }
            }
        }
    }

    /// Handle a key event; may produce a command for the API worker.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Filtering => self.handle_filtering_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                Some(ApiCommand::Shutdown)
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                Some(ApiCommand::Shutdown)
            }
            KeyCode::Char('r') => {
                self.is_loading = true;
                self.log(LogEntry::info("Refreshing release plan..."));
                Some(ApiCommand::RefreshPlan)
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.input_mode = InputMode::Filtering;
                None
            }
            _ => None,
        }
    }

    fn handle_filtering_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.filter.next_field();
                None
            }
            KeyCode::Enter => {
                let request = self.filter.to_request();
                self.is_loading = true;
                self.input_mode = InputMode::Normal;
                self.log(LogEntry::info(format!(
                    "Applying filters (view: {}, name: {:?})",
                    request.view_type, request.filters.name
                )));
                Some(ApiCommand::ApplyFilters(request))
            }
            KeyCode::Up | KeyCode::Left if self.filter.focused == FilterField::ViewType => {
                self.filter.view_type = self.filter.view_type.previous();
                None
            }
            KeyCode::Down | KeyCode::Right if self.filter.focused == FilterField::ViewType => {
                self.filter.view_type = self.filter.view_type.next();
                None
            }
            KeyCode::Backspace if self.filter.focused == FilterField::Name => {
                self.filter.name.pop();
                None
            }
            KeyCode::Char(c) if self.filter.focused == FilterField::Name => {
                self.filter.name.push(c);
                None
            }
            _ => None,
        }
    }

    /// Status bar text.
    pub fn status_text(&self) -> String {
        let connection = if self.api_connected {
            "Connected"
        } else {
            "Disconnected"
        };

        let loading = if self.is_loading { " [Loading...]" } else { "" };

        let last_refresh = self
            .last_refresh
            .map(|t| {
                let secs = t.elapsed().as_secs();
                if secs < 60 {
                    format!(" ({}s ago)", secs)
                } else {
                    format!(" ({}m ago)", secs / 60)
                }
            })
            .unwrap_or_default();

        format!(
            "{}{}{} | f: Filter | r: Refresh | q: Quit",
            connection, loading, last_refresh
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanItem;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn valid_plan(name: &str) -> ReleasePlan {
        ReleasePlan {
            epics: Some(vec![PlanItem::new(name, "2024-01-01", "2024-02-01")]),
            features: None,
            sprints: None,
        }
    }

    fn error_count(app: &App) -> usize {
        app.logs.iter().filter(|e| e.level == LogLevel::Error).count()
    }

    #[test]
    fn failed_request_keeps_chart_and_logs_once() {
        let mut app = App::new();
        app.handle_api_message(ApiMessage::PlanLoaded(valid_plan("epic-a")));
        let before = error_count(&app);

        app.handle_api_message(ApiMessage::Error("connection refused".into()));

        assert_eq!(error_count(&app), before + 1);
        let plan = app.plan.as_ref().unwrap();
        assert_eq!(plan.epics.as_ref().unwrap()[0].name, "epic-a");
        assert!(!app.is_loading);
    }

    #[test]
    fn invalid_payload_never_replaces_the_plan() {
        let mut app = App::new();
        app.handle_api_message(ApiMessage::PlanLoaded(valid_plan("epic-a")));

        app.handle_api_message(ApiMessage::PlanLoaded(ReleasePlan::default()));

        let plan = app.plan.as_ref().unwrap();
        assert_eq!(plan.epics.as_ref().unwrap()[0].name, "epic-a");
        assert_eq!(error_count(&app), 1);
    }

    #[test]
    fn later_payload_wins_wholesale() {
        let mut app = App::new();
        app.handle_api_message(ApiMessage::PlanLoaded(valid_plan("first")));
        app.handle_api_message(ApiMessage::PlanLoaded(valid_plan("second")));

        let plan = app.plan.as_ref().unwrap();
        assert_eq!(plan.epics.as_ref().unwrap().len(), 1);
        assert_eq!(plan.epics.as_ref().unwrap()[0].name, "second");
    }

    #[test]
    fn refresh_key_issues_fetch() {
        let mut app = App::new();
        let cmd = app.handle_key(key(KeyCode::Char('r')));
        assert!(matches!(cmd, Some(ApiCommand::RefreshPlan)));
        assert!(app.is_loading);
    }

    #[test]
    fn filter_flow_builds_the_request() {
        let mut app = App::new();
        assert!(app.handle_key(key(KeyCode::Char('f'))).is_none());
        assert_eq!(app.input_mode, InputMode::Filtering);

        // Cycle the view type, then type into the name field.
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Tab));
        for c in "auth".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }

        let cmd = app.handle_key(key(KeyCode::Enter));
        match cmd {
            Some(ApiCommand::ApplyFilters(req)) => {
                assert_eq!(req.view_type, "epics");
                assert_eq!(req.filters.name, "auth");
            }
            other => panic!("expected ApplyFilters, got {:?}", other),
        }
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn escape_leaves_filter_mode_without_submitting() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('/')));
        let cmd = app.handle_key(key(KeyCode::Esc));
        assert!(cmd.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn connection_transitions_are_logged_once() {
        let mut app = App::new();
        let before = app.logs.len();
        app.handle_api_message(ApiMessage::ConnectionStatus(true));
        app.handle_api_message(ApiMessage::ConnectionStatus(true));
        app.handle_api_message(ApiMessage::ConnectionStatus(false));
        // Only the two transitions produce entries.
        assert_eq!(app.logs.len(), before + 2);
    }
}
