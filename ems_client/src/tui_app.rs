//! Terminal UI for the Employee Management System.
//!
//! Each screen of the application is a [`pages::Page`]. Network calls run
//! on spawned tasks and report back as [`AppEvent`]s over a channel that the
//! single UI loop drains between frames.

use anyhow::Result;
use chrono::{DateTime, Utc};
use ems_core::{
    ApiClient, ApiError, ApiResult, Notification, NotificationLevel, Route, RouteDecision,
    api::SavedForm,
    auth::User,
    employees::{Employee, EmployeeId},
    forms::FormTemplate,
    guard,
};
use ratatui::{
    DefaultTerminal, Frame,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Alignment, Constraint, Flex, Layout, Margin, Rect},
    style::Stylize,
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{Block, Clear, List, ListDirection, ListItem, Paragraph, Scrollbar, ScrollbarOrientation},
};
use std::{future::Future, time::Duration};
use tokio::sync::mpsc;

mod pages;
mod widgets;

use pages::Page;
use widgets::ScrollableList;

const HELP: &str = "\
Tab
        Toggle this help menu.
PageUp / PageDown
        Scroll the history panel (or this menu while it is open).
Ctrl+Home / Ctrl+End
        Jump to the oldest / newest history record.
Esc
        Go back to the dashboard. Quits from the dashboard and login screens.
Ctrl+C
        Quit.
";
const MAX_LOG_RECORDS: usize = 1024;
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecordKind {
    Info,
    Success,
    Error,
    You,
}

/// A timestamped terminal message with an importance label to help
/// direct user attention.
#[derive(Clone, Debug)]
pub(crate) struct Record {
    datetime: DateTime<Utc>,
    kind: RecordKind,
    content: String,
}

impl Record {
    fn new(kind: RecordKind, content: String) -> Self {
        Self {
            datetime: Utc::now(),
            kind,
            content,
        }
    }
}

impl From<Notification> for Record {
    fn from(notification: Notification) -> Self {
        let kind = match notification.level {
            NotificationLevel::Info => RecordKind::Info,
            NotificationLevel::Success => RecordKind::Success,
            NotificationLevel::Error => RecordKind::Error,
        };
        Self {
            datetime: notification.created_at,
            kind,
            content: notification.message,
        }
    }
}

impl From<Record> for ListItem<'_> {
    fn from(val: Record) -> Self {
        let repr = match val.kind {
            RecordKind::Info => "INFO".light_blue(),
            RecordKind::Success => "OK".light_green(),
            RecordKind::Error => "ERROR".light_red(),
            RecordKind::You => "YOU".light_yellow(),
        };

        let msg = vec![
            format!("[{} ", val.datetime.format("%H:%M:%S")).into(),
            Span::styled(format!("{repr:5}"), repr.style),
            format!("]: {}", val.content).into(),
        ];

        ListItem::new(Line::from(msg))
    }
}

/// What a page asks the app to do after handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Navigate(Route),
    Logout,
    /// A call failed because the session is gone
    SessionExpired,
    Quit,
}

/// Completion of background work started by a page
#[derive(Debug)]
pub(crate) enum AppEvent {
    LoggedIn(ApiResult<User>),
    Registered(ApiResult<User>),
    PasswordChanged(ApiResult<String>),
    LoggedOut,
    TemplatesLoaded(ApiResult<Vec<FormTemplate>>),
    TemplateLoaded(ApiResult<FormTemplate>),
    EmployeeLoaded {
        id: EmployeeId,
        result: ApiResult<(Employee, FormTemplate)>,
    },
    /// `from` is the employee form route that sent the save
    EmployeeSaved { from: Route, result: ApiResult<()> },
    FormSaved(ApiResult<SavedForm>),
}

pub(crate) fn employee_saved_message(from: Route) -> &'static str {
    match from {
        Route::EditEmployee(_) => "Employee updated successfully!",
        _ => "Employee created successfully!",
    }
}

pub(crate) fn form_saved_message(saved: &SavedForm) -> &'static str {
    match saved {
        SavedForm::Created(_) => "Form template saved successfully!",
        SavedForm::Reordered(_) => "Field order saved.",
    }
}

fn expired<T>(result: &ApiResult<T>) -> bool {
    result.as_ref().is_err_and(ApiError::is_session_expired)
}

impl AppEvent {
    /// Whether the work failed because the session is gone.
    fn session_expired(&self) -> bool {
        match self {
            AppEvent::LoggedIn(r) | AppEvent::Registered(r) => expired(r),
            AppEvent::PasswordChanged(r) => expired(r),
            AppEvent::LoggedOut => false,
            AppEvent::TemplatesLoaded(r) => expired(r),
            AppEvent::TemplateLoaded(r) => expired(r),
            AppEvent::EmployeeLoaded { result, .. } => expired(result),
            AppEvent::EmployeeSaved { result, .. } => expired(result),
            AppEvent::FormSaved(r) => expired(r),
        }
    }
}

/// Shared services handed to pages
pub(crate) struct Context {
    pub api: ApiClient,
    pub search_debounce: Duration,
    /// Prefilled on the login screen
    pub default_username: String,
    events: mpsc::UnboundedSender<AppEvent>,
    records: Vec<Record>,
    in_flight: usize,
}

impl Context {
    fn new(
        api: ApiClient,
        search_debounce: Duration,
        default_username: String,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            api,
            search_debounce,
            default_username,
            events,
            records: Vec::new(),
            in_flight: 0,
        }
    }

    pub fn notify(&mut self, notification: Notification) {
        self.records.push(notification.into());
    }

    pub fn notify_all(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            self.notify(notification);
        }
    }

    /// Record something the user typed.
    pub fn echo(&mut self, input: impl Into<String>) {
        self.records.push(Record::new(RecordKind::You, input.into()));
    }

    /// Run `task` in the background, delivering its result as an event.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        self.in_flight += 1;
        let events = self.events.clone();
        tokio::spawn(async move {
            let _ = events.send(task.await);
        });
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    fn complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    #[cfg(test)]
    pub fn take_records(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.records)
    }
}

/// TUI App state
pub struct TuiApp {
    ctx: Context,
    events: mpsc::UnboundedReceiver<AppEvent>,
    /// Screen currently shown
    page: Box<dyn Page>,
    /// Whether to display the help menu window
    show_help_menu: bool,
    /// Helps scroll through the help menu window if the terminal is small
    help_handle: ScrollableList,
    /// History of recorded messages
    log_handle: ScrollableList,
}

impl TuiApp {
    pub fn new(api: ApiClient, search_debounce: Duration, default_username: String) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let mut ctx = Context::new(api, search_debounce, default_username, tx);

        let start = if ctx.api.session().is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        };
        let page = pages::open(start, &mut ctx);

        let mut app = Self {
            ctx,
            events,
            page,
            show_help_menu: false,
            help_handle: ScrollableList::new(MAX_LOG_RECORDS),
            log_handle: ScrollableList::new(MAX_LOG_RECORDS),
        };
        app.rebuild_help();
        app
    }

    /// Fill help menu with the page's commands followed by the global keys
    fn rebuild_help(&mut self) {
        self.help_handle.clear();
        self.help_handle.push("".into());
        for line in self.page.help().lines().chain(HELP.lines()) {
            self.help_handle.push(line.to_string().into());
        }
        self.help_handle.push("".into());
        self.help_handle.jump_to_first();
    }

    /// Show `route`, or wherever the guard sends us instead.
    fn navigate(&mut self, route: Route) {
        let decision = guard(route, &self.ctx.api.session().snapshot());
        if let RouteDecision::Redirect(target) = decision {
            tracing::info!(from = %route, to = %target, "Route guard redirect");
        }

        self.page = pages::open(decision.target(), &mut self.ctx);
        self.rebuild_help();
    }

    /// Carry out a page's request. Returns true when the app should exit.
    fn perform(&mut self, action: Action) -> bool {
        match action {
            Action::None => {}
            Action::Navigate(route) => self.navigate(route),
            Action::Logout => {
                let api = self.ctx.api.clone();
                self.ctx.spawn(async move {
                    api.logout().await;
                    AppEvent::LoggedOut
                });
            }
            Action::SessionExpired => {
                tracing::warn!("Session expired, returning to login");
                self.ctx.notify_all(ApiError::SessionExpired.notifications());
                self.navigate(Route::Login);
            }
            Action::Quit => return true,
        }
        false
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Action::Quit,
            (KeyModifiers::CONTROL, KeyCode::Home) => {
                self.log_handle.jump_to_first();
                return Action::None;
            }
            (KeyModifiers::CONTROL, KeyCode::End) => {
                self.log_handle.jump_to_last();
                return Action::None;
            }
            (_, KeyCode::Tab) => {
                self.show_help_menu = !self.show_help_menu;
                return Action::None;
            }
            (_, KeyCode::PageUp) => {
                if self.show_help_menu {
                    self.help_handle.move_up();
                } else {
                    self.log_handle.move_up();
                }
                return Action::None;
            }
            (_, KeyCode::PageDown) => {
                if self.show_help_menu {
                    self.help_handle.move_down();
                } else {
                    self.log_handle.move_down();
                }
                return Action::None;
            }
            _ => {}
        }

        if self.show_help_menu {
            if key.code == KeyCode::Esc {
                self.show_help_menu = false;
            }
            return Action::None;
        }

        self.page.handle_key(key, &mut self.ctx)
    }

    fn handle_event(&mut self, event: AppEvent) -> Action {
        self.ctx.complete();
        if event.session_expired() {
            return Action::SessionExpired;
        }

        let route = self.page.route();
        match event {
            AppEvent::LoggedOut => {
                self.ctx.notify(Notification::info("Logged out."));
                Action::Navigate(Route::Login)
            }
            // The page that saved has been left; still tell the user how it went
            AppEvent::EmployeeSaved { from, result } if from != route => {
                match result {
                    Ok(()) => self
                        .ctx
                        .notify(Notification::success(employee_saved_message(from))),
                    Err(e) => self.ctx.notify_all(e.notifications()),
                }
                Action::None
            }
            AppEvent::FormSaved(result) if route != Route::FormBuilder => {
                match result {
                    Ok(saved) => self
                        .ctx
                        .notify(Notification::success(form_saved_message(&saved))),
                    Err(e) => self.ctx.notify_all(e.notifications()),
                }
                Action::None
            }
            event => self.page.handle_event(event, &mut self.ctx),
        }
    }

    /// Move records gathered by pages into the history panel
    fn flush_records(&mut self) {
        for record in self.ctx.records.drain(..) {
            self.log_handle.push(record.into());
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let user = self
            .ctx
            .api
            .session()
            .user()
            .map_or_else(|| "not signed in".to_string(), |u| u.username);

        let header = Line::from(vec![
            " EMS ".bold().white().on_blue(),
            format!("  {}  ", self.page.route().title()).bold(),
            format!("{}  ", self.page.route().path()).dark_gray(),
        ]);
        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);
        frame.render_widget(Paragraph::new(header).block(Block::bordered()), left);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                user.light_green(),
                format!(" @ {} ", self.ctx.api.base_url()).dark_gray(),
            ]))
            .alignment(Alignment::Right)
            .block(Block::bordered()),
            right,
        );
    }

    /// Render the log/history window with scrollbar
    fn draw_log(&mut self, frame: &mut Frame, area: Rect) {
        let log_records = self.log_handle.list_items.clone();
        let log_records = List::new(log_records)
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" history  "));
        frame.render_stateful_widget(log_records, area, &mut self.log_handle.list_state);

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.log_handle.scroll_state,
        );
    }

    /// Render the help/status bar at the bottom
    fn draw_help_bar(&self, frame: &mut Frame, area: Rect) {
        let status_indicator = if self.ctx.is_busy() || self.page.is_loading() {
            "● Loading".yellow()
        } else {
            "● Ready".green()
        };

        let help_message = vec![
            status_indicator,
            " | press ".into(),
            "Tab".bold().white(),
            " to view help, ".into(),
            "Esc".bold().white(),
            " to go back, or ".into(),
            "Ctrl+C".bold().white(),
            " to exit".into(),
        ];
        frame.render_widget(Paragraph::new(Line::from(help_message)), area);
    }

    /// Render the help menu overlay
    fn draw_help_menu(&mut self, frame: &mut Frame) {
        let vertical = Layout::vertical([Constraint::Max(29)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Max(92)]).flex(Flex::Center);
        let [help_menu_area] = vertical.areas(frame.area());
        let [help_menu_area] = horizontal.areas(help_menu_area);
        frame.render_widget(Clear, help_menu_area);

        let help_items = self.help_handle.list_items.clone();
        let help_items = List::new(help_items)
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" commands  "));
        frame.render_stateful_widget(
            help_items,
            help_menu_area,
            &mut self.help_handle.list_state,
        );

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .begin_symbol(None)
                .end_symbol(None),
            help_menu_area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.help_handle.scroll_state,
        );
    }

    fn draw(&mut self, frame: &mut Frame) {
        let window = Layout::vertical([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Page
            Constraint::Length(8), // History
            Constraint::Length(1), // Help bar
        ]);
        let [header_area, page_area, log_area, help_area] = window.areas(frame.area());

        self.draw_header(frame, header_area);
        self.page.draw(frame, page_area);
        self.draw_log(frame, log_area);
        self.draw_help_bar(frame, help_area);

        if self.show_help_menu {
            self.draw_help_menu(frame);
        }
    }

    /// Run the TUI application
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        loop {
            self.flush_records();
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(POLL_TIMEOUT)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                let action = self.handle_key(key);
                if self.perform(action) {
                    return Ok(());
                }
            }

            // Results of background requests
            while let Ok(event) = self.events.try_recv() {
                let action = self.handle_event(event);
                if self.perform(action) {
                    return Ok(());
                }
            }

            let action = self.page.tick(&mut self.ctx);
            if self.perform(action) {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> (Context, mpsc::UnboundedReceiver<AppEvent>) {
    use ems_core::auth::{MemoryStorage, SessionStore};
    use std::sync::Arc;

    let session = Arc::new(SessionStore::open(Box::new(MemoryStorage::default())));
    // Nothing listens on the discard port
    let api = ApiClient::new("http://127.0.0.1:9", session).unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Context::new(api, Duration::from_millis(10), "tester".to_string(), tx),
        rx,
    )
}
