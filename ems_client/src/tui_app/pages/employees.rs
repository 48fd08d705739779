use super::{Page, centered, is_ctrl, is_text_edit};
use crate::tui_app::{Action, Context, widgets::UserInput};
use ems_core::{
    ApiClient, Route,
    employees::{Employee, EmployeeId, EmployeeList, ListEvent},
};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Text},
    widgets::{Block, Cell, Clear, Padding, Paragraph, Row, Table, TableState},
};
use std::sync::Arc;
use tokio::sync::mpsc;

const HELP: &str = "\
Type
        Search employees. The search runs once you stop typing.
Up / Down
        Choose an employee.
Enter
        Edit the chosen employee.
Ctrl+N
        Add a new employee.
Ctrl+D
        Delete the chosen employee (asks for confirmation).
Ctrl+R
        Reload the list.
";

/// Values shown per row before truncating
const SUMMARY_VALUES: usize = 3;

pub(crate) struct EmployeesPage {
    list: EmployeeList<ApiClient>,
    list_events: mpsc::UnboundedReceiver<ListEvent>,
    search: UserInput,
    table_state: TableState,
}

impl EmployeesPage {
    pub fn new(ctx: &mut Context) -> Self {
        let (tx, list_events) = mpsc::unbounded_channel();
        let mut list = EmployeeList::new(Arc::new(ctx.api.clone()), tx, ctx.search_debounce);
        list.refresh();

        Self {
            list,
            list_events,
            search: UserInput::new(),
            table_state: TableState::default(),
        }
    }

    fn selected_id(&self) -> Option<EmployeeId> {
        self.table_state
            .selected()
            .and_then(|idx| self.list.employees().get(idx))
            .map(|e| e.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.list.employees().len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(idx) if idx >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            Some(_) => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(id) = self.list.pending_delete() {
                    tracing::info!(employee_id = id, "Deleting employee");
                }
                self.list.confirm_delete();
            }
            KeyCode::Char('n') | KeyCode::Esc => self.list.cancel_delete(),
            _ => {}
        }
        Action::None
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
        let rows = self.list.employees().iter().map(make_employee_row);
        let empty = self.list.employees().is_empty() && !self.list.is_loading();

        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Fill(1),
                Constraint::Fill(3),
                Constraint::Length(12),
            ],
        )
        .header(Row::new(vec!["ID", "Form", "Details", "Created"]).bold().underlined())
        .row_highlight_style(Style::default().reversed())
        .block(
            Block::bordered()
                .padding(Padding::horizontal(1))
                .title(format!(" employees ({})  ", self.list.employees().len()))
                .title_bottom(if empty { " no employees found  " } else { "" }),
        );
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, id: EmployeeId) {
        let area = centered(area, 56, 7);
        frame.render_widget(Clear, area);
        let body = vec![
            Line::from(format!("Delete employee #{id}?")).bold(),
            Line::from("This cannot be undone."),
            Line::default(),
            Line::from(vec![
                "y".bold().light_red(),
                " delete    ".into(),
                "n".bold().white(),
                " cancel".into(),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(body)
                .alignment(Alignment::Center)
                .block(Block::bordered().title(" confirm delete  ").light_red()),
            area,
        );
    }
}

fn make_employee_row(employee: &Employee) -> Row<'static> {
    let mut summary: Vec<String> = employee
        .data
        .iter()
        .take(SUMMARY_VALUES)
        .map(|d| format!("{}: {}", d.field_label, d.field_value))
        .collect();
    if employee.data.len() > SUMMARY_VALUES {
        summary.push("…".to_string());
    }

    Row::new(vec![
        Cell::new(Text::from(employee.id.to_string()).alignment(Alignment::Right)),
        Cell::new(
            employee
                .form_template_name
                .clone()
                .unwrap_or_else(|| format!("#{}", employee.form_template)),
        ),
        Cell::new(summary.join(", ")),
        Cell::new(
            employee
                .created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ),
    ])
}

impl Page for EmployeesPage {
    fn route(&self) -> Route {
        Route::Employees
    }

    fn help(&self) -> &'static str {
        HELP
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let [search_area, table_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(area);

        let confirming = self.list.pending_delete();
        self.search
            .render(frame, search_area, " search  ".to_string(), false, confirming.is_none());
        self.draw_table(frame, table_area);

        if let Some(id) = confirming {
            self.draw_confirm(frame, area, id);
        }
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Action {
        if self.list.pending_delete().is_some() {
            return self.handle_confirm_key(key);
        }

        if is_ctrl(&key, 'n') {
            return Action::Navigate(Route::NewEmployee);
        }
        if is_ctrl(&key, 'd') {
            if let Some(id) = self.selected_id() {
                self.list.request_delete(id);
            }
            return Action::None;
        }
        if is_ctrl(&key, 'r') {
            self.list.refresh();
            return Action::None;
        }

        match key.code {
            KeyCode::Esc => Action::Navigate(Route::Dashboard),
            KeyCode::Enter => self
                .selected_id()
                .map_or(Action::None, |id| Action::Navigate(Route::EditEmployee(id))),
            KeyCode::Up => {
                self.table_state.select_previous();
                Action::None
            }
            KeyCode::Down => {
                self.table_state.select_next();
                self.clamp_selection();
                Action::None
            }
            code if is_text_edit(&key) => {
                if self.search.handle_key(code) {
                    self.list.set_query(self.search.value.clone());
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn tick(&mut self, ctx: &mut Context) -> Action {
        while let Ok(event) = self.list_events.try_recv() {
            if event.session_expired() {
                return Action::SessionExpired;
            }
            let notifications = self.list.apply(event);
            ctx.notify_all(notifications);
            self.clamp_selection();
        }
        Action::None
    }

    fn is_loading(&self) -> bool {
        self.list.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui_app::test_context;
    use ratatui::crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[tokio::test]
    async fn test_typing_updates_query() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeesPage::new(&mut ctx);

        for c in "jo".chars() {
            page.handle_key(KeyEvent::from(KeyCode::Char(c)), &mut ctx);
        }

        assert_eq!(page.list.query(), "jo");
        assert!(page.is_loading());
    }

    #[tokio::test]
    async fn test_navigation_keys() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeesPage::new(&mut ctx);

        assert_eq!(
            page.handle_key(ctrl('n'), &mut ctx),
            Action::Navigate(Route::NewEmployee)
        );
        // Nothing selected in an empty list
        assert_eq!(
            page.handle_key(KeyEvent::from(KeyCode::Enter), &mut ctx),
            Action::None
        );
        assert_eq!(
            page.handle_key(KeyEvent::from(KeyCode::Esc), &mut ctx),
            Action::Navigate(Route::Dashboard)
        );
    }

    #[tokio::test]
    async fn test_failed_load_reported() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeesPage::new(&mut ctx);

        // The initial load fails against the unreachable test backend
        let mut action = Action::None;
        for _ in 0..50 {
            action = page.tick(&mut ctx);
            if !page.is_loading() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(action, Action::None);
        assert!(!page.is_loading());
        assert_eq!(ctx.take_records().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_modal_captures_keys() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeesPage::new(&mut ctx);
        page.list.request_delete(5);

        // Typing goes to the modal, not the search box
        page.handle_key(KeyEvent::from(KeyCode::Char('x')), &mut ctx);
        assert_eq!(page.list.query(), "");
        assert_eq!(page.list.pending_delete(), Some(5));

        page.handle_key(KeyEvent::from(KeyCode::Char('n')), &mut ctx);
        assert_eq!(page.list.pending_delete(), None);
    }
}
