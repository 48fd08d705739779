use super::Page;
use crate::tui_app::{Action, Context};
use ems_core::Route;
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, List, ListItem, ListState, Padding, Paragraph},
};

const HELP: &str = "\
Up / Down
        Choose a menu entry.
Enter
        Open the chosen entry.
1-6
        Open an entry directly.
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEntry {
    Open(Route),
    Logout,
}

const MENU: [(&str, &str, MenuEntry); 6] = [
    (
        "My Profile",
        "View and manage your personal details.",
        MenuEntry::Open(Route::Profile),
    ),
    (
        "Employee Forms",
        "Build and manage dynamic employee forms.",
        MenuEntry::Open(Route::FormBuilder),
    ),
    (
        "Employees",
        "View, add, and manage employee records.",
        MenuEntry::Open(Route::Employees),
    ),
    (
        "New Employee",
        "Fill in a record against one of your forms.",
        MenuEntry::Open(Route::NewEmployee),
    ),
    (
        "Change Password",
        "Update your password for security and protection.",
        MenuEntry::Open(Route::ChangePassword),
    ),
    ("Logout", "End this session.", MenuEntry::Logout),
];

pub(crate) struct DashboardPage {
    username: String,
    menu_state: ListState,
}

impl DashboardPage {
    pub fn new(ctx: &Context) -> Self {
        Self {
            username: ctx
                .api
                .session()
                .user()
                .map(|u| u.username)
                .unwrap_or_default(),
            menu_state: ListState::default().with_selected(Some(0)),
        }
    }

    fn activate(&self, idx: usize) -> Action {
        match MENU.get(idx) {
            Some((.., MenuEntry::Open(route))) => Action::Navigate(*route),
            Some((.., MenuEntry::Logout)) => Action::Logout,
            None => Action::None,
        }
    }
}

impl Page for DashboardPage {
    fn route(&self) -> Route {
        Route::Dashboard
    }

    fn help(&self) -> &'static str {
        HELP
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let [welcome_area, menu_area] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(4)]).areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                " Welcome, ".into(),
                self.username.clone().bold().light_green(),
            ])),
            welcome_area,
        );

        let items = MENU.iter().enumerate().map(|(idx, (title, description, _))| {
            ListItem::new(Line::from(vec![
                format!(" {}. ", idx + 1).dark_gray(),
                format!("{title:<18}").bold(),
                description.to_string().into(),
            ]))
        });
        let menu = List::new(items)
            .highlight_style(Style::default().reversed())
            .block(Block::bordered().padding(Padding::uniform(1)).title(" dashboard  "));
        frame.render_stateful_widget(menu, menu_area, &mut self.menu_state);
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Action {
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Up => {
                self.menu_state.select_previous();
                Action::None
            }
            KeyCode::Down => {
                let next = self.menu_state.selected().map_or(0, |i| i + 1);
                self.menu_state.select(Some(next.min(MENU.len() - 1)));
                Action::None
            }
            KeyCode::Enter => self.activate(self.menu_state.selected().unwrap_or(0)),
            KeyCode::Char(c) => match c.to_digit(10) {
                Some(n) if n >= 1 => self.activate(n as usize - 1),
                _ => Action::None,
            },
            _ => Action::None,
        }
    }
}
