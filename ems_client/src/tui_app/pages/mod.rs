//! Screens of the application, one per route.

use super::{Action, AppEvent, Context};
use ems_core::Route;
use ratatui::{
    Frame,
    crossterm::event::{KeyEvent, KeyModifiers},
    layout::{Constraint, Flex, Layout, Rect},
};

mod change_password;
mod dashboard;
mod employee_form;
mod employees;
mod form_builder;
mod login;
mod profile;
mod register;

use change_password::ChangePasswordPage;
use dashboard::DashboardPage;
use employee_form::EmployeeFormPage;
use employees::EmployeesPage;
use form_builder::FormBuilderPage;
use login::LoginPage;
use profile::ProfilePage;
use register::RegisterPage;

/// A screen owning its own state and input handling
pub(crate) trait Page {
    fn route(&self) -> Route;

    /// Page-specific lines for the help menu
    fn help(&self) -> &'static str;

    fn draw(&mut self, frame: &mut Frame, area: Rect);

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action;

    /// Handle the result of background work this page started.
    fn handle_event(&mut self, _event: AppEvent, _ctx: &mut Context) -> Action {
        Action::None
    }

    /// Called once per frame.
    fn tick(&mut self, _ctx: &mut Context) -> Action {
        Action::None
    }

    /// Whether the page is waiting on work it tracks itself
    fn is_loading(&self) -> bool {
        false
    }
}

/// Build the page for `route`. The route guard has already been applied.
pub(crate) fn open(route: Route, ctx: &mut Context) -> Box<dyn Page> {
    tracing::debug!(route = %route, "Opening page");
    match route {
        Route::Login => Box::new(LoginPage::new(ctx)),
        Route::Register => Box::new(RegisterPage::new()),
        Route::Dashboard => Box::new(DashboardPage::new(ctx)),
        Route::Profile => Box::new(ProfilePage::new(ctx)),
        Route::ChangePassword => Box::new(ChangePasswordPage::new()),
        Route::Employees => Box::new(EmployeesPage::new(ctx)),
        Route::NewEmployee | Route::EditEmployee(_) => Box::new(EmployeeFormPage::new(route, ctx)),
        Route::FormBuilder => Box::new(FormBuilderPage::new()),
    }
}

/// Whether a key should be typed into a text input.
fn is_text_edit(key: &KeyEvent) -> bool {
    !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && key.code == ratatui::crossterm::event::KeyCode::Char(c)
}

/// A box of at most `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Max(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Max(width)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
