use super::{Page, centered, is_ctrl, is_text_edit};
use crate::tui_app::{
    Action, AppEvent, Context,
    widgets::{InputField, InputForm},
};
use ems_core::{Notification, Route, validation::LoginForm};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::{Block, Paragraph},
};

const HELP: &str = "\
Enter
        Move to the next field, or sign in from the last one.
Up / Down
        Move between fields.
Ctrl+R
        Create an account instead.
";

pub(crate) struct LoginPage {
    form: InputForm,
}

impl LoginPage {
    pub fn new(ctx: &Context) -> Self {
        let mut form = InputForm::new(vec![
            InputField::text("Username").with_value(ctx.default_username.as_str()),
            InputField::password("Password"),
        ]);
        if !ctx.default_username.is_empty() {
            form.focus_next();
        }
        Self { form }
    }

    fn submit(&mut self, ctx: &mut Context) {
        let form = LoginForm {
            username: self.form.value(0).trim().to_string(),
            password: self.form.value(1).to_string(),
        };
        if let Err(e) = form.validate() {
            ctx.notify(e.into());
            return;
        }

        let api = ctx.api.clone();
        ctx.spawn(async move { AppEvent::LoggedIn(api.login_with(&form).await) });
    }
}

impl Page for LoginPage {
    fn route(&self) -> Route {
        Route::Login
    }

    fn help(&self) -> &'static str {
        HELP
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered(area, 60, self.form.height() + 4);
        let block = Block::bordered().title(" Sign in  ".bold());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [form_area, hint_area] =
            Layout::vertical([Constraint::Length(self.form.height()), Constraint::Length(1)])
                .areas(inner);
        self.form.render(frame, form_area);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                "Enter".bold().white(),
                " to sign in, ".into(),
                "Ctrl+R".bold().white(),
                " to register".into(),
            ])),
            hint_area,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action {
        if is_ctrl(&key, 'r') {
            return Action::Navigate(Route::Register);
        }

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Enter if self.form.is_last_focused() => {
                self.submit(ctx);
                Action::None
            }
            KeyCode::Enter => {
                self.form.focus_next();
                Action::None
            }
            code if is_text_edit(&key) => {
                self.form.handle_key(code);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_event(&mut self, event: AppEvent, ctx: &mut Context) -> Action {
        match event {
            AppEvent::LoggedIn(Ok(user)) => {
                tracing::info!(username = %user.username, "Logged in");
                ctx.notify(Notification::success(format!(
                    "Login successful! Welcome back, {}.",
                    user.username
                )));
                Action::Navigate(Route::Dashboard)
            }
            AppEvent::LoggedIn(Err(e)) => {
                tracing::warn!("Login failed: {}", e);
                ctx.notify_all(e.notifications());
                Action::None
            }
            _ => Action::None,
        }
    }
}
