use super::{Page, centered, is_ctrl, is_text_edit};
use crate::tui_app::{
    Action, AppEvent, Context,
    widgets::{InputField, InputForm},
};
use ems_core::{Notification, Route, validation::RegistrationForm};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::Rect,
    style::Stylize,
    widgets::Block,
};

const HELP: &str = "\
Enter
        Move to the next field, or create the account from the last one.
Up / Down
        Move between fields.
Ctrl+L / Esc
        Back to sign in.
";

const USERNAME: usize = 0;
const EMAIL: usize = 1;
const FIRST_NAME: usize = 2;
const LAST_NAME: usize = 3;
const PASSWORD: usize = 4;
const PASSWORD_CONFIRM: usize = 5;

pub(crate) struct RegisterPage {
    form: InputForm,
}

impl RegisterPage {
    pub fn new() -> Self {
        Self {
            form: InputForm::new(vec![
                InputField::text("Username"),
                InputField::text("Email"),
                InputField::text("First name"),
                InputField::text("Last name"),
                InputField::password("Password"),
                InputField::password("Confirm password"),
            ]),
        }
    }

    fn registration(&self) -> RegistrationForm {
        RegistrationForm {
            username: self.form.value(USERNAME).trim().to_string(),
            email: self.form.value(EMAIL).trim().to_string(),
            first_name: self.form.value(FIRST_NAME).trim().to_string(),
            last_name: self.form.value(LAST_NAME).trim().to_string(),
            password: self.form.value(PASSWORD).to_string(),
            password_confirm: self.form.value(PASSWORD_CONFIRM).to_string(),
        }
    }

    fn submit(&mut self, ctx: &mut Context) {
        let form = self.registration();
        if let Err(e) = form.validate() {
            ctx.notify(e.into());
            return;
        }

        let api = ctx.api.clone();
        ctx.spawn(async move { AppEvent::Registered(api.register(&form).await) });
    }
}

impl Page for RegisterPage {
    fn route(&self) -> Route {
        Route::Register
    }

    fn help(&self) -> &'static str {
        HELP
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered(area, 60, self.form.height() + 2);
        let block = Block::bordered().title(" Create account  ".bold());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.form.render(frame, inner);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action {
        if is_ctrl(&key, 'l') {
            return Action::Navigate(Route::Login);
        }

        match key.code {
            KeyCode::Esc => Action::Navigate(Route::Login),
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
            AppEvent::Registered(Ok(user)) => {
                tracing::info!(username = %user.username, "Registered");
                ctx.notify(Notification::success("Registration successful! Welcome."));
                Action::Navigate(Route::Dashboard)
            }
            AppEvent::Registered(Err(e)) => {
                ctx.notify_all(e.notifications());
                Action::None
            }
            _ => Action::None,
        }
    }
}
