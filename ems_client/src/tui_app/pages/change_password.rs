use super::{Page, centered, is_text_edit};
use crate::tui_app::{
    Action, AppEvent, Context,
    widgets::{InputField, InputForm},
};
use ems_core::{Notification, Route, validation::ChangePasswordForm};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::Rect,
    widgets::Block,
};

const HELP: &str = "\
Enter
        Move to the next field, or submit from the last one.
Esc
        Back to your profile.
";

pub(crate) struct ChangePasswordPage {
    form: InputForm,
}

impl ChangePasswordPage {
    pub fn new() -> Self {
        Self {
            form: InputForm::new(vec![
                InputField::password("Current password"),
                InputField::password("New password"),
            ]),
        }
    }

    fn submit(&mut self, ctx: &mut Context) {
        let form = ChangePasswordForm {
            old_password: self.form.value(0).to_string(),
            new_password: self.form.value(1).to_string(),
        };
        if form.validate().is_err() {
            ctx.notify(Notification::error("Please fill in both fields."));
            return;
        }

        let api = ctx.api.clone();
        ctx.spawn(async move { AppEvent::PasswordChanged(api.change_password(&form).await) });
    }
}

impl Page for ChangePasswordPage {
    fn route(&self) -> Route {
        Route::ChangePassword
    }

    fn help(&self) -> &'static str {
        HELP
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered(area, 60, self.form.height() + 2);
        let block = Block::bordered().title(" change password  ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.form.render(frame, inner);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action {
        match key.code {
            KeyCode::Esc => Action::Navigate(Route::Profile),
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
            AppEvent::PasswordChanged(Ok(message)) => {
                ctx.notify(Notification::success(message));
                Action::Navigate(Route::Profile)
            }
            AppEvent::PasswordChanged(Err(e)) => {
                ctx.notify_all(e.notifications());
                Action::None
            }
            _ => Action::None,
        }
    }
}
