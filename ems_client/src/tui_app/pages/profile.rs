use super::{Page, centered};
use crate::tui_app::{Action, Context};
use chrono::{DateTime, Local};
use ems_core::{Route, auth::decode_claims};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::Rect,
    style::Stylize,
    text::{Line, Span},
    widgets::{Block, Padding, Paragraph},
};

const HELP: &str = "\
c / Enter
        Change your password.
";

pub(crate) struct ProfilePage {
    username: String,
    email: String,
    user_id: Option<i64>,
    /// When the current access token expires, if it could be read
    token_expiry: Option<DateTime<Local>>,
}

impl ProfilePage {
    pub fn new(ctx: &Context) -> Self {
        let session = ctx.api.session();
        let user = session.user().unwrap_or_default();
        let token_expiry = session
            .access_token()
            .and_then(|token| decode_claims(&token).ok())
            .and_then(|claims| DateTime::from_timestamp(claims.exp, 0))
            .map(|exp| exp.with_timezone(&Local));

        Self {
            username: user.username,
            email: user.email,
            user_id: user.id,
            token_expiry,
        }
    }
}

fn row(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::from(format!("{label:<16}")).dark_gray(),
        Span::from(value).bold(),
    ])
}

impl Page for ProfilePage {
    fn route(&self) -> Route {
        Route::Profile
    }

    fn help(&self) -> &'static str {
        HELP
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let or_dash = |s: &str| {
            if s.is_empty() {
                "-".to_string()
            } else {
                s.to_string()
            }
        };

        let lines = vec![
            row("Username", or_dash(&self.username)),
            row("Email", or_dash(&self.email)),
            row(
                "User id",
                self.user_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            ),
            row(
                "Token expires",
                self.token_expiry.map_or_else(
                    || "unknown".to_string(),
                    |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
                ),
            ),
            Line::default(),
            Line::from(vec![
                "Press ".into(),
                "c".bold().white(),
                " to change your password".into(),
            ]),
        ];

        let area = centered(area, 64, lines.len() as u16 + 4);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::bordered()
                    .padding(Padding::uniform(1))
                    .title(" my profile  "),
            ),
            area,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Action {
        match key.code {
            KeyCode::Esc => Action::Navigate(Route::Dashboard),
            KeyCode::Enter | KeyCode::Char('c') => Action::Navigate(Route::ChangePassword),
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui_app::test_context;
    use ems_core::auth::{AuthTokens, User};

    #[tokio::test]
    async fn test_shows_session_user() {
        let (mut ctx, _rx) = test_context();
        ctx.api
            .session()
            .login(AuthTokens {
                access: "opaque".to_string(),
                refresh: "refresh".to_string(),
                user: Some(User {
                    id: Some(3),
                    username: "carol".to_string(),
                    email: "carol@example.com".to_string(),
                }),
            })
            .unwrap();

        let mut page = ProfilePage::new(&ctx);

        assert_eq!(page.username, "carol");
        assert_eq!(page.user_id, Some(3));
        // Opaque tokens carry no readable expiry
        assert!(page.token_expiry.is_none());
        assert_eq!(
            page.handle_key(KeyEvent::from(KeyCode::Char('c')), &mut ctx),
            Action::Navigate(Route::ChangePassword)
        );
    }
}
