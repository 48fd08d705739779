use super::{Page, is_text_edit};
use crate::{
    commands::{BuilderCommand, parse_command},
    tui_app::{Action, AppEvent, Context, form_saved_message, widgets::UserInput},
};
use ems_core::{
    Notification, Route,
    api::SavedForm,
    forms::{DraftField, FieldPatch, FormBuilder},
};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Alignment, Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Text},
    widgets::{Block, Cell, Padding, Paragraph, Row, Table},
};

const HELP: &str = "\
add
        Append a new text field.
rm N
        Remove field N.
mv N M
        Move field N to position M.
label N TEXT
        Rename field N.
type N TYPE
        Change the type of field N (text, number, email, password, date,
        textarea, select, checkbox, radio).
req N
        Toggle whether field N is required.
opts N A,B,C
        Set the options of a select or radio field.
name TEXT
        Rename the form.
list
        List your saved forms.
open ID
        Load a saved form to reorder its fields.
save
        Save the form, or the new field order of a loaded form.
reset
        Discard the form and start over.
";

const LOADED_TEMPLATE_ERROR: &str =
    "Loaded templates can only be reordered. Use 'reset' to start a new form.";

pub(crate) struct FormBuilderPage {
    builder: FormBuilder,
    command: UserInput,
}

impl FormBuilderPage {
    pub fn new() -> Self {
        Self {
            builder: FormBuilder::new(),
            command: UserInput::new(),
        }
    }

    fn run(&mut self, command: BuilderCommand, ctx: &mut Context) {
        let loaded = self.builder.template_id().is_some();
        match command {
            BuilderCommand::List => {
                let api = ctx.api.clone();
                ctx.spawn(async move { AppEvent::TemplatesLoaded(api.list_templates().await) });
            }
            BuilderCommand::Open(id) => {
                let api = ctx.api.clone();
                ctx.spawn(async move { AppEvent::TemplateLoaded(api.get_template(id).await) });
            }
            BuilderCommand::Save => self.save(ctx),
            BuilderCommand::Reset => {
                self.builder.reset();
                ctx.notify(Notification::info("Form reset."));
            }
            BuilderCommand::Move { from, to } => {
                if !self.builder.move_field(from, to) {
                    ctx.notify(no_such_field(from.max(to)));
                }
            }
            _ if loaded => ctx.notify(Notification::error(LOADED_TEMPLATE_ERROR)),
            BuilderCommand::Add => {
                self.builder.add_field();
            }
            BuilderCommand::Remove(index) => {
                if let Some(id) = self.builder.id_at(index) {
                    self.builder.remove_field(id);
                } else {
                    ctx.notify(no_such_field(index));
                }
            }
            BuilderCommand::Label { index, label } => {
                self.patch(index, FieldPatch::label(label), ctx)
            }
            BuilderCommand::Type { index, field_type } => {
                self.patch(index, FieldPatch::field_type(field_type), ctx)
            }
            BuilderCommand::ToggleRequired(index) => {
                let required = self
                    .builder
                    .id_at(index)
                    .and_then(|id| self.builder.field(id))
                    .is_some_and(|f| f.required);
                self.patch(index, FieldPatch::required(!required), ctx)
            }
            BuilderCommand::Options { index, options } => {
                self.patch(index, FieldPatch::options(options), ctx)
            }
            BuilderCommand::Name(name) => self.builder.set_name(name),
        }
    }

    fn patch(&mut self, index: usize, patch: FieldPatch, ctx: &mut Context) {
        let updated = self
            .builder
            .id_at(index)
            .is_some_and(|id| self.builder.update_field(id, patch));
        if !updated {
            ctx.notify(no_such_field(index));
        }
    }

    fn save(&mut self, ctx: &mut Context) {
        if self.builder.template_id().is_none() {
            if let Err(e) = self.builder.validate() {
                ctx.notify(e.into());
                return;
            }
        }

        let api = ctx.api.clone();
        let builder = self.builder.clone();
        ctx.spawn(async move { AppEvent::FormSaved(api.save_form(&builder).await) });
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let status = match self.builder.template_id() {
            Some(id) => format!("saved form #{id} (reorder only)").light_yellow(),
            None => "new form".light_green(),
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                " ".into(),
                self.builder.name().to_string().bold(),
                "  ·  ".dark_gray(),
                status,
            ])),
            area,
        );
    }

    fn draw_fields(&self, frame: &mut Frame, area: Rect) {
        let rows = self
            .builder
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| make_field_row(idx, field));
        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Fill(2),
                Constraint::Length(10),
                Constraint::Length(9),
                Constraint::Fill(2),
            ],
        )
        .header(
            Row::new(vec!["#", "Label", "Type", "Required", "Options"])
                .bold()
                .underlined(),
        )
        .block(
            Block::bordered()
                .padding(Padding::horizontal(1))
                .title(format!(" fields ({})  ", self.builder.len()))
                .title_bottom(if self.builder.is_empty() {
                    " type 'add' to add a field  "
                } else {
                    ""
                }),
        );
        frame.render_widget(table, area);
    }
}

fn no_such_field(index: usize) -> Notification {
    Notification::error(format!("There is no field {}.", index + 1))
}

fn make_field_row(idx: usize, field: &DraftField) -> Row<'static> {
    let options = if field.field_type.has_options() {
        field.options.join(", ")
    } else {
        String::new()
    };
    Row::new(vec![
        Cell::new(Text::from((idx + 1).to_string()).alignment(Alignment::Right)),
        Cell::new(field.label.clone()),
        Cell::new(field.field_type.as_str()),
        Cell::new(if field.required { "yes" } else { "no" }),
        Cell::new(options),
    ])
}

impl Page for FormBuilderPage {
    fn route(&self) -> Route {
        Route::FormBuilder
    }

    fn help(&self) -> &'static str {
        HELP
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let [status_area, fields_area, command_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .areas(area);

        self.draw_status(frame, status_area);
        self.draw_fields(frame, fields_area);
        self.command
            .render(frame, command_area, " command  ".to_string(), false, true);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action {
        match key.code {
            KeyCode::Esc => Action::Navigate(Route::Dashboard),
            KeyCode::Enter => {
                let input = self.command.submit();
                if input.trim().is_empty() {
                    return Action::None;
                }
                ctx.echo(input.clone());
                match parse_command(&input) {
                    Ok(command) => self.run(command, ctx),
                    Err(e) => ctx.notify(Notification::error(e.to_string())),
                }
                Action::None
            }
            code if is_text_edit(&key) => {
                self.command.handle_key(code);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_event(&mut self, event: AppEvent, ctx: &mut Context) -> Action {
        match event {
            AppEvent::TemplatesLoaded(Ok(templates)) => {
                if templates.is_empty() {
                    ctx.notify(Notification::info("You have no saved forms yet."));
                }
                ctx.notify_all(templates.iter().map(|t| {
                    Notification::info(format!("#{} {} ({} fields)", t.id, t.name, t.fields.len()))
                }));
            }
            AppEvent::TemplateLoaded(Ok(template)) => {
                self.builder = FormBuilder::from_template(&template);
                ctx.notify(Notification::info(format!(
                    "Loaded form #{}. Use 'mv' then 'save' to change the field order.",
                    template.id
                )));
            }
            AppEvent::FormSaved(Ok(saved)) => {
                ctx.notify(Notification::success(form_saved_message(&saved)));
                if let SavedForm::Created(template) = saved {
                    tracing::info!(template_id = template.id, "Form template created");
                    self.builder.reset();
                }
            }
            AppEvent::TemplatesLoaded(Err(e))
            | AppEvent::TemplateLoaded(Err(e))
            | AppEvent::FormSaved(Err(e)) => ctx.notify_all(e.notifications()),
            _ => {}
        }
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui_app::test_context;
    use ems_core::forms::{FieldType, FormField, FormTemplate};

    fn enter(page: &mut FormBuilderPage, ctx: &mut Context, line: &str) {
        for c in line.chars() {
            page.handle_key(KeyEvent::from(KeyCode::Char(c)), ctx);
        }
        page.handle_key(KeyEvent::from(KeyCode::Enter), ctx);
    }

    fn saved_template() -> FormTemplate {
        let field = |id: i64, label: &str, order: i32| FormField {
            id,
            label: label.to_string(),
            field_type: FieldType::Text,
            required: false,
            options: None,
            order,
        };
        FormTemplate {
            id: 4,
            name: "Onboarding".to_string(),
            fields: vec![field(40, "Name", 0), field(41, "Team", 1)],
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_build_form_with_commands() {
        let (mut ctx, _rx) = test_context();
        let mut page = FormBuilderPage::new();

        enter(&mut page, &mut ctx, "name Contractors");
        enter(&mut page, &mut ctx, "add");
        enter(&mut page, &mut ctx, "add");
        enter(&mut page, &mut ctx, "label 1 Full Name");
        enter(&mut page, &mut ctx, "req 1");
        enter(&mut page, &mut ctx, "type 2 select");
        enter(&mut page, &mut ctx, "opts 2 Sales, Ops");
        enter(&mut page, &mut ctx, "mv 2 1");

        let fields = page.builder.fields();
        assert_eq!(page.builder.name(), "Contractors");
        assert_eq!(fields[0].field_type, FieldType::Select);
        assert_eq!(fields[0].options, vec!["Sales", "Ops"]);
        assert_eq!(fields[0].order, 0);
        assert_eq!(fields[1].label, "Full Name");
        assert!(fields[1].required);
        assert_eq!(fields[1].order, 1);

        // Only the echoed input, no errors
        let records = ctx.take_records();
        assert_eq!(records.len(), 8);
        assert!(records.iter().all(|r| r.kind == crate::tui_app::RecordKind::You));
    }

    #[tokio::test]
    async fn test_invalid_commands_reported() {
        let (mut ctx, _rx) = test_context();
        let mut page = FormBuilderPage::new();

        enter(&mut page, &mut ctx, "rm 3");
        enter(&mut page, &mut ctx, "frobnicate");
        enter(&mut page, &mut ctx, "save");

        let errors: Vec<_> = ctx
            .take_records()
            .into_iter()
            .filter(|r| r.kind == crate::tui_app::RecordKind::Error)
            .collect();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].content, "There is no field 3.");
        // Nothing to save: validation stops the request
        assert!(!ctx.is_busy());
    }

    #[tokio::test]
    async fn test_loaded_template_is_reorder_only() {
        let (mut ctx, _rx) = test_context();
        let mut page = FormBuilderPage::new();
        page.handle_event(AppEvent::TemplateLoaded(Ok(saved_template())), &mut ctx);
        ctx.take_records();

        enter(&mut page, &mut ctx, "add");
        enter(&mut page, &mut ctx, "mv 1 2");

        let records = ctx.take_records();
        assert_eq!(records[1].content, LOADED_TEMPLATE_ERROR);
        assert_eq!(page.builder.len(), 2);
        assert_eq!(page.builder.fields()[0].server_id, Some(41));
        assert_eq!(page.builder.template_id(), Some(4));

        enter(&mut page, &mut ctx, "reset");
        assert_eq!(page.builder.template_id(), None);
        assert!(page.builder.is_empty());
    }

    #[tokio::test]
    async fn test_created_form_resets_builder() {
        let (mut ctx, _rx) = test_context();
        let mut page = FormBuilderPage::new();
        enter(&mut page, &mut ctx, "add");
        ctx.take_records();

        page.handle_event(
            AppEvent::FormSaved(Ok(SavedForm::Created(saved_template()))),
            &mut ctx,
        );

        assert!(page.builder.is_empty());
        assert_eq!(
            ctx.take_records()[0].content,
            "Form template saved successfully!"
        );
    }

    #[tokio::test]
    async fn test_template_listing() {
        let (mut ctx, _rx) = test_context();
        let mut page = FormBuilderPage::new();

        page.handle_event(AppEvent::TemplatesLoaded(Ok(vec![saved_template()])), &mut ctx);

        assert_eq!(ctx.take_records()[0].content, "#4 Onboarding (2 fields)");
    }
}
