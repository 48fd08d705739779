use super::{Page, is_ctrl, is_text_edit};
use crate::tui_app::{
    Action, AppEvent, Context, employee_saved_message,
    widgets::{InputField, InputForm},
};
use ems_core::{
    ApiError, Notification, Route,
    employees::EmployeeDraft,
    forms::{FieldType, FormField, FormTemplate},
};
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
        Choose a form template, or move between fields.
Enter
        Use the chosen template. In the form, move to the next field or
        save from the last one.
Ctrl+S
        Save the employee.
Esc
        Back to the employee list.
";

pub(crate) struct EmployeeFormPage {
    route: Route,
    draft: EmployeeDraft,
    /// Templates offered when creating an employee
    templates: Vec<FormTemplate>,
    chooser: ListState,
    /// Value inputs, present once a template is chosen
    inputs: Option<InputForm>,
    loading: bool,
}

impl EmployeeFormPage {
    pub fn new(route: Route, ctx: &mut Context) -> Self {
        let api = ctx.api.clone();
        match route {
            Route::EditEmployee(id) => ctx.spawn(async move {
                let loaded = async {
                    let employee = api.get_employee(id).await?;
                    let template = api.get_template(employee.form_template).await?;
                    Ok::<_, ApiError>((employee, template))
                };
                AppEvent::EmployeeLoaded {
                    id,
                    result: loaded.await,
                }
            }),
            _ => ctx.spawn(async move { AppEvent::TemplatesLoaded(api.list_templates().await) }),
        }

        Self {
            route,
            draft: EmployeeDraft::new(),
            templates: Vec::new(),
            chooser: ListState::default(),
            inputs: None,
            loading: true,
        }
    }

    fn use_template(&mut self, ctx: &mut Context) {
        let Some(template) = self
            .chooser
            .selected()
            .and_then(|idx| self.templates.get(idx))
            .cloned()
        else {
            ctx.notify(Notification::error("Please select a form template."));
            return;
        };

        match self.draft.select_template(template) {
            Ok(()) => self.inputs = Some(build_inputs(&self.draft)),
            Err(e) => ctx.notify(e.into()),
        }
    }

    fn submit(&mut self, ctx: &mut Context) {
        let Some(inputs) = &self.inputs else {
            ctx.notify(Notification::error("Please select a form template."));
            return;
        };
        for (idx, field) in inputs.fields.iter().enumerate() {
            self.draft.set_value(idx, field.input.value.as_str());
        }
        if let Err(e) = self.draft.validate() {
            ctx.notify(e.into());
            return;
        }

        let api = ctx.api.clone();
        let draft = self.draft.clone();
        let from = self.route;
        ctx.spawn(async move {
            AppEvent::EmployeeSaved {
                from,
                result: api.save_employee(&draft).await,
            }
        });
    }

    fn draw_chooser(&mut self, frame: &mut Frame, area: Rect) {
        let items = self.templates.iter().map(|t| {
            ListItem::new(Line::from(vec![
                format!("#{:<4}", t.id).dark_gray(),
                t.name.clone().bold(),
                format!("  ({} fields)", t.fields.len()).into(),
            ]))
        });
        let list = List::new(items)
            .highlight_style(Style::default().reversed())
            .block(
                Block::bordered()
                    .padding(Padding::horizontal(1))
                    .title(" choose a form template  "),
            );
        frame.render_stateful_widget(list, area, &mut self.chooser);
    }
}

/// Hint shown next to a field's label
fn field_hint(field: &FormField) -> String {
    match field.field_type {
        FieldType::Select | FieldType::Radio => {
            format!("one of: {}", field.options.clone().unwrap_or_default().join(" | "))
        }
        FieldType::Checkbox => "true / false".to_string(),
        FieldType::Date => "YYYY-MM-DD".to_string(),
        other => other.to_string(),
    }
}

fn build_inputs(draft: &EmployeeDraft) -> InputForm {
    let fields = draft
        .fields()
        .into_iter()
        .enumerate()
        .map(|(idx, field)| {
            let label = format!(
                "{}{} ({})",
                field.label,
                if field.required { " *" } else { "" },
                field_hint(field)
            );
            let input = if field.field_type == FieldType::Password {
                InputField::password(label)
            } else {
                InputField::text(label)
            };
            input.with_value(draft.value(idx).unwrap_or_default())
        })
        .collect();
    InputForm::new(fields)
}

impl Page for EmployeeFormPage {
    fn route(&self) -> Route {
        self.route
    }

    fn help(&self) -> &'static str {
        HELP
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let title = match (self.draft.employee_id(), self.draft.template()) {
            (Some(id), Some(t)) => format!("Edit employee #{id}  ·  {}", t.name),
            (None, Some(t)) => format!("New employee  ·  {}", t.name),
            (_, None) if self.loading => "Loading…".to_string(),
            (_, None) => "New employee".to_string(),
        };

        let [title_area, body_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);
        frame.render_widget(Paragraph::new(format!(" {title}").bold()), title_area);

        match &self.inputs {
            Some(inputs) => {
                let block = Block::bordered().title(" Ctrl+S to save  ");
                let inner = block.inner(body_area);
                frame.render_widget(block, body_area);
                inputs.render(frame, inner);
            }
            None if !self.draft.is_edit_mode() => self.draw_chooser(frame, body_area),
            None => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action {
        if key.code == KeyCode::Esc {
            return Action::Navigate(Route::Employees);
        }
        if is_ctrl(&key, 's') {
            self.submit(ctx);
            return Action::None;
        }

        let Some(inputs) = &mut self.inputs else {
            match key.code {
                KeyCode::Up => self.chooser.select_previous(),
                KeyCode::Down => {
                    let next = self.chooser.selected().map_or(0, |i| i + 1);
                    if next < self.templates.len() {
                        self.chooser.select(Some(next));
                    }
                }
                KeyCode::Enter => self.use_template(ctx),
                _ => {}
            }
            return Action::None;
        };

        match key.code {
            KeyCode::Enter if inputs.is_last_focused() => self.submit(ctx),
            KeyCode::Enter => inputs.focus_next(),
            code if is_text_edit(&key) => {
                inputs.handle_key(code);
            }
            _ => {}
        }
        Action::None
    }

    fn handle_event(&mut self, event: AppEvent, ctx: &mut Context) -> Action {
        match event {
            AppEvent::TemplatesLoaded(result) if self.route == Route::NewEmployee => {
                self.loading = false;
                match result {
                    Ok(templates) => {
                        if templates.is_empty() {
                            ctx.notify(Notification::info(
                                "No form templates yet. Create one in the form builder first.",
                            ));
                        }
                        self.templates = templates;
                        if !self.templates.is_empty() {
                            self.chooser.select(Some(0));
                        }
                    }
                    Err(e) => {
                        ctx.notify(Notification::error("Failed to load form templates."));
                        ctx.notify_all(e.notifications());
                    }
                }
                Action::None
            }
            AppEvent::EmployeeLoaded { id, .. } if self.route != Route::EditEmployee(id) => {
                tracing::debug!(
                    employee_id = id,
                    route = %self.route,
                    "Ignoring load for another page"
                );
                Action::None
            }
            AppEvent::EmployeeLoaded { result, .. } => {
                self.loading = false;
                match result {
                    Ok((employee, template)) => {
                        self.draft = EmployeeDraft::for_employee(&employee, template);
                        self.inputs = Some(build_inputs(&self.draft));
                        Action::None
                    }
                    Err(e) => {
                        ctx.notify(Notification::error("Failed to load employee data."));
                        ctx.notify_all(e.notifications());
                        Action::Navigate(Route::Employees)
                    }
                }
            }
            AppEvent::EmployeeSaved { from, result } => match result {
                Ok(()) => {
                    ctx.notify(Notification::success(employee_saved_message(from)));
                    Action::Navigate(Route::Employees)
                }
                Err(e) => {
                    ctx.notify_all(e.notifications());
                    Action::None
                }
            },
            _ => Action::None,
        }
    }

    fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui_app::test_context;
    use ems_core::employees::{Employee, EmployeeData};
    use ratatui::crossterm::event::KeyModifiers;

    fn template() -> FormTemplate {
        let field = |id: i64, label: &str, field_type: FieldType, required: bool, order: i32| {
            FormField {
                id,
                label: label.to_string(),
                field_type,
                required,
                options: None,
                order,
            }
        };
        FormTemplate {
            id: 1,
            name: "Standard".to_string(),
            fields: vec![
                field(11, "Email", FieldType::Email, false, 1),
                field(10, "Full Name", FieldType::Text, true, 0),
            ],
            created_at: None,
            updated_at: None,
        }
    }

    fn type_text(page: &mut EmployeeFormPage, ctx: &mut Context, text: &str) {
        for c in text.chars() {
            page.handle_key(KeyEvent::from(KeyCode::Char(c)), ctx);
        }
    }

    #[tokio::test]
    async fn test_new_employee_flow() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeeFormPage::new(Route::NewEmployee, &mut ctx);
        page.handle_event(AppEvent::TemplatesLoaded(Ok(vec![template()])), &mut ctx);
        assert!(!page.is_loading());

        page.handle_key(KeyEvent::from(KeyCode::Enter), &mut ctx);
        let labels: Vec<_> = page
            .inputs
            .as_ref()
            .unwrap()
            .fields
            .iter()
            .map(|f| f.label.clone())
            .collect();
        assert_eq!(labels, vec!["Full Name * (text)", "Email (email)"]);

        // Required name missing: not sent
        let busy_before = ctx.is_busy();
        page.handle_key(
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
            &mut ctx,
        );
        assert_eq!(ctx.take_records().len(), 1);
        assert_eq!(ctx.is_busy(), busy_before);

        type_text(&mut page, &mut ctx, "Jane Doe");
        page.handle_key(KeyEvent::from(KeyCode::Enter), &mut ctx);
        type_text(&mut page, &mut ctx, "jane@example.com");
        page.handle_key(KeyEvent::from(KeyCode::Enter), &mut ctx);

        assert_eq!(page.draft.values(), ["Jane Doe", "jane@example.com"]);
        assert!(ctx.take_records().is_empty());
    }

    #[tokio::test]
    async fn test_edit_prefills_values() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeeFormPage::new(Route::EditEmployee(7), &mut ctx);
        let employee = Employee {
            id: 7,
            form_template: 1,
            form_template_name: None,
            data: vec![EmployeeData::new("Full Name", "John Smith")],
            created_at: None,
        };

        page.handle_event(
            AppEvent::EmployeeLoaded {
                id: 7,
                result: Ok((employee, template())),
            },
            &mut ctx,
        );

        let inputs = page.inputs.as_ref().unwrap();
        assert_eq!(inputs.value(0), "John Smith");
        assert_eq!(inputs.value(1), "");
        assert_eq!(page.route(), Route::EditEmployee(7));
    }

    #[tokio::test]
    async fn test_save_result_messages() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeeFormPage::new(Route::NewEmployee, &mut ctx);

        let action = page.handle_event(
            AppEvent::EmployeeSaved {
                from: Route::NewEmployee,
                result: Ok(()),
            },
            &mut ctx,
        );

        assert_eq!(action, Action::Navigate(Route::Employees));
        assert_eq!(
            ctx.take_records()[0].content,
            "Employee created successfully!"
        );
    }

    fn employee(id: i64) -> Employee {
        Employee {
            id,
            form_template: 1,
            form_template_name: None,
            data: vec![EmployeeData::new("Full Name", "John Smith")],
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_load_for_another_employee_ignored() {
        let (mut ctx, _rx) = test_context();

        // A new employee page stays in create mode
        let mut page = EmployeeFormPage::new(Route::NewEmployee, &mut ctx);
        let action = page.handle_event(
            AppEvent::EmployeeLoaded {
                id: 1,
                result: Ok((employee(1), template())),
            },
            &mut ctx,
        );
        assert_eq!(action, Action::None);
        assert!(!page.draft.is_edit_mode());
        assert!(page.inputs.is_none());

        // An edit page only takes its own employee
        let mut page = EmployeeFormPage::new(Route::EditEmployee(2), &mut ctx);
        page.handle_event(
            AppEvent::EmployeeLoaded {
                id: 1,
                result: Ok((employee(1), template())),
            },
            &mut ctx,
        );
        assert_eq!(page.draft.employee_id(), None);
        assert!(page.is_loading());

        // Nor does a failed load for someone else send it away
        let action = page.handle_event(
            AppEvent::EmployeeLoaded {
                id: 1,
                result: Err(ApiError::SessionExpired),
            },
            &mut ctx,
        );
        assert_eq!(action, Action::None);
        assert!(ctx.take_records().is_empty());
    }

    #[tokio::test]
    async fn test_edit_page_ignores_template_list() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeeFormPage::new(Route::EditEmployee(2), &mut ctx);

        page.handle_event(AppEvent::TemplatesLoaded(Ok(vec![template()])), &mut ctx);

        assert!(page.templates.is_empty());
        assert!(page.is_loading());
    }

    #[tokio::test]
    async fn test_update_message() {
        let (mut ctx, _rx) = test_context();
        let mut page = EmployeeFormPage::new(Route::EditEmployee(7), &mut ctx);

        page.handle_event(
            AppEvent::EmployeeSaved {
                from: Route::EditEmployee(7),
                result: Ok(()),
            },
            &mut ctx,
        );

        assert_eq!(
            ctx.take_records()[0].content,
            "Employee updated successfully!"
        );
    }
}
