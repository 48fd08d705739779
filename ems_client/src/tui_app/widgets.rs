use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::{Constraint, Layout, Position, Rect},
    style::{Style, Stylize},
    widgets::{Block, ListItem, ListState, Paragraph, ScrollbarState},
};

/// A bounded list rendered bottom-to-top, newest item first.
///
/// Index 0 is the newest item and sits at the bottom of the window.
pub struct ScrollableList {
    max_items: usize,
    pub list_items: Vec<ListItem<'static>>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
}

impl ScrollableList {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            list_items: Vec::new(),
            list_state: ListState::default(),
            scroll_state: ScrollbarState::default(),
        }
    }

    pub fn clear(&mut self) {
        self.list_items.clear();
        self.list_state.select(None);
        self.scroll_state = ScrollbarState::default();
    }

    /// Add a new item and follow it.
    pub fn push(&mut self, item: ListItem<'static>) {
        self.list_items.insert(0, item);
        self.list_items.truncate(self.max_items);
        self.scroll_state = self.scroll_state.content_length(self.list_items.len());
        self.jump_to_last();
    }

    /// Select the oldest item, at the top of the window.
    pub fn jump_to_first(&mut self) {
        if let Some(last) = self.list_items.len().checked_sub(1) {
            self.select(last);
        }
    }

    /// Select the newest item, at the bottom of the window.
    pub fn jump_to_last(&mut self) {
        if !self.list_items.is_empty() {
            self.select(0);
        }
    }

    pub fn move_up(&mut self) {
        let next = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.list_items.len().saturating_sub(1)),
            None => 0,
        };
        if !self.list_items.is_empty() {
            self.select(next);
        }
    }

    pub fn move_down(&mut self) {
        let next = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        if !self.list_items.is_empty() {
            self.select(next);
        }
    }

    fn select(&mut self, idx: usize) {
        self.list_state.select(Some(idx));
        // Scrollbar runs top-to-bottom while the list runs bottom-to-top
        let position = self.list_items.len().saturating_sub(idx + 1);
        self.scroll_state = self.scroll_state.position(position);
    }
}

/// Single-line text input with a cursor.
#[derive(Debug, Default)]
pub struct UserInput {
    /// Cursor position, in chars
    pub char_idx: usize,
    pub value: String,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            char_idx: value.chars().count(),
            value,
        }
    }

    fn byte_idx(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.char_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub fn input(&mut self, c: char) {
        let idx = self.byte_idx();
        self.value.insert(idx, c);
        self.char_idx += 1;
    }

    pub fn backspace(&mut self) {
        if self.char_idx > 0 {
            self.char_idx -= 1;
            let idx = self.byte_idx();
            self.value.remove(idx);
        }
    }

    pub fn delete(&mut self) {
        if self.char_idx < self.value.chars().count() {
            let idx = self.byte_idx();
            self.value.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.char_idx = self.char_idx.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.char_idx = (self.char_idx + 1).min(self.value.chars().count());
    }

    pub fn jump_to_first(&mut self) {
        self.char_idx = 0;
    }

    pub fn jump_to_last(&mut self) {
        self.char_idx = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.char_idx = 0;
    }

    /// Take the current value, leaving the input empty.
    pub fn submit(&mut self) -> String {
        self.char_idx = 0;
        std::mem::take(&mut self.value)
    }

    /// Apply an editing key. Returns false for keys that aren't edits.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => self.input(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.jump_to_first(),
            KeyCode::End => self.jump_to_last(),
            _ => return false,
        }
        true
    }

    /// Render as a bordered one-line box, placing the cursor when focused.
    pub fn render(&self, frame: &mut Frame, area: Rect, title: String, masked: bool, focused: bool) {
        let shown = if masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };

        let block = if focused {
            Block::bordered().title(title.light_green())
        } else {
            Block::bordered().title(title)
        };
        frame.render_widget(Paragraph::new(shown).style(Style::default()).block(block), area);

        if focused {
            frame.set_cursor_position(Position::new(
                area.x + self.char_idx as u16 + 1,
                area.y + 1,
            ));
        }
    }
}

/// A labelled input in an [`InputForm`].
pub struct InputField {
    pub label: String,
    pub input: UserInput,
    pub masked: bool,
}

impl InputField {
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            input: UserInput::new(),
            masked: false,
        }
    }

    pub fn password(label: impl Into<String>) -> Self {
        Self {
            masked: true,
            ..Self::text(label)
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.input = UserInput::with_value(value);
        self
    }
}

/// A vertical stack of inputs with one focused at a time.
pub struct InputForm {
    pub fields: Vec<InputField>,
    focus: usize,
}

impl InputForm {
    pub fn new(fields: Vec<InputField>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn is_last_focused(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    pub fn focus_next(&mut self) {
        if !self.is_last_focused() {
            self.focus += 1;
        }
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map_or("", |f| f.input.value.as_str())
    }

    /// Route a key to the focused input or move focus.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Up => self.focus_prev(),
            KeyCode::Down => self.focus_next(),
            _ => {
                return self
                    .fields
                    .get_mut(self.focus)
                    .is_some_and(|f| f.input.handle_key(code));
            }
        }
        true
    }

    /// Height needed to render every field.
    pub fn height(&self) -> u16 {
        self.fields.len() as u16 * 3
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical(self.fields.iter().map(|_| Constraint::Length(3))).split(area);
        for (idx, (field, row)) in self.fields.iter().zip(rows.iter()).enumerate() {
            field.input.render(
                frame,
                *row,
                format!(" {}  ", field.label),
                field.masked,
                idx == self.focus,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_editing() {
        let mut input = UserInput::new();
        for c in "hélo".chars() {
            input.input(c);
        }
        input.move_left();
        input.input('l');
        assert_eq!(input.value, "héllo");

        input.jump_to_first();
        input.delete();
        assert_eq!(input.value, "éllo");

        input.jump_to_last();
        input.backspace();
        assert_eq!(input.value, "éll");
        assert_eq!(input.char_idx, 3);
    }

    #[test]
    fn test_user_input_submit_clears() {
        let mut input = UserInput::with_value("add");
        assert_eq!(input.submit(), "add");
        assert!(input.value.is_empty());
        assert_eq!(input.char_idx, 0);
    }

    #[test]
    fn test_scrollable_list_bounded() {
        let mut list = ScrollableList::new(2);
        list.push("a".into());
        list.push("b".into());
        list.push("c".into());
        assert_eq!(list.list_items.len(), 2);
        assert_eq!(list.list_state.selected(), Some(0));

        list.jump_to_first();
        assert_eq!(list.list_state.selected(), Some(1));
        list.move_up();
        assert_eq!(list.list_state.selected(), Some(1));
        list.move_down();
        assert_eq!(list.list_state.selected(), Some(0));
    }

    #[test]
    fn test_input_form_focus() {
        let mut form = InputForm::new(vec![
            InputField::text("Username").with_value("alice"),
            InputField::password("Password"),
        ]);
        assert_eq!(form.focus(), 0);

        form.handle_key(KeyCode::Down);
        form.handle_key(KeyCode::Char('x'));
        assert!(form.is_last_focused());
        assert_eq!(form.value(0), "alice");
        assert_eq!(form.value(1), "x");

        form.handle_key(KeyCode::Down);
        assert_eq!(form.focus(), 1);
        assert!(!form.handle_key(KeyCode::Enter));
    }
}
