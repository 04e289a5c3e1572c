use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Event emitted by PathInput
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathInputEvent {
    None,
    /// Enter pressed with the trimmed text.
    Submit(String),
    /// Esc pressed
    Cancel,
}

/// Single-line text input wrapping tui-textarea, used by the open-file prompt.
pub struct PathInput {
    textarea: TextArea<'static>,
}

impl PathInput {
    /// Create an input holding `initial`, cursor at the end.
    pub fn new(initial: &str, text_color: Color) -> Self {
        let single_line = initial.replace(['\n', '\r'], " ");
        let mut textarea = TextArea::new(vec![single_line]);
        textarea.set_style(Style::default().fg(text_color));
        // No underline on the cursor line
        textarea.set_cursor_line_style(Style::default());
        textarea.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        textarea.move_cursor(CursorMove::End);
        Self { textarea }
    }

    pub fn value(&self) -> String {
        self.textarea.lines().first().cloned().unwrap_or_default()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> PathInputEvent {
        match event.code {
            KeyCode::Enter => PathInputEvent::Submit(self.value().trim().to_string()),
            KeyCode::Esc => PathInputEvent::Cancel,
            _ => {
                self.textarea.input(key_event_to_input(event));
                PathInputEvent::None
            }
        }
    }
}

/// Convert a crossterm KeyEvent to tui_textarea::Input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        // Single line: vertical movement and tabs do nothing
        _ => Key::Null,
    };

    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Widget for &PathInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);
    }
}
