//! Status Bar
//!
//! Format: `status message                     [generation]`

use crate::todo::TodoStore;
use flux_esse::Snapshot;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    Frame,
};

const HINT: &str = "Enter add | ^T toggle | ^D remove | Tab filter | ^X clear done | Esc quit";

pub fn render(todo: &Snapshot<TodoStore>, area: Rect, f: &mut Frame) {
    if area.height < 1 {
        return;
    }

    let style = Style::default().bg(Color::Blue).fg(Color::White);
    let buf = f.buffer_mut();

    // Fill entire row with background
    for x in area.x..area.x + area.width {
        buf[(x, area.y)].set_bg(Color::Blue).set_char(' ');
    }

    let message = todo.status.as_deref().unwrap_or(HINT);
    let generation = format!("[{}]", todo.generation());
    let available = area.width.saturating_sub(generation.len() as u16 + 3) as usize;

    let shown: String = if message.chars().count() > available {
        let truncated: String = message.chars().take(available.saturating_sub(1)).collect();
        format!("{}…", truncated)
    } else {
        message.to_string()
    };
    buf.set_string(area.x + 1, area.y, &shown, style);

    if area.width > generation.len() as u16 + 1 {
        let x = area.x + area.width - generation.len() as u16 - 1;
        buf.set_string(x, area.y, &generation, style);
    }
}
