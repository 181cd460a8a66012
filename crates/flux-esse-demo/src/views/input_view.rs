use crate::todo::TodoStore;
use flux_esse::Snapshot;
use ratatui::{
    layout::{Position, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the input line and place the cursor after the typed text
pub fn render(todo: &Snapshot<TodoStore>, area: Rect, f: &mut Frame) {
    let block = Block::default().title(" New todo ").borders(Borders::ALL);
    let paragraph = Paragraph::new(todo.input.as_str()).block(block);
    f.render_widget(paragraph, area);

    let x = cursor_x(area, todo.input.chars().count());
    f.set_cursor_position(Position::new(x, area.y.saturating_add(1)));
}

/// Column after `typed` characters, kept inside the block's borders
fn cursor_x(area: Rect, typed: usize) -> u16 {
    let typed = u16::try_from(typed).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2))
}
