use crate::todo::TodoStore;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the filtered todo list with the selection highlighted
pub fn render(todo: &TodoStore, title: &str, area: Rect, f: &mut Frame) {
    let visible = todo.visible();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|(_, item)| {
            let (marker, style) = if item.done {
                ("[x] ", Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT))
            } else {
                ("[ ] ", Style::default())
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(item.title.clone(), style),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(format!(
            " {} ({} left, showing {}) ",
            title,
            todo.remaining(),
            todo.filter.label()
        ))
        .borders(Borders::ALL);

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(todo.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
