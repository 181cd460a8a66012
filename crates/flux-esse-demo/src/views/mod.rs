//! Views
//!
//! Each view is a descendant of the todo provider: it receives only the
//! environment and the scope id, and fetches the store itself.

use crate::todo::TodoStore;
use flux_esse::{use_context, Env, FluxError, ScopeId, Snapshot};
use parking_lot::Mutex;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub mod input_view;
pub mod status_bar;
pub mod todo_list_view;

/// Render the entire application UI
pub fn render(env: &Env, scope: ScopeId, title: &str, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    with_todos(env, scope, chunks[0], f, |todo, area, f| {
        todo_list_view::render(todo, title, area, f)
    });
    with_todos(env, scope, chunks[1], f, input_view::render);
    with_todos(env, scope, chunks[2], f, status_bar::render);
}

/// Resolve the todo store for a view, drawing the error instead if that fails
fn with_todos(
    env: &Env,
    scope: ScopeId,
    area: Rect,
    f: &mut Frame,
    view: impl FnOnce(&Snapshot<TodoStore>, Rect, &mut Frame),
) {
    match use_context::<TodoStore>(env, scope) {
        Ok(consumer) => view(&consumer.store(), area, f),
        Err(e) => render_error(&e, area, f),
    }
}

/// Last view error written to the log; a persisting error is logged once
static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

fn first_report(message: &str) -> bool {
    let mut last = LAST_ERROR.lock();
    if last.as_deref() == Some(message) {
        return false;
    }
    *last = Some(message.to_string());
    true
}

fn render_error(error: &FluxError, area: Rect, f: &mut Frame) {
    if first_report(&error.to_string()) {
        log::error!("View could not reach the todo store: {}", error);
    }
    let paragraph = Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red));
    f.render_widget(paragraph, area);
}
