//! Todo store
//!
//! All state of the demo lives here. Views only ever read snapshots of it and
//! key presses only ever invoke its actions.

use anyhow::bail;
use flux_esse::{ActionTable, Draft, FluxStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub title: String,
    pub done: bool,
}

impl TodoItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            done: false,
        }
    }
}

/// Which items the list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Completed,
            Self::Completed => Self::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    fn accepts(self, item: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.done,
            Self::Completed => item.done,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TodoStore {
    pub items: Vec<TodoItem>,
    pub input: String,
    pub selected: usize, // Index into the visible (filtered) items
    pub filter: Filter,
    pub status: Option<String>,
    pub running: bool,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            input: String::new(),
            selected: 0,
            filter: Filter::default(),
            status: None,
            running: true,
        }
    }
}

impl TodoStore {
    /// Items passing the current filter, with their index in `items`
    pub fn visible(&self) -> Vec<(usize, &TodoItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.filter.accepts(item))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|item| !item.done).count()
    }

    fn selected_index(&self) -> Option<usize> {
        self.visible().get(self.selected).map(|(index, _)| *index)
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible().len();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }
}

impl FluxStore for TodoStore {
    fn register(actions: &mut ActionTable<Self>) {
        actions
            .add("input_char", |todo: &mut Draft<Self>, c: char| {
                todo.input.push(c);
            })
            .add("input_backspace", |todo: &mut Draft<Self>, ()| {
                todo.input.pop();
            })
            .try_add("add", |todo: &mut Draft<Self>, ()| {
                let title = todo.input.trim().to_string();
                if title.is_empty() {
                    todo.status = Some("Nothing to add".to_string());
                    bail!("refusing to add an empty todo");
                }
                todo.items.push(TodoItem::new(&title));
                todo.input.clear();
                todo.status = Some(format!("Added \"{}\"", title));
                Ok(())
            })
            .add("seed", |todo: &mut Draft<Self>, titles: Vec<String>| {
                todo.items.extend(titles.into_iter().map(TodoItem::new));
            })
            .add("toggle", |todo: &mut Draft<Self>, ()| {
                if let Some(index) = todo.selected_index() {
                    let item = &mut todo.items[index];
                    item.done = !item.done;
                }
                todo.clamp_selection();
            })
            .add("remove", |todo: &mut Draft<Self>, ()| {
                if let Some(index) = todo.selected_index() {
                    let item = todo.items.remove(index);
                    todo.status = Some(format!("Removed \"{}\"", item.title));
                }
                todo.clamp_selection();
            })
            .add("select_next", |todo: &mut Draft<Self>, ()| {
                if todo.selected + 1 < todo.visible().len() {
                    todo.selected += 1;
                }
            })
            .add("select_previous", |todo: &mut Draft<Self>, ()| {
                todo.selected = todo.selected.saturating_sub(1);
            })
            .add("cycle_filter", |todo: &mut Draft<Self>, ()| {
                todo.filter = todo.filter.next();
                todo.selected = 0;
            })
            .add("clear_completed", |todo: &mut Draft<Self>, ()| {
                let before = todo.items.len();
                todo.items.retain(|item| !item.done);
                let cleared = before - todo.items.len();
                todo.status = Some(format!("Cleared {} completed", cleared));
                todo.clamp_selection();
            })
            .add("quit", |todo: &mut Draft<Self>, ()| {
                todo.running = false;
            });
    }
}
