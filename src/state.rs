// List state and the pure mutation API

use crate::models::{Priority, Stats, Todo, TodoId, next_id};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Ordered items plus the ids marked for batch operations
///
/// Every mutation returns a new state; the receiver is never modified.
/// Invalid input (blank text, duplicate text, unknown id) yields an equal
/// state, so callers detect change with `==`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    items: Vec<Todo>,
    selected: BTreeSet<TodoId>,
}

/// Tri-state of the "select all" checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAll {
    None,
    Partial,
    All,
}

/// A user action against the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { text: String, priority: Priority },
    Toggle(TodoId),
    Remove(TodoId),
    ToggleSelect(TodoId),
    ToggleSelectAll,
    BatchDelete,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection wholesale, keeping only selections that still exist
    pub fn with_items(&self, items: Vec<Todo>) -> Self {
        let selected = self
            .selected
            .iter()
            .copied()
            .filter(|id| items.iter().any(|t| t.id == *id))
            .collect();
        Self { items, selected }
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn selected(&self) -> &BTreeSet<TodoId> {
        &self.selected
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn is_selected(&self, id: TodoId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected items in collection order
    pub fn selected_items(&self) -> Vec<Todo> {
        self.items
            .iter()
            .filter(|t| self.selected.contains(&t.id))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.items)
    }

    pub fn select_all_state(&self) -> SelectAll {
        if self.selected.is_empty() {
            SelectAll::None
        } else if self.selected.len() == self.items.len() {
            SelectAll::All
        } else {
            SelectAll::Partial
        }
    }

    pub fn apply(&self, command: &Command) -> Self {
        match command {
            Command::Add { text, priority } => self.add(text, *priority),
            Command::Toggle(id) => self.toggle(*id),
            Command::Remove(id) => self.remove(*id),
            Command::ToggleSelect(id) => self.toggle_select(*id),
            Command::ToggleSelectAll => self.toggle_select_all(),
            Command::BatchDelete => self.batch_delete(),
        }
    }

    pub fn add(&self, text: &str, priority: Priority) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return self.clone();
        }

        let lowered = text.to_lowercase();
        if self.items.iter().any(|t| t.text.to_lowercase() == lowered) {
            debug!(text, "add: duplicate text ignored");
            return self.clone();
        }

        let floor = self.items.iter().map(|t| t.id).max().unwrap_or(0);
        let Some(id) = next_id(floor) else {
            warn!(floor, "add: no id left above existing items");
            return self.clone();
        };
        let todo = Todo::new(id, text, priority);
        debug!(id = todo.id, %priority, "add: appended item");

        let mut next = self.clone();
        next.items.push(todo);
        next
    }

    pub fn toggle(&self, id: TodoId) -> Self {
        let mut next = self.clone();
        if let Some(todo) = next.items.iter_mut().find(|t| t.id == id) {
            todo.completed = !todo.completed;
        }
        next
    }

    pub fn remove(&self, id: TodoId) -> Self {
        let mut next = self.clone();
        next.items.retain(|t| t.id != id);
        next.selected.remove(&id);
        next
    }

    pub fn toggle_select(&self, id: TodoId) -> Self {
        if self.get(id).is_none() {
            return self.clone();
        }

        let mut next = self.clone();
        if !next.selected.remove(&id) {
            next.selected.insert(id);
        }
        next
    }

    pub fn toggle_select_all(&self) -> Self {
        let all: BTreeSet<TodoId> = self.items.iter().map(|t| t.id).collect();
        let selected = if self.selected == all { BTreeSet::new() } else { all };
        Self {
            items: self.items.clone(),
            selected,
        }
    }

    pub fn batch_delete(&self) -> Self {
        let items = self
            .items
            .iter()
            .filter(|t| !self.selected.contains(&t.id))
            .cloned()
            .collect::<Vec<_>>();
        debug!(removed = self.items.len() - items.len(), "batch_delete");
        Self {
            items,
            selected: BTreeSet::new(),
        }
    }
}
