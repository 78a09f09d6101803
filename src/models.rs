// Data models for todostore

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// Item identifier (milliseconds-since-epoch at creation, bumped to stay unique)
pub type TodoId = i64;

/// A single to-do entry
///
/// Field order matters: it is the on-disk order, and hydrate-then-save must
/// reproduce the stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    /// Older saved data has no priority (or a null one); it loads as medium.
    #[serde(default, deserialize_with = "priority_or_default")]
    pub priority: Priority,
}

impl Todo {
    pub fn new(id: TodoId, text: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            priority,
        }
    }
}

fn priority_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Priority, D::Error> {
    Ok(Option::<Priority>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(eyre::eyre!("Unknown priority: {} (expected high, medium or low)", other)),
        }
    }
}

/// Item counts over a slice of todos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl Stats {
    pub fn of(items: &[Todo]) -> Self {
        let mut stats = Stats {
            total: items.len(),
            ..Default::default()
        };

        for item in items {
            if item.completed {
                stats.completed += 1;
            }
            match item.priority {
                Priority::High => stats.high += 1,
                Priority::Medium => stats.medium += 1,
                Priority::Low => stats.low += 1,
            }
        }
        stats.incomplete = stats.total - stats.completed;

        stats
    }
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a fresh item id
///
/// The result is strictly greater than every id this process has generated
/// before and strictly greater than `floor`. Returns `None` once the id space
/// above either bound is exhausted.
pub fn next_id(floor: TodoId) -> Option<TodoId> {
    let mut last = LAST_ID.load(Ordering::SeqCst);
    loop {
        let candidate = now_ms().max(last.saturating_add(1)).max(floor.saturating_add(1));
        if candidate <= last || candidate <= floor {
            return None;
        }
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return Some(candidate),
            Err(actual) => last = actual,
        }
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
