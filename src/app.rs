// Component orchestration: state ownership, persistence mirroring and export

use crate::export::{self, ExportError, ExportFormat, ExportScope};
use crate::kv::KeyValueStore;
use crate::labels::Labels;
use crate::persist::Persistence;
use crate::state::{Command, ListState};
use chrono::{DateTime, FixedOffset, Local};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination for exported content
pub trait FileSaver {
    fn save(&mut self, content: &str, filename: &str, mime_type: &str) -> Result<()>;
}

/// Writes exports into a directory
#[derive(Debug, Clone)]
pub struct DirSaver {
    dir: PathBuf,
}

impl DirSaver {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirSaver {
    fn save(&mut self, content: &str, filename: &str, mime_type: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create export directory")?;
        let path = self.dir.join(filename);
        fs::write(&path, content).with_context(|| format!("Failed to write export {:?}", path))?;
        info!(file = ?path, mime_type, bytes = content.len(), "Saved export");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub content: String,
    pub filename: String,
    pub mime_type: String,
}

/// Keeps exports in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySaver {
    pub saved: Vec<SavedFile>,
}

impl FileSaver for MemorySaver {
    fn save(&mut self, content: &str, filename: &str, mime_type: &str) -> Result<()> {
        self.saved.push(SavedFile {
            content: content.to_string(),
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
        });
        Ok(())
    }
}

/// Open flag of the export dropdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportMenu {
    open: bool,
}

impl ExportMenu {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }
}

/// The to-do list component
///
/// Owns the single [`ListState`] and mirrors item changes into the store once
/// hydrated.
pub struct TodoApp<S: KeyValueStore> {
    state: ListState,
    persistence: Persistence<S>,
    labels: &'static Labels,
    menu: ExportMenu,
}

impl<S: KeyValueStore> TodoApp<S> {
    pub fn new(persistence: Persistence<S>, labels: &'static Labels) -> Self {
        Self {
            state: ListState::new(),
            persistence,
            labels,
            menu: ExportMenu::default(),
        }
    }

    /// Replace the items with the stored collection and enable persistence
    pub fn hydrate(&mut self) {
        let items = self.persistence.hydrate();
        self.state = self.state.with_items(items);
    }

    pub fn is_hydrated(&self) -> bool {
        self.persistence.is_hydrated()
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn labels(&self) -> &'static Labels {
        self.labels
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn menu(&self) -> ExportMenu {
        self.menu
    }

    pub fn menu_mut(&mut self) -> &mut ExportMenu {
        &mut self.menu
    }

    /// Apply a command, returning whether the state changed
    ///
    /// A changed item collection is written through to storage.
    pub fn dispatch(&mut self, command: &Command) -> Result<bool> {
        let next = self.state.apply(command);
        if next == self.state {
            debug!(?command, "dispatch: no change");
            return Ok(false);
        }

        let items_changed = next.items() != self.state.items();
        self.state = next;
        if items_changed {
            self.persistence.save(self.state.items())?;
        }
        Ok(true)
    }

    /// Export the given scope now, returning the saved filename
    pub fn export<F: FileSaver>(&mut self, kind: ExportFormat, scope: ExportScope, saver: &mut F) -> Result<String> {
        self.export_at(kind, scope, saver, Local::now().fixed_offset())
    }

    /// Export as of `at`; closes the export menu whatever the outcome
    ///
    /// An empty scope is refused with [`ExportError`] before the saver is called.
    pub fn export_at<F: FileSaver>(
        &mut self,
        kind: ExportFormat,
        scope: ExportScope,
        saver: &mut F,
        at: DateTime<FixedOffset>,
    ) -> Result<String> {
        self.menu.close();

        let items = match scope {
            ExportScope::All => self.state.items().to_vec(),
            ExportScope::Selected => self.state.selected_items(),
        };
        if items.is_empty() {
            return Err(ExportError::empty(scope).into());
        }

        let content = export::format_at(kind, &items, self.labels, at)?;
        let filename = export::filename(kind, scope, at);
        saver.save(&content, &filename, kind.mime_type())?;

        info!(%kind, ?scope, count = items.len(), filename = %filename, "Exported todos");
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::labels::Locale;
    use crate::models::Priority;
    use crate::persist::DEFAULT_KEY;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn app_with(raw: Option<&str>) -> TodoApp<MemoryStore> {
        let mut store = MemoryStore::new();
        if let Some(raw) = raw {
            store.set(DEFAULT_KEY, raw).unwrap();
        }
        TodoApp::new(Persistence::new(store), Labels::for_locale(Locale::En))
    }

    fn stored(app: &TodoApp<MemoryStore>) -> Option<String> {
        app.persistence().store().get(DEFAULT_KEY).unwrap()
    }

    fn add(text: &str, priority: Priority) -> Command {
        Command::Add {
            text: text.to_string(),
            priority,
        }
    }

    fn at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_dispatch_before_hydration_does_not_write() {
        let raw = r#"[{"id":1,"text":"Saved","completed":false,"priority":"high"}]"#;
        let mut app = app_with(Some(raw));

        assert!(app.dispatch(&add("Early", Priority::Low)).unwrap());
        assert_eq!(stored(&app).as_deref(), Some(raw));

        app.hydrate();
        assert_eq!(app.state().items().len(), 1);
        assert_eq!(app.state().items()[0].text, "Saved");
    }

    #[test]
    fn test_dispatch_after_hydration_writes_through() {
        let mut app = app_with(None);
        app.hydrate();
        assert!(app.is_hydrated());

        app.dispatch(&add("Buy milk", Priority::High)).unwrap();
        let saved = stored(&app).unwrap();
        assert!(saved.contains("\"text\":\"Buy milk\""));

        let id = app.state().items()[0].id;
        app.dispatch(&Command::Toggle(id)).unwrap();
        assert!(stored(&app).unwrap().contains("\"completed\":true"));
    }

    #[test]
    fn test_dispatch_reports_no_change() {
        let mut app = app_with(None);
        app.hydrate();
        app.dispatch(&add("Buy milk", Priority::High)).unwrap();

        assert!(!app.dispatch(&add("buy MILK", Priority::Low)).unwrap());
        assert!(!app.dispatch(&add("  ", Priority::Low)).unwrap());
        assert!(!app.dispatch(&Command::Remove(-1)).unwrap());
    }

    #[test]
    fn test_selection_changes_do_not_rewrite_storage() {
        let mut app = app_with(None);
        app.hydrate();
        app.dispatch(&add("Buy milk", Priority::High)).unwrap();

        let before = stored(&app);
        assert!(app.dispatch(&Command::ToggleSelectAll).unwrap());
        assert_eq!(stored(&app), before);
    }

    #[test]
    fn test_hydrate_malformed_starts_empty() {
        let mut app = app_with(Some("not json"));
        app.hydrate();
        assert!(app.state().items().is_empty());

        app.dispatch(&add("Fresh", Priority::Medium)).unwrap();
        assert!(stored(&app).unwrap().starts_with("[{"));
    }

    #[test]
    fn test_export_all() {
        let raw = r#"[{"id":1,"text":"Buy milk","completed":false,"priority":"high"}]"#;
        let mut app = app_with(Some(raw));
        app.hydrate();

        let mut saver = MemorySaver::default();
        let filename = app.export_at(ExportFormat::Json, ExportScope::All, &mut saver, at()).unwrap();

        assert_eq!(filename, "todos_20250102_030405.json");
        assert_eq!(saver.saved.len(), 1);
        assert_eq!(saver.saved[0].mime_type, "application/json;charset=utf-8");

        let value: serde_json::Value = serde_json::from_str(&saver.saved[0].content).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["completed"], 0);
        assert_eq!(value["todos"][0]["text"], "Buy milk");
    }

    #[test]
    fn test_export_selected_only() {
        let mut app = app_with(None);
        app.hydrate();
        app.dispatch(&add("One", Priority::High)).unwrap();
        app.dispatch(&add("Two", Priority::Low)).unwrap();
        let two = app.state().items()[1].id;
        app.dispatch(&Command::ToggleSelect(two)).unwrap();

        let mut saver = MemorySaver::default();
        let filename = app
            .export_at(ExportFormat::Csv, ExportScope::Selected, &mut saver, at())
            .unwrap();

        assert_eq!(filename, "todos_selected_20250102_030405.csv");
        let content = &saver.saved[0].content;
        assert!(content.contains("\"Two\""));
        assert!(!content.contains("\"One\""));
    }

    #[test]
    fn test_export_after_batch_delete_blocks() {
        let mut app = app_with(None);
        app.hydrate();
        app.dispatch(&add("One", Priority::High)).unwrap();
        app.dispatch(&add("Two", Priority::Low)).unwrap();
        let one = app.state().items()[0].id;
        app.dispatch(&Command::ToggleSelect(one)).unwrap();
        app.dispatch(&Command::BatchDelete).unwrap();

        let mut saver = MemorySaver::default();
        let err = app
            .export_at(ExportFormat::Txt, ExportScope::Selected, &mut saver, at())
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<ExportError>(), Some(ExportError::NothingSelected)));
        assert!(saver.saved.is_empty());
    }

    #[test]
    fn test_export_empty_list_blocks() {
        let mut app = app_with(None);
        app.hydrate();

        let mut saver = MemorySaver::default();
        let err = app.export(ExportFormat::Csv, ExportScope::All, &mut saver).unwrap_err();
        assert!(matches!(err.downcast_ref::<ExportError>(), Some(ExportError::NothingToExport)));
        assert!(saver.saved.is_empty());
    }

    #[test]
    fn test_export_closes_menu() {
        let mut app = app_with(None);
        app.hydrate();
        app.dispatch(&add("One", Priority::High)).unwrap();

        app.menu_mut().open();
        assert!(app.menu().is_open());

        let mut saver = MemorySaver::default();
        app.export_at(ExportFormat::Txt, ExportScope::All, &mut saver, at()).unwrap();
        assert!(!app.menu().is_open());
    }

    #[test]
    fn test_menu_toggle() {
        let mut menu = ExportMenu::default();
        menu.toggle();
        assert!(menu.is_open());
        menu.toggle();
        assert!(!menu.is_open());
        menu.open();
        menu.close();
        assert!(!menu.is_open());
    }

    #[test]
    fn test_dir_saver_writes_file() {
        let temp = TempDir::new().unwrap();
        let mut saver = DirSaver::new(temp.path().join("exports"));

        saver.save("hello", "todos.txt", "text/plain;charset=utf-8").unwrap();
        let written = fs::read_to_string(saver.dir().join("todos.txt")).unwrap();
        assert_eq!(written, "hello");
    }
}
