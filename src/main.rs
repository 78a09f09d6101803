use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use todostore::{
    Command, Config, DirSaver, ExportError, ExportFormat, ExportScope, KeyValueStore, Persistence, Priority,
    SelectAll, TodoApp, TodoId, labels::priority_icon,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "todostore CLI - To-do list with priorities, batch selection and export")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the config file (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all todos
    List,

    /// Add a todo
    Add {
        text: String,

        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },

    /// Flip a todo between done and not done
    Toggle { id: TodoId },

    /// Delete a todo
    Rm { id: TodoId },

    /// Delete every listed todo at once
    BatchDelete {
        #[arg(required = true)]
        ids: Vec<TodoId>,
    },

    /// Export todos to a file in the export directory
    Export {
        #[arg(short, long, default_value = "txt")]
        format: ExportFormat,

        /// Export only these todos
        #[arg(long, num_args = 1..)]
        selected: Option<Vec<TodoId>>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Setup tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = config.open_store()?;
    let persistence = Persistence::with_key(store, config.storage_key.clone());
    let mut app = TodoApp::new(persistence, todostore::Labels::for_locale(config.locale));
    app.hydrate();

    match cli.command {
        Commands::List => render(&app),
        Commands::Add { text, priority } => {
            if app.dispatch(&Command::Add { text, priority })? {
                render(&app);
            } else {
                println!("{}", "Nothing added (empty or duplicate)".yellow());
            }
        }
        Commands::Toggle { id } => {
            app.dispatch(&Command::Toggle(id))?;
            render(&app);
        }
        Commands::Rm { id } => {
            app.dispatch(&Command::Remove(id))?;
            render(&app);
        }
        Commands::BatchDelete { ids } => {
            select(&mut app, &ids)?;
            app.dispatch(&Command::BatchDelete)?;
            render(&app);
        }
        Commands::Export { format, selected } => {
            let scope = match selected {
                Some(ids) => {
                    select(&mut app, &ids)?;
                    ExportScope::Selected
                }
                None => ExportScope::All,
            };

            if !export(&mut app, format, scope, &config.export_dir)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Run an export, returning `false` when it was refused for lack of items
fn export<S: KeyValueStore>(
    app: &mut TodoApp<S>,
    format: ExportFormat,
    scope: ExportScope,
    export_dir: &Path,
) -> Result<bool> {
    let mut saver = DirSaver::new(export_dir);
    match app.export(format, scope, &mut saver) {
        Ok(filename) => {
            println!("Exported {}", saver.dir().join(filename).display());
            Ok(true)
        }
        Err(e) if e.downcast_ref::<ExportError>().is_some() => {
            eprintln!("{}", e.to_string().red().bold());
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

fn select<S: KeyValueStore>(app: &mut TodoApp<S>, ids: &[TodoId]) -> Result<()> {
    for id in ids {
        if !app.state().is_selected(*id) {
            app.dispatch(&Command::ToggleSelect(*id))?;
        }
    }
    Ok(())
}

fn render<S: KeyValueStore>(app: &TodoApp<S>) {
    let state = app.state();
    let labels = app.labels();

    if state.items().is_empty() {
        println!("{}", "No todos".dimmed());
        return;
    }

    let header = match state.select_all_state() {
        SelectAll::All => "[x]",
        SelectAll::Partial => "[-]",
        SelectAll::None => "[ ]",
    };
    println!("{} {}", header, labels.report_title.bold());

    for todo in state.items() {
        let mark = if todo.completed { "✓" } else { " " };
        let text = if todo.completed {
            todo.text.dimmed().strikethrough()
        } else {
            todo.text.normal()
        };
        let label = labels.priority(todo.priority);
        let label = match todo.priority {
            Priority::High => label.red(),
            Priority::Medium => label.yellow(),
            Priority::Low => label.green(),
        };
        println!(
            "[{}] {} {} [{}] {}",
            mark,
            todo.id.to_string().dimmed(),
            priority_icon(todo.priority),
            label,
            text
        );
    }

    let stats = state.stats();
    println!(
        "{}: {} | {}: {} | {}: {}",
        labels.total, stats.total, labels.completed, stats.completed, labels.incomplete, stats.incomplete
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use todostore::{Labels, Locale, MemoryStore};

    fn hydrated_app() -> TodoApp<MemoryStore> {
        let mut app = TodoApp::new(Persistence::new(MemoryStore::new()), Labels::for_locale(Locale::En));
        app.hydrate();
        app
    }

    #[test]
    fn test_export_refused_reports_failure() {
        let temp = TempDir::new().unwrap();
        let mut app = hydrated_app();

        assert!(!export(&mut app, ExportFormat::Csv, ExportScope::All, temp.path()).unwrap());
        assert!(!export(&mut app, ExportFormat::Csv, ExportScope::Selected, temp.path()).unwrap());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_writes_file() {
        let temp = TempDir::new().unwrap();
        let mut app = hydrated_app();
        app.dispatch(&Command::Add {
            text: "Buy milk".to_string(),
            priority: Priority::High,
        })
        .unwrap();

        assert!(export(&mut app, ExportFormat::Txt, ExportScope::All, temp.path()).unwrap());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }
}
