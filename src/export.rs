// Export formats: plain-text report, JSON document, CSV sheet

use crate::labels::{Labels, priority_icon};
use crate::models::{Stats, Todo};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, Utc};
use serde::Serialize;

const DIVIDER_WIDTH: usize = 40;
const CSV_BOM: char = '\u{FEFF}';
const CSV_HEADER: &str = "ID,Text,Completed,CompletedText,Priority";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Txt,
    Json,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Txt, ExportFormat::Json, ExportFormat::Csv];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain;charset=utf-8",
            ExportFormat::Json => "application/json;charset=utf-8",
            ExportFormat::Csv => "text/csv;charset=utf-8",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(eyre::eyre!("Unknown export format: {} (expected txt, json or csv)", other)),
        }
    }
}

/// Which items an export covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportScope {
    #[default]
    All,
    Selected,
}

/// Reasons an export is refused
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("there are no todos to export")]
    NothingToExport,

    #[error("no todos are selected for export")]
    NothingSelected,

    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ExportError {
    pub fn empty(scope: ExportScope) -> Self {
        match scope {
            ExportScope::All => ExportError::NothingToExport,
            ExportScope::Selected => ExportError::NothingSelected,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument<'a> {
    export_time: String,
    total: usize,
    completed: usize,
    todos: &'a [Todo],
}

/// Format `items` as of the current local time
pub fn format(kind: ExportFormat, items: &[Todo], labels: &Labels) -> Result<String, ExportError> {
    format_at(kind, items, labels, Local::now().fixed_offset())
}

/// Format `items` as of `at`
pub fn format_at(
    kind: ExportFormat,
    items: &[Todo],
    labels: &Labels,
    at: DateTime<FixedOffset>,
) -> Result<String, ExportError> {
    if items.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    match kind {
        ExportFormat::Txt => Ok(format_txt(items, labels, at)),
        ExportFormat::Json => format_json(items, at),
        ExportFormat::Csv => Ok(format_csv(items, labels)),
    }
}

/// `todos[_selected]_<YYYYMMDD_HHMMSS>.<ext>`
pub fn filename(kind: ExportFormat, scope: ExportScope, at: DateTime<FixedOffset>) -> String {
    let suffix = match scope {
        ExportScope::All => "",
        ExportScope::Selected => "_selected",
    };
    format!("todos{}_{}.{}", suffix, at.format("%Y%m%d_%H%M%S"), kind.extension())
}

fn format_json(items: &[Todo], at: DateTime<FixedOffset>) -> Result<String, ExportError> {
    let stats = Stats::of(items);
    let doc = JsonDocument {
        export_time: at.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true),
        total: stats.total,
        completed: stats.completed,
        todos: items,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn format_csv(items: &[Todo], labels: &Labels) -> String {
    let mut rows = Vec::with_capacity(items.len() + 1);
    rows.push(format!("{}{}", CSV_BOM, CSV_HEADER));

    for item in items {
        rows.push(format!(
            "{},{},{},{},{}",
            item.id,
            csv_quote(&item.text),
            item.completed,
            labels.completion(item.completed),
            labels.priority(item.priority),
        ));
    }

    rows.join("\n")
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn format_txt(items: &[Todo], labels: &Labels, at: DateTime<FixedOffset>) -> String {
    let divider = "=".repeat(DIVIDER_WIDTH);
    let stats = Stats::of(items);

    let mut lines = Vec::with_capacity(items.len() + 4);
    lines.push(format!(
        "{} - {}: {}",
        labels.report_title,
        labels.exported_at,
        at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(divider.clone());

    for item in items {
        let mark = if item.completed { "✓" } else { " " };
        lines.push(format!(
            "[{}] {} [{}] {}",
            mark,
            priority_icon(item.priority),
            labels.priority(item.priority),
            item.text
        ));
    }

    lines.push(divider);
    lines.push(format!(
        "{}: {} | {}: {} | {}: {} | {}: {} | {}: {} | {}: {}",
        labels.total,
        stats.total,
        labels.completed,
        stats.completed,
        labels.incomplete,
        stats.incomplete,
        labels.high,
        stats.high,
        labels.medium,
        stats.medium,
        labels.low,
        stats.low,
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Locale;
    use crate::models::Priority;
    use chrono::TimeZone;

    fn at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .unwrap()
    }

    fn labels() -> &'static Labels {
        Labels::for_locale(Locale::En)
    }

    fn buy_milk() -> Vec<Todo> {
        vec![Todo::new(1, "Buy milk", Priority::High)]
    }

    #[test]
    fn test_empty_items_rejected() {
        for kind in ExportFormat::ALL {
            let err = format_at(kind, &[], labels(), at()).unwrap_err();
            assert!(matches!(err, ExportError::NothingToExport));
        }
    }

    #[test]
    fn test_json_export() {
        let out = format_at(ExportFormat::Json, &buy_milk(), labels(), at()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["exportTime"], "2024-03-05T06:07:09.000Z");
        assert_eq!(value["total"], 1);
        assert_eq!(value["completed"], 0);
        assert_eq!(
            value["todos"],
            serde_json::json!([{"id": 1, "text": "Buy milk", "completed": false, "priority": "high"}])
        );
        // Two-space indentation
        assert!(out.contains("\n  \"total\": 1"));
    }

    #[test]
    fn test_csv_export() {
        let mut done = Todo::new(2, "Say \"hi\"", Priority::Low);
        done.completed = true;
        let items = vec![Todo::new(1, "Buy milk, eggs", Priority::High), done];

        let out = format_at(ExportFormat::Csv, &items, labels(), at()).unwrap();
        assert!(out.starts_with('\u{FEFF}'));

        let lines: Vec<&str> = out.trim_start_matches('\u{FEFF}').split('\n').collect();
        assert_eq!(
            lines,
            vec![
                "ID,Text,Completed,CompletedText,Priority",
                "1,\"Buy milk, eggs\",false,Incomplete,High",
                "2,\"Say \"\"hi\"\"\",true,Completed,Low",
            ]
        );
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let items = vec![Todo::new(3, "Say \"hi\"", Priority::Medium)];
        let out = format_at(ExportFormat::Csv, &items, labels(), at()).unwrap();
        assert!(out.contains(r#""Say ""hi""""#));
    }

    #[test]
    fn test_txt_export() {
        let mut done = Todo::new(2, "Walk dog", Priority::Medium);
        done.completed = true;
        let items = vec![Todo::new(1, "Buy milk", Priority::High), done];

        let out = format_at(ExportFormat::Txt, &items, labels(), at()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Todo List - Exported at: 2024-03-05 14:07:09");
        assert_eq!(lines[1], "=".repeat(40));
        assert_eq!(lines[2], "[ ] 🔴 [High] Buy milk");
        assert_eq!(lines[3], "[✓] 🟡 [Medium] Walk dog");
        assert_eq!(lines[4], "=".repeat(40));
        assert_eq!(
            lines[5],
            "Total: 2 | Completed: 1 | Incomplete: 1 | High: 1 | Medium: 1 | Low: 0"
        );
    }

    #[test]
    fn test_txt_export_localized() {
        let out = format_at(
            ExportFormat::Txt,
            &buy_milk(),
            Labels::for_locale(Locale::Zh),
            at(),
        )
        .unwrap();
        assert!(out.starts_with("待办事项清单 - 导出时间: "));
        assert!(out.contains("[ ] 🔴 [高] Buy milk"));
    }

    #[test]
    fn test_filename() {
        assert_eq!(
            filename(ExportFormat::Csv, ExportScope::All, at()),
            "todos_20240305_140709.csv"
        );
        assert_eq!(
            filename(ExportFormat::Json, ExportScope::Selected, at()),
            "todos_selected_20240305_140709.json"
        );
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Txt.mime_type(), "text/plain;charset=utf-8");
        assert_eq!(ExportFormat::Json.mime_type(), "application/json;charset=utf-8");
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv;charset=utf-8");
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_empty_error_by_scope() {
        assert!(matches!(ExportError::empty(ExportScope::All), ExportError::NothingToExport));
        assert!(matches!(ExportError::empty(ExportScope::Selected), ExportError::NothingSelected));
    }
}
