// User-facing label tables

use crate::models::Priority;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl std::str::FromStr for Locale {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "zh" => Ok(Locale::Zh),
            other => Err(eyre::eyre!("Unsupported locale: {} (expected en or zh)", other)),
        }
    }
}

/// Strings used by the export formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub report_title: &'static str,
    pub exported_at: &'static str,
    pub completed: &'static str,
    pub incomplete: &'static str,
    pub total: &'static str,
    pub high: &'static str,
    pub medium: &'static str,
    pub low: &'static str,
}

impl Labels {
    pub fn for_locale(locale: Locale) -> &'static Labels {
        match locale {
            Locale::En => &EN,
            Locale::Zh => &ZH,
        }
    }

    pub fn priority(&self, priority: Priority) -> &'static str {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    pub fn completion(&self, completed: bool) -> &'static str {
        if completed { self.completed } else { self.incomplete }
    }
}

/// Icon shown before the priority label in text reports
pub fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    }
}

static EN: Labels = Labels {
    report_title: "Todo List",
    exported_at: "Exported at",
    completed: "Completed",
    incomplete: "Incomplete",
    total: "Total",
    high: "High",
    medium: "Medium",
    low: "Low",
};

static ZH: Labels = Labels {
    report_title: "待办事项清单",
    exported_at: "导出时间",
    completed: "已完成",
    incomplete: "未完成",
    total: "总计",
    high: "高",
    medium: "中",
    low: "低",
};
