//! Skip-feature warning collection.
//!
//! Unsupported or approximated OOXML features degrade to documented defaults
//! instead of failing the conversion. Each degradation is recorded here under
//! a stable feature key so batch callers can see what was approximated.

use serde::Serialize;
use std::cell::RefCell;

/// How much warning detail a conversion records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Record nothing.
    Off,
    /// Record and de-duplicate, summarize at the end.
    #[default]
    Warn,
    /// Additionally emit each occurrence through `log::debug!`.
    Debug,
}

/// One de-duplicated warning with its occurrence count.
#[derive(Debug, Clone, Serialize)]
pub struct WarningEntry {
    /// Stable feature identifier, e.g. "blip-clr-change".
    pub feature: String,
    /// Human-readable description of the first occurrence.
    pub message: String,
    /// Location context of the first occurrence, e.g. "Slide 3".
    pub location: Option<String>,
    /// Number of times this feature key was reported.
    pub count: usize,
}

/// End-of-conversion summary of everything that was approximated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarningSummary {
    pub entries: Vec<WarningEntry>,
    pub total: usize,
}

/// Per-conversion warning sink.
///
/// Interior mutability keeps the parser and renderer call trees on `&self`;
/// a conversion is single-threaded so a `RefCell` is sufficient.
#[derive(Debug)]
pub struct WarningCollector {
    level: LogLevel,
    entries: RefCell<Vec<WarningEntry>>,
}

impl WarningCollector {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Record a degraded feature under a stable key.
    pub fn warn(&self, feature: &str, message: impl Into<String>, location: Option<&str>) {
        if self.level == LogLevel::Off {
            return;
        }
        let message = message.into();
        if self.level == LogLevel::Debug {
            match location {
                Some(loc) => log::debug!("[{feature}] {message} ({loc})"),
                None => log::debug!("[{feature}] {message}"),
            }
        }
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.iter_mut().find(|e| e.feature == feature) {
            entry.count += 1;
        } else {
            entries.push(WarningEntry {
                feature: feature.to_string(),
                message,
                location: location.map(String::from),
                count: 1,
            });
        }
    }

    /// Summarize everything recorded so far.
    pub fn summary(&self) -> WarningSummary {
        let entries = self.entries.borrow().clone();
        let total = entries.iter().map(|e| e.count).sum();
        WarningSummary { entries, total }
    }

    /// Emit the summary through the `log` facade.
    pub fn flush(&self) {
        if self.level == LogLevel::Off {
            return;
        }
        let summary = self.summary();
        if summary.total == 0 {
            return;
        }
        log::warn!(
            "{} feature(s) were approximated during conversion:",
            summary.entries.len()
        );
        for entry in &summary.entries {
            match &entry.location {
                Some(loc) => {
                    log::warn!("  [{}] {} ({}) x{}", entry.feature, entry.message, loc, entry.count)
                }
                None => log::warn!("  [{}] {} x{}", entry.feature, entry.message, entry.count),
            }
        }
    }
}

impl Default for WarningCollector {
    fn default() -> Self {
        Self::new(LogLevel::Warn)
    }
}
