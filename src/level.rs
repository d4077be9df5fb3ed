//! Log levels and per-framework level mapping
//!
//! The facade speaks six levels. Every binding translates them onto the
//! native severities of its framework through a [`LevelMap`] built once when
//! the binding is constructed.

use std::fmt;

/// Severity of a log entry.
///
/// Levels are totally ordered: `Trace < Debug < Info < Warn < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Very detailed diagnostics
    Trace,
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Something unexpected that the library recovered from
    Warn,
    /// An operation failed
    Error,
    /// The library cannot continue
    Fatal,
}

impl LogLevel {
    /// All levels in ascending order.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Upper-case name of the level.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translation table from facade levels to a framework's native levels.
///
/// A framework with fewer native levels collapses adjacent facade levels onto
/// one native level. The table is indexed by [`LogLevel`] in ascending order.
///
/// # Example
///
/// ```
/// use logbridge::{LevelMap, LogLevel};
///
/// // A framework without a dedicated fatal level
/// let map = LevelMap::new([0u8, 1, 2, 3, 4, 4]);
/// assert_eq!(map.map(LogLevel::Fatal), map.map(LogLevel::Error));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelMap<N: Copy> {
    table: [N; 6],
}

impl<N: Copy> LevelMap<N> {
    /// Build a map from the native level for each facade level, `Trace` first.
    pub const fn new(table: [N; 6]) -> Self {
        Self { table }
    }

    /// Native level for a facade level.
    pub fn map(&self, level: LogLevel) -> N {
        self.table[level.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_all_is_sorted() {
        let mut sorted = LogLevel::ALL;
        sorted.sort();
        assert_eq!(sorted, LogLevel::ALL);
    }

    #[test]
    fn test_display() {
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(LogLevel::Fatal.to_string(), "FATAL");
    }

    #[test]
    fn test_level_map_preserves_order() {
        let map = LevelMap::new([1, 1, 2, 3, 4, 5]);
        let mapped: Vec<i32> = LogLevel::ALL.iter().map(|l| map.map(*l)).collect();
        assert!(mapped.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(map.map(LogLevel::Trace), map.map(LogLevel::Debug));
    }
}
