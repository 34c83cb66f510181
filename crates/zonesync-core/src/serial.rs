//! Zone serial generation
//!
//! Produces date-based serials of the form `YYYYMMDDcc`, where `cc` is a
//! two-digit same-day counter. The counter lives in process memory only:
//! a restart immediately after a same-day update can repeat or lower the
//! next serial. Same-day updates past 99 are not guarded against either.
//! Both are accepted limitations.

use chrono::NaiveDate;

/// Mutable serial state, owned by the orchestrator and mutated under a
/// critical section. Two concurrent requests must never observe the
/// same serial for the same day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialState {
    date: Option<NaiveDate>,
    counter: u32,
}

/// A generated zone serial
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Serial(u64);

impl Serial {
    /// Numeric value as embedded in the zone file
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SerialState {
    /// Create fresh state; the first serial taken on any day is `..00`
    pub fn new() -> Self {
        Self {
            date: None,
            counter: 0,
        }
    }

    /// Take the next serial for `today`.
    ///
    /// Same date: the counter increments. New date: the counter resets
    /// to zero. Every call consumes a tick, whether or not the caller
    /// goes on to publish a zone file.
    pub fn next(&mut self, today: NaiveDate) -> Serial {
        match self.date {
            Some(date) if date == today => {
                self.counter += 1;
            }
            _ => {
                self.date = Some(today);
                self.counter = 0;
            }
        }

        let date_part: u64 = today
            .format("%Y%m%d")
            .to_string()
            .parse()
            .unwrap_or_default();
        Serial(date_part * 100 + u64::from(self.counter))
    }
}

impl Default for SerialState {
    fn default() -> Self {
        Self::new()
    }
}
