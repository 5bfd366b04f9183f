use std::collections::VecDeque;

/// Lines kept by [`LogBuffer`] before the oldest are dropped.
pub const LOG_CAPACITY: usize = 500;

/// Destination for human-readable match log lines.
pub trait LogSink {
    /// Records a single line.
    fn log(&mut self, line: &str);
}

impl<F> LogSink for F
where
    F: FnMut(&str),
{
    fn log(&mut self, line: &str) {
        self(line);
    }
}

/// Bounded in-memory log that keeps the most recent lines.
#[derive(Clone, Debug)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    /// Creates a buffer holding up to [`LOG_CAPACITY`] lines.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    /// Creates a buffer holding up to `capacity` lines.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(LOG_CAPACITY)),
            capacity,
        }
    }

    /// Lines currently retained, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Number of retained lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Reports whether nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Discards every retained line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for LogBuffer {
    fn log(&mut self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            let _ = self.lines.pop_front();
        }
        self.lines.push_back(line.to_owned());
    }
}
