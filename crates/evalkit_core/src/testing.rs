//! Test utilities.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Level;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Log lines recorded by [`capture_logs`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    lines: Vec<String>,
}

impl CapturedLogs {
    /// Every recorded line, level included.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Messages recorded at exactly `level`, with the level stripped.
    #[must_use]
    pub fn at(&self, level: Level) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|line| line.trim_start().strip_prefix(level.as_str()))
            .map(|msg| msg.trim_start().to_string())
            .collect()
    }
}

/// Run `f` with a scoped subscriber that records every event on this thread.
///
/// ```rust
/// use evalkit_core::testing::capture_logs;
/// use tracing::Level;
///
/// let ((), logs) = capture_logs(|| tracing::warn!("careful"));
/// assert_eq!(logs.at(Level::WARN), vec!["careful".to_string()]);
/// ```
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
    let lines = text.lines().map(str::to_string).collect();
    (result, CapturedLogs { lines })
}
