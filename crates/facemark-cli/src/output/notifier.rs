//! Notifier printing to stderr.

use facemark_core::Notifier;

/// Shows notifications as plain lines on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}
