//! Output formatting for CLI.

mod json;
mod notifier;
mod progress;

pub use json::{Dimensions, Report};
pub use notifier::StderrNotifier;
pub use progress::Spinner;
