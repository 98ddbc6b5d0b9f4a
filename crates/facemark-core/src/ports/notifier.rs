//! User-facing failure notification port.

/// Port for surfacing messages to the user before a run terminates.
pub trait Notifier: Send + Sync {
    /// Shows `message` to the user.
    fn notify(&self, message: &str);
}
