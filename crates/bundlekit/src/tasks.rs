//! Attaching bundler work to the host application's asset task.

/// Name of the host task that compiles assets for deployment.
pub const PRECOMPILE_TASK: &str = "assets:precompile";

/// A task runner owned by the embedding application.
pub trait TaskHost {
    fn is_defined(&self, task: &str) -> bool;

    /// Append `actions` to `task`, to run after its own work.
    fn enhance(&mut self, task: &str, actions: &[String]);
}

/// Append `actions` to [`PRECOMPILE_TASK`] when the host defines it.
/// Returns whether the task was enhanced.
pub fn enhance_precompile(host: &mut dyn TaskHost, actions: &[String]) -> bool {
    if !host.is_defined(PRECOMPILE_TASK) {
        tracing::debug!("{PRECOMPILE_TASK} is not defined; nothing to enhance");
        return false;
    }
    host.enhance(PRECOMPILE_TASK, actions);
    tracing::debug!(actions = ?actions, "enhanced {PRECOMPILE_TASK}");
    true
}
