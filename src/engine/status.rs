//! Ambient debug-mode detection.

/// Decides whether bundles without a forced mode render in debug mode.
pub trait DebugStatus: Send + Sync {
    fn is_debugging_enabled(&self) -> bool;
}

/// A fixed answer, set at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDebugStatus(pub bool);

impl DebugStatus for FixedDebugStatus {
    fn is_debugging_enabled(&self) -> bool {
        self.0
    }
}

/// Reads an environment variable on every render.
///
/// `1`, `true`, `yes` and `on` (any case) enable debug mode.
#[derive(Debug, Clone)]
pub struct EnvDebugStatus {
    var: String,
}

impl EnvDebugStatus {
    pub const DEFAULT_VAR: &'static str = "PACKTAG_DEBUG";

    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvDebugStatus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl DebugStatus for EnvDebugStatus {
    fn is_debugging_enabled(&self) -> bool {
        std::env::var(&self.var).is_ok_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }
}
