//! Configuration for the lifecycle manager.

/// Configuration for the lifecycle manager.
///
/// Controls how invalid transitions surface and whether transitions are
/// traced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Panic on an invalid transition instead of returning the error.
    ///
    /// Defaults to on in debug builds, where a wrong-stage call is a caller
    /// bug that should stop the program.
    pub strict: bool,

    /// Emit a `trace` event for every stage change.
    pub trace_transitions: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            strict: cfg!(debug_assertions),
            trace_transitions: true,
        }
    }
}

impl LifecycleConfig {
    /// Creates a configuration that panics on invalid transitions.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Creates a configuration that returns invalid transitions as errors.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Builder method to set strictness.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builder method to enable/disable transition tracing.
    #[must_use]
    pub fn with_trace_transitions(mut self, trace: bool) -> Self {
        self.trace_transitions = trace;
        self
    }
}
