//! Persistent and one-shot scope labels.

/// Tracks the scope applied to outgoing events.
///
/// Resolution order for a call is: explicit scope from the call's metadata,
/// then the transient scope, then the persistent scope. Every resolution
/// consumes the transient scope, even when the caller goes on to drop the
/// event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeTracker {
    persistent: Option<String>,
    transient: Option<String>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scope applied to all following calls.
    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.persistent = Some(scope.into());
    }

    pub fn clear_scope(&mut self) {
        self.persistent = None;
    }

    /// Set a scope for the next resolution only.
    pub fn with_scope(&mut self, scope: impl Into<String>) -> &mut Self {
        self.transient = Some(scope.into());
        self
    }

    pub fn persistent(&self) -> Option<&str> {
        self.persistent.as_deref()
    }

    /// Resolve the scope for one call and clear the transient scope.
    pub fn resolve(&mut self, explicit: Option<String>) -> Option<String> {
        let transient = self.transient.take();
        explicit.or(transient).or_else(|| self.persistent.clone())
    }
}
