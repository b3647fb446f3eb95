use std::fmt;

/// Releases one registration when disposed.
///
/// Disposal is explicit; dropping a `Disposer` without calling [`Disposer::dispose`] keeps the
/// registration alive.
#[must_use = "dropping a Disposer leaves its registration active"]
pub struct Disposer {
    release: Option<Box<dyn FnOnce()>>,
}

impl Disposer {
    /// Wrap a release action.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A disposer that releases nothing.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Run the release action. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Whether the release action has not run yet.
    pub fn is_armed(&self) -> bool {
        self.release.is_some()
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// Collects disposers and releases all of them on one [`Scope::teardown`].
#[derive(Debug, Default)]
pub struct Scope {
    disposers: Vec<Disposer>,
    torn_down: bool,
}

impl Scope {
    /// Empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a disposer. Adding to a torn-down scope disposes it immediately.
    pub fn add(&mut self, mut disposer: Disposer) {
        if self.torn_down {
            disposer.dispose();
        } else {
            self.disposers.push(disposer);
        }
    }

    /// Dispose everything, newest first.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        while let Some(mut d) = self.disposers.pop() {
            d.dispose();
        }
    }

    /// Number of disposers held.
    pub fn len(&self) -> usize {
        self.disposers.len()
    }

    /// Whether no disposers are held.
    pub fn is_empty(&self) -> bool {
        self.disposers.is_empty()
    }

    /// Whether [`Scope::teardown`] has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/scope.rs"]
mod tests;
