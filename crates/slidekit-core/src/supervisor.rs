//! Fallback supervisor for render/update cycles.
//!
//! A [`Supervisor`] wraps a fallible cycle (typically "render the slide into
//! my surface"). When the cycle returns an error, or panics, the supervisor
//! logs the failure, hands it to the `on_error` collaborator and returns the
//! fallback output instead. The owning view keeps running and may call
//! [`Supervisor::retry`] later.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

/// What went wrong inside a supervised cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisedFailure {
    /// Name of the supervised component.
    pub component: String,
    /// Error message or panic payload.
    pub message: String,
    /// True when the cycle panicked rather than returning an error.
    pub panicked: bool,
    pub at: DateTime<Utc>,
}

/// Output of a supervised cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SupervisedOutput<T> {
    /// The cycle succeeded.
    Completed(T),
    /// The cycle failed and the fallback was used.
    Fallback(T),
}

impl<T> SupervisedOutput<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SupervisedOutput::Fallback(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            SupervisedOutput::Completed(v) | SupervisedOutput::Fallback(v) => v,
        }
    }
}

type ErrorCallback = Box<dyn FnMut(&SupervisedFailure)>;

/// Composable error boundary around a render/update cycle.
pub struct Supervisor<T> {
    component: String,
    fallback: Box<dyn Fn() -> T>,
    on_error: Option<ErrorCallback>,
    last_failure: Option<SupervisedFailure>,
    failure_count: u32,
}

impl<T> Supervisor<T> {
    pub fn new<F>(component: impl Into<String>, fallback: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self {
            component: component.into(),
            fallback: Box::new(fallback),
            on_error: None,
            last_failure: None,
            failure_count: 0,
        }
    }

    /// Installs the collaborator called with every captured failure.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&SupervisedFailure) + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Replaces the `on_error` collaborator on an existing supervisor.
    pub fn set_on_error<F>(&mut self, callback: F)
    where
        F: FnMut(&SupervisedFailure) + 'static,
    {
        self.on_error = Some(Box::new(callback));
    }

    /// Runs `cycle`, capturing both returned errors and panics.
    pub fn run<E, F>(&mut self, cycle: F) -> SupervisedOutput<T>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        match panic::catch_unwind(AssertUnwindSafe(cycle)) {
            Ok(Ok(value)) => {
                self.last_failure = None;
                SupervisedOutput::Completed(value)
            }
            Ok(Err(err)) => self.fail(err.to_string(), false),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.fail(message, true)
            }
        }
    }

    /// Clears the recorded failure and runs `cycle` again.
    pub fn retry<E, F>(&mut self, cycle: F) -> SupervisedOutput<T>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        tracing::debug!("{}: retrying after failure", self.component);
        self.last_failure = None;
        self.run(cycle)
    }

    pub fn has_failed(&self) -> bool {
        self.last_failure.is_some()
    }

    pub fn last_failure(&self) -> Option<&SupervisedFailure> {
        self.last_failure.as_ref()
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    fn fail(&mut self, message: String, panicked: bool) -> SupervisedOutput<T> {
        let failure = SupervisedFailure {
            component: self.component.clone(),
            message,
            panicked,
            at: Utc::now(),
        };
        tracing::error!(
            "{} failed{}: {}",
            failure.component,
            if panicked { " (panic)" } else { "" },
            failure.message
        );
        self.failure_count += 1;
        if let Some(callback) = self.on_error.as_mut() {
            callback(&failure);
        }
        self.last_failure = Some(failure);
        SupervisedOutput::Fallback((self.fallback)())
    }
}

impl<T> std::fmt::Debug for Supervisor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("component", &self.component)
            .field("failure_count", &self.failure_count)
            .field("last_failure", &self.last_failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_success_passes_through() {
        let mut sup = Supervisor::new("thumb", || 0u32);
        let out = sup.run(|| Ok::<_, String>(7));
        assert_eq!(out, SupervisedOutput::Completed(7));
        assert!(!sup.has_failed());
    }

    #[test]
    fn test_error_uses_fallback_and_reports() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let mut sup = Supervisor::new("canvas", || "fallback".to_string())
            .on_error(move |f| seen_clone.borrow_mut().push(f.message.clone()));

        let out = sup.run(|| Err::<String, _>("surface lost"));
        assert!(out.is_fallback());
        assert_eq!(out.into_inner(), "fallback");
        assert_eq!(seen.borrow().as_slice(), ["surface lost".to_string()]);
        assert_eq!(sup.failure_count(), 1);
    }

    #[test]
    fn test_panic_is_captured() {
        let mut sup = Supervisor::new("notes", || -1i32);
        let out = sup.run(|| -> Result<i32, String> { panic!("bad state") });
        assert_eq!(out, SupervisedOutput::Fallback(-1));
        let failure = sup.last_failure().cloned().expect("failure recorded");
        assert!(failure.panicked);
        assert_eq!(failure.message, "bad state");
    }

    #[test]
    fn test_retry_clears_failure() {
        let mut sup = Supervisor::new("canvas", || ());
        sup.run(|| Err::<(), _>("first"));
        assert!(sup.has_failed());
        let out = sup.retry(|| Ok::<_, String>(()));
        assert!(!out.is_fallback());
        assert!(!sup.has_failed());
    }
}
