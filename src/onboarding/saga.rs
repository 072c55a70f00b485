//! Step composition with compensation.
//!
//! A step that leaves earlier work dangling when it fails gets an undo
//! action attached with [`with_compensation`]; the undo runs at most once
//! and only when the step failed.

use std::future::Future;

use crate::backend::BackendError;

#[derive(Debug)]
pub enum CleanupOutcome {
    Succeeded,
    Failed(BackendError),
}

impl CleanupOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, CleanupOutcome::Succeeded)
    }
}

/// A failed step together with the result of undoing its predecessors
#[derive(Debug)]
pub struct Compensated<E> {
    pub cause: E,
    pub cleanup: CleanupOutcome,
}

/// Run `step`; if it fails, run `undo` once and report both results.
pub async fn with_compensation<T, E, S, U, F>(step: S, undo: U) -> Result<T, Compensated<E>>
where
    S: Future<Output = Result<T, E>>,
    U: FnOnce() -> F,
    F: Future<Output = Result<(), BackendError>>,
{
    match step.await {
        Ok(value) => Ok(value),
        Err(cause) => {
            let cleanup = match undo().await {
                Ok(()) => CleanupOutcome::Succeeded,
                Err(err) => CleanupOutcome::Failed(err),
            };
            Err(Compensated { cause, cleanup })
        }
    }
}
