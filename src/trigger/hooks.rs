use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use super::pin::PinEvent;

/// Side effect run when a pin is entered or left.
///
/// Hooks run synchronously inside the frame tick. Work that must outlive the call has to be
/// spawned by the hook itself.
pub type Hook = Box<dyn FnMut(&PinEvent) -> anyhow::Result<()>>;

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Run a pin hook, logging a returned error or a panic. Returns whether it succeeded.
pub(crate) fn fire(label: &'static str, hook: &mut Hook, event: &PinEvent) -> bool {
    match catch_unwind(AssertUnwindSafe(|| hook(event))) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::warn!(
                hook = label,
                id = event.id.0,
                error = %format!("{err:#}"),
                "pin hook failed"
            );
            false
        }
        Err(payload) => {
            tracing::error!(
                hook = label,
                id = event.id.0,
                panic = panic_message(payload.as_ref()),
                "pin hook panicked"
            );
            false
        }
    }
}

/// Run a user callback, logging a panic instead of unwinding into the frame loop.
pub(crate) fn isolate(label: &'static str, f: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            tracing::error!(
                callback = label,
                panic = panic_message(payload.as_ref()),
                "callback panicked"
            );
            false
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/hooks.rs"]
mod tests;
