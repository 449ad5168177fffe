//! Panic guards for the exported functions.
//!
//! A panic must never unwind into the host, so every `extern "C"` entry point runs its body
//! through one of these helpers.

use crate::error::Result;

/// Extract a human-readable message from a panic payload.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "non-string panic payload".to_string()
}

/// Run `f` and turn its result into the boundary's success flag.
///
/// Errors and panics are logged and reported as `false`.
pub(crate) fn guard_bool(op: &'static str, f: impl FnOnce() -> Result<()>) -> bool {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::error!("{} failed: {}", op, e);
            false
        }
        Err(payload) => {
            log::error!("panic in ffi `{}`: {}", op, panic_message(payload));
            false
        }
    }
}

/// Run `f`, logging a panic instead of propagating it.
pub(crate) fn guard_void(op: &'static str, f: impl FnOnce()) {
    if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        log::error!("panic in ffi `{}`: {}", op, panic_message(payload));
    }
}

/// Run `f`, returning `default` if it panics.
pub(crate) fn guard_with_default<T>(op: &'static str, default: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            log::error!("panic in ffi `{}`: {}", op, panic_message(payload));
            default
        }
    }
}
