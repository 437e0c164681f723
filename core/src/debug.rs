//! Diagnostic side channel for response tracing.
//!
//! A [`DebugSink`] receives one formatted line per response body read by the
//! client. It is invoked synchronously on the calling thread; sinks shared
//! across threads must be `Send + Sync` and do their own serialization.
//!
//! A sink that panics is isolated: the panic is caught, reported through
//! `tracing::warn!`, and the call carries on with its own result.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

#[derive(Clone)]
pub struct DebugSink(Arc<dyn Fn(&str) + Send + Sync>);

impl DebugSink {
    pub fn new(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Sink that forwards every line to `tracing::debug!`.
    pub fn tracing() -> Self {
        Self::new(|msg| tracing::debug!(target: "telegram_core::api", "{msg}"))
    }

    pub(crate) fn emit(&self, msg: &str) {
        if catch_unwind(AssertUnwindSafe(|| (self.0)(msg))).is_err() {
            tracing::warn!("debug sink panicked; ignoring");
        }
    }
}

impl Default for DebugSink {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DebugSink(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn emit_forwards_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            DebugSink::new(move |msg| seen.lock().unwrap().push(msg.to_string()))
        };
        sink.emit("one");
        sink.emit("two");
        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn emit_swallows_panics() {
        let sink = DebugSink::new(|_| panic!("sink exploded"));
        sink.emit("anything");
    }
}
