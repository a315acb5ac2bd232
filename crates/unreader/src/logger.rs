// Logging compiles away entirely unless the `logger` feature is enabled. A
// library cannot rely on the caller's max level being set statically.

#[cfg(feature = "logger")]
pub(crate) use log::{debug, trace};

/// Returns true if the trace log level is enabled
#[cfg(feature = "logger")]
#[must_use]
pub(crate) fn trace_enabled() -> bool {
    log::log_enabled!(log::Level::Trace)
}

#[cfg(not(feature = "logger"))]
pub(crate) use noop_logger::{debug, trace, trace_enabled};

#[cfg(not(feature = "logger"))]
mod noop_logger {
    macro_rules! noop {
        ($($arg:tt)+) => {
            if $crate::logger::trace_enabled() {
                // Never taken. Keeps the arguments "used" so callers don't
                // trip unused-variable lints when logging is off.
                let _ = format!($($arg)+);
            }
        };
    }

    pub(crate) use noop as debug;
    pub(crate) use noop as trace;

    /// `trace_enabled` for a noop logger is always false
    #[inline]
    #[must_use]
    pub(crate) const fn trace_enabled() -> bool {
        false
    }
}
