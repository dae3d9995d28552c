//! Domain-aware logging macros.
//!
//! Each macro injects a `domain` field so callers never spell the string
//! literal. Domains in use: `parse`, `eval`, `ffi`, `sys`.
//!
//! ```ignore
//! rx_debug!(parse, len = source.len(), "expression parsed");
//! rx_warn!(ffi, code = 2004, "configuration rejected");
//! ```
//!
//! The domain is a bare identifier, converted to a `&str` by the macro.
//! Exported so the boundary crate logs under the same field layout.

/// Internal helper. Use `rx_error!` … `rx_trace!`.
#[doc(hidden)]
#[macro_export]
macro_rules! rx_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        ::tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

#[macro_export]
macro_rules! rx_error {
    ($domain:ident, $($rest:tt)*) => {
        $crate::rx_log!(error, $domain, $($rest)*)
    };
}

#[macro_export]
macro_rules! rx_warn {
    ($domain:ident, $($rest:tt)*) => {
        $crate::rx_log!(warn, $domain, $($rest)*)
    };
}

#[macro_export]
macro_rules! rx_info {
    ($domain:ident, $($rest:tt)*) => {
        $crate::rx_log!(info, $domain, $($rest)*)
    };
}

/// ```ignore
/// rx_debug!(eval, result = %rendered, "expression evaluated");
/// ```
#[macro_export]
macro_rules! rx_debug {
    ($domain:ident, $($rest:tt)*) => {
        $crate::rx_log!(debug, $domain, $($rest)*)
    };
}

#[macro_export]
macro_rules! rx_trace {
    ($domain:ident, $($rest:tt)*) => {
        $crate::rx_log!(trace, $domain, $($rest)*)
    };
}
