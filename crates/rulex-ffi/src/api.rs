use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::ptr;
use std::sync::Mutex;

use orion_error::ErrorCode;
use rulex_config::EngineConfig;
use rulex_core::{Engine, rx_debug, rx_error, rx_info, rx_warn};
use rulex_lang::ast::Expression;
use tracing_appender::non_blocking::WorkerGuard;

use crate::error::FfiReason;
use crate::record::{self, ExpressionError};
use crate::tracing_init::init_tracing;

/// Keeps the non-blocking file writer alive for the life of the process.
static LOG_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

// ---------------------------------------------------------------------------
// Boundary helpers
// ---------------------------------------------------------------------------

/// Run `f` with panics contained, reporting failure through `err`.
///
/// # Safety
/// `err` is NULL or points to a writable `ExpressionError`.
unsafe fn guarded<T>(
    call: &'static str,
    err: *mut ExpressionError,
    on_error: T,
    f: impl FnOnce() -> Result<T, FfiReason>,
) -> T {
    let outcome = panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or(Err(FfiReason::Panic));
    match outcome {
        Ok(value) => {
            unsafe { record::clear(err) };
            value
        }
        Err(reason) => {
            match &reason {
                FfiReason::Panic => {
                    rx_error!(ffi, call, code = reason.error_code(), "panic contained at boundary");
                }
                FfiReason::InvalidOutput | FfiReason::Config(_) | FfiReason::Logging(_) => {
                    rx_warn!(ffi, call, code = reason.error_code(), error = %reason, "call rejected");
                }
                _ => {
                    rx_debug!(ffi, call, code = reason.error_code(), error = %reason, "call failed");
                }
            }
            unsafe { record::fill(err, &reason) };
            on_error
        }
    }
}

/// # Safety
/// `ptr` is NULL or a NUL-terminated string valid for the duration of the call.
unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, FfiReason> {
    if ptr.is_null() {
        return Err(FfiReason::InvalidInput(format!("{what} is NULL")));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiReason::InvalidInput(format!("{what} is not valid UTF-8")))
}

/// # Safety
/// `ptr` is NULL or a live pointer produced by this library.
unsafe fn borrow<'a, T>(ptr: *const T, what: &str) -> Result<&'a T, FfiReason> {
    unsafe { ptr.as_ref() }.ok_or_else(|| FfiReason::InvalidInput(format!("{what} is NULL")))
}

/// # Safety
/// `ptr` is NULL (defaults) or a NUL-terminated TOML document.
unsafe fn read_config(ptr: *const c_char) -> Result<EngineConfig, FfiReason> {
    if ptr.is_null() {
        return Ok(EngineConfig::default());
    }
    unsafe { read_str(ptr, "config") }?
        .parse::<EngineConfig>()
        .map_err(|e| FfiReason::Config(format!("{e:#}")))
}

fn into_c_string(text: String) -> Result<*mut c_char, FfiReason> {
    CString::new(text)
        .map(CString::into_raw)
        .map_err(|_| FfiReason::InvalidOutput)
}

fn parse_with(engine: &Engine, input: &str) -> Result<*mut Expression, FfiReason> {
    let expr = engine.try_parse(input)?;
    Ok(Box::into_raw(Box::new(expr)))
}

fn evaluate_with(engine: &Engine, expr: &Expression, event: &str) -> Result<*mut c_char, FfiReason> {
    let rendered = engine.try_evaluate(expr, event)?;
    into_c_string(rendered)
}

// ---------------------------------------------------------------------------
// Default-limit calls
// ---------------------------------------------------------------------------

/// Parse `input` into a reusable expression handle.
///
/// Returns NULL on failure and fills `err` when it is not NULL.
///
/// # Safety
/// `input` is NULL or a NUL-terminated string; `err` is NULL or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_parse(
    input: *const c_char,
    err: *mut ExpressionError,
) -> *mut Expression {
    unsafe {
        guarded("expression_parse", err, ptr::null_mut(), || {
            let input = read_str(input, "input")?;
            parse_with(&Engine::default(), input)
        })
    }
}

/// Evaluate a parsed expression against a JSON object event.
///
/// The returned string is owned by the caller; release it with
/// [`free_evaluate`].
///
/// # Safety
/// `expr` is NULL or a live handle from `expression_parse`; `event` is NULL
/// or a NUL-terminated string; `err` is NULL or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_evaluate(
    expr: *const Expression,
    event: *const c_char,
    err: *mut ExpressionError,
) -> *mut c_char {
    unsafe {
        guarded("expression_evaluate", err, ptr::null_mut(), || {
            let expr = borrow(expr, "expression")?;
            let event = read_str(event, "event")?;
            evaluate_with(&Engine::default(), expr, event)
        })
    }
}

/// Release an expression handle. NULL is ignored.
///
/// # Safety
/// `expr` is NULL or a handle from this library not yet released.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_free(expr: *mut Expression) {
    if !expr.is_null() {
        drop(unsafe { Box::from_raw(expr) });
    }
}

/// Release a result string. NULL is ignored.
///
/// # Safety
/// `ptr` is NULL or a string returned by this library not yet released.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_evaluate(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Parse and evaluate in one call. Returns NULL on any failure.
///
/// # Safety
/// `input` and `event` are NULL or NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn evaluate(input: *const c_char, event: *const c_char) -> *mut c_char {
    unsafe {
        guarded("evaluate", ptr::null_mut(), ptr::null_mut(), || {
            let input = read_str(input, "input")?;
            let event = read_str(event, "event")?;
            let engine = Engine::default();
            let expr = engine.try_parse(input)?;
            evaluate_with(&engine, &expr, event)
        })
    }
}

// ---------------------------------------------------------------------------
// Configured engine
// ---------------------------------------------------------------------------

/// Create an engine from a TOML configuration; NULL `config_toml` uses the
/// defaults.
///
/// # Safety
/// `config_toml` is NULL or a NUL-terminated string; `err` is NULL or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_engine_new(
    config_toml: *const c_char,
    err: *mut ExpressionError,
) -> *mut Engine {
    unsafe {
        guarded("expression_engine_new", err, ptr::null_mut(), || {
            let config = read_config(config_toml)?;
            Ok(Box::into_raw(Box::new(Engine::new(&config))))
        })
    }
}

/// Release an engine. Expressions it produced stay valid.
///
/// # Safety
/// `engine` is NULL or a handle from `expression_engine_new` not yet released.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_engine_free(engine: *mut Engine) {
    if !engine.is_null() {
        drop(unsafe { Box::from_raw(engine) });
    }
}

/// Like [`expression_parse`], under the engine's limits.
///
/// # Safety
/// `engine` is a live engine handle; otherwise as [`expression_parse`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_engine_parse(
    engine: *const Engine,
    input: *const c_char,
    err: *mut ExpressionError,
) -> *mut Expression {
    unsafe {
        guarded("expression_engine_parse", err, ptr::null_mut(), || {
            let engine = borrow(engine, "engine")?;
            let input = read_str(input, "input")?;
            parse_with(engine, input)
        })
    }
}

/// Like [`expression_evaluate`], through a configured engine.
///
/// # Safety
/// `engine` is a live engine handle; otherwise as [`expression_evaluate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_engine_evaluate(
    engine: *const Engine,
    expr: *const Expression,
    event: *const c_char,
    err: *mut ExpressionError,
) -> *mut c_char {
    unsafe {
        guarded("expression_engine_evaluate", err, ptr::null_mut(), || {
            let engine = borrow(engine, "engine")?;
            let expr = borrow(expr, "expression")?;
            let event = read_str(event, "event")?;
            evaluate_with(engine, expr, event)
        })
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install the process-wide tracing subscriber from the `[logging]` section
/// of `config_toml` (NULL: defaults). Relative log file paths resolve
/// against the working directory.
///
/// Returns 0 on success, otherwise the error code (2004 bad configuration,
/// 2005 subscriber already installed or log file unusable).
///
/// # Safety
/// `config_toml` is NULL or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_init_logging(config_toml: *const c_char) -> i32 {
    let mut err = ExpressionError::empty();
    unsafe {
        guarded("expression_init_logging", &mut err, (), || {
            let config = read_config(config_toml)?;
            let guard = init_tracing(&config.logging, Path::new("."))
                .map_err(|e| FfiReason::Logging(format!("{e:#}")))?;
            if let Ok(mut slot) = LOG_GUARD.lock() {
                *slot = guard;
            }
            rx_info!(sys, level = %config.logging.level, "logging initialised");
            Ok(())
        });
    }
    let code = err.code;
    unsafe { record::expression_error_free(&mut err) };
    code
}
