use std::ffi::{CString, c_char};
use std::ptr;

use orion_error::ErrorCode;

use crate::error::FfiReason;

/// Caller-owned error record, filled in when a call fails.
///
/// `code` is 0 after a successful call. `position` is the byte offset into
/// the expression source for lex and parse failures, -1 otherwise. `message`
/// is owned by the caller once set and must be released with
/// [`expression_error_free`] before the record is reused.
#[repr(C)]
#[derive(Debug)]
pub struct ExpressionError {
    pub code: i32,
    pub position: i64,
    pub message: *mut c_char,
}

impl ExpressionError {
    pub const fn empty() -> Self {
        Self {
            code: 0,
            position: -1,
            message: ptr::null_mut(),
        }
    }
}

impl Default for ExpressionError {
    fn default() -> Self {
        Self::empty()
    }
}

/// Mark `err` as success. The message pointer is overwritten, not freed.
///
/// # Safety
/// `err` is NULL or points to a writable `ExpressionError`.
pub(crate) unsafe fn clear(err: *mut ExpressionError) {
    if let Some(err) = unsafe { err.as_mut() } {
        *err = ExpressionError::empty();
    }
}

/// # Safety
/// `err` is NULL or points to a writable `ExpressionError`.
pub(crate) unsafe fn fill(err: *mut ExpressionError, reason: &FfiReason) {
    let Some(err) = (unsafe { err.as_mut() }) else {
        return;
    };
    err.code = reason.error_code();
    err.position = reason.position().map_or(-1, |p| p as i64);
    err.message = CString::new(reason.to_string().replace('\0', "\\0"))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut());
}

/// Release the message held by `err` and reset the record.
///
/// # Safety
/// `err` is NULL or points to an `ExpressionError` whose `message` is NULL
/// or was set by this library and not yet released.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expression_error_free(err: *mut ExpressionError) {
    let Some(err) = (unsafe { err.as_mut() }) else {
        return;
    };
    if !err.message.is_null() {
        drop(unsafe { CString::from_raw(err.message) });
    }
    *err = ExpressionError::empty();
}
