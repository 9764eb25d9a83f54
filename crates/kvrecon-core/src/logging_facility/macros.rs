//! Boundary logging macros
//!
//! Every public operation logs exactly one `start` and then either one `end`
//! or one `end_error`. All three share `component`, `op` and `event`; extra
//! fields are passed through to `tracing` unchanged, so `%` and `?` sigils
//! work as usual.

#[doc(hidden)]
#[macro_export]
macro_rules! __op_event {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        tracing::event!(
            tracing::Level::$level,
            component = module_path!(),
            op = $op,
            event = $crate::kvrecon_core_types::schema::event::$event,
            $($($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use kvrecon_core::log_op_start;
/// log_op_start!("changes");
/// log_op_start!("changes", format = "yaml", key = "a/b");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(INFO, $op, START $(, $($field)*)?)
    };
}

/// Log the successful end of an operation; `duration_ms` is required
///
/// ```
/// # use kvrecon_core::log_op_end;
/// log_op_end!("push", duration_ms = 3, applied_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(INFO, $op, END, duration_ms = $duration $(, $($field)*)?)
    };
}

/// Log a failed operation
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError).
/// The event carries its kind, stable code and message, plus its request id
/// when one was attached.
///
/// ```
/// # use kvrecon_core::log_op_error;
/// # use kvrecon_core::errors::ReconcileError;
/// let err = ReconcileError::UnsupportedFormat { format: "ini".to_string() };
/// log_op_error!("changes", err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = ::core::convert::Into::into($err);
        $crate::__op_event!(
            ERROR,
            $op,
            END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            message = ex_err.message(),
            key = ex_err.key(),
            request_id = ex_err.request_id().map(tracing::field::display)
            $(, $($field)*)?
        )
    }};
}
