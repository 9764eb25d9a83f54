//! Structured logging
//!
//! - [`init`] / [`init_from_env`]: install the global subscriber once
//! - `log_op_start!`, `log_op_end!`, `log_op_error!`: boundary events
//! - [`test_capture`]: record events in memory for assertions
//!
//! ```rust
//! use kvrecon_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Only [`crate::reconciler::Reconciler`] emits boundary events. Flattening,
//! diffing and applying log at `debug` level without `op`/`event` fields.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, init_from_env, Profile, PROFILE_ENV};
pub use test_capture::{init_test_capture, CaptureLayer, CapturedEvent, TestCapture};
