//! Types shared by the kvrecon facilities
//!
//! - [`RequestId`]: correlation id attached to every public reconciler call
//! - [`schema`]: log field keys and boundary event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
