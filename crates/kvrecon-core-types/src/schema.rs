//! Names shared by the logging macros, the test capture layer and anything
//! that consumes the JSON log stream.

/// Structured field keys
pub mod field {
    pub const COMPONENT: &str = "component";
    pub const OP: &str = "op";
    pub const EVENT: &str = "event";
    pub const DURATION_MS: &str = "duration_ms";
    pub const REQUEST_ID: &str = "request_id";

    pub const KEY: &str = "key";
    pub const FORMAT: &str = "format";
    pub const ACTION: &str = "action";

    pub const PAIR_COUNT: &str = "pair_count";
    pub const CHANGE_COUNT: &str = "change_count";
    pub const APPLIED_COUNT: &str = "applied_count";

    pub const ERR_KIND: &str = "err_kind";
    pub const ERR_CODE: &str = "err_code";
    pub const MESSAGE: &str = "message";
}

/// Values of the `event` field around an operation
pub mod event {
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const END_ERROR: &str = "end_error";

    /// Every boundary event, in lifecycle order
    pub const ALL: [&str; 3] = [START, END, END_ERROR];
}
