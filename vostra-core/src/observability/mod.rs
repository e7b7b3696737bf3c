pub mod logging;
pub mod trace_context;

pub use logging::{init_tracing, TelemetryError};
pub use trace_context::{
    extract_request_id, extract_traceparent, inject_trace_context, trace_headers,
    REQUEST_ID_HEADER, TRACEPARENT_HEADER, TRACESTATE_HEADER,
};
