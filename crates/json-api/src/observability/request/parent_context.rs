//! Incoming `traceparent` handling.
//!
//! Requests from an instrumented caller continue the caller's trace; anything
//! else starts a fresh root span.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::{HeaderMap, HeaderName};

pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| remote_parent(propagator, headers))
}

/// Extracts against an empty context so a missing header never adopts the
/// span that happens to be current in this process.
fn remote_parent<P>(propagator: &P, headers: &HeaderMap) -> Option<Context>
where
    P: TextMapPropagator + ?Sized,
{
    let context = propagator.extract_with_context(&Context::new(), &RequestHeaders(headers));
    let valid = context.span().span_context().is_valid();

    valid.then_some(context)
}

#[derive(Debug)]
struct RequestHeaders<'a>(&'a HeaderMap);

impl Extractor for RequestHeaders<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::header::HeaderValue;

    use super::*;

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn valid_traceparent_becomes_the_parent() {
        let mut headers = HeaderMap::new();
        headers.insert("traceparent", HeaderValue::from_static(TRACEPARENT));

        let parent = remote_parent(&TraceContextPropagator::new(), &headers);
        let trace_id = parent.map(|context| context.span().span_context().trace_id().to_string());

        assert_eq!(
            trace_id.as_deref(),
            Some("4bf92f3577b34da6a3ce929d0e0e4736")
        );
    }

    #[test]
    fn missing_or_garbled_header_starts_a_new_trace() {
        let propagator = TraceContextPropagator::new();
        let mut headers = HeaderMap::new();

        assert!(remote_parent(&propagator, &headers).is_none(), "no header");

        headers.insert("traceparent", HeaderValue::from_static("00-not-a-trace-01"));

        assert!(remote_parent(&propagator, &headers).is_none(), "garbled header");
    }
}
