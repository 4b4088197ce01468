//! Correlation identifier threaded through every user directory call.
//!
//! The trace middleware assigns one per request; handlers pass it explicitly
//! to the directory, which records it on each log line. Error bodies and the
//! `trace-id` response header repeat it so clients can quote it back.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Header carrying the trace identifier on requests and responses.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Per-request trace identifier.
///
/// # Examples
/// ```
/// use apid::domain::TraceId;
///
/// let inbound = TraceId::from_header(" 6f1c1f0e-8f7a-4c55-9e0b-1c2d3e4f5a6b ");
/// assert!(inbound.is_some());
/// assert!(TraceId::from_header("req-42").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier for a request that arrived without one.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Accept a caller-supplied header value when it holds a UUID.
    pub fn from_header(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn generated_ids_are_distinct_v4_uuids() {
        let first = TraceId::generate();
        assert_eq!(first.as_uuid().get_version_num(), 4);
        assert_ne!(first, TraceId::generate());
    }

    #[rstest]
    fn display_is_hyphenated_lowercase() {
        let uuid = Uuid::parse_str("6F1C1F0E-8F7A-4C55-9E0B-1C2D3E4F5A6B").expect("uuid");
        assert_eq!(
            TraceId::from_uuid(uuid).to_string(),
            "6f1c1f0e-8f7a-4c55-9e0b-1c2d3e4f5a6b"
        );
    }

    #[rstest]
    #[case("6f1c1f0e-8f7a-4c55-9e0b-1c2d3e4f5a6b", true)]
    #[case("  6f1c1f0e-8f7a-4c55-9e0b-1c2d3e4f5a6b\t", true)]
    #[case("", false)]
    #[case("req-42", false)]
    fn header_values_must_hold_a_uuid(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(TraceId::from_header(raw).is_some(), accepted);
    }
}
