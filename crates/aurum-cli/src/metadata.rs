use std::fmt::{Display, Formatter};

use aurum_core::ProviderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request identifier (UUID v4) for correlating output with stderr logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Envelope metadata. Field order is fixed to keep JSON output stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub request_id: RequestId,
    pub source: ProviderId,
    /// Sub-ranges fetched (or planned) for the command.
    pub chunks: usize,
    pub latency_ms: u64,
}

impl Metadata {
    pub fn new(request_id: RequestId, source: ProviderId, chunks: usize, latency_ms: u64) -> Self {
        Self {
            request_id,
            source,
            chunks,
            latency_ms,
        }
    }
}
