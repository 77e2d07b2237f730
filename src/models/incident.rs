//! Reported detection events

use serde::Serialize;

/// One reported detection event
///
/// Created by the incident reporter when a detector fires; immutable
/// afterwards. Incidents are rendered and forgotten, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct Incident {
    /// Strictly increasing ordinal, starting at 1 for each run
    pub ordinal: u64,
    pub kind: String,
    pub source: String,
    pub protocol: String,
    /// Packet payload (hex-rendered) or the matched text
    pub payload: String,
}
