//! Incident numbering and rendering
//!
//! The reporter owns the process-wide incident counter and the output
//! sink. Every detector funnels through `report`, which keeps the
//! ordinals strictly increasing regardless of incident kind.

use std::io::{self, Write};

use crate::models::Incident;

/// Renders incidents to the output sink with increasing ordinals
///
/// Holds the only mutable shared state in the process. Constructed once
/// per run; tests construct a fresh reporter per case.
pub struct IncidentReporter {
    next_ordinal: u64,
    /// None writes to stdout
    sink: Option<Box<dyn Write + Send>>,
}

impl IncidentReporter {
    /// Create a reporter writing to stdout
    pub fn new() -> Self {
        IncidentReporter {
            next_ordinal: 1,
            sink: None,
        }
    }

    /// Create a reporter writing to the given sink
    pub fn with_sink(sink: Box<dyn Write + Send>) -> Self {
        IncidentReporter {
            next_ordinal: 1,
            sink: Some(sink),
        }
    }

    /// Number, render and emit one incident
    ///
    /// Performs no validation of its inputs; callers supply well-formed
    /// strings. A sink failure is fatal to the caller.
    pub fn report(
        &mut self,
        kind: &str,
        source: &str,
        protocol: &str,
        payload: &str,
    ) -> io::Result<Incident> {
        let incident = Incident {
            ordinal: self.next_ordinal,
            kind: kind.to_string(),
            source: source.to_string(),
            protocol: protocol.to_string(),
            payload: payload.to_string(),
        };

        let line = format!(
            "{}. ALERT: {} is detected from {} ({}) ({})!\n",
            incident.ordinal, incident.kind, incident.source, incident.protocol, incident.payload
        );
        self.write_line(&line)?;

        if let Ok(json) = serde_json::to_string(&incident) {
            log::debug!("incident: {}", json);
        }

        self.next_ordinal += 1;
        Ok(incident)
    }

    /// Incidents reported so far
    pub fn incident_count(&self) -> u64 {
        self.next_ordinal - 1
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match &mut self.sink {
            Some(sink) => {
                sink.write_all(line.as_bytes())?;
                sink.flush()
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(line.as_bytes())?;
                handle.flush()
            }
        }
    }
}

impl Default for IncidentReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a packet payload as space-separated hex bytes
pub fn render_payload_hex(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|byte| format!("0x{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}
