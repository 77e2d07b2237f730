//! Ingestion drivers
//!
//! The `Inspector` wires the scan classifier, the signature scanners, the
//! access-log parser and the incident reporter into one sequential path.
//! Two drivers feed it: `run_live` pulls packets from a capture source,
//! `run_replay` walks a finite log. One unit is fully classified and
//! reported before the next is consumed.

use std::error::Error;
use std::io::BufRead;

use crate::detection::{classify_tcp_flags, SignatureScanner};
use crate::input::{AccessLogParser, PacketSource};
use crate::models::{Packet, ProtocolKind};
use crate::report::{render_payload_hex, IncidentReporter};

/// Sequential traffic inspector
pub struct Inspector {
    packet_rules: SignatureScanner,
    log_rules: SignatureScanner,
    log_parser: AccessLogParser,
    reporter: IncidentReporter,
}

impl Inspector {
    /// Build an inspector around the given reporter
    pub fn new(reporter: IncidentReporter) -> Result<Self, regex::Error> {
        Ok(Inspector {
            packet_rules: SignatureScanner::packet_rules()?,
            log_rules: SignatureScanner::log_field_rules()?,
            log_parser: AccessLogParser::new()?,
            reporter,
        })
    }

    /// Classify one packet and report any detection
    ///
    /// TCP packets go through scan classification first; only when the
    /// verdict is `None` does the payload reach the signature rules.
    /// Other protocol kinds are noted by kind alone, scan detection for
    /// them is deliberately not performed.
    pub fn process_packet(&mut self, packet: &Packet) -> Result<(), Box<dyn Error>> {
        match packet.kind {
            ProtocolKind::Tcp => {
                let flags = match packet.tcp_flags {
                    Some(flags) => flags,
                    None => {
                        log::debug!("TCP packet without a flag set, skipping detection");
                        return Ok(());
                    }
                };

                let source = packet
                    .source
                    .map(|ip| ip.to_string())
                    .unwrap_or_else(|| "unknown".to_string());

                match classify_tcp_flags(&flags).label() {
                    Some(label) => {
                        self.reporter.report(
                            label,
                            &source,
                            "TCP",
                            &render_payload_hex(&packet.payload),
                        )?;
                    }
                    None => {
                        if let Some(hit) = self.packet_rules.scan(&packet.payload) {
                            self.reporter.report(
                                hit.label,
                                &source,
                                "HTTP",
                                &render_payload_hex(&packet.payload),
                            )?;
                        }
                    }
                }
            }
            other => {
                log::debug!("{} packet observed, no detection", other);
            }
        }
        Ok(())
    }

    /// Parse one access-log line and scan every captured field
    ///
    /// Nonconforming lines are skipped silently. Each field is scanned
    /// independently, so one line can produce several incidents; the
    /// client field is the source for all of them.
    pub fn process_line(&mut self, line: &str) -> Result<(), Box<dyn Error>> {
        let record = match self.log_parser.parse(line) {
            Some(record) => record,
            None => {
                log::debug!("skipping nonconforming log line");
                return Ok(());
            }
        };

        log::debug!(
            "record from {} ({})",
            record.client,
            record
                .timestamp()
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_else(|| "unparsed timestamp".to_string())
        );

        for field in record.fields() {
            if let Some(hit) = self.log_rules.scan(field.as_bytes()) {
                self.reporter
                    .report(hit.label, &record.client, "HTTP", &hit.text)?;
            }
        }
        Ok(())
    }

    /// Incidents reported so far
    pub fn incident_count(&self) -> u64 {
        self.reporter.incident_count()
    }
}

/// Live Mode: consume packets until the source closes
///
/// Blocks on the source between packets; the loop ends when the source
/// reports `None` (closed externally) and propagates source failures.
pub fn run_live<S: PacketSource>(
    source: &mut S,
    inspector: &mut Inspector,
) -> Result<(), Box<dyn Error>> {
    while let Some(packet) = source.next_packet()? {
        inspector.process_packet(&packet)?;
    }
    log::info!(
        "Capture source closed, {} incident(s) reported",
        inspector.incident_count()
    );
    Ok(())
}

/// Replay Mode: consume log lines until the source is exhausted
pub fn run_replay<R: BufRead>(reader: R, inspector: &mut Inspector) -> Result<(), Box<dyn Error>> {
    for line in reader.lines() {
        inspector.process_line(&line?)?;
    }
    log::info!(
        "Replay finished, {} incident(s) reported",
        inspector.incident_count()
    );
    Ok(())
}
