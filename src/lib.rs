pub mod config;
pub mod detection;
pub mod engine;
pub mod input;
pub mod models;
pub mod report;

// Re-export commonly used types
pub use config::Config;
pub use detection::{classify_tcp_flags, ScanVerdict, SignatureMatch, SignatureScanner};
pub use engine::{run_live, run_replay, Inspector};
pub use input::{AccessLogParser, LogRecord, PacketSource, PcapPacketSource};
pub use models::{Incident, Packet, ProtocolKind, TcpFlags};
pub use report::IncidentReporter;
