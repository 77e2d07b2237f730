pub mod access_log;
pub mod capture;

pub use access_log::{AccessLogParser, LogRecord};
pub use capture::{CaptureError, PacketSource, PcapPacketSource};
