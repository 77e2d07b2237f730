//! Decoded packet model
//!
//! A `Packet` is one unit of observed traffic after header decoding.
//! Capture and decoding live behind the `input::capture` boundary; the
//! detection engine only ever sees this shape.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Protocol kind of a decoded packet
///
/// Closed set; everything the decoder cannot classify lands in `Other`
/// and is excluded from detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolKind {
    Ethernet,
    Ip,
    Tcp,
    Udp,
    Other,
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolKind::Ethernet => write!(f, "ETH"),
            ProtocolKind::Ip => write!(f, "IP"),
            ProtocolKind::Tcp => write!(f, "TCP"),
            ProtocolKind::Udp => write!(f, "UDP"),
            ProtocolKind::Other => write!(f, "OTHER"),
        }
    }
}

/// TCP header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TcpFlags {
    pub fin: bool,
    pub syn: bool,
    pub rst: bool,
    pub psh: bool,
    pub ack: bool,
    pub urg: bool,
    pub ece: bool,
    pub cwr: bool,
}

impl TcpFlags {
    /// Build from the flag byte of a TCP header (wire bit order)
    pub fn from_u8(flags: u8) -> Self {
        TcpFlags {
            fin: flags & 0x01 != 0,
            syn: flags & 0x02 != 0,
            rst: flags & 0x04 != 0,
            psh: flags & 0x08 != 0,
            ack: flags & 0x10 != 0,
            urg: flags & 0x20 != 0,
            ece: flags & 0x40 != 0,
            cwr: flags & 0x80 != 0,
        }
    }

    /// Number of flags currently set
    pub fn count_set(&self) -> usize {
        [
            self.fin, self.syn, self.rst, self.psh, self.ack, self.urg, self.ece, self.cwr,
        ]
        .iter()
        .filter(|&&set| set)
        .count()
    }
}

/// One decoded unit of traffic
///
/// Invariant: `tcp_flags` is `Some` only when `kind` is `Tcp`.
#[derive(Debug, Clone)]
pub struct Packet {
    pub kind: ProtocolKind,
    /// Source address, when the packet carries an IP layer
    pub source: Option<IpAddr>,
    pub tcp_flags: Option<TcpFlags>,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Build a TCP packet
    pub fn tcp(source: Option<IpAddr>, flags: TcpFlags, payload: Vec<u8>) -> Self {
        Packet {
            kind: ProtocolKind::Tcp,
            source,
            tcp_flags: Some(flags),
            payload,
        }
    }

    /// Build a non-TCP packet of the given kind (no flag set)
    pub fn non_tcp(kind: ProtocolKind, source: Option<IpAddr>, payload: Vec<u8>) -> Self {
        Packet {
            kind,
            source,
            tcp_flags: None,
            payload,
        }
    }

    /// Placeholder for frames the decoder could not classify
    pub fn undecoded() -> Self {
        Packet {
            kind: ProtocolKind::Other,
            source: None,
            tcp_flags: None,
            payload: Vec::new(),
        }
    }
}
