//! Live packet source boundary
//!
//! Capture and header decoding are external concerns: `pcap` pulls raw
//! frames off the interface and `etherparse` slices the headers. This
//! module reduces both to the `Packet` model behind the `PacketSource`
//! trait, which is all the ingestion driver ever sees.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use thiserror::Error;

use crate::config::CaptureConfig;
use crate::models::{Packet, ProtocolKind, TcpFlags};

/// Errors from the capture source
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture device error: {0}")]
    Pcap(#[from] pcap::Error),
}

/// Pull-based source of decoded packets
///
/// `next_packet` blocks until a packet is available; `Ok(None)` means the
/// source is closed and no further packets will arrive. Errors are fatal
/// to the caller, no retry policy is defined.
pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<Packet>, CaptureError>;
}

/// Packet source backed by a live pcap capture
///
/// The capture runs with a read timeout so the externally owned stop flag
/// is observed even on a quiet interface; setting the flag closes the
/// source on the next timeout tick.
pub struct PcapPacketSource {
    capture: pcap::Capture<pcap::Active>,
    stop: Arc<AtomicBool>,
}

impl PcapPacketSource {
    /// Open the configured interface for live capture
    pub fn open(config: &CaptureConfig, stop: Arc<AtomicBool>) -> Result<Self, CaptureError> {
        let capture = pcap::Capture::from_device(config.interface.as_str())?
            .promisc(config.promiscuous)
            .snaplen(config.snaplen)
            .timeout(config.timeout_ms)
            .open()?;

        log::info!(
            "Capturing on {} (promiscuous: {}, snaplen: {})",
            config.interface,
            config.promiscuous,
            config.snaplen
        );

        Ok(PcapPacketSource { capture, stop })
    }
}

impl PacketSource for PcapPacketSource {
    fn next_packet(&mut self) -> Result<Option<Packet>, CaptureError> {
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(None);
            }

            match self.capture.next_packet() {
                Ok(frame) => return Ok(Some(decode_frame(frame.data))),
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(pcap::Error::NoMorePackets) => return Ok(None),
                Err(e) => return Err(CaptureError::Pcap(e)),
            }
        }
    }
}

/// Decode one Ethernet frame into the packet model
///
/// Frames the decoder cannot make sense of become `ProtocolKind::Other`;
/// detection is skipped for those units rather than surfacing an error.
pub fn decode_frame(data: &[u8]) -> Packet {
    let sliced = match SlicedPacket::from_ethernet(data) {
        Ok(sliced) => sliced,
        Err(e) => {
            log::debug!("undecodable frame ({} bytes): {}", data.len(), e);
            return Packet::undecoded();
        }
    };

    let source: Option<IpAddr> = match &sliced.net {
        Some(NetSlice::Ipv4(ipv4)) => Some(IpAddr::from(ipv4.header().source_addr())),
        Some(NetSlice::Ipv6(ipv6)) => Some(IpAddr::from(ipv6.header().source_addr())),
        _ => None,
    };

    match &sliced.transport {
        Some(TransportSlice::Tcp(tcp)) => {
            let flags = TcpFlags {
                fin: tcp.fin(),
                syn: tcp.syn(),
                rst: tcp.rst(),
                psh: tcp.psh(),
                ack: tcp.ack(),
                urg: tcp.urg(),
                ece: tcp.ece(),
                cwr: tcp.cwr(),
            };
            Packet::tcp(source, flags, tcp.payload().to_vec())
        }
        Some(TransportSlice::Udp(udp)) => {
            Packet::non_tcp(ProtocolKind::Udp, source, udp.payload().to_vec())
        }
        _ => {
            if source.is_some() {
                Packet::non_tcp(ProtocolKind::Ip, source, Vec::new())
            } else if sliced.link.is_some() {
                Packet::non_tcp(ProtocolKind::Ethernet, None, Vec::new())
            } else {
                Packet::undecoded()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherparse::PacketBuilder;

    #[test]
    fn test_decode_tcp_frame() {
        let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
            .ipv4([192, 168, 1, 50], [192, 168, 1, 1], 64)
            .tcp(4321, 80, 0, 1024);
        let mut frame = Vec::with_capacity(builder.size(4));
        builder.write(&mut frame, b"Nmap").unwrap();

        let packet = decode_frame(&frame);
        assert_eq!(packet.kind, ProtocolKind::Tcp);
        assert_eq!(packet.source.unwrap().to_string(), "192.168.1.50");
        assert!(packet.tcp_flags.is_some());
        assert_eq!(packet.payload, b"Nmap");
    }

    #[test]
    fn test_decode_tcp_flags() {
        let builder = PacketBuilder::ethernet2([0; 6], [0; 6])
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .tcp(1234, 80, 0, 1024)
            .fin()
            .psh()
            .urg(7);
        let mut frame = Vec::with_capacity(builder.size(0));
        builder.write(&mut frame, &[]).unwrap();

        let packet = decode_frame(&frame);
        let flags = packet.tcp_flags.unwrap();
        assert!(flags.fin && flags.psh && flags.urg);
        assert_eq!(flags.count_set(), 3);
    }

    #[test]
    fn test_decode_udp_frame() {
        let builder = PacketBuilder::ethernet2([0; 6], [0; 6])
            .ipv4([10, 0, 0, 9], [10, 0, 0, 2], 64)
            .udp(5353, 53);
        let mut frame = Vec::with_capacity(builder.size(5));
        builder.write(&mut frame, b"query").unwrap();

        let packet = decode_frame(&frame);
        assert_eq!(packet.kind, ProtocolKind::Udp);
        assert!(packet.tcp_flags.is_none());
        assert_eq!(packet.payload, b"query");
    }

    #[test]
    fn test_decode_garbage_is_other() {
        let packet = decode_frame(&[0xDE, 0xAD]);
        assert_eq!(packet.kind, ProtocolKind::Other);
        assert!(packet.source.is_none());
    }
}
