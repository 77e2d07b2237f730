pub mod incident;
pub mod packet;

pub use incident::Incident;
pub use packet::{Packet, ProtocolKind, TcpFlags};
