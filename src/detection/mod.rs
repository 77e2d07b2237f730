pub mod scan;
pub mod signatures;

pub use scan::{classify_tcp_flags, ScanVerdict};
pub use signatures::{Matcher, Signature, SignatureMatch, SignatureScanner};
