//! File formats read by `WemVoice`

pub mod txtp;

pub use txtp::{DescriptorId, DescriptorRecord, parse_txtp_file, parse_txtp_str};
