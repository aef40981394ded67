//! Decoding of bencoded `.torrent` metainfo files.
//!
//! Only the fields the dispatcher cares about are kept: the announce URL used
//! by tracker filters and the piece hashes used to recognise the same torrent
//! under a different file name.

mod parser;
mod types;

pub use parser::{decode_file, parse_metainfo};
pub use types::{ContentHash, DecodeError, Metainfo};
