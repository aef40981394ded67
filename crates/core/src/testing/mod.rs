//! Testing utilities shared by unit and integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use torrdispatch_core::testing::{fixtures, MockPlacer};
//!
//! let hole = temp.path().join("hole");
//! fixtures::write_torrent(&hole, "a.torrent", Some("http://tracker.example/announce"), &fixtures::pieces(1));
//!
//! let dispatcher = Dispatcher::new(group, "torrent", MockPlacer::new())?;
//! ```

mod mock_placer;

pub use mock_placer::{MockPlacer, RecordedPlacement};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// A 20-byte piece hash derived from `seed`.
    pub fn pieces(seed: u8) -> Vec<u8> {
        (0..20u8).map(|i| seed.wrapping_mul(31).wrapping_add(i)).collect()
    }

    /// Bencode a single-file v1 torrent.
    pub fn torrent_bytes(announce: Option<&str>, name: &str, pieces: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(b'd');
        if let Some(announce) = announce {
            push_str(&mut out, b"announce");
            push_str(&mut out, announce.as_bytes());
        }
        push_str(&mut out, b"info");
        out.push(b'd');
        push_str(&mut out, b"length");
        out.extend_from_slice(b"i1024e");
        push_str(&mut out, b"name");
        push_str(&mut out, name.as_bytes());
        push_str(&mut out, b"piece length");
        out.extend_from_slice(b"i16384e");
        push_str(&mut out, b"pieces");
        push_str(&mut out, pieces);
        out.push(b'e');
        out.push(b'e');
        out
    }

    /// Write a torrent named `file_name` into `dir`, creating `dir` if needed.
    pub fn write_torrent(
        dir: &Path,
        file_name: &str,
        announce: Option<&str>,
        pieces: &[u8],
    ) -> PathBuf {
        std::fs::create_dir_all(dir).expect("create fixture directory");
        let name = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
        let path = dir.join(file_name);
        std::fs::write(&path, torrent_bytes(announce, name, pieces)).expect("write fixture torrent");
        path
    }

    fn push_str(out: &mut Vec<u8>, value: &[u8]) {
        out.extend_from_slice(value.len().to_string().as_bytes());
        out.push(b':');
        out.extend_from_slice(value);
    }
}
