//! Metainfo parser built on librqbit-core.

use librqbit_core::torrent_metainfo::{torrent_from_bytes, TorrentMetaV1Owned};
use std::path::Path;
use tokio::fs;

use super::types::{ContentHash, DecodeError, Metainfo};

/// Read and decode a metainfo file.
pub async fn decode_file(path: &Path) -> Result<Metainfo, DecodeError> {
    let bytes = fs::read(path).await.map_err(|e| DecodeError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_metainfo(path, &bytes)
}

/// Decode metainfo bytes. `path` is only used for error reporting.
pub fn parse_metainfo(path: &Path, bytes: &[u8]) -> Result<Metainfo, DecodeError> {
    let torrent: TorrentMetaV1Owned =
        torrent_from_bytes(bytes).map_err(|e| DecodeError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let announce = torrent
        .announce
        .as_ref()
        .map(|b| bytes_to_string(b.as_ref()));
    let name = torrent
        .info
        .name
        .as_ref()
        .map(|b| bytes_to_string(b.as_ref()));

    let pieces: &[u8] = torrent.info.pieces.as_ref();
    if pieces.is_empty() {
        return Err(DecodeError::Malformed {
            path: path.to_path_buf(),
            reason: "empty pieces field".to_string(),
        });
    }

    Ok(Metainfo {
        announce,
        name,
        content_hash: ContentHash::new(pieces.to_vec()),
    })
}

/// Lossy UTF-8 conversion; trackers and names are informational only.
fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
