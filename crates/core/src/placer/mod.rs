//! Placer module for moving metainfo files into watch directories.
//!
//! This module provides the `Placer` trait and a filesystem implementation
//! that never overwrites an existing file.
//!
//! # Features
//!
//! - Hard-link publication when source and destination share a filesystem
//! - Staged copy published without replacing anything, or exclusive-create copy
//!   where links are unsupported
//! - Byte-for-byte comparison with an existing namesake: identical content is
//!   reused, different content gets the next free `name-N.ext`
//! - Automatic destination directory creation
//!
//! # Example
//!
//! ```ignore
//! use torrdispatch_core::placer::{FsPlacer, Placer};
//!
//! let placer = FsPlacer::with_defaults();
//! let placed = placer
//!     .safe_move(Path::new("/blackhole/a.torrent"), Path::new("/watch/rt1"))
//!     .await?;
//! println!("now at {}", placed.destination.display());
//! ```

mod config;
mod error;
mod fs_placer;
mod naming;
mod traits;
mod types;

pub use config::PlacerConfig;
pub use error::PlacerError;
pub use fs_placer::FsPlacer;
pub use naming::IncrementedNames;
pub use traits::Placer;
pub use types::{PlaceMode, PlacedFile, PlacementOutcome};
