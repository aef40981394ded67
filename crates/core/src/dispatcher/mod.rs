//! Dispatch groups: scanning blackholes and spreading their torrents over
//! capacity-limited watch directories.
//!
//! A pass over a group goes through these stages:
//! 1. Scanning the sources and applying the tracker filter
//! 2. Dropping candidates whose content is already in a watchdir (and
//!    deleting their staging copy)
//! 3. Moving each remaining candidate into the least occupied target under
//!    the group limit
//!
//! Nothing is persisted between passes: the filesystem is the only state.
//!
//! # Example
//!
//! ```ignore
//! use torrdispatch_core::{Dispatcher, FsPlacer, GroupConfig};
//!
//! let dispatcher = Dispatcher::new(group, "torrent", FsPlacer::with_defaults())?;
//! let report = dispatcher.dispatch(None, false).await?;
//! println!("{} torrent(s) moved", report.moved_count());
//! ```

mod error;
mod group;
mod types;

pub use error::DispatchError;
pub use group::Dispatcher;
pub use types::{MoveFailure, MoveReport, PlannedMove};
