pub mod config;
pub mod dispatcher;
pub mod duplicates;
pub mod filter;
pub mod metainfo;
pub mod occupancy;
pub mod placer;
pub mod scanner;
pub mod testing;
pub mod watchdir;

pub use config::{
    default_config_path, load_config, load_config_from_str, validate_config, Config, ConfigError,
    FilterConfig, GroupConfig,
};
pub use dispatcher::{DispatchError, Dispatcher, MoveFailure, MoveReport, PlannedMove};
pub use duplicates::{find_duplicates, DuplicateMatch};
pub use filter::{FilterVerdict, TrackerFilter};
pub use metainfo::{decode_file, ContentHash, DecodeError, Metainfo};
pub use occupancy::{OccupancyTable, TargetOccupancy};
pub use placer::{
    FsPlacer, PlaceMode, PlacedFile, PlacementOutcome, Placer, PlacerConfig, PlacerError,
};
pub use scanner::scan;
