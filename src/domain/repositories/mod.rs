pub mod screener_source;
pub mod snapshot_reader;

pub use screener_source::{InMemoryScreenerSource, ScreenerDataSource};
pub use snapshot_reader::{InMemorySnapshotReader, SnapshotReader};
