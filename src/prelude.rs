pub use crate::builder::{NavigableMapBuilder, NullPolicy, OrderedHashMapBuilder};
pub use crate::error::{ConfigError, InvariantError, MapError};
pub use crate::map::{Cursor, NavCursor, NavigableMap, NavigableView, OrderedHashMap};
pub use crate::ordering::{Natural, OrderWith, PartialNatural, Reversed, Total};
pub use crate::policy::{EvictWith, MaxEntries, NeverEvict};
pub use crate::traits::{EvictionPolicy, KeyOrder};

#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{NavigableMapMetricsSnapshot, OrderedMapMetricsSnapshot};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsExporter, MetricsSnapshotProvider};
