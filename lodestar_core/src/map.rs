// lodestar_core/src/map.rs

use crate::messages::PointCloud;
use crate::types::Timestamp;
use std::path::Path;
use thiserror::Error;

/// Failure to bring a prior map into memory. Recoverable: the previously
/// loaded map, if any, stays in place.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse map file: {0}")]
    Parse(String),
}

// --- The Map Store Trait ("Contract") ---
/// The contract for loading and pre-filtering a prior map. The concrete
/// file format and the filter algorithm live outside the core.
pub trait MapStore: Send + Sync {
    /// Read a point cloud from disk.
    fn load(&self, path: &Path) -> Result<PointCloud, MapError>;

    /// Reduce the raw map to the subset worth registering against
    /// (e.g. uniform plane segmentation in the reference pipeline).
    fn prefilter(&self, cloud: PointCloud) -> PointCloud;
}

/// A loaded, pre-filtered prior map. Immutable; owned by the controller
/// and shared out by `Arc` for the worker's registration calls.
#[derive(Clone, Debug)]
pub struct PriorMap {
    pub cloud: PointCloud,
    pub load_time: Timestamp,
}
