// lodestar_core/src/error.rs

use crate::map::MapError;
use thiserror::Error;

/// Failures surfaced by the ingestion callbacks. None of these are fatal:
/// rejected preconditions leave state unchanged and simply suppress forward
/// progress until the precondition is met.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("pose initial guess in map not set, waiting for marker")]
    WaitingForInitialPose,

    #[error("pose not initialized, waiting for pose prior")]
    WaitingForPosePrior,

    #[error("map not initialized, waiting for map load")]
    WaitingForMap,

    #[error("cannot update after localization started")]
    AlreadyLocalizing,

    #[error("map-based localization disabled")]
    MapServiceDisabled,

    #[error("map load failed: {0}")]
    Map(#[from] MapError),
}
