// lodestar_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::accumulator::ScanAccumulator;
pub use crate::map::MapStore;
pub use crate::registration::{RegistrationPipeline, RegistrationResult};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::ControllerConfig;
pub use crate::error::IngestError;
pub use crate::map::{MapError, PriorMap};
pub use crate::messages::{
    CorrectedPose, Diagnostics, MeasurementBatch, Point, PointCloud, PoseMessage, ScanFrame,
};
pub use crate::queue::BoundedWorkQueue;
pub use crate::state_machine::LocalizationPhase;
pub use crate::types::{Pose, Timestamp};

// --- The Orchestrator ---
pub use crate::accumulator::FixedCountAccumulator;
pub use crate::controller::{IngestionController, PoseUpdate, ScanOutcome};
