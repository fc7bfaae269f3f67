// lodestar_core/src/registration.rs

use crate::map::PriorMap;
use crate::messages::MeasurementBatch;
use nalgebra::Isometry3;

/// Everything the registration pipeline reports per drained batch. The
/// correction maps the live pose estimate into the reference/map frame;
/// the scalars feed the diagnostic outputs.
#[derive(Clone, Copy, Debug)]
pub struct RegistrationResult {
    pub correction: Isometry3<f64>,
    pub overlap: f32,
    pub alignability: f32,
    /// Zero means the classifier produced no prediction for this batch.
    pub risk: f32,
}

// --- The Registration Pipeline Trait ("Contract") ---
/// The consumer-side contract. The worker thread drains the controller's
/// queue, calls `register`, and feeds the result back through
/// `IngestionController::apply_registration_result`. This core never calls
/// it directly and never blocks on it.
pub trait RegistrationPipeline: Send {
    fn register(
        &mut self,
        batch: &MeasurementBatch,
        prior_map: Option<&PriorMap>,
    ) -> RegistrationResult;
}
