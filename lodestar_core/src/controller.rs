// lodestar_core/src/controller.rs

use crate::accumulator::ScanAccumulator;
use crate::config::ControllerConfig;
use crate::correction::CorrectionComposer;
use crate::error::IngestError;
use crate::map::{MapStore, PriorMap};
use crate::messages::{
    CorrectedPose, Diagnostics, MeasurementBatch, PoseMessage, ScanFrame,
};
use crate::queue::BoundedWorkQueue;
use crate::registration::RegistrationResult;
use crate::state_machine::{LocalizationPhase, LocalizationStateMachine};
use crate::types::Pose;

use log::{debug, info, warn};
use nalgebra::Isometry3;
use std::path::Path;
use std::sync::{Arc, Mutex};

// --- Motion Gate ---

/// "Enough motion occurred" test between two pose samples: the relative
/// translation must exceed `translation_threshold`, or any single Euler
/// angle of the relative rotation must exceed `rotation_threshold_rad`.
/// Both comparisons are strict, so a batch exactly at a threshold is
/// rejected.
pub fn exceeds_motion_thresholds(
    relative: &Isometry3<f64>,
    translation_threshold: f64,
    rotation_threshold_rad: f64,
) -> bool {
    if relative.translation.vector.norm() > translation_threshold {
        return true;
    }
    let (roll, pitch, yaw) = relative.rotation.euler_angles();
    roll.abs() > rotation_threshold_rad
        || pitch.abs() > rotation_threshold_rad
        || yaw.abs() > rotation_threshold_rad
}

// --- Callback Results ---

/// What `handle_pose_prior` hands back for downstream publication.
#[derive(Clone, Debug)]
pub struct PoseUpdate {
    pub corrected: CorrectedPose,
    /// Present only when diagnostic publication is enabled and a
    /// registration result has arrived.
    pub diagnostics: Option<Diagnostics>,
}

/// Which path a scan callback took, mostly for observability and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The frame was appended to the current batch.
    Accumulated,
    /// A fresh correction invalidated the partial batch; the frame was
    /// skipped and the accumulator reset.
    BufferCleared,
    /// A batch completed, passed the motion gate and was queued.
    /// `dropped` counts the oldest batches evicted by the overflow policy.
    BatchQueued { dropped: usize },
    /// A batch completed but the robot had not moved enough; discarded.
    GateRejected,
}

// --- Internal State Partitions ---

/// The phase machine and the prior map it gates share one lock, so the
/// Localizing check and a map commit form a single critical section.
struct LocalizationState {
    machine: LocalizationStateMachine,
    prior_map: Option<Arc<PriorMap>>,
}

#[derive(Debug, Clone, Copy)]
struct PoseState {
    /// Latest accepted pose prior (world -> body). None until the first
    /// prior is accepted.
    live: Option<Pose>,
    /// Pose at the last accepted capture, the motion-gate baseline.
    previous_capture: Pose,
}

struct ScanState<A> {
    accumulator: A,
    /// One-shot: armed by the pose path when a correction lands, observed
    /// by the next scan callback.
    clear_pending: bool,
}

// --- The Controller ---

/// Orchestrates the two producer callbacks: feeds the accumulator, gates
/// batch finalization on motion, hands finalized batches to the worker
/// queue and composes the correction with the live pose prior.
///
/// All methods take `&self`; internal state is partitioned across
/// independent mutexes (localization phase + the prior map it gates, pose
/// state, scan state + clear flag, correction, queue) that are never held
/// simultaneously. Share it across the two producer threads with an `Arc`.
pub struct IngestionController<A: ScanAccumulator> {
    config: ControllerConfig,
    localization: Mutex<LocalizationState>,
    pose_state: Mutex<PoseState>,
    scan_state: Mutex<ScanState<A>>,
    composer: CorrectionComposer,
    queue: Arc<BoundedWorkQueue<MeasurementBatch>>,
    diagnostics: Mutex<Option<Diagnostics>>,
}

impl<A: ScanAccumulator> IngestionController<A> {
    pub fn new(config: ControllerConfig, accumulator: A) -> Self {
        let queue = Arc::new(BoundedWorkQueue::new(config.queue_capacity));
        Self {
            localization: Mutex::new(LocalizationState {
                machine: LocalizationStateMachine::new(config.map_based_localization),
                prior_map: None,
            }),
            pose_state: Mutex::new(PoseState {
                live: None,
                previous_capture: Pose::identity(),
            }),
            scan_state: Mutex::new(ScanState {
                accumulator,
                clear_pending: false,
            }),
            composer: CorrectionComposer::new(),
            queue,
            diagnostics: Mutex::new(None),
            config,
        }
    }

    // --- Pose-Prior Path ---

    /// Handle one pose-prior message. On the first accepted call this
    /// starts localization and installs the one-time initial correction;
    /// on every call it returns `correction ∘ live_pose` for publication,
    /// with the input covariance passed through.
    pub fn handle_pose_prior(&self, msg: &PoseMessage) -> Result<PoseUpdate, IngestError> {
        let initial = {
            let mut loc = self.localization.lock().unwrap();
            if self.config.map_based_localization && !loc.machine.marker_set() {
                warn!("pose initial guess in map not set, waiting for marker");
                return Err(IngestError::WaitingForInitialPose);
            }
            (loc.machine.phase() != LocalizationPhase::Localizing)
                .then(|| loc.machine.on_first_pose_prior(&msg.pose))
        };
        let first = initial.is_some();
        if let Some(initial) = initial {
            self.composer.initialize(initial);
        }

        let live = Pose::new(msg.pose, msg.timestamp);
        {
            let mut pose_state = self.pose_state.lock().unwrap();
            pose_state.live = Some(live);
            if first {
                pose_state.previous_capture = live;
            }
        }

        // Composition order is `correction ∘ live` (body -> reference
        // applied to world -> body).
        // TODO: a robot operating mode may need the opposite order; keep
        // this order until that mode is specified.
        let corrected = self.composer.compose(&msg.pose);

        // A correction landed since the last clear: arm the one-shot flag
        // for the scan path.
        if self.composer.take_dirty() {
            self.scan_state.lock().unwrap().clear_pending = true;
        }

        let diagnostics = if self.config.publish_diagnostics {
            *self.diagnostics.lock().unwrap()
        } else {
            None
        };

        Ok(PoseUpdate {
            corrected: CorrectedPose {
                timestamp: msg.timestamp,
                pose: corrected,
                covariance: msg.covariance,
            },
            diagnostics,
        })
    }

    // --- Scan Path ---

    /// Handle one raw range-sensor frame: feed the accumulator (or clear
    /// it if a correction just landed), and when a batch completes and the
    /// motion gate passes, hand it to the worker queue.
    pub fn handle_scan(&self, frame: &ScanFrame) -> Result<ScanOutcome, IngestError> {
        if self.phase() != LocalizationPhase::Localizing {
            warn!("pose not initialized, waiting for pose prior");
            return Err(IngestError::WaitingForPosePrior);
        }

        // Snapshot the pose pair before touching the scan state; the pose
        // lock and the scan lock are never held together.
        let (live, previous) = {
            let pose_state = self.pose_state.lock().unwrap();
            match pose_state.live {
                Some(live) => (live, pose_state.previous_capture),
                None => {
                    warn!("pose not initialized, waiting for pose prior");
                    return Err(IngestError::WaitingForPosePrior);
                }
            }
        };

        let finalized = {
            let mut scan_state = self.scan_state.lock().unwrap();

            if scan_state.clear_pending {
                scan_state.clear_pending = false;
                let discarded = scan_state.accumulator.frame_count();
                if discarded > 0 {
                    scan_state.accumulator.reset();
                }
                debug!("cleared accumulation buffer of {} frames", discarded);
                return Ok(ScanOutcome::BufferCleared);
            }

            scan_state.accumulator.add_frame(frame);
            if !scan_state.accumulator.is_batch_complete() {
                return Ok(ScanOutcome::Accumulated);
            }

            // Batch complete: only worth registering if the robot moved.
            let relative = previous.relative_to(&live);
            let accepted = exceeds_motion_thresholds(
                &relative,
                self.config.translation_threshold,
                self.config.rotation_threshold_deg.to_radians(),
            );

            let batch = accepted.then(|| MeasurementBatch {
                capture_time: scan_state.accumulator.completion_timestamp(),
                cloud: scan_state.accumulator.extract_cloud(),
                pose_at_capture: live,
            });
            scan_state.accumulator.reset();
            batch
        };

        let Some(batch) = finalized else {
            return Ok(ScanOutcome::GateRejected);
        };

        debug!(
            "finished collecting batch at {:.6} with {} points",
            batch.capture_time,
            batch.cloud.len()
        );
        self.pose_state.lock().unwrap().previous_capture = live;

        // Push + consumer wake-up is one atomic unit inside the queue.
        let dropped = self.queue.push(batch);
        if dropped > 0 {
            warn!("work queue over capacity, dropping {} batches", dropped);
        }
        Ok(ScanOutcome::BatchQueued { dropped })
    }

    // --- Initial Pose & Map ---

    /// Record the operator's initial-pose guess in the map frame. Rejected
    /// once localization has started.
    pub fn set_initial_pose_marker(&self, msg: &PoseMessage) -> Result<(), IngestError> {
        self.localization
            .lock()
            .unwrap()
            .machine
            .on_initial_pose_marker(msg.pose)
    }

    /// Load and pre-filter a prior map through the given store. Disallowed
    /// once localization has started or when map-based mode is off; a load
    /// failure leaves any previously loaded map in place. Returns the
    /// filtered point count.
    pub fn load_map(&self, store: &dyn MapStore, path: &Path) -> Result<usize, IngestError> {
        if !self.config.map_based_localization {
            warn!("map service disabled");
            return Err(IngestError::MapServiceDisabled);
        }
        if self.phase() == LocalizationPhase::Localizing {
            warn!("map cannot be updated after localization started");
            return Err(IngestError::AlreadyLocalizing);
        }

        info!("loading map from {:?}", path);
        let raw = store.load(path)?;
        let filtered = store.prefilter(raw);
        info!("loaded map with {} points", filtered.len());

        let count = filtered.len();
        let load_time = filtered.timestamp;
        {
            // Localization may have started while the file was read; the
            // phase re-check and the map commit share one critical section,
            // so a map can never be replaced once Localizing.
            let mut loc = self.localization.lock().unwrap();
            if loc.machine.phase() == LocalizationPhase::Localizing {
                warn!("map cannot be updated after localization started");
                return Err(IngestError::AlreadyLocalizing);
            }
            loc.prior_map = Some(Arc::new(PriorMap {
                cloud: filtered,
                load_time,
            }));
            loc.machine.on_map_loaded(true);
        }
        Ok(count)
    }

    // --- Worker Feedback ---

    /// Feed back the registration pipeline's output: replaces the
    /// correction (arming the next buffer clear) and stores the latest
    /// diagnostic scalars.
    pub fn apply_registration_result(&self, result: RegistrationResult) {
        self.composer.apply_correction(result.correction);
        let has_prediction = result.risk != 0.0;
        *self.diagnostics.lock().unwrap() = Some(Diagnostics {
            overlap: result.overlap,
            alignability: has_prediction.then_some(result.alignability),
            risk: has_prediction.then_some(result.risk),
        });
    }

    // --- Accessors ---

    pub fn phase(&self) -> LocalizationPhase {
        self.localization.lock().unwrap().machine.phase()
    }

    /// Latest accepted pose prior, if any.
    pub fn live_pose(&self) -> Option<Pose> {
        self.pose_state.lock().unwrap().live
    }

    pub fn current_correction(&self) -> Isometry3<f64> {
        self.composer.current()
    }

    pub fn prior_map(&self) -> Option<Arc<PriorMap>> {
        self.localization.lock().unwrap().prior_map.clone()
    }

    /// The handoff queue, for the consumer thread's drain loop.
    pub fn queue(&self) -> Arc<BoundedWorkQueue<MeasurementBatch>> {
        Arc::clone(&self.queue)
    }
}
