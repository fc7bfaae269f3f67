// lodestar_core/src/correction.rs

use nalgebra::Isometry3;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct CorrectionState {
    transform: Isometry3<f64>,
    /// Set when a registration result replaced the transform; consumed by
    /// the pose path to arm the accumulation-buffer clear.
    dirty: bool,
}

/// Holds the latest rigid correction from the registration pipeline and
/// composes it with the live pose prior. Readers copy the transform out
/// under the lock, so a torn transform can never be observed.
#[derive(Debug)]
pub struct CorrectionComposer {
    state: Mutex<CorrectionState>,
}

impl Default for CorrectionComposer {
    fn default() -> Self {
        Self {
            state: Mutex::new(CorrectionState {
                transform: Isometry3::identity(),
                dirty: false,
            }),
        }
    }
}

impl CorrectionComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the one-time initial correction. Unlike `apply_correction`
    /// this does not mark the state dirty: the initial alignment must not
    /// trigger a buffer clear.
    pub fn initialize(&self, transform: Isometry3<f64>) {
        let mut state = self.state.lock().unwrap();
        state.transform = transform;
    }

    /// Atomically replace the correction and mark it dirty.
    pub fn apply_correction(&self, transform: Isometry3<f64>) {
        let mut state = self.state.lock().unwrap();
        state.transform = transform;
        state.dirty = true;
    }

    /// `correction ∘ pose`: the live pose mapped into the reference frame.
    pub fn compose(&self, pose: &Isometry3<f64>) -> Isometry3<f64> {
        self.state.lock().unwrap().transform * pose
    }

    /// Consume the dirty flag. Returns true at most once per applied
    /// correction.
    pub fn take_dirty(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        std::mem::replace(&mut state.dirty, false)
    }

    pub fn current(&self) -> Isometry3<f64> {
        self.state.lock().unwrap().transform
    }
}
