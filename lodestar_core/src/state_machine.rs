// lodestar_core/src/state_machine.rs

use crate::error::IngestError;
use log::{info, warn};
use nalgebra::Isometry3;

/// Localization readiness. Transitions are monotonic and one-directional:
/// `AwaitingMap -> AwaitingInitialPose -> Localizing`. Once `Localizing`,
/// the map and the initial-pose marker are permanently locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizationPhase {
    AwaitingMap,
    AwaitingInitialPose,
    Localizing,
}

/// The single authority over phase transitions. Every public callback of
/// the controller queries this machine instead of keeping its own flags.
#[derive(Debug)]
pub struct LocalizationStateMachine {
    phase: LocalizationPhase,
    map_based: bool,
    marker_pose: Option<Isometry3<f64>>,
}

impl LocalizationStateMachine {
    pub fn new(map_based: bool) -> Self {
        Self {
            phase: LocalizationPhase::AwaitingMap,
            map_based,
            marker_pose: None,
        }
    }

    pub fn phase(&self) -> LocalizationPhase {
        self.phase
    }

    pub fn marker_set(&self) -> bool {
        self.marker_pose.is_some()
    }

    /// A successful map load unlocks the initial-pose marker, but only in
    /// map-based mode; everywhere else this is a no-op. Returns whether the
    /// phase advanced.
    pub fn on_map_loaded(&mut self, success: bool) -> bool {
        if success && self.map_based && self.phase == LocalizationPhase::AwaitingMap {
            self.phase = LocalizationPhase::AwaitingInitialPose;
            info!("map loaded, awaiting initial pose");
            return true;
        }
        false
    }

    /// Record the operator's initial-pose guess. The marker can be updated
    /// repeatedly until localization starts, not after.
    pub fn on_initial_pose_marker(
        &mut self,
        marker: Isometry3<f64>,
    ) -> Result<(), IngestError> {
        match self.phase {
            LocalizationPhase::Localizing => {
                warn!("initial pose marker cannot be updated after localization started");
                Err(IngestError::AlreadyLocalizing)
            }
            LocalizationPhase::AwaitingMap if self.map_based => {
                warn!("map not initialized, marker neglected");
                Err(IngestError::WaitingForMap)
            }
            _ => {
                info!("localization initial pose set");
                self.marker_pose = Some(marker);
                Ok(())
            }
        }
    }

    /// The first accepted pose prior starts localization. Returns the
    /// one-time initial correction `marker ∘ inverse(first_prior)` in
    /// map-based mode, identity otherwise.
    pub fn on_first_pose_prior(&mut self, first_prior: &Isometry3<f64>) -> Isometry3<f64> {
        self.phase = LocalizationPhase::Localizing;
        info!("starting localization");
        match (self.map_based, self.marker_pose) {
            (true, Some(marker)) => marker * first_prior.inverse(),
            _ => Isometry3::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};

    fn some_pose() -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(2.0, -1.0, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.7),
        )
    }

    #[test]
    fn map_load_only_advances_in_map_based_mode() {
        let mut sm = LocalizationStateMachine::new(false);
        assert!(!sm.on_map_loaded(true));
        assert_eq!(sm.phase(), LocalizationPhase::AwaitingMap);

        let mut sm = LocalizationStateMachine::new(true);
        assert!(!sm.on_map_loaded(false));
        assert!(sm.on_map_loaded(true));
        assert_eq!(sm.phase(), LocalizationPhase::AwaitingInitialPose);
    }

    #[test]
    fn marker_rejected_before_map_in_map_based_mode() {
        let mut sm = LocalizationStateMachine::new(true);
        assert!(matches!(
            sm.on_initial_pose_marker(some_pose()),
            Err(IngestError::WaitingForMap)
        ));
        sm.on_map_loaded(true);
        assert!(sm.on_initial_pose_marker(some_pose()).is_ok());
    }

    #[test]
    fn marker_allowed_without_map_when_mode_disabled() {
        let mut sm = LocalizationStateMachine::new(false);
        assert!(sm.on_initial_pose_marker(some_pose()).is_ok());
    }

    #[test]
    fn marker_locked_once_localizing() {
        let mut sm = LocalizationStateMachine::new(true);
        sm.on_map_loaded(true);
        sm.on_initial_pose_marker(some_pose()).unwrap();
        sm.on_first_pose_prior(&Isometry3::identity());
        assert_eq!(sm.phase(), LocalizationPhase::Localizing);
        assert!(matches!(
            sm.on_initial_pose_marker(Isometry3::identity()),
            Err(IngestError::AlreadyLocalizing)
        ));
    }

    #[test]
    fn initial_correction_maps_first_prior_onto_marker() {
        let marker = some_pose();
        let first_prior = Isometry3::from_parts(
            Translation3::new(-3.0, 4.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -1.2),
        );

        let mut sm = LocalizationStateMachine::new(true);
        sm.on_map_loaded(true);
        sm.on_initial_pose_marker(marker).unwrap();
        let correction = sm.on_first_pose_prior(&first_prior);

        // correction ∘ first_prior must land exactly on the marker pose.
        let composed = correction * first_prior;
        assert!((composed.translation.vector - marker.translation.vector).norm() < 1e-12);
        assert!(composed.rotation.angle_to(&marker.rotation) < 1e-12);
    }

    #[test]
    fn initial_correction_is_identity_without_map_mode() {
        let mut sm = LocalizationStateMachine::new(false);
        let correction = sm.on_first_pose_prior(&some_pose());
        assert_eq!(correction, Isometry3::identity());
    }
}
