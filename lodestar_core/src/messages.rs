// lodestar_core/src/messages.rs

use crate::types::{Pose, Timestamp};
use nalgebra::{Isometry3, Matrix6, Point3};

// =========================================================================
// == Sensor-Side Data Structures ==
// =========================================================================

/// Represents a single point from a range sensor like a LiDAR.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    /// The 3D position of the point.
    pub position: Point3<f64>,
    /// Optional: The intensity of the laser return for this point.
    pub intensity: Option<f32>,
}

/// A structured collection of points with a capture timestamp.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    /// The timestamp of when the scan was captured.
    pub timestamp: Timestamp,
    /// The collection of points that make up the cloud.
    pub points: Vec<Point>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One raw frame from the scanning range sensor, as delivered by the
/// transport layer. Frames are fed to the accumulator one at a time.
#[derive(Clone, Debug)]
pub struct ScanFrame {
    pub timestamp: Timestamp,
    pub points: Vec<Point>,
}

// =========================================================================
// == Pose Messages ==
// =========================================================================

/// The pose-prior input (e.g. from odometry), with its covariance.
#[derive(Clone, Debug)]
pub struct PoseMessage {
    pub timestamp: Timestamp,
    pub pose: Isometry3<f64>,
    pub covariance: Matrix6<f64>,
}

/// The corrected pose published after every accepted pose prior.
/// Covariance is passed through unchanged from the input message.
#[derive(Clone, Debug)]
pub struct CorrectedPose {
    pub timestamp: Timestamp,
    pub pose: Isometry3<f64>,
    pub covariance: Matrix6<f64>,
}

// =========================================================================
// == Worker Handoff ==
// =========================================================================

/// A finalized, motion-gated accumulation cycle. Created exactly once per
/// cycle; owned by the work queue until the worker drains it.
#[derive(Clone, Debug)]
pub struct MeasurementBatch {
    /// When the accumulator reported the batch complete.
    pub capture_time: Timestamp,
    /// The accumulated point cloud.
    pub cloud: PointCloud,
    /// The live pose at the moment of completion.
    pub pose_at_capture: Pose,
}

/// Scalar outputs of the registration pipeline, reported alongside the
/// corrected pose when diagnostic publication is enabled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diagnostics {
    pub overlap: f32,
    /// Only present when the classifier produced a non-zero risk prediction.
    pub alignability: Option<f32>,
    pub risk: Option<f32>,
}
