// lodestar_core/src/accumulator.rs

use crate::messages::{PointCloud, ScanFrame};
use crate::types::Timestamp;

// --- The ScanAccumulator Trait ("Contract") ---
/// The contract for the algorithm that turns raw range-sensor frames into
/// an accumulated point cloud. The controller drives it one frame at a
/// time and drains it when it reports completion.
///
/// `reset` must be safe to call at any time, discarding partial state.
pub trait ScanAccumulator: Send {
    /// Feed one raw frame into the current batch.
    fn add_frame(&mut self, frame: &ScanFrame);

    /// Has the current batch finished accumulating?
    fn is_batch_complete(&self) -> bool;

    /// The timestamp at which the batch completed. Only meaningful once
    /// `is_batch_complete` returns true.
    fn completion_timestamp(&self) -> Timestamp;

    /// Take the accumulated cloud out of the accumulator.
    fn extract_cloud(&mut self) -> PointCloud;

    /// Number of frames collected so far in the current batch.
    fn frame_count(&self) -> usize;

    /// Discard all partial state and start a fresh batch.
    fn reset(&mut self);
}

// --- A Simple Concrete Implementation ---
/// An accumulator that declares a batch complete after a fixed number of
/// frames, concatenating their points.
#[derive(Debug, Clone)]
pub struct FixedCountAccumulator {
    batch_size: usize,
    frames_seen: usize,
    last_frame_time: Timestamp,
    points: PointCloud,
}

impl FixedCountAccumulator {
    pub fn new(batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be at least one frame");
        Self {
            batch_size,
            frames_seen: 0,
            last_frame_time: 0.0,
            points: PointCloud::default(),
        }
    }
}

impl ScanAccumulator for FixedCountAccumulator {
    fn add_frame(&mut self, frame: &ScanFrame) {
        if self.frames_seen >= self.batch_size {
            // A complete batch must be drained or reset before more frames
            // can be accepted.
            return;
        }
        self.points.points.extend_from_slice(&frame.points);
        self.points.timestamp = frame.timestamp;
        self.last_frame_time = frame.timestamp;
        self.frames_seen += 1;
    }

    fn is_batch_complete(&self) -> bool {
        self.frames_seen >= self.batch_size
    }

    fn completion_timestamp(&self) -> Timestamp {
        self.last_frame_time
    }

    fn extract_cloud(&mut self) -> PointCloud {
        std::mem::take(&mut self.points)
    }

    fn frame_count(&self) -> usize {
        self.frames_seen
    }

    fn reset(&mut self) {
        self.frames_seen = 0;
        self.last_frame_time = 0.0;
        self.points = PointCloud::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn frame(t: Timestamp, n: usize) -> ScanFrame {
        ScanFrame {
            timestamp: t,
            points: (0..n)
                .map(|i| crate::messages::Point {
                    position: Point3::new(i as f64, 0.0, 0.0),
                    intensity: None,
                })
                .collect(),
        }
    }

    #[test]
    fn completes_at_batch_size() {
        let mut accu = FixedCountAccumulator::new(3);
        accu.add_frame(&frame(1.0, 2));
        accu.add_frame(&frame(2.0, 2));
        assert!(!accu.is_batch_complete());
        accu.add_frame(&frame(3.0, 2));
        assert!(accu.is_batch_complete());
        assert_eq!(accu.completion_timestamp(), 3.0);
        assert_eq!(accu.extract_cloud().len(), 6);
    }

    #[test]
    fn reset_discards_partial_state() {
        let mut accu = FixedCountAccumulator::new(5);
        accu.add_frame(&frame(1.0, 10));
        assert_eq!(accu.frame_count(), 1);
        accu.reset();
        assert_eq!(accu.frame_count(), 0);
        assert!(accu.extract_cloud().is_empty());
        assert!(!accu.is_batch_complete());
    }
}
