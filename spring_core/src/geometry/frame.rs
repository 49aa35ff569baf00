//! Cross-section frames along the sampled centerline.
//!
//! Frames are propagated by rotating the previous normal through the turn
//! between consecutive tangents (parallel transport), so they never flip at
//! curvature inflections the way Frenet frames do. The renderer sweeps the wire
//! section with them and structural consumers use them as beam orientations.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Tangent used when two samples coincide.
pub const DEFAULT_TANGENT: Vec3 = Vec3::Z;

/// Segments shorter than this give no usable direction.
const MIN_SEGMENT_LENGTH: f64 = 1e-12;

/// Cross-product length below which consecutive tangents count as parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// `dot + 1` below this counts as a half-turn reversal.
const ANTIPARALLEL_EPSILON: f64 = 1e-9;

/// An orthonormal, right-handed triple (`binormal = tangent × normal`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

impl Frame {
    /// Orientation used for degenerate centerlines.
    pub const DEFAULT: Frame = Frame {
        tangent: Vec3::Z,
        normal: Vec3::X,
        binormal: Vec3::Y,
    };

    /// Check if the frame is orthonormal within tolerance.
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        (self.tangent.length() - 1.0).abs() < tolerance
            && (self.normal.length() - 1.0).abs() < tolerance
            && (self.binormal.length() - 1.0).abs() < tolerance
            && self.tangent.dot(self.normal).abs() < tolerance
            && self.tangent.dot(self.binormal).abs() < tolerance
            && self.normal.dot(self.binormal).abs() < tolerance
    }

    /// First frame of a curve: the normal comes from whichever of two reference
    /// axes is least parallel to the tangent.
    pub fn initial(tangent: Vec3) -> Frame {
        let tangent = tangent.normalize_or(DEFAULT_TANGENT);
        let normal = initial_normal(tangent);
        let binormal = tangent.cross(normal).normalize_or(Vec3::Y);
        Frame {
            tangent,
            normal: binormal.cross(tangent),
            binormal,
        }
    }

    /// Carry this frame onto a new unit tangent.
    pub fn transport(&self, tangent: Vec3) -> Frame {
        let tangent = tangent.normalize_or(self.tangent);
        let dot = self.tangent.dot(tangent).clamp(-1.0, 1.0);

        let rotated = if dot < -1.0 + ANTIPARALLEL_EPSILON {
            // Half turn about an axis perpendicular to the old tangent
            self.normal.rotate_about(self.binormal, PI)
        } else {
            let axis = self.tangent.cross(tangent);
            if axis.length() < PARALLEL_EPSILON {
                self.normal
            } else {
                self.normal.rotate_about(axis.normalize_or(self.binormal), dot.acos())
            }
        };

        let binormal = tangent.cross(rotated).normalize_or(self.binormal);
        let normal = binormal.cross(tangent).normalize_or(self.normal);
        Frame {
            tangent,
            normal,
            binormal: tangent.cross(normal),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::DEFAULT
    }
}

fn initial_normal(tangent: Vec3) -> Vec3 {
    let reference = if tangent.dot(Vec3::Z).abs() <= tangent.dot(Vec3::X).abs() {
        Vec3::Z
    } else {
        Vec3::X
    };
    if let Some(normal) = (reference - tangent * tangent.dot(reference)).try_normalize() {
        return normal;
    }

    // Cross with the coordinate axis most perpendicular to the tangent
    let axis = [Vec3::X, Vec3::Y, Vec3::Z]
        .into_iter()
        .min_by(|a, b| {
            tangent
                .dot(*a)
                .abs()
                .total_cmp(&tangent.dot(*b).abs())
        })
        .unwrap_or(Vec3::X);
    tangent.cross(axis).normalize_or(Vec3::X)
}

/// Unit tangents by finite differences: forward at the first sample, backward
/// at the last, central elsewhere.
pub fn tangents(points: &[Vec3]) -> Vec<Vec3> {
    let n = points.len();
    (0..n)
        .map(|i| {
            if n < 2 {
                return DEFAULT_TANGENT;
            }
            let (a, b) = if i == 0 {
                (points[0], points[1])
            } else if i == n - 1 {
                (points[n - 2], points[n - 1])
            } else {
                (points[i - 1], points[i + 1])
            };
            let delta = b - a;
            if delta.length() < MIN_SEGMENT_LENGTH {
                DEFAULT_TANGENT
            } else {
                delta.normalize_or(DEFAULT_TANGENT)
            }
        })
        .collect()
}

/// Parallel-transported frames, one per point.
pub fn transport_frames(points: &[Vec3]) -> Vec<Frame> {
    let tangents = tangents(points);
    let mut frames: Vec<Frame> = Vec::with_capacity(tangents.len());
    for tangent in tangents {
        let frame = match frames.last() {
            Some(prev) => prev.transport(tangent),
            None => Frame::initial(tangent),
        };
        frames.push(frame);
    }
    frames
}
