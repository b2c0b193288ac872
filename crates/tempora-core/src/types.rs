//! Spatial types used throughout Tempora

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Transform component representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// Spatial state stored for one dimension. Scale is not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Snapshot {
    /// Capture the spatial part of a live transform
    pub fn capture(transform: &Transform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
        }
    }

    /// Write this snapshot into a live transform, leaving scale untouched
    pub fn apply_to(&self, transform: &mut Transform) {
        transform.position = self.position;
        transform.rotation = self.rotation;
    }
}
