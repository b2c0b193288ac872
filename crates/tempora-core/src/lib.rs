//! Tempora Core - Core types shared by every Tempora crate
//!
//! This crate provides the foundational types used throughout the game:
//! - Mathematical primitives (re-exported from glam)
//! - Transform and per-dimension snapshots of spatial state
//! - The three time dimensions and the masks built over them

pub mod dimension;
pub mod types;

pub use dimension::{Dimension, DimensionChange, TimelineMask};
pub use glam::{Quat, Vec3};
pub use types::{Snapshot, Transform};
