//! Tempora Timeline - Dimension switching for time-aware entities
//!
//! The [`TimelineController`] holds the current [`Dimension`] and a registry
//! of entities. On every switch each registered entity records the state of
//! the dimension being left, pushes it forward to the causally later
//! dimensions, and takes on the snapshot and visuals of the new one.
//! Runtime-spawned entities that would be observed before they were created
//! are destroyed.
//!
//! [`Dimension`]: tempora_core::Dimension

pub mod aware;
pub mod config;
pub mod controller;
pub mod lifecycle;
pub mod presentation;
pub mod shared;

pub use aware::{apply_dimension, ApplyOutcome, TimelineAware};
pub use config::TimelineSettings;
pub use controller::{DimensionListener, ListenerId, SwitchOutcome, TimelineController, TimelineHost};
pub use presentation::{Active, MaterialId, Presentation, Renderer};
pub use shared::{SharedTimeline, TimelineStage};
