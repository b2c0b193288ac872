//! Time dimensions and the masks built over them
//!
//! The world exists in exactly one of three dimensions at a time. Their
//! declaration order is the causal order: Past < Present < Future.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three mutually exclusive time states of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Past,
    Present,
    Future,
}

impl Dimension {
    /// Every dimension in causal order
    pub const ALL: [Dimension; 3] = [Dimension::Past, Dimension::Present, Dimension::Future];

    /// Position in the causal order (Past = 0, Present = 1, Future = 2)
    pub const fn index(self) -> usize {
        match self {
            Dimension::Past => 0,
            Dimension::Present => 1,
            Dimension::Future => 2,
        }
    }

    /// Display name of this dimension
    pub const fn name(self) -> &'static str {
        match self {
            Dimension::Past => "Past",
            Dimension::Present => "Present",
            Dimension::Future => "Future",
        }
    }

    /// Whether this dimension is causally earlier than `other`
    pub fn is_before(self, other: Dimension) -> bool {
        self < other
    }

    /// The single-bit mask for this dimension
    pub const fn mask(self) -> TimelineMask {
        match self {
            Dimension::Past => TimelineMask::PAST,
            Dimension::Present => TimelineMask::PRESENT,
            Dimension::Future => TimelineMask::FUTURE,
        }
    }

    /// Dimensions causally after this one, nearest first
    pub fn later(self) -> &'static [Dimension] {
        match self {
            Dimension::Past => &[Dimension::Present, Dimension::Future],
            Dimension::Present => &[Dimension::Future],
            Dimension::Future => &[],
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::Present
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// The set of dimensions an entity is permitted to exist in.
    ///
    /// Independent of which dimension is current.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TimelineMask: u8 {
        const PAST = 1 << 0;
        const PRESENT = 1 << 1;
        const FUTURE = 1 << 2;
        const ALL = Self::PAST.bits() | Self::PRESENT.bits() | Self::FUTURE.bits();
    }
}

impl TimelineMask {
    /// The empty mask: exists nowhere
    pub const NONE: TimelineMask = TimelineMask::empty();

    /// Forward-causality mask for something created in `birth`.
    ///
    /// Created in Past: Past, Present and Future. Created in Present: Present
    /// and Future. Created in Future: Future only.
    pub fn forward_from(birth: Dimension) -> Self {
        birth
            .later()
            .iter()
            .fold(birth.mask(), |mask, later| mask | later.mask())
    }

    /// Whether `dimension` is part of this mask
    pub fn contains_dimension(self, dimension: Dimension) -> bool {
        self.intersects(dimension.mask())
    }
}

impl Default for TimelineMask {
    fn default() -> Self {
        TimelineMask::ALL
    }
}

/// A transition between two dimensions, as delivered to every registered entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionChange {
    pub from: Dimension,
    pub to: Dimension,
}

impl DimensionChange {
    pub fn new(from: Dimension, to: Dimension) -> Self {
        Self { from, to }
    }
}
