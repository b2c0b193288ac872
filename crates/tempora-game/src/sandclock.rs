//! The sandclock pickup that grants time control

use glam::Vec3;
use tempora_core::Dimension;
use tempora_timeline::{TimelineController, TimelineHost};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Sandclock {
    pub position: Vec3,
    /// Distance from which the player can pick it up
    pub radius: f32,
    /// Return to the Present once collected
    pub force_present: bool,
    collected: bool,
}

impl Sandclock {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            force_present: true,
            collected: false,
        }
    }

    /// Keep the current dimension on pickup
    pub fn without_forced_present(mut self) -> Self {
        self.force_present = false;
        self
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    pub fn in_range(&self, player: Vec3) -> bool {
        !self.collected && self.position.distance(player) <= self.radius
    }

    /// Try to pick the sandclock up from `player`.
    ///
    /// Unlocks switching on success. Does nothing when out of range or
    /// already collected.
    pub fn collect<H: TimelineHost>(
        &mut self,
        controller: &mut TimelineController,
        host: &mut H,
        player: Vec3,
    ) -> bool {
        if !self.in_range(player) {
            debug!("Sandclock out of reach");
            return false;
        }

        controller.enable_switching();
        if self.force_present {
            info!("Sandclock collected, returning to the Present");
            controller.switch_to(host, Dimension::Present);
        } else {
            info!("Sandclock collected");
        }
        self.collected = true;
        true
    }
}
