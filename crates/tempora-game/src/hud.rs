//! HUD model: the rotating time icon and the matter counters

use std::sync::Arc;

use glam::Quat;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempora_core::Dimension;
use tempora_ecs::World;
use tempora_timeline::{ListenerId, TimelineController};

use crate::spawner::MatterSpawner;

/// Highest value the slot counter sprite can show
pub const MAX_COUNTER_SPRITE: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HudSettings {
    /// How fast the time icon turns toward its target
    pub icon_rotation_speed: f32,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            icon_rotation_speed: 10.0,
        }
    }
}

/// Icon orientation for a dimension: a third of a turn per step about Z
pub fn icon_rotation_for(dimension: Dimension) -> Quat {
    let degrees: f32 = match dimension {
        Dimension::Past => -120.0,
        Dimension::Present => 0.0,
        Dimension::Future => 120.0,
    };
    Quat::from_rotation_z(degrees.to_radians())
}

/// Sprite index for the number of free matter slots
pub fn spawn_counter_sprite(available: usize) -> usize {
    available.min(MAX_COUNTER_SPRITE)
}

#[derive(Debug)]
pub struct HudState {
    settings: HudSettings,
    icon_rotation: Quat,
    target: Arc<Mutex<Quat>>,
    selected_variant: usize,
    counter_sprite: usize,
}

impl HudState {
    /// Start with the icon already pointing at `current`
    pub fn new(settings: HudSettings, current: Dimension) -> Self {
        let rotation = icon_rotation_for(current);
        Self {
            settings,
            icon_rotation: rotation,
            target: Arc::new(Mutex::new(rotation)),
            selected_variant: 0,
            counter_sprite: 0,
        }
    }

    /// Follow the controller's dimension changes
    pub fn attach(&self, controller: &mut TimelineController) -> ListenerId {
        let target = Arc::clone(&self.target);
        controller.subscribe(move |dimension: Dimension| {
            *target.lock() = icon_rotation_for(dimension);
        })
    }

    /// Turn the icon toward its target
    pub fn update(&mut self, dt: f32) {
        let target = *self.target.lock();
        let t = (dt * self.settings.icon_rotation_speed).clamp(0.0, 1.0);
        self.icon_rotation = self.icon_rotation.slerp(target, t);
    }

    /// Read the spawner's counters
    pub fn refresh(&mut self, spawner: &MatterSpawner, world: &World) {
        self.selected_variant = spawner.selected_index();
        self.counter_sprite = spawn_counter_sprite(spawner.available_slots(world));
    }

    pub fn icon_rotation(&self) -> Quat {
        self.icon_rotation
    }

    pub fn target_rotation(&self) -> Quat {
        *self.target.lock()
    }

    pub fn selected_variant(&self) -> usize {
        self.selected_variant
    }

    pub fn counter_sprite(&self) -> usize {
        self.counter_sprite
    }
}
