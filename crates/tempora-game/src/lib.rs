//! Tempora Game - Gameplay around the timeline
//!
//! Matter bending, the sandclock pickup, input mapping and the HUD model.
//! Everything here talks to the timeline through its public API.

pub mod hud;
pub mod input;
pub mod sandclock;
pub mod sinker;
pub mod spawner;

pub use hud::{spawn_counter_sprite, HudSettings, HudState};
pub use input::{InputAction, InputBinding, InputBindings, InputHandler, InputState, TimeControlInput};
pub use sandclock::Sandclock;
pub use sinker::{MatterSinker, Sinking};
pub use spawner::{
    ChildVariant, Grabbable, MatterSpawner, SpawnError, SpawnTag, SpawnVariant, SpawnedMatter,
    SpawnerSettings, VariantLook,
};
