//! Tempora ECS - Entity arena and component storage
//!
//! Entities are generational handles: a destroyed entity's handle never
//! aliases a later one, so registries can hold plain copies of handles and
//! check them for liveness before use.

mod component;
mod entity;
mod world;

pub use component::Component;
pub use entity::Entity;
pub use world::World;
