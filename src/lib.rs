//! skframework library.
//!
//! Resource manifest extraction and progressive loading for browser-style
//! games, organised as an ECS session: the record stores, caches and scene
//! state live as resources in a `bevy_ecs` world.

pub mod events;
pub mod game;
pub mod loader;
pub mod manifest;
pub mod resources;
pub mod systems;
