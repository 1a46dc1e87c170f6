//! Frame time of the session.
//!
//! Written once per frame by
//! [`update_world_time`](crate::systems::time::update_world_time) and read
//! by systems that animate over time, such as the boot progress bar.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub time_scale: f32,
    /// Frames stepped since the session started.
    pub frames: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frames: 0,
        }
    }
}
