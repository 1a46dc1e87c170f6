//! Frame clock.
//!
//! The session has no render loop of its own; whoever drives it (the CLI's
//! headless boot, a host engine, tests) calls [`update_world_time`] with the
//! real frame delta before running the frame schedule.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance [`WorldTime`] by `dt` unscaled seconds.
///
/// Inserts a default clock if the world has none yet.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.get_resource_or_insert_with(WorldTime::default);
    let scaled_dt = dt.max(0.0) * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frames += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_applies_time_scale() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            time_scale: 0.5,
            ..WorldTime::default()
        });
        update_world_time(&mut world, 0.5);
        update_world_time(&mut world, 0.5);
        let wt = world.resource::<WorldTime>();
        assert_eq!(wt.delta, 0.25);
        assert_eq!(wt.elapsed, 0.5);
        assert_eq!(wt.frames, 2);
    }

    #[test]
    fn test_update_inserts_missing_clock() {
        let mut world = World::new();
        update_world_time(&mut world, 1.0 / 60.0);
        assert_eq!(world.resource::<WorldTime>().frames, 1);
    }
}
