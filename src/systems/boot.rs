//! Boot scene progress bar driver.
//!
//! Consumes [`LoadMessage`]s: the [`BootProgress`] bar is created when the
//! preload stage completes, follows the scene stage's progress, and once it
//! is visibly full requests the configured next scene through
//! [`NextSceneState`]. The request is made once per bar; leaving the boot
//! scene removes the bar, so the next boot starts over.

use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::events::loadmessage::{BootStage, LoadMessage};
use crate::resources::bootprogress::BootProgress;
use crate::resources::loaderconfig::LoaderConfig;
use crate::resources::scenestate::{NextSceneState, NextSceneStates, SceneState, SceneStates};
use crate::resources::worldtime::WorldTime;

/// Feed load messages into the progress bar and leave the boot scene once
/// it is full.
#[allow(clippy::too_many_arguments)]
pub fn boot_progress_system(
    mut commands: Commands,
    mut reader: MessageReader<LoadMessage>,
    mut progress: Option<ResMut<BootProgress>>,
    time: Res<WorldTime>,
    config: Res<LoaderConfig>,
    scene: Res<SceneState>,
    mut next_scene: ResMut<NextSceneState>,
    mut requested: Local<bool>,
) {
    if progress.is_none() {
        *requested = false;
    }
    let mut created: Option<BootProgress> = None;

    for message in reader.read() {
        match *message {
            LoadMessage::StageComplete {
                stage: BootStage::Preload,
            } => {
                if progress.is_none() && created.is_none() {
                    info!("Preload complete, showing progress bar");
                    created = Some(BootProgress::default());
                }
            }
            LoadMessage::Progress {
                stage: BootStage::Scene,
                value,
            } => {
                if let Some(bar) = progress.as_deref_mut().or(created.as_mut()) {
                    bar.set_progress(value);
                }
            }
            LoadMessage::StageComplete {
                stage: BootStage::Scene,
            } => {
                if let Some(bar) = progress.as_deref_mut().or(created.as_mut()) {
                    bar.set_progress(1.0);
                }
            }
            LoadMessage::Extracted {
                stage,
                errors,
                duplicated_keys,
                ..
            } => {
                if errors > 0 || duplicated_keys > 0 {
                    warn!(
                        "{:?} manifest: {} fetch errors, {} duplicated keys",
                        stage, errors, duplicated_keys
                    );
                }
            }
            LoadMessage::Progress {
                stage: BootStage::Preload,
                ..
            } => {}
        }
    }

    let full = match progress.as_deref_mut().or(created.as_mut()) {
        Some(bar) => {
            bar.advance(time.delta);
            bar.is_full()
        }
        None => false,
    };

    if full
        && !*requested
        && *scene.get() == SceneStates::Boot
        && *next_scene.get() == NextSceneStates::Unchanged
    {
        info!("Boot finished, requesting {:?}", config.next_scene);
        next_scene.set(config.next_scene);
        *requested = true;
    }

    if let Some(bar) = created {
        commands.insert_resource(bar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::loadbridge::update_bevy_load_messages;

    fn world() -> World {
        let mut world = World::new();
        world.insert_resource(Messages::<LoadMessage>::default());
        world.insert_resource(WorldTime {
            delta: 0.5,
            ..WorldTime::default()
        });
        world.insert_resource(LoaderConfig::default());
        let mut scene = SceneState::new();
        scene.set(SceneStates::Boot);
        world.insert_resource(scene);
        world.insert_resource(NextSceneState::new());
        world
    }

    fn schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems((update_bevy_load_messages, boot_progress_system).chain());
        schedule
    }

    #[test]
    fn test_bar_created_after_preload() {
        let mut world = world();
        let mut schedule = schedule();

        world.write_message(LoadMessage::Progress {
            stage: BootStage::Preload,
            value: 0.5,
        });
        schedule.run(&mut world);
        assert!(world.get_resource::<BootProgress>().is_none());

        world.write_message(LoadMessage::StageComplete {
            stage: BootStage::Preload,
        });
        world.write_message(LoadMessage::Progress {
            stage: BootStage::Scene,
            value: 0.4,
        });
        schedule.run(&mut world);
        let bar = world.resource::<BootProgress>();
        assert_eq!(bar.target(), 0.4);
        assert_eq!(bar.displayed(), 0.4);
    }

    #[test]
    fn test_requests_next_scene_once_full() {
        let mut world = world();
        let mut schedule = schedule();

        world.write_message(LoadMessage::StageComplete {
            stage: BootStage::Preload,
        });
        world.write_message(LoadMessage::StageComplete {
            stage: BootStage::Scene,
        });
        schedule.run(&mut world);
        assert_eq!(world.resource::<NextSceneState>().get(), &NextSceneStates::Unchanged);

        schedule.run(&mut world);
        assert_eq!(
            world.resource::<NextSceneState>().get(),
            &NextSceneStates::Pending(SceneStates::Home)
        );

        world.resource_mut::<NextSceneState>().reset();
        schedule.run(&mut world);
        assert_eq!(world.resource::<NextSceneState>().get(), &NextSceneStates::Unchanged);
    }

    #[test]
    fn test_new_bar_requests_again() {
        let mut world = world();
        let mut schedule = schedule();

        for _ in 0..2 {
            world.write_message(LoadMessage::StageComplete {
                stage: BootStage::Preload,
            });
            world.write_message(LoadMessage::StageComplete {
                stage: BootStage::Scene,
            });
            schedule.run(&mut world);
            schedule.run(&mut world);
            assert_eq!(
                world.resource::<NextSceneState>().get(),
                &NextSceneStates::Pending(SceneStates::Home)
            );

            world.resource_mut::<NextSceneState>().reset();
            world.remove_resource::<BootProgress>();
            schedule.run(&mut world);
            assert!(world.get_resource::<BootProgress>().is_none());
        }
    }
}
