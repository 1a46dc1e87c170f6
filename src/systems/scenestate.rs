//! Scene transition trigger.
use crate::events::scenestate::SceneChangedEvent;
use crate::resources::scenestate::{NextSceneState, NextSceneStates, SceneState, SceneStates};
use bevy_ecs::prelude::*;

/// Trigger a [`SceneChangedEvent`] when a scene change is pending.
pub fn check_pending_scene(mut commands: Commands, next_scene: Res<NextSceneState>) {
    if let NextSceneStates::Pending(_) = next_scene.get() {
        commands.trigger(SceneChangedEvent {});
    }
}

/// Run condition: the session is in the boot scene.
pub fn scene_is_boot(scene: Res<SceneState>) -> bool {
    matches!(scene.get(), SceneStates::Boot)
}
