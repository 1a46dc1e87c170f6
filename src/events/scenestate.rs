//! Scene transition event and observer.
//!
//! Systems request a scene change by updating [`NextSceneState`];
//! [`check_pending_scene`](crate::systems::scenestate::check_pending_scene)
//! then triggers a [`SceneChangedEvent`] and the observer here applies it.
//! Leaving the boot scene evicts the boot-only assets from the caches and
//! drops the progress bar.
use crate::loader::boot::evict_boot_resources;
use crate::resources::assetcache::AssetCaches;
use crate::resources::bootprogress::BootProgress;
use crate::resources::masterregistry::MasterRegistry;
use crate::resources::resourcecatalog::ResourceCatalog;
use crate::resources::scenestate::NextSceneStates::{Pending, Unchanged};
use crate::resources::scenestate::{NextSceneState, SceneState, SceneStates};
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};

/// Applies the scene pending in [`NextSceneState`], if any.
#[derive(Event, Debug, Clone, Copy)]
pub struct SceneChangedEvent {}

/// Observer that applies a pending scene transition.
///
/// Copies the pending scene into [`SceneState`], runs the leave hook of the
/// previous scene and resets [`NextSceneState`]. Missing state resources are
/// logged and the event is ignored.
pub fn observe_scene_change_event(
    _trigger: On<SceneChangedEvent>,
    mut commands: Commands,
    mut next_scene: Option<ResMut<NextSceneState>>,
    mut scene: Option<ResMut<SceneState>>,
    registry: Option<Res<MasterRegistry>>,
    caches: Option<ResMut<AssetCaches>>,
) {
    debug!("SceneChangedEvent triggered");

    if let (Some(next), Some(current)) = (next_scene.as_deref_mut(), scene.as_deref_mut()) {
        match *next.get() {
            Pending(new_scene) => {
                let old_scene = *current.get();
                info!("Transitioning from {:?} to {:?}", old_scene, new_scene);
                current.set(new_scene);
                next.reset();
                on_scene_leave(&mut commands, old_scene, registry.as_deref(), caches);
            }
            Unchanged => debug!("No scene change pending."),
        }
    } else {
        warn!(
            "One or more resources missing in observe_scene_change_event. next_scene: {:?}, scene: {:?}",
            next_scene.is_some(),
            scene.is_some()
        );
    }
}

fn on_scene_leave(
    commands: &mut Commands,
    scene: SceneStates,
    registry: Option<&MasterRegistry>,
    caches: Option<ResMut<AssetCaches>>,
) {
    if scene != SceneStates::Boot {
        debug!("Left {:?}", scene);
        return;
    }
    commands.remove_resource::<BootProgress>();
    let catalog = registry.and_then(|registry| registry.get::<ResourceCatalog>());
    match (catalog, caches) {
        (Some(catalog), Some(mut caches)) => {
            let evicted = evict_boot_resources(catalog, &mut caches);
            info!("Evicted {} boot resources", evicted);
        }
        _ => warn!("Can not evict boot resources: catalog or caches missing"),
    }
}
