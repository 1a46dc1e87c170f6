//! Session setup and the boot flow.
//!
//! A session is a [`World`] holding the master registry, asset caches,
//! font store, configuration and scene state. [`create_session`] builds one,
//! [`enter_boot`] switches it into the boot scene, [`run_boot_sequence`]
//! loads the preload and scene resources, and [`step_frame`] runs the
//! per-frame systems that turn load messages into a scene transition.

use std::path::Path;

use bevy_ecs::prelude::*;
use futures::executor::block_on;
use log::{debug, info};

use crate::events::scenestate::{SceneChangedEvent, observe_scene_change_event};
use crate::loader::boot::{BootReport, BootSequence};
use crate::loader::bulk::BulkLoader;
use crate::loader::fontloader::FontFaceLoader;
use crate::loader::progressive::LoaderIo;
use crate::manifest::fetch::ManifestFetch;
use crate::resources::assetcache::AssetCaches;
use crate::resources::fontstore::FontStore;
use crate::resources::loadbridge::{LoadBridge, setup_load_bridge};
use crate::resources::loaderconfig::LoaderConfig;
use crate::resources::masterregistry::{Master, MasterRegistry};
use crate::resources::resourcecatalog::ResourceCatalog;
use crate::resources::resourcerecord::ResourceRecord;
use crate::resources::scenestate::{NextSceneState, SceneState, SceneStates};
use crate::resources::worldtime::WorldTime;
use crate::systems::boot::boot_progress_system;
use crate::systems::loadbridge::{poll_load_messages, update_bevy_load_messages};
use crate::systems::scenestate::{check_pending_scene, scene_is_boot};
use crate::systems::time::update_world_time;

/// Build a fresh session world.
///
/// The registry comes with an empty [`ResourceCatalog`] registered; the scene
/// starts at [`SceneStates::None`].
pub fn create_session(config: LoaderConfig) -> World {
    let mut world = World::new();

    MasterRegistry::create_instance(&mut world);
    world
        .resource_mut::<MasterRegistry>()
        .register::<ResourceCatalog>();

    world.insert_resource(config);
    world.insert_resource(AssetCaches::new());
    world.insert_resource(FontStore::new());
    world.insert_resource(WorldTime::default());
    world.insert_resource(SceneState::new());
    world.insert_resource(NextSceneState::new());
    setup_load_bridge(&mut world);

    world.add_observer(observe_scene_change_event);
    world.flush();
    world
}

/// Tear down the stores of a session. The world itself stays usable.
pub fn destroy_session(world: &mut World) {
    MasterRegistry::destroy_instance(world);
    if let Some(mut caches) = world.get_resource_mut::<AssetCaches>() {
        caches.clear();
    }
    if let Some(mut fonts) = world.get_resource_mut::<FontStore>() {
        fonts.clear();
    }
    debug!("Session destroyed");
}

/// Systems run once per frame, in order.
pub fn frame_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            poll_load_messages,
            update_bevy_load_messages,
            boot_progress_system.run_if(scene_is_boot),
            check_pending_scene,
        )
            .chain(),
    );
    schedule
}

/// Advance the clock by `dt` seconds and run `schedule` once.
pub fn step_frame(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    schedule.run(world);
}

/// Switch the session into the boot scene immediately.
pub fn enter_boot(world: &mut World) {
    world.resource_mut::<NextSceneState>().set(SceneStates::Boot);
    world.trigger(SceneChangedEvent {});
}

/// Load the catalog from a manifest file into the session's registry.
pub fn load_catalog(world: &mut World, path: impl AsRef<Path>) -> Result<usize, String> {
    let mut registry = world
        .get_resource_mut::<MasterRegistry>()
        .ok_or_else(|| "MasterRegistry missing from session".to_string())?;
    let catalog = registry
        .get_mut::<ResourceCatalog>()
        .ok_or_else(|| format!("{} master not registered", ResourceCatalog::NAME))?;
    catalog.load_file(path)
}

/// Parse a manifest file into records, keeping order and duplicates.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<ResourceRecord>, String> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read manifest {:?}: {}", path, e))?;
    serde_json::from_str(&json).map_err(|e| format!("Invalid manifest {:?}: {}", path, e))
}

/// Run both boot passes against the session's catalog and caches.
///
/// Progress is published on the session's [`LoadBridge`]; run
/// [`frame_schedule`] afterwards to consume it. The passes run to completion
/// on the calling thread.
pub fn run_boot_sequence<F, B, L>(
    world: &mut World,
    scene_resources: &[ResourceRecord],
    fetch: F,
    bulk: B,
    fonts: L,
) -> Result<BootReport, String>
where
    F: ManifestFetch,
    B: BulkLoader,
    L: FontFaceLoader,
{
    let tx = world
        .get_resource::<LoadBridge>()
        .ok_or_else(|| "LoadBridge missing from session".to_string())?
        .tx
        .clone();
    let config = world
        .get_resource::<LoaderConfig>()
        .ok_or_else(|| "LoaderConfig missing from session".to_string())?
        .clone();
    if !world.contains_resource::<AssetCaches>() || !world.contains_resource::<FontStore>() {
        return Err("Asset caches missing from session".to_string());
    }

    let mut sequence = BootSequence::from_config(&config);
    world.resource_scope(|world, mut caches: Mut<AssetCaches>| {
        world.resource_scope(|world, mut font_store: Mut<FontStore>| {
            let catalog = world
                .get_resource::<MasterRegistry>()
                .and_then(|registry| registry.get::<ResourceCatalog>())
                .ok_or_else(|| "Resource catalog missing from session".to_string())?;

            let mut io = LoaderIo {
                fetch,
                bulk,
                fonts,
                caches: &mut caches,
                font_store: &mut font_store,
            };
            let report = block_on(sequence.run(catalog, scene_resources, &mut io, &tx));
            info!(
                "Boot loaded {} + {} items",
                report.preload.bulk_count + report.preload.font_count,
                report.scene.bulk_count + report.scene.font_count
            );
            Ok::<_, String>(report)
        })
    })
}

/// Step frames of `dt` seconds until the session leaves the boot scene.
///
/// Returns the number of frames stepped, or `None` if the scene did not
/// change within `max_frames`.
pub fn run_until_scene_change(world: &mut World, dt: f32, max_frames: usize) -> Option<usize> {
    let mut schedule = frame_schedule();
    for frame in 1..=max_frames {
        step_frame(world, &mut schedule, dt);
        if *world.resource::<SceneState>().get() != SceneStates::Boot {
            return Some(frame);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_registers_catalog() {
        let world = create_session(LoaderConfig::default());
        let registry = world.resource::<MasterRegistry>();
        assert!(registry.contains("resource"));
        assert!(registry.get::<ResourceCatalog>().is_some());
        assert_eq!(world.resource::<SceneState>().get(), &SceneStates::None);
    }

    #[test]
    fn test_enter_boot() {
        let mut world = create_session(LoaderConfig::default());
        enter_boot(&mut world);
        assert_eq!(world.resource::<SceneState>().get(), &SceneStates::Boot);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut a = create_session(LoaderConfig::default());
        let b = create_session(LoaderConfig::default());
        a.resource_mut::<MasterRegistry>()
            .get_mut::<ResourceCatalog>()
            .unwrap()
            .store(ResourceRecord::new(
                "x",
                crate::resources::resourcerecord::ResourceCategory::Home,
                crate::resources::resourcerecord::ResourceType::Image,
                "/x.png",
            ));
        let count = |w: &World| {
            w.resource::<MasterRegistry>()
                .get::<ResourceCatalog>()
                .unwrap()
                .len()
        };
        assert_eq!(count(&a), 1);
        assert_eq!(count(&b), 0);
    }

    #[test]
    fn test_destroy_session_removes_registry() {
        let mut world = create_session(LoaderConfig::default());
        destroy_session(&mut world);
        assert!(!world.contains_resource::<MasterRegistry>());
        destroy_session(&mut world);
    }
}
