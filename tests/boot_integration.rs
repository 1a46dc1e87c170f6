//! Boot flow integration tests.
//!
//! Drives a whole session: catalog preload, scene load, the progress bar,
//! the scene transition and the eviction of boot-only assets.

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;
use serde_json::json;

use skframework::events::loadmessage::{BootStage, LoadMessage};
use skframework::events::scenestate::SceneChangedEvent;
use skframework::game::{
    create_session, enter_boot, frame_schedule, load_catalog, run_boot_sequence,
    run_until_scene_change, step_frame,
};
use skframework::loader::bulk::FsBulkLoader;
use skframework::loader::fontloader::FsFontFaceLoader;
use skframework::manifest::fetch::FsFetch;
use skframework::resources::assetcache::AssetCaches;
use skframework::resources::bootprogress::BootProgress;
use skframework::resources::fontstore::FontStore;
use skframework::resources::loaderconfig::LoaderConfig;
use skframework::resources::masterregistry::MasterRegistry;
use skframework::resources::resourcecatalog::ResourceCatalog;
use skframework::resources::resourcerecord::{ResourceCategory, ResourceRecord, ResourceType};
use skframework::resources::scenestate::{NextSceneState, SceneState, SceneStates};
use skframework::systems::loadbridge::{poll_load_messages, update_bevy_load_messages};

const DT: f32 = 1.0 / 60.0;

struct Assets {
    dir: tempfile::TempDir,
}

impl Assets {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("boot")).unwrap();
        std::fs::create_dir_all(root.join("home")).unwrap();
        std::fs::create_dir_all(root.join("internal/common/font")).unwrap();
        std::fs::write(root.join("boot/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        std::fs::write(root.join("boot/jingle.mp3"), b"ID3").unwrap();
        std::fs::write(root.join("boot/boot.json"), br#"{"title": "loading"}"#).unwrap();
        std::fs::write(root.join("home/click.mp3"), b"ID3").unwrap();
        std::fs::write(root.join("home/bgm.mp3"), b"ID3").unwrap();
        std::fs::write(root.join("home/layout.json"), br#"{"fontFamily": "Title", "key": "bg.png"}"#).unwrap();
        std::fs::write(root.join("internal/bg.png"), [0x89, b'P', b'N', b'G']).unwrap();
        std::fs::write(root.join("internal/common/font/Title.ttf"), [0u8, 1, 0, 0, 0, 0]).unwrap();
        std::fs::write(
            root.join("catalog.json"),
            json!([
                {"id": "logo", "category": "BOOT", "type": "IMAGE", "path": "/boot/logo.png"},
                {"id": "jingle", "category": "BOOT", "type": "AUDIO", "path": "/boot/jingle.mp3"},
                {"id": "boot.json", "category": "BOOT", "type": "JSON", "path": "/boot/boot.json"},
                {"id": "click", "category": "BOOT_COMMON", "type": "AUDIO", "path": "/home/click.mp3"},
                {"id": "bgm", "category": "HOME", "type": "AUDIO", "path": "/home/bgm.mp3"}
            ])
            .to_string(),
        )
        .unwrap();
        Assets { dir }
    }

    fn config(&self) -> LoaderConfig {
        LoaderConfig {
            asset_root: self.dir.path().to_path_buf(),
            ..LoaderConfig::default()
        }
    }

    fn scene(&self) -> Vec<ResourceRecord> {
        vec![
            ResourceRecord::new("bgm", ResourceCategory::Home, ResourceType::Audio, "/home/bgm.mp3"),
            ResourceRecord::new("layout.json", ResourceCategory::Home, ResourceType::Json, "/home/layout.json")
                .with_param1(true),
        ]
    }
}

fn booted_session(assets: &Assets) -> World {
    let mut world = create_session(assets.config());
    load_catalog(&mut world, assets.dir.path().join("catalog.json")).unwrap();
    enter_boot(&mut world);
    let root = assets.dir.path();
    run_boot_sequence(
        &mut world,
        &assets.scene(),
        FsFetch::new(root),
        FsBulkLoader::new(root),
        FsFontFaceLoader::new(root),
    )
    .unwrap();
    world
}

#[test]
fn catalog_is_loaded_into_registry() {
    let assets = Assets::new();
    let mut world = create_session(assets.config());
    let accepted = load_catalog(&mut world, assets.dir.path().join("catalog.json")).unwrap();
    assert_eq!(accepted, 5);
    let registry = world.resource::<MasterRegistry>();
    let catalog = registry.get::<ResourceCatalog>().unwrap();
    assert_eq!(catalog.get_by_category(&[ResourceCategory::Boot]).len(), 3);
}

#[test]
fn boot_sequence_fills_caches_and_publishes_messages() {
    let assets = Assets::new();
    let mut world = booted_session(&assets);

    {
        let caches = world.resource::<AssetCaches>();
        assert!(caches.textures.has("logo"));
        assert!(caches.audio.has("jingle"));
        assert!(caches.audio.has("click"));
        assert!(caches.audio.has("bgm"));
        assert!(caches.textures.has("bg.png"));
        assert!(world.resource::<FontStore>().get("Title").is_some());
    }

    let mut schedule = Schedule::default();
    schedule.add_systems((poll_load_messages, update_bevy_load_messages).chain());
    schedule.run(&mut world);

    let mut state = SystemState::<MessageReader<LoadMessage>>::new(&mut world);
    let mut reader = state.get_mut(&mut world);
    let messages: Vec<LoadMessage> = reader.read().cloned().collect();
    assert!(messages.contains(&LoadMessage::StageComplete {
        stage: BootStage::Preload
    }));
    assert_eq!(
        messages.last(),
        Some(&LoadMessage::StageComplete {
            stage: BootStage::Scene
        })
    );
    let scene_progress: Vec<f32> = messages
        .iter()
        .filter_map(|m| match m {
            LoadMessage::Progress {
                stage: BootStage::Scene,
                value,
            } => Some(*value),
            _ => None,
        })
        .collect();
    assert!(scene_progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(scene_progress.last(), Some(&1.0));
}

#[test]
fn progress_bar_leads_to_next_scene_and_evicts_boot_assets() {
    let assets = Assets::new();
    let mut world = booted_session(&assets);

    let mut schedule = frame_schedule();
    step_frame(&mut world, &mut schedule, DT);
    let bar = world.resource::<BootProgress>();
    assert_eq!(bar.target(), 1.0);
    assert!(bar.displayed() < 1.0);
    assert_eq!(world.resource::<SceneState>().get(), &SceneStates::Boot);

    let frames = run_until_scene_change(&mut world, DT, 600).expect("boot never finished");
    assert!(frames > 1);
    assert_eq!(world.resource::<SceneState>().get(), &SceneStates::Home);

    let caches = world.resource::<AssetCaches>();
    assert!(!caches.textures.has("logo"));
    assert!(!caches.audio.has("jingle"));
    assert!(!caches.json.has("boot.json"));
    assert!(caches.audio.has("click"));
    assert!(caches.audio.has("bgm"));
}

fn step_until_scene_change(world: &mut World, schedule: &mut Schedule, max_frames: usize) -> Option<usize> {
    (1..=max_frames).find(|_| {
        step_frame(world, schedule, DT);
        *world.resource::<SceneState>().get() != SceneStates::Boot
    })
}

#[test]
fn boot_can_run_twice_on_one_schedule() {
    let assets = Assets::new();
    let mut world = create_session(assets.config());
    load_catalog(&mut world, assets.dir.path().join("catalog.json")).unwrap();
    let mut schedule = frame_schedule();
    let root = assets.dir.path();

    for round in 0..2 {
        enter_boot(&mut world);
        assert!(
            world.get_resource::<BootProgress>().is_none(),
            "round {} started with a stale bar",
            round
        );
        run_boot_sequence(
            &mut world,
            &assets.scene(),
            FsFetch::new(root),
            FsBulkLoader::new(root),
            FsFontFaceLoader::new(root),
        )
        .unwrap();

        let frames = step_until_scene_change(&mut world, &mut schedule, 600);
        assert!(frames.is_some(), "round {} never left boot", round);
        assert_eq!(world.resource::<SceneState>().get(), &SceneStates::Home);
        assert!(world.get_resource::<BootProgress>().is_none());
        assert!(!world.resource::<AssetCaches>().textures.has("logo"));
    }
}

#[test]
fn configured_next_scene_is_used() {
    let assets = Assets::new();
    let mut config = assets.config();
    config.next_scene = SceneStates::TeamSelect;
    let mut world = create_session(config);
    load_catalog(&mut world, assets.dir.path().join("catalog.json")).unwrap();
    enter_boot(&mut world);
    let root = assets.dir.path();
    run_boot_sequence(
        &mut world,
        &[],
        FsFetch::new(root),
        FsBulkLoader::new(root),
        FsFontFaceLoader::new(root),
    )
    .unwrap();

    run_until_scene_change(&mut world, 0.5, 10).expect("boot never finished");
    assert_eq!(world.resource::<SceneState>().get(), &SceneStates::TeamSelect);
}

#[test]
fn scene_change_without_pending_is_ignored() {
    let mut world = create_session(LoaderConfig::default());
    world.trigger(SceneChangedEvent {});
    world.flush();
    assert_eq!(world.resource::<SceneState>().get(), &SceneStates::None);

    world.resource_mut::<NextSceneState>().set(SceneStates::Play);
    world.trigger(SceneChangedEvent {});
    world.flush();
    assert_eq!(world.resource::<SceneState>().get(), &SceneStates::Play);
}

#[test]
fn leaving_boot_without_registry_keeps_caches() {
    let assets = Assets::new();
    let mut world = booted_session(&assets);
    MasterRegistry::destroy_instance(&mut world);

    world.resource_mut::<NextSceneState>().set(SceneStates::Home);
    world.trigger(SceneChangedEvent {});
    world.flush();

    assert_eq!(world.resource::<SceneState>().get(), &SceneStates::Home);
    assert!(world.resource::<AssetCaches>().textures.has("logo"));
}
