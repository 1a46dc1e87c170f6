//! ECS resources and the stores behind them.
//!
//! This module groups the long-lived data injected into a session world:
//! record stores, asset caches, configuration and scene state. Each
//! submodule documents the semantics of its resource(s).
//!
//! Overview
//! - `assetcache` – loaded audio/texture/JSON/spine/video payloads by id
//! - `bootprogress` – boot progress bar model
//! - `fontstore` – decoded font faces by family name
//! - `loadbridge` – channel between the boot sequence and the world
//! - `loaderconfig` – asset locations and loader settings from INI
//! - `masterregistry` – name-keyed directory of record stores
//! - `recordstore` – generic id-indexed, order-preserving store
//! - `resourcecatalog` – the resource record store
//! - `resourcerecord` – manifest entry model
//! - `scenestate` – authoritative and pending scene
//! - `worldtime` – frame time
pub mod assetcache;
pub mod bootprogress;
pub mod fontstore;
pub mod loadbridge;
pub mod loaderconfig;
pub mod masterregistry;
pub mod recordstore;
pub mod resourcecatalog;
pub mod resourcerecord;
pub mod scenestate;
pub mod worldtime;
