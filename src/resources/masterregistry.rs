//! Directory of named record stores ("masters") for one game session.
//!
//! Each store type declares a static [`Master::NAME`]; the registry owns one
//! instance per name. The registry is an ECS resource, so a `World` is the
//! session that scopes it: [`MasterRegistry::create_instance`] and
//! [`MasterRegistry::destroy_instance`] are idempotent lifecycle calls on a
//! world, and independent worlds never share stores.
//!
//! Lookups never panic: a miss is logged and reported as `None`.

use std::any::Any;

use bevy_ecs::prelude::{Resource, World};
use log::{debug, error};
use rustc_hash::FxHashMap;

/// A store type that can live in the [`MasterRegistry`].
pub trait Master: Any + Send + Sync + Default {
    /// Registry key of this store type.
    const NAME: &'static str;
}

/// Set of master types registered together, e.g. `(ResourceCatalog, Other)`.
pub trait MasterSet {
    fn register_into(registry: &mut MasterRegistry);
}

macro_rules! impl_master_set_tuple {
    ($($m:ident),+) => {
        impl<$($m: Master),+> MasterSet for ($($m,)+) {
            fn register_into(registry: &mut MasterRegistry) {
                $(registry.register::<$m>();)+
            }
        }
    };
}

impl_master_set_tuple!(A);
impl_master_set_tuple!(A, B);
impl_master_set_tuple!(A, B, C);
impl_master_set_tuple!(A, B, C, D);
impl_master_set_tuple!(A, B, C, D, E);

/// Name-keyed directory of master stores.
#[derive(Resource, Default)]
pub struct MasterRegistry {
    masters: FxHashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl MasterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an empty registry into `world` unless one already exists.
    pub fn create_instance(world: &mut World) {
        if !world.contains_resource::<MasterRegistry>() {
            world.insert_resource(MasterRegistry::new());
        }
    }

    /// Destroy and remove the registry from `world`, if present.
    pub fn destroy_instance(world: &mut World) {
        if let Some(mut registry) = world.remove_resource::<MasterRegistry>() {
            registry.destroy();
        }
    }

    /// Instantiate and register `M` under [`Master::NAME`].
    ///
    /// An already-registered name is logged and left untouched; returns
    /// whether a new store was created.
    pub fn register<M: Master>(&mut self) -> bool {
        if self.masters.contains_key(M::NAME) {
            error!("{} has already registered!", M::NAME);
            return false;
        }
        debug!("Registering master {}", M::NAME);
        self.masters.insert(M::NAME, Box::new(M::default()));
        true
    }

    /// Register every master type of a [`MasterSet`] in order.
    pub fn register_all<S: MasterSet>(&mut self) {
        S::register_into(self);
    }

    /// Store of type `M`, looked up by its declared name.
    pub fn get<M: Master>(&self) -> Option<&M> {
        self.get_named::<M>(M::NAME)
    }

    pub fn get_mut<M: Master>(&mut self) -> Option<&mut M> {
        self.get_named_mut::<M>(M::NAME)
    }

    /// Store of type `M` registered under an explicit `name`.
    pub fn get_named<M: Master>(&self, name: &str) -> Option<&M> {
        let Some(master) = self.masters.get(name) else {
            error!("{} not found!", name);
            return None;
        };
        let found = master.downcast_ref::<M>();
        if found.is_none() {
            error!("{} is not a {}", name, std::any::type_name::<M>());
        }
        found
    }

    pub fn get_named_mut<M: Master>(&mut self, name: &str) -> Option<&mut M> {
        let Some(master) = self.masters.get_mut(name) else {
            error!("{} not found!", name);
            return None;
        };
        let found = master.downcast_mut::<M>();
        if found.is_none() {
            error!("{} is not a {}", name, std::any::type_name::<M>());
        }
        found
    }

    pub fn contains(&self, name: &str) -> bool {
        self.masters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.masters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masters.is_empty()
    }

    /// Drop every registered store.
    pub fn destroy(&mut self) {
        self.masters.clear();
    }
}
