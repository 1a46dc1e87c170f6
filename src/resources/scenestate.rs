//! High-level scene state resources.
//!
//! These resources track the authoritative current scene and any pending
//! transition requested by systems. See
//! `crate::events::scenestate::observe_scene_change_event` for how a
//! transition is applied and leave hooks are invoked.

use bevy_ecs::prelude::Resource;

/// Discrete scenes the game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneStates {
    #[default]
    None,
    Boot,
    Home,
    Play,
    TeamSelect,
    TimeSelect,
    ModeSelect,
}

impl SceneStates {
    /// Config/CLI name of the scene.
    pub fn name(&self) -> &'static str {
        match self {
            SceneStates::None => "NONE",
            SceneStates::Boot => "BOOT",
            SceneStates::Home => "HOME",
            SceneStates::Play => "PLAY",
            SceneStates::TeamSelect => "TEAM-SELECT",
            SceneStates::TimeSelect => "TIME-SELECT",
            SceneStates::ModeSelect => "MODE-SELECT",
        }
    }

    /// Parse a scene name, case-insensitively.
    pub fn from_name(name: &str) -> Option<SceneStates> {
        let wanted = name.trim().to_ascii_uppercase().replace('_', "-");
        [
            SceneStates::None,
            SceneStates::Boot,
            SceneStates::Home,
            SceneStates::Play,
            SceneStates::TeamSelect,
            SceneStates::TimeSelect,
            SceneStates::ModeSelect,
        ]
        .into_iter()
        .find(|scene| scene.name() == wanted)
    }
}

/// Representation of a requested next scene.
///
/// Use [`NextSceneState::set`] to mark a transition as pending; an observer
/// will later apply it and reset the value to [`NextSceneStates::Unchanged`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NextSceneStates {
    #[default]
    Unchanged,
    Pending(SceneStates),
}

/// Authoritative current scene.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SceneState {
    current: SceneStates,
}

impl SceneState {
    /// Create a new state initialized to [`SceneStates::None`].
    pub fn new() -> Self {
        Self::default()
    }
    /// Read-only access to the current scene.
    pub fn get(&self) -> &SceneStates {
        &self.current
    }
    /// Update the current scene immediately, skipping leave hooks.
    pub fn set(&mut self, state: SceneStates) {
        self.current = state;
    }
}

/// Intent to change to a new scene.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NextSceneState {
    next: NextSceneStates,
}

impl NextSceneState {
    /// Create a new value initialized to [`NextSceneStates::Unchanged`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current transition request.
    pub fn get(&self) -> &NextSceneStates {
        &self.next
    }

    /// Request a transition to `next` by marking it as pending.
    pub fn set(&mut self, next: SceneStates) {
        self.next = NextSceneStates::Pending(next);
    }

    /// Reset to [`NextSceneStates::Unchanged`].
    pub fn reset(&mut self) {
        self.next = NextSceneStates::Unchanged;
    }
}
