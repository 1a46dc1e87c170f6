//! Messages emitted by the boot sequence while it loads.
//!
//! The boot sequence pushes [`LoadMessage`]s into a crossbeam channel; the
//! [`LoadBridge`](crate::resources::loadbridge::LoadBridge) receiver is
//! drained into the ECS mailbox each frame by
//! [`poll_load_messages`](crate::systems::loadbridge::poll_load_messages).

use bevy_ecs::message::Message;

/// Which of the two boot passes a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootStage {
    /// `BOOT` + `BOOT_COMMON` resources from the catalog.
    Preload,
    /// The resources of the scene booted into.
    Scene,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub enum LoadMessage {
    /// Cumulative weighted progress of a stage, in `[0, 1]`.
    Progress { stage: BootStage, value: f32 },
    /// Manifest extraction finished for a stage.
    Extracted {
        stage: BootStage,
        errors: usize,
        duplicated_keys: usize,
        duplicated_paths: usize,
    },
    /// Every bulk item and font of a stage has settled. Sent once per stage.
    StageComplete { stage: BootStage },
}
