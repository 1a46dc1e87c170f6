//! ECS resource bridging the boot sequence with the world.
//!
//! Use [`setup_load_bridge`] once during initialization; it inserts the
//! [`LoadBridge`] and the `Messages<LoadMessage>` mailbox. The boot sequence
//! writes to a clone of [`LoadBridge::tx`] while systems drain
//! [`LoadBridge::rx`].

use crate::events::loadmessage::LoadMessage;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Shared channel between the loading pipeline and the ECS world.
#[derive(Resource)]
pub struct LoadBridge {
    /// Sender handed to [`BootSequence::run`](crate::loader::boot::BootSequence::run).
    pub tx: Sender<LoadMessage>,
    /// Receiver drained by
    /// [`poll_load_messages`](crate::systems::loadbridge::poll_load_messages).
    pub rx: Receiver<LoadMessage>,
}

/// Create the load channel and register the bridge resources.
///
/// Calling it again replaces the bridge; messages still queued in the old
/// channel are lost.
pub fn setup_load_bridge(world: &mut World) {
    let (tx, rx) = unbounded::<LoadMessage>();
    world.insert_resource(LoadBridge { tx, rx });
    world.insert_resource(Messages::<LoadMessage>::default());
}
