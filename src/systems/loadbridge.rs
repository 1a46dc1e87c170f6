//! Systems moving load messages from the channel into the ECS mailbox.
//!
//! Run [`poll_load_messages`] then [`update_bevy_load_messages`] once per
//! frame, before any system that reads
//! [`LoadMessage`](crate::events::loadmessage::LoadMessage).

use crate::events::loadmessage::LoadMessage;
use crate::resources::loadbridge::LoadBridge;
use bevy_ecs::prelude::{MessageWriter, Messages, Res, ResMut};

/// Drain every pending [`LoadMessage`] from the bridge without blocking.
pub fn poll_load_messages(bridge: Res<LoadBridge>, mut writer: MessageWriter<LoadMessage>) {
    writer.write_batch(bridge.rx.try_iter());
}

/// Advance the [`Messages<LoadMessage>`] double buffer.
pub fn update_bevy_load_messages(mut messages: ResMut<Messages<LoadMessage>>) {
    messages.update();
}
