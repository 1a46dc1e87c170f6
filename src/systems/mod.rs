//! Session systems.
//!
//! Submodules overview
//! - [`boot`] – drive the boot progress bar and leave the boot scene when full
//! - [`loadbridge`] – move load messages from the channel into the ECS mailbox
//! - [`scenestate`] – trigger pending scene transitions
//! - [`time`] – advance the frame clock

pub mod boot;
pub mod loadbridge;
pub mod scenestate;
pub mod time;
