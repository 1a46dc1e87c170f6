//! Event and message types exchanged across systems.
//!
//! Submodules:
//! - [`loadmessage`] – progress and completion messages of the boot sequence
//! - [`scenestate`] – scene transition event and the observer applying it
pub mod loadmessage;
pub mod scenestate;
