//! MixConsole - mixing console routing graph and channel strip presets
//!
//! This library owns the in-memory signal-routing graph of a mixing console
//! and the preset engine that stamps configurations onto its channels.

#![deny(warnings)]

pub mod audio_sync;
pub mod config;
pub mod effects;
pub mod error;
pub mod mixer;
pub mod presets;
pub mod serializer;

pub use audio_sync::{AudioSync, ConsoleChange};
pub use error::{ConsoleError, EntityKind};
pub use mixer::{BusChannel, BusType, ChannelStrip, ChannelType, MixingConsole};
pub use presets::{ChannelStripPreset, PresetCategory, PresetManager};
