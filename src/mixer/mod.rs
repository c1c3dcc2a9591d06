//! Mixer module - channel strips, buses and the console that owns them
//!
//! `MixingConsole` is the routing graph. It is the only place the graph
//! invariants are enforced; everything else reads from it or calls into it.

pub mod routing;


use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::audio_sync::ConsoleChange;
use crate::effects::{InsertSlot, Send};
use crate::error::{ConsoleError, Result};

/// Id of the master strip every console owns
pub const MASTER_ID: &str = "master";

/// Default fader level for new strips
pub const DEFAULT_VOLUME: f32 = 0.8;

/// Kind of channel strip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    #[default]
    Audio,
    Midi,
    Bus,
    Master,
}

/// Kind of bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    Reverb,
    Delay,
    Compressor,
    Eq,
    #[default]
    Subgroup,
    Master,
    Aux,
    Fx,
}

/// Stereo levels for a meter (0.0 - 1.0)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoLevels {
    pub left: f32,
    pub right: f32,
}

impl StereoLevels {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }
}

/// Display-only metering state. Never read by routing or solo logic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Meter {
    pub level: StereoLevels,
    pub peak: StereoLevels,
}

impl Meter {
    /// Overwrite the current level, holding the peak
    pub fn update(&mut self, level: StereoLevels) {
        self.level = level;
        self.peak.left = self.peak.left.max(level.left);
        self.peak.right = self.peak.right.max(level.right);
    }

    /// Let peaks fall toward the current level
    pub fn decay(&mut self, rate: f32) {
        self.peak.left = (self.peak.left - rate).max(self.level.left).max(0.0);
        self.peak.right = (self.peak.right - rate).max(self.level.right).max(0.0);
    }
}

/// A mixable signal path (track)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStrip {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    /// Volume level (0.0 - 1.0)
    pub volume: f32,
    /// Pan position (-1.0 = full left, 0.0 = center, 1.0 = full right)
    pub pan: f32,
    #[serde(default)]
    pub is_muted: bool,
    #[serde(default)]
    pub is_solo: bool,
    /// Insert chain in signal order
    #[serde(default)]
    pub inserts: Vec<InsertSlot>,
    #[serde(default)]
    pub sends: Vec<Send>,
    #[serde(default)]
    pub output_bus: String,
    #[serde(skip)]
    pub meter: Meter,
}

impl ChannelStrip {
    pub fn new(id: &str, name: &str, channel_type: ChannelType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            channel_type,
            volume: DEFAULT_VOLUME,
            pan: 0.0,
            is_muted: false,
            is_solo: false,
            inserts: Vec::new(),
            sends: Vec::new(),
            output_bus: MASTER_ID.to_string(),
            meter: Meter::default(),
        }
    }

    pub fn audio(id: &str, name: &str) -> Self {
        Self::new(id, name, ChannelType::Audio)
    }

    pub fn master() -> Self {
        Self {
            volume: 1.0,
            output_bus: String::new(),
            ..Self::new(MASTER_ID, "Master", ChannelType::Master)
        }
    }

    pub fn is_master(&self) -> bool {
        self.channel_type == ChannelType::Master
    }
}

/// An aggregation point that sums member channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusChannel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub bus_type: BusType,
    /// Member channel ids (no duplicates)
    #[serde(default)]
    pub channels: Vec<String>,
    pub volume: f32,
    pub pan: f32,
    #[serde(default)]
    pub is_muted: bool,
    #[serde(default)]
    pub sends: Vec<Send>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(skip)]
    pub meter: Meter,
}

impl BusChannel {
    pub fn new(id: &str, name: &str, bus_type: BusType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            bus_type,
            channels: Vec::new(),
            volume: DEFAULT_VOLUME,
            pan: 0.0,
            is_muted: false,
            sends: Vec::new(),
            icon: String::new(),
            color: String::new(),
            meter: Meter::default(),
        }
    }

    pub fn has_member(&self, channel_id: &str) -> bool {
        self.channels.iter().any(|c| c == channel_id)
    }
}

/// The routing graph - owns all channel strips, buses and the master strip
#[derive(Debug, Clone, PartialEq)]
pub struct MixingConsole {
    id: String,
    channels: Vec<ChannelStrip>,
    buses: Vec<BusChannel>,
    master: ChannelStrip,
}

impl Default for MixingConsole {
    fn default() -> Self {
        Self::new("console")
    }
}

impl MixingConsole {
    /// Create an empty console with only the master strip
    pub fn new(id: &str) -> Self {
        Self::with_master(id, ChannelStrip::master())
    }

    /// Create an empty console around an existing master strip
    pub fn with_master(id: &str, mut master: ChannelStrip) -> Self {
        master.channel_type = ChannelType::Master;
        master.is_solo = false;
        Self {
            id: id.to_string(),
            channels: Vec::new(),
            buses: Vec::new(),
            master,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// All non-master channel strips, in insertion order
    pub fn channels(&self) -> &[ChannelStrip] {
        &self.channels
    }

    pub fn buses(&self) -> &[BusChannel] {
        &self.buses
    }

    pub fn master(&self) -> &ChannelStrip {
        &self.master
    }

    pub fn master_mut(&mut self) -> &mut ChannelStrip {
        &mut self.master
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    /// Look up a channel strip (including the master strip)
    pub fn get_channel(&self, id: &str) -> Option<&ChannelStrip> {
        if id == self.master.id {
            return Some(&self.master);
        }
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn get_channel_mut(&mut self, id: &str) -> Option<&mut ChannelStrip> {
        if id == self.master.id {
            return Some(&mut self.master);
        }
        self.channels.iter_mut().find(|c| c.id == id)
    }

    pub fn get_bus(&self, id: &str) -> Option<&BusChannel> {
        self.buses.iter().find(|b| b.id == id)
    }

    pub fn get_bus_mut(&mut self, id: &str) -> Option<&mut BusChannel> {
        self.buses.iter_mut().find(|b| b.id == id)
    }

    /// Mutable channel lookup that reports `NotFound`
    fn channel_mut_or_err(&mut self, id: &str) -> Result<&mut ChannelStrip> {
        match self.get_channel_mut(id) {
            Some(channel) => Ok(channel),
            None => {
                warn!(channel = id, "channel not found");
                Err(ConsoleError::channel_not_found(id))
            }
        }
    }

    /// Add a channel strip
    ///
    /// The id must be unique across channels and the master strip, and a
    /// console never holds a second master.
    pub fn add_channel(&mut self, strip: ChannelStrip) -> Result<ConsoleChange> {
        if strip.is_master() {
            return Err(ConsoleError::ValidationFailed(
                "console already has a master strip".to_string(),
            ));
        }
        if self.get_channel(&strip.id).is_some() {
            return Err(ConsoleError::ValidationFailed(format!(
                "duplicate channel id: {}",
                strip.id
            )));
        }
        debug!(channel = %strip.id, name = %strip.name, "add channel");
        let id = strip.id.clone();
        self.channels.push(strip);
        Ok(ConsoleChange::ChannelAdded(id))
    }

    /// Remove a channel strip and strip its id from every bus roster
    ///
    /// Unknown ids and the master strip are a no-op.
    pub fn remove_channel(&mut self, id: &str) -> ConsoleChange {
        let Some(pos) = self.channels.iter().position(|c| c.id == id) else {
            return ConsoleChange::Unchanged;
        };
        self.channels.remove(pos);
        for bus in &mut self.buses {
            bus.channels.retain(|c| c != id);
        }
        debug!(channel = id, "remove channel");
        ConsoleChange::ChannelRemoved(id.to_string())
    }

    /// Duplicate a channel strip under a fresh id
    ///
    /// The copy carries the source's levels, flags, inserts, sends and output
    /// bus, but starts unrouted from every bus.
    pub fn duplicate_channel(&mut self, id: &str) -> Result<ConsoleChange> {
        if id == self.master.id {
            return Err(ConsoleError::ValidationFailed(
                "master strip cannot be duplicated".to_string(),
            ));
        }
        let source = self
            .channels
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ConsoleError::channel_not_found(id))?;

        let copy = ChannelStrip {
            id: Uuid::new_v4().to_string(),
            name: format!("{} (copy)", source.name),
            meter: Meter::default(),
            ..source.clone()
        };
        let new_id = copy.id.clone();
        debug!(source = id, copy = %new_id, "duplicate channel");
        self.channels.push(copy);
        Ok(ConsoleChange::ChannelAdded(new_id))
    }

    /// Engage or release solo on a channel
    ///
    /// Mutes are recomputed from scratch: while any channel is soloed every
    /// other non-master channel is muted unless it is soloed too. A channel's
    /// mute state from before the first solo is not remembered.
    pub fn set_solo(&mut self, id: &str, solo: bool) -> Result<ConsoleChange> {
        if id == self.master.id {
            return Ok(ConsoleChange::Unchanged);
        }
        self.channel_mut_or_err(id)?.is_solo = solo;

        let has_solo = self.has_solo();
        for channel in self.channels.iter_mut().filter(|c| c.id != id) {
            channel.is_muted = has_solo && !channel.is_solo;
        }
        debug!(channel = id, solo, has_solo, "solo");
        Ok(ConsoleChange::SoloChanged)
    }

    /// Check if any channel has solo enabled
    pub fn has_solo(&self) -> bool {
        self.channels.iter().any(|c| c.is_solo)
    }

    /// Check if a channel should be heard
    pub fn is_audible(&self, id: &str) -> bool {
        self.get_channel(id).is_some_and(|c| !c.is_muted)
    }

    /// Set volume for a channel
    pub fn set_volume(&mut self, id: &str, volume: f32) -> Result<ConsoleChange> {
        self.channel_mut_or_err(id)?.volume = volume.clamp(0.0, 1.0);
        Ok(ConsoleChange::ChannelUpdated(id.to_string()))
    }

    /// Set pan for a channel
    pub fn set_pan(&mut self, id: &str, pan: f32) -> Result<ConsoleChange> {
        self.channel_mut_or_err(id)?.pan = pan.clamp(-1.0, 1.0);
        Ok(ConsoleChange::ChannelUpdated(id.to_string()))
    }

    /// Set mute for a channel
    pub fn set_mute(&mut self, id: &str, muted: bool) -> Result<ConsoleChange> {
        self.channel_mut_or_err(id)?.is_muted = muted;
        Ok(ConsoleChange::ChannelUpdated(id.to_string()))
    }

    /// Point a channel's main output at a bus (or the master strip)
    pub fn set_output_bus(&mut self, id: &str, bus_id: &str) -> Result<ConsoleChange> {
        if bus_id != self.master.id && self.get_bus(bus_id).is_none() {
            warn!(bus = bus_id, "output bus not found");
            return Err(ConsoleError::bus_not_found(bus_id));
        }
        self.channel_mut_or_err(id)?.output_bus = bus_id.to_string();
        Ok(ConsoleChange::ChannelUpdated(id.to_string()))
    }

    /// Move an insert within a channel's chain
    pub fn reorder_insert(&mut self, id: &str, from: usize, to: usize) -> Result<ConsoleChange> {
        let channel = self.channel_mut_or_err(id)?;
        let len = channel.inserts.len();
        if from >= len || to >= len {
            return Err(ConsoleError::ValidationFailed(format!(
                "insert index out of range: {} -> {} (chain has {})",
                from, to, len
            )));
        }
        if from == to {
            return Ok(ConsoleChange::Unchanged);
        }
        let slot = channel.inserts.remove(from);
        channel.inserts.insert(to, slot);
        Ok(ConsoleChange::ChannelUpdated(id.to_string()))
    }

    /// Replace a channel's inserts and sends in one step
    pub(crate) fn replace_chain(
        &mut self,
        id: &str,
        inserts: Vec<InsertSlot>,
        sends: Vec<Send>,
    ) -> Result<ConsoleChange> {
        let channel = self.channel_mut_or_err(id)?;
        channel.inserts = inserts;
        channel.sends = sends;
        Ok(ConsoleChange::ChannelUpdated(id.to_string()))
    }

    /// Write a meter reading for a channel or bus (called from the meter tick)
    ///
    /// Returns false if the id is unknown.
    pub fn update_meter(&mut self, id: &str, level: StereoLevels) -> bool {
        if let Some(channel) = self.get_channel_mut(id) {
            channel.meter.update(level);
            return true;
        }
        if let Some(bus) = self.get_bus_mut(id) {
            bus.meter.update(level);
            return true;
        }
        false
    }

    /// Decay peak levels (call each tick for smooth falloff)
    pub fn decay_meters(&mut self, rate: f32) {
        self.master.meter.decay(rate);
        for channel in &mut self.channels {
            channel.meter.decay(rate);
        }
        for bus in &mut self.buses {
            bus.meter.decay(rate);
        }
    }
}
