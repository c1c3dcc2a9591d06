//! Console JSON - the boundary shape handed to the persistence layer
//!
//! Format:
//! - `channels`: every non-master channel strip
//! - `buses`: every bus, including its roster and sends
//! - `masterBus`: the master strip
//!
//! Meter fields are display-only and never written.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::effects::dedupe_sends;
use crate::error::Result;
use crate::mixer::{BusChannel, ChannelStrip, MixingConsole};

/// Serializable console document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleDocument {
    /// Console identifier (optional for documents written by other hosts)
    #[serde(default = "default_console_id")]
    pub id: String,
    #[serde(default)]
    pub channels: Vec<ChannelStrip>,
    #[serde(default)]
    pub buses: Vec<BusChannel>,
    #[serde(default = "ChannelStrip::master")]
    pub master_bus: ChannelStrip,
}

fn default_console_id() -> String {
    "console".to_string()
}

impl From<&MixingConsole> for ConsoleDocument {
    fn from(console: &MixingConsole) -> Self {
        Self {
            id: console.id().to_string(),
            channels: console.channels().to_vec(),
            buses: console.buses().to_vec(),
            master_bus: console.master().clone(),
        }
    }
}

impl ConsoleDocument {
    /// Rebuild a console graph from this document
    ///
    /// Channels and buses are added first, then each roster is replayed
    /// through the routing operation so the returned console already
    /// reflects every bus membership. Repeated sends to one destination
    /// collapse into a single send.
    pub fn into_console(self) -> Result<MixingConsole> {
        let mut master = self.master_bus;
        master.sends = dedupe_sends(master.sends);
        let mut console = MixingConsole::with_master(&self.id, master);

        for mut channel in self.channels {
            channel.sends = dedupe_sends(channel.sends);
            console.add_channel(channel)?;
        }

        let mut rosters = Vec::with_capacity(self.buses.len());
        for mut bus in self.buses {
            bus.sends = dedupe_sends(bus.sends);
            rosters.push((bus.id.clone(), std::mem::take(&mut bus.channels)));
            console.add_bus(bus)?;
        }
        for (bus_id, members) in rosters {
            for channel_id in members {
                console.route_channel_to_bus(&channel_id, &bus_id)?;
            }
        }

        debug!(
            console = console.id(),
            channels = console.channel_count(),
            buses = console.bus_count(),
            "console restored"
        );
        Ok(console)
    }
}

/// Serialize the whole console graph to a JSON value
pub fn to_json(console: &MixingConsole) -> Result<Value> {
    Ok(serde_json::to_value(ConsoleDocument::from(console))?)
}

/// Reconstruct a console graph from a JSON value
pub fn from_json(data: &Value) -> Result<MixingConsole> {
    let document = ConsoleDocument::deserialize(data)?;
    document.into_console()
}

/// Serialize to a pretty-printed JSON string
pub fn to_json_string(console: &MixingConsole) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ConsoleDocument::from(console))?)
}

/// Parse a console from a JSON string
pub fn from_json_str(json: &str) -> Result<MixingConsole> {
    let document: ConsoleDocument = serde_json::from_str(json)?;
    document.into_console()
}
