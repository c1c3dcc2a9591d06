//! Routing operations on the console graph
//!
//! Bus rosters, bus lifecycle and bus-to-bus sends. Read-requiring operations
//! fail with `NotFound`; removals of absent targets are silent no-ops.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use super::{BusChannel, MixingConsole};
use crate::audio_sync::ConsoleChange;
use crate::effects::{remove_send, upsert_send};
use crate::error::{ConsoleError, Result};

impl MixingConsole {
    /// Mutable bus lookup that reports `NotFound`
    fn bus_mut_or_err(&mut self, id: &str) -> Result<&mut BusChannel> {
        match self.get_bus_mut(id) {
            Some(bus) => Ok(bus),
            None => {
                warn!(bus = id, "bus not found");
                Err(ConsoleError::bus_not_found(id))
            }
        }
    }

    /// Add a bus. Ids must be unique.
    pub fn add_bus(&mut self, bus: BusChannel) -> Result<ConsoleChange> {
        if self.get_bus(&bus.id).is_some() {
            return Err(ConsoleError::ValidationFailed(format!(
                "duplicate bus id: {}",
                bus.id
            )));
        }
        debug!(bus = %bus.id, name = %bus.name, "add bus");
        let id = bus.id.clone();
        self.buses.push(bus);
        Ok(ConsoleChange::BusAdded(id))
    }

    /// Remove a bus
    ///
    /// Member channels are unrouted first (they stay in the console). Sends
    /// and output assignments pointing at the bus are dropped so nothing is
    /// left referencing it. Unknown ids are a no-op.
    pub fn remove_bus(&mut self, id: &str) -> ConsoleChange {
        let Some(pos) = self.buses.iter().position(|b| b.id == id) else {
            return ConsoleChange::Unchanged;
        };

        let members = std::mem::take(&mut self.buses[pos].channels);
        self.buses.remove(pos);

        for bus in &mut self.buses {
            remove_send(&mut bus.sends, id);
        }
        let master_id = self.master.id.clone();
        for channel in &mut self.channels {
            remove_send(&mut channel.sends, id);
            if channel.output_bus == id {
                channel.output_bus = master_id.clone();
            }
        }

        debug!(bus = id, released = members.len(), "remove bus");
        ConsoleChange::BusRemoved(id.to_string())
    }

    /// Add a channel to a bus roster
    ///
    /// Idempotent: a channel appears in a roster at most once. The channel
    /// itself does not have to exist yet.
    pub fn route_channel_to_bus(
        &mut self,
        channel_id: &str,
        bus_id: &str,
    ) -> Result<ConsoleChange> {
        let bus = self.bus_mut_or_err(bus_id)?;
        if bus.has_member(channel_id) {
            return Ok(ConsoleChange::Unchanged);
        }
        bus.channels.push(channel_id.to_string());
        debug!(channel = channel_id, bus = bus_id, "route");
        Ok(ConsoleChange::RoutingChanged {
            bus: bus_id.to_string(),
        })
    }

    /// Remove a channel from a bus roster. No-op if either is absent.
    pub fn unroute_channel_from_bus(&mut self, channel_id: &str, bus_id: &str) -> ConsoleChange {
        let Some(bus) = self.get_bus_mut(bus_id) else {
            return ConsoleChange::Unchanged;
        };
        let before = bus.channels.len();
        bus.channels.retain(|c| c != channel_id);
        if bus.channels.len() == before {
            return ConsoleChange::Unchanged;
        }
        debug!(channel = channel_id, bus = bus_id, "unroute");
        ConsoleChange::RoutingChanged {
            bus: bus_id.to_string(),
        }
    }

    /// Ids of every bus whose roster contains the channel
    pub fn buses_for_channel(&self, channel_id: &str) -> Vec<&str> {
        self.buses
            .iter()
            .filter(|b| b.has_member(channel_id))
            .map(|b| b.id.as_str())
            .collect()
    }

    /// Send from one bus to another
    ///
    /// If `from` already sends to `to`, the amount is updated in place;
    /// otherwise a new post-fader send is appended.
    pub fn add_bus_send(&mut self, from: &str, to: &str, amount: f32) -> Result<ConsoleChange> {
        if self.get_bus(to).is_none() {
            warn!(bus = to, "send destination not found");
            return Err(ConsoleError::bus_not_found(to));
        }
        if from == to {
            return Err(ConsoleError::ValidationFailed(format!(
                "bus {} cannot send to itself",
                from
            )));
        }
        let bus = self.bus_mut_or_err(from)?;
        let created = upsert_send(&mut bus.sends, to, amount);
        debug!(from, to, amount, created, "bus send");
        Ok(ConsoleChange::SendsChanged {
            source: from.to_string(),
        })
    }

    /// Remove the send from one bus to another. No-op if absent.
    pub fn remove_bus_send(&mut self, from: &str, to: &str) -> ConsoleChange {
        let Some(bus) = self.get_bus_mut(from) else {
            return ConsoleChange::Unchanged;
        };
        if !remove_send(&mut bus.sends, to) {
            return ConsoleChange::Unchanged;
        }
        debug!(from, to, "remove bus send");
        ConsoleChange::SendsChanged {
            source: from.to_string(),
        }
    }

    /// Send from a channel strip to a bus, with the same one-per-destination rule
    pub fn add_channel_send(
        &mut self,
        channel_id: &str,
        bus_id: &str,
        amount: f32,
    ) -> Result<ConsoleChange> {
        if self.get_bus(bus_id).is_none() {
            warn!(bus = bus_id, "send destination not found");
            return Err(ConsoleError::bus_not_found(bus_id));
        }
        let channel = self.channel_mut_or_err(channel_id)?;
        upsert_send(&mut channel.sends, bus_id, amount);
        debug!(channel = channel_id, bus = bus_id, amount, "channel send");
        Ok(ConsoleChange::SendsChanged {
            source: channel_id.to_string(),
        })
    }

    /// Remove a channel's send to a bus. No-op if absent.
    pub fn remove_channel_send(&mut self, channel_id: &str, bus_id: &str) -> ConsoleChange {
        let Some(channel) = self.get_channel_mut(channel_id) else {
            return ConsoleChange::Unchanged;
        };
        if !remove_send(&mut channel.sends, bus_id) {
            return ConsoleChange::Unchanged;
        }
        ConsoleChange::SendsChanged {
            source: channel_id.to_string(),
        }
    }

    /// Set volume for a bus
    pub fn set_bus_volume(&mut self, id: &str, volume: f32) -> Result<ConsoleChange> {
        self.bus_mut_or_err(id)?.volume = volume.clamp(0.0, 1.0);
        Ok(ConsoleChange::BusUpdated(id.to_string()))
    }

    /// Set pan for a bus
    pub fn set_bus_pan(&mut self, id: &str, pan: f32) -> Result<ConsoleChange> {
        self.bus_mut_or_err(id)?.pan = pan.clamp(-1.0, 1.0);
        Ok(ConsoleChange::BusUpdated(id.to_string()))
    }

    /// Set mute for a bus
    pub fn set_bus_mute(&mut self, id: &str, muted: bool) -> Result<ConsoleChange> {
        self.bus_mut_or_err(id)?.is_muted = muted;
        Ok(ConsoleChange::BusUpdated(id.to_string()))
    }

    /// Bus index lookup used by the graph queries
    fn bus_indices(&self) -> HashMap<&str, usize> {
        self.buses
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.as_str(), i))
            .collect()
    }

    /// Check if the bus-to-bus sends contain a feedback loop
    ///
    /// Sends are not rejected when they close a loop; the host engine asks
    /// this before re-patching.
    pub fn has_feedback_loop(&self) -> bool {
        let index = self.bus_indices();

        // DFS with coloring: 0=white (unvisited), 1=gray (in progress), 2=black (done)
        let mut color = vec![0u8; self.buses.len()];

        fn dfs(
            console: &MixingConsole,
            index: &HashMap<&str, usize>,
            node: usize,
            color: &mut [u8],
        ) -> bool {
            color[node] = 1;
            for send in &console.buses[node].sends {
                let Some(&t) = index.get(send.destination_bus.as_str()) else {
                    continue;
                };
                if color[t] == 1 {
                    return true; // Back edge = cycle
                }
                if color[t] == 0 && dfs(console, index, t, color) {
                    return true;
                }
            }
            color[node] = 2;
            false
        }

        (0..self.buses.len()).any(|i| color[i] == 0 && dfs(self, &index, i, &mut color))
    }

    /// Topological processing order of buses (senders before receivers)
    ///
    /// Buses caught in a feedback loop are left out.
    pub fn bus_processing_order(&self) -> Vec<&str> {
        let index = self.bus_indices();
        let n = self.buses.len();

        let mut receivers: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        for (i, bus) in self.buses.iter().enumerate() {
            for send in &bus.sends {
                if let Some(&t) = index.get(send.destination_bus.as_str()) {
                    receivers[i].push(t);
                    in_degree[t] += 1;
                }
            }
        }

        // Kahn's algorithm; ready buses come out in the order they became ready
        let mut ready: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(node) = ready.pop_front() {
            order.push(self.buses[node].id.as_str());
            for &t in &receivers[node] {
                in_degree[t] -= 1;
                if in_degree[t] == 0 {
                    ready.push_back(t);
                }
            }
        }
        order
    }
}
