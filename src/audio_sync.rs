//! Change notification for the host audio engine
//!
//! Every mutating console call returns a `ConsoleChange`. The host feeds them
//! into `AudioSync`, which batches them into dirty flags so the engine can
//! re-patch its real-time graph once per frame instead of after every edit.

use std::collections::BTreeSet;

/// What a mutating console operation changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleChange {
    /// The call was a no-op (absent target, already in the requested state)
    Unchanged,
    ChannelAdded(String),
    ChannelRemoved(String),
    /// Level, pan, mute, inserts, sends or output bus of a channel changed
    ChannelUpdated(String),
    BusAdded(String),
    BusRemoved(String),
    /// Level, pan or mute of a bus changed
    BusUpdated(String),
    /// A bus roster changed
    RoutingChanged { bus: String },
    /// The send list of a channel or bus changed
    SendsChanged { source: String },
    /// Solo state changed (and mutes were recomputed)
    SoloChanged,
}

impl ConsoleChange {
    pub fn is_changed(&self) -> bool {
        !matches!(self, ConsoleChange::Unchanged)
    }

    /// Short description for logs and status display
    pub fn description(&self) -> &'static str {
        match self {
            ConsoleChange::Unchanged => "No change",
            ConsoleChange::ChannelAdded(_) => "Add channel",
            ConsoleChange::ChannelRemoved(_) => "Remove channel",
            ConsoleChange::ChannelUpdated(_) => "Update channel",
            ConsoleChange::BusAdded(_) => "Add bus",
            ConsoleChange::BusRemoved(_) => "Remove bus",
            ConsoleChange::BusUpdated(_) => "Update bus",
            ConsoleChange::RoutingChanged { .. } => "Change routing",
            ConsoleChange::SendsChanged { .. } => "Change sends",
            ConsoleChange::SoloChanged => "Change solo",
        }
    }
}

/// Dirty flags for audio sync batching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    /// Volumes, pans, or mutes changed
    pub mixer: bool,
    /// Bus rosters or channel/bus set changed
    pub routing: bool,
    /// Send lists changed
    pub sends: bool,
    /// Insert chains changed
    pub effects: bool,
}

impl DirtyFlags {
    /// Check if any flags are set
    pub fn any(&self) -> bool {
        self.mixer || self.routing || self.sends || self.effects
    }

    /// Clear all flags
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A batch of pending changes handed to the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncBatch {
    pub dirty: DirtyFlags,
    /// Channel and bus ids touched since the last flush
    pub touched: BTreeSet<String>,
}

/// Coordinates engine synchronization with dirty tracking
#[derive(Debug, Default)]
pub struct AudioSync {
    dirty: DirtyFlags,
    touched: BTreeSet<String>,
}

impl AudioSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change returned by a console operation
    pub fn record(&mut self, change: &ConsoleChange) {
        match change {
            ConsoleChange::Unchanged => {}
            ConsoleChange::ChannelAdded(id)
            | ConsoleChange::ChannelRemoved(id)
            | ConsoleChange::BusAdded(id)
            | ConsoleChange::BusRemoved(id) => {
                self.dirty.routing = true;
                self.dirty.mixer = true;
                self.touched.insert(id.clone());
            }
            ConsoleChange::ChannelUpdated(id) => {
                // Inserts, sends and levels all funnel through here
                self.dirty.mixer = true;
                self.dirty.effects = true;
                self.dirty.sends = true;
                self.touched.insert(id.clone());
            }
            ConsoleChange::BusUpdated(id) => {
                self.dirty.mixer = true;
                self.touched.insert(id.clone());
            }
            ConsoleChange::RoutingChanged { bus } => {
                self.dirty.routing = true;
                self.touched.insert(bus.clone());
            }
            ConsoleChange::SendsChanged { source } => {
                self.dirty.sends = true;
                self.touched.insert(source.clone());
            }
            ConsoleChange::SoloChanged => {
                self.dirty.mixer = true;
            }
        }
    }

    /// Check if anything is waiting to be flushed
    pub fn is_dirty(&self) -> bool {
        self.dirty.any()
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Take the pending batch, leaving the coordinator clean
    pub fn take(&mut self) -> Option<SyncBatch> {
        if !self.dirty.any() {
            return None;
        }
        let batch = SyncBatch {
            dirty: self.dirty,
            touched: std::mem::take(&mut self.touched),
        };
        self.dirty.clear();
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_leaves_sync_clean() {
        let mut sync = AudioSync::new();
        sync.record(&ConsoleChange::Unchanged);
        assert!(!sync.is_dirty());
        assert!(sync.take().is_none());
    }

    #[test]
    fn test_routing_change_marks_routing() {
        let mut sync = AudioSync::new();
        sync.record(&ConsoleChange::RoutingChanged {
            bus: "bus-reverb".to_string(),
        });

        let dirty = sync.dirty();
        assert!(dirty.routing);
        assert!(!dirty.sends);
        assert!(!dirty.effects);
    }

    #[test]
    fn test_bus_update_marks_mixer_only() {
        let mut sync = AudioSync::new();
        sync.record(&ConsoleChange::BusUpdated("bus-drums".to_string()));

        let batch = sync.take().unwrap();
        assert_eq!(
            batch.dirty,
            DirtyFlags {
                mixer: true,
                ..DirtyFlags::default()
            }
        );
        assert!(batch.touched.contains("bus-drums"));
    }

    #[test]
    fn test_structural_changes_mark_routing_and_mixer() {
        let mut sync = AudioSync::new();
        sync.record(&ConsoleChange::ChannelAdded("vox".to_string()));
        sync.record(&ConsoleChange::BusRemoved("bus-reverb".to_string()));

        let batch = sync.take().unwrap();
        assert!(batch.dirty.routing);
        assert!(batch.dirty.mixer);
        assert!(!batch.dirty.sends);
        assert!(!batch.dirty.effects);
        assert_eq!(
            batch.touched.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["bus-reverb", "vox"]
        );
    }

    #[test]
    fn test_take_batches_and_clears() {
        let mut sync = AudioSync::new();
        sync.record(&ConsoleChange::SendsChanged {
            source: "bus-a".to_string(),
        });
        sync.record(&ConsoleChange::ChannelUpdated("vox".to_string()));
        sync.record(&ConsoleChange::ChannelUpdated("vox".to_string()));

        let batch = sync.take().unwrap();
        assert!(batch.dirty.sends);
        assert!(batch.dirty.effects);
        assert_eq!(batch.touched.len(), 2);
        assert!(batch.touched.contains("vox"));

        assert!(!sync.is_dirty());
        assert!(sync.take().is_none());
    }
}
