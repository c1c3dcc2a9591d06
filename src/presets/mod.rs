//! Channel strip presets - catalog, apply and capture
//!
//! A preset is a template. Applying one stamps fresh insert and send instances
//! onto a channel; saving one snapshots a channel's current chain.

pub mod builtin;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use builtin::built_in_presets;

use crate::audio_sync::ConsoleChange;
use crate::effects::{dedupe_sends, EqBand, InsertSlot, Send};
use crate::error::{ConsoleError, Result};
use crate::mixer::{ChannelType, MixingConsole};

pub const DEFAULT_COMP_THRESHOLD: f32 = -20.0;
pub const DEFAULT_COMP_RATIO: f32 = 4.0;
pub const DEFAULT_COMP_ATTACK: f32 = 10.0;
pub const DEFAULT_COMP_RELEASE: f32 = 100.0;

/// Instrument family a preset is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetCategory {
    Vocals,
    Drums,
    Bass,
    Guitar,
    Keys,
    Synth,
    Strings,
    Brass,
    Fx,
    Master,
}

impl PresetCategory {
    /// Get display name for the category
    pub fn name(&self) -> &'static str {
        match self {
            PresetCategory::Vocals => "Vocals",
            PresetCategory::Drums => "Drums",
            PresetCategory::Bass => "Bass",
            PresetCategory::Guitar => "Guitar",
            PresetCategory::Keys => "Keys",
            PresetCategory::Synth => "Synth",
            PresetCategory::Strings => "Strings",
            PresetCategory::Brass => "Brass",
            PresetCategory::Fx => "FX",
            PresetCategory::Master => "Master",
        }
    }

    /// Parse a category from its name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Get all categories
    pub fn all() -> &'static [PresetCategory] {
        &[
            PresetCategory::Vocals,
            PresetCategory::Drums,
            PresetCategory::Bass,
            PresetCategory::Guitar,
            PresetCategory::Keys,
            PresetCategory::Synth,
            PresetCategory::Strings,
            PresetCategory::Brass,
            PresetCategory::Fx,
            PresetCategory::Master,
        ]
    }
}

/// The configuration payload a preset stamps onto a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStripConfig {
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub eq_enabled: bool,
    #[serde(default)]
    pub eq_bands: Vec<EqBand>,
    pub compression_enabled: bool,
    pub compression_threshold: f32,
    pub compression_ratio: f32,
    pub compression_attack: f32,
    pub compression_release: f32,
    #[serde(default)]
    pub inserts: Vec<InsertSlot>,
    #[serde(default)]
    pub sends: Vec<Send>,
}

impl Default for ChannelStripConfig {
    fn default() -> Self {
        Self {
            channel_type: ChannelType::Audio,
            eq_enabled: false,
            eq_bands: Vec::new(),
            compression_enabled: false,
            compression_threshold: DEFAULT_COMP_THRESHOLD,
            compression_ratio: DEFAULT_COMP_RATIO,
            compression_attack: DEFAULT_COMP_ATTACK,
            compression_release: DEFAULT_COMP_RELEASE,
            inserts: Vec::new(),
            sends: Vec::new(),
        }
    }
}

impl ChannelStripConfig {
    /// Build the insert chain this config produces
    ///
    /// Config inserts come first in their stored order, then a synthesized EQ
    /// (if enabled), then a synthesized compressor (if enabled).
    pub fn render_inserts(&self) -> Vec<InsertSlot> {
        let mut inserts = self.inserts.clone();
        if self.eq_enabled {
            inserts.push(InsertSlot::eq(&self.eq_bands));
        }
        if self.compression_enabled {
            inserts.push(InsertSlot::compressor(
                self.compression_threshold,
                self.compression_ratio,
                self.compression_attack,
                self.compression_release,
            ));
        }
        inserts
    }
}

/// A named, reusable channel strip configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStripPreset {
    pub id: String,
    pub name: String,
    pub category: PresetCategory,
    #[serde(default)]
    pub description: String,
    pub config: ChannelStripConfig,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ChannelStripPreset {
    /// Case-insensitive match against name, description or any tag
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// An ordered library of presets keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetCatalog {
    presets: Vec<ChannelStripPreset>,
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog pre-filled with the built-in presets
    pub fn built_in() -> Self {
        let mut catalog = Self::new();
        for preset in built_in_presets() {
            catalog.insert(preset);
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&ChannelStripPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Insert a preset, replacing any existing preset with the same id
    ///
    /// Repeated sends to one bus in the preset config collapse into one.
    /// Returns the stored preset.
    pub fn insert(&mut self, mut preset: ChannelStripPreset) -> &ChannelStripPreset {
        preset.config.sends = dedupe_sends(std::mem::take(&mut preset.config.sends));
        let pos = match self.presets.iter().position(|p| p.id == preset.id) {
            Some(pos) => {
                self.presets[pos] = preset;
                pos
            }
            None => {
                self.presets.push(preset);
                self.presets.len() - 1
            }
        };
        &self.presets[pos]
    }

    pub fn remove(&mut self, id: &str) -> Option<ChannelStripPreset> {
        let pos = self.presets.iter().position(|p| p.id == id)?;
        Some(self.presets.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelStripPreset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Preset library for one console session
#[derive(Debug, Clone)]
pub struct PresetManager {
    catalog: PresetCatalog,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Create a manager with the built-in presets available
    pub fn new() -> Self {
        Self::with_catalog(PresetCatalog::built_in())
    }

    pub fn with_catalog(catalog: PresetCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn get_preset(&self, id: &str) -> Option<&ChannelStripPreset> {
        self.catalog.get(id)
    }

    /// Add a preset (replaces one with the same id)
    pub fn add_preset(&mut self, preset: ChannelStripPreset) {
        debug!(preset = %preset.id, "add preset");
        self.catalog.insert(preset);
    }

    pub fn remove_preset(&mut self, id: &str) -> Option<ChannelStripPreset> {
        self.catalog.remove(id)
    }

    pub fn get_presets_by_category(&self, category: PresetCategory) -> Vec<&ChannelStripPreset> {
        self.catalog.iter().filter(|p| p.category == category).collect()
    }

    pub fn search_presets(&self, query: &str) -> Vec<&ChannelStripPreset> {
        self.catalog.iter().filter(|p| p.matches(query)).collect()
    }

    /// Stamp a preset onto a channel
    ///
    /// The channel's inserts and sends are replaced by fresh copies of the
    /// preset's, followed by synthesized EQ and compressor inserts when the
    /// preset enables them.
    pub fn apply_preset(
        &self,
        console: &mut MixingConsole,
        channel_id: &str,
        preset_id: &str,
    ) -> Result<ConsoleChange> {
        if console.get_channel(channel_id).is_none() {
            warn!(channel = channel_id, "apply preset: channel not found");
            return Err(ConsoleError::channel_not_found(channel_id));
        }
        let preset = self.catalog.get(preset_id).ok_or_else(|| {
            warn!(preset = preset_id, "apply preset: preset not found");
            ConsoleError::preset_not_found(preset_id)
        })?;

        let inserts = preset.config.render_inserts();
        let sends = dedupe_sends(preset.config.sends.clone());
        debug!(
            channel = channel_id,
            preset = preset_id,
            inserts = inserts.len(),
            sends = sends.len(),
            "apply preset"
        );
        console.replace_chain(channel_id, inserts, sends)
    }

    /// Capture a channel's current inserts and sends as a new custom preset
    ///
    /// EQ and compression stay disabled on the saved config: the captured
    /// insert list already holds whatever was synthesized before.
    pub fn save_preset(
        &mut self,
        console: &MixingConsole,
        channel_id: &str,
        name: &str,
        category: PresetCategory,
        description: Option<&str>,
    ) -> Result<&ChannelStripPreset> {
        let channel = console.get_channel(channel_id).ok_or_else(|| {
            warn!(channel = channel_id, "save preset: channel not found");
            ConsoleError::channel_not_found(channel_id)
        })?;

        let preset = ChannelStripPreset {
            id: format!("custom-{}", Uuid::new_v4()),
            name: name.to_string(),
            category,
            description: description
                .map(str::to_string)
                .unwrap_or_else(|| format!("Custom preset from {}", channel.name)),
            config: ChannelStripConfig {
                channel_type: channel.channel_type,
                inserts: channel.inserts.clone(),
                sends: channel.sends.clone(),
                ..ChannelStripConfig::default()
            },
            icon: "sliders".to_string(),
            color: "#9E9E9E".to_string(),
            tags: vec!["custom".to_string()],
        };
        info!(preset = %preset.id, channel = channel_id, "saved preset");
        Ok(self.catalog.insert(preset))
    }

    /// Export the full catalog
    pub fn export_presets(&self) -> Vec<ChannelStripPreset> {
        self.catalog.iter().cloned().collect()
    }

    /// Merge presets into the catalog by id. Returns how many were new.
    pub fn import_presets(&mut self, presets: Vec<ChannelStripPreset>) -> usize {
        let total = presets.len();
        let mut added = 0;
        for preset in presets {
            if !self.catalog.contains(&preset.id) {
                added += 1;
            }
            self.catalog.insert(preset);
        }
        info!(total, added, replaced = total - added, "imported presets");
        added
    }

    /// Export the catalog as a JSON array
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_presets())?)
    }

    /// Merge presets from a JSON array
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let presets: Vec<ChannelStripPreset> = serde_json::from_str(json)?;
        Ok(self.import_presets(presets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{COMPRESSOR_EFFECT, EQ_EFFECT};
    use crate::error::EntityKind;
    use crate::mixer::{BusChannel, BusType, ChannelStrip};

    fn console_with_vox() -> MixingConsole {
        let mut console = MixingConsole::new("test");
        console.add_channel(ChannelStrip::audio("vox", "Lead Vox")).unwrap();
        console
    }

    #[test]
    fn test_built_in_catalog_available() {
        let manager = PresetManager::new();
        assert!(!manager.catalog().is_empty());
        assert!(manager.get_preset("preset-vocal-lead").is_some());
    }

    #[test]
    fn test_apply_vocal_lead_to_empty_channel() {
        let manager = PresetManager::new();
        let mut console = console_with_vox();

        let change = manager
            .apply_preset(&mut console, "vox", "preset-vocal-lead")
            .unwrap();
        assert_eq!(change, ConsoleChange::ChannelUpdated("vox".to_string()));

        let vox = console.get_channel("vox").unwrap();
        assert_eq!(vox.inserts.len(), 3);
        assert_eq!(vox.inserts[0].id, "insert-compressor");
        assert!(vox.inserts[1].is_effect(EQ_EFFECT));
        assert!(vox.inserts[2].is_effect(COMPRESSOR_EFFECT));
        assert_eq!(vox.sends.len(), 1);
    }

    #[test]
    fn test_apply_eq_insert_has_three_params_per_band() {
        let manager = PresetManager::new();
        let mut console = console_with_vox();

        for preset in manager.catalog().iter().filter(|p| p.config.eq_enabled) {
            manager.apply_preset(&mut console, "vox", &preset.id).unwrap();
            let vox = console.get_channel("vox").unwrap();

            let eq_slots: Vec<_> = vox.inserts.iter().filter(|s| s.is_effect(EQ_EFFECT)).collect();
            let synthesized = eq_slots.last().unwrap();
            assert_eq!(synthesized.parameters.len(), 3 * preset.config.eq_bands.len());
        }
    }

    #[test]
    fn test_apply_replaces_existing_chain() {
        let manager = PresetManager::new();
        let mut console = console_with_vox();
        console.get_channel_mut("vox").unwrap().inserts.push(InsertSlot::new("chorus"));

        manager
            .apply_preset(&mut console, "vox", "preset-vocal-lead")
            .unwrap();

        let vox = console.get_channel("vox").unwrap();
        assert!(vox.inserts.iter().all(|s| !s.is_effect("chorus")));
    }

    #[test]
    fn test_apply_does_not_share_with_template() {
        let manager = PresetManager::new();
        let mut console = console_with_vox();
        manager
            .apply_preset(&mut console, "vox", "preset-vocal-lead")
            .unwrap();

        console.get_channel_mut("vox").unwrap().inserts[0].set_param("ratio", 20.0);

        let template = manager.get_preset("preset-vocal-lead").unwrap();
        assert_ne!(template.config.inserts[0].get_param("ratio"), 20.0);
    }

    #[test]
    fn test_apply_missing_targets() {
        let manager = PresetManager::new();
        let mut console = console_with_vox();

        let err = manager
            .apply_preset(&mut console, "ghost-channel", "preset-vocal-lead")
            .unwrap_err();
        assert!(err.is_not_found(EntityKind::Channel));

        let err = manager
            .apply_preset(&mut console, "vox", "preset-ghost")
            .unwrap_err();
        assert!(err.is_not_found(EntityKind::Preset));
    }

    #[test]
    fn test_save_preset_captures_chain() {
        let mut manager = PresetManager::new();
        let mut console = console_with_vox();
        manager
            .apply_preset(&mut console, "vox", "preset-vocal-lead")
            .unwrap();

        let before = manager.catalog().len();
        let saved = manager
            .save_preset(&console, "vox", "My Vox", PresetCategory::Vocals, None)
            .unwrap()
            .clone();

        assert_eq!(manager.catalog().len(), before + 1);
        assert_eq!(manager.get_preset(&saved.id), Some(&saved));
        assert_eq!(saved.description, "Custom preset from Lead Vox");
        assert!(!saved.config.eq_enabled);
        assert!(!saved.config.compression_enabled);
        assert_eq!(saved.config.inserts.len(), 3);
        assert_eq!(saved.config.sends.len(), 1);

        // Re-applying a saved preset reproduces the chain without re-synthesizing
        let mut other = console_with_vox();
        manager.apply_preset(&mut other, "vox", &saved.id).unwrap();
        assert_eq!(other.get_channel("vox").unwrap().inserts.len(), 3);
    }

    #[test]
    fn test_save_preset_missing_channel() {
        let mut manager = PresetManager::new();
        let console = console_with_vox();
        let result = manager.save_preset(&console, "ghost", "x", PresetCategory::Fx, Some("d"));
        assert!(matches!(result, Err(ConsoleError::NotFound { .. })));
    }

    #[test]
    fn test_category_filter() {
        let manager = PresetManager::new();
        let drums = manager.get_presets_by_category(PresetCategory::Drums);
        assert!(!drums.is_empty());
        assert!(drums.iter().all(|p| p.category == PresetCategory::Drums));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let manager = PresetManager::new();
        let by_name = manager.search_presets("VOCAL");
        assert!(by_name.iter().any(|p| p.id == "preset-vocal-lead"));

        let by_tag = manager.search_presets("punch");
        assert!(by_tag.iter().any(|p| p.id == "preset-kick-punch"));

        assert!(manager.search_presets("no such preset anywhere").is_empty());
    }

    #[test]
    fn test_import_merges_by_id() {
        let mut manager = PresetManager::new();
        let before = manager.catalog().len();

        let mut replaced = manager.get_preset("preset-vocal-lead").unwrap().clone();
        replaced.name = "Renamed".to_string();
        let mut fresh = replaced.clone();
        fresh.id = "preset-imported".to_string();

        let added = manager.import_presets(vec![replaced, fresh]);

        assert_eq!(added, 1);
        assert_eq!(manager.catalog().len(), before + 1);
        assert_eq!(manager.get_preset("preset-vocal-lead").unwrap().name, "Renamed");
    }

    #[test]
    fn test_import_collapses_repeated_sends() {
        let mut manager = PresetManager::new();
        let mut preset = manager.get_preset("preset-vocal-lead").unwrap().clone();
        preset.id = "preset-double-verb".to_string();
        preset.config.sends.push(Send::new("bus-reverb", 0.6));

        manager.import_presets(vec![preset]);
        let stored = manager.get_preset("preset-double-verb").unwrap();
        assert_eq!(stored.config.sends.len(), 1);
        assert_eq!(stored.config.sends[0].id, "send-reverb");
        assert_eq!(stored.config.sends[0].amount, 0.6);

        let mut console = console_with_vox();
        manager
            .apply_preset(&mut console, "vox", "preset-double-verb")
            .unwrap();
        assert_eq!(console.get_channel("vox").unwrap().sends.len(), 1);

        console.add_bus(BusChannel::new("bus-reverb", "Reverb", BusType::Reverb)).unwrap();
        console.add_channel_send("vox", "bus-reverb", 0.1).unwrap();
        let sends = &console.get_channel("vox").unwrap().sends;
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].amount, 0.1);
    }

    #[test]
    fn test_export_import_json() {
        let source = PresetManager::new();
        let json = source.export_json().unwrap();

        let mut target = PresetManager::with_catalog(PresetCatalog::new());
        let added = target.import_json(&json).unwrap();

        assert_eq!(added, source.catalog().len());
        assert_eq!(target.catalog(), source.catalog());
    }

    #[test]
    fn test_preset_json_shape() {
        let manager = PresetManager::new();
        let preset = manager.get_preset("preset-vocal-lead").unwrap();
        let json = serde_json::to_value(preset).unwrap();

        assert_eq!(json["category"], "vocals");
        assert_eq!(json["config"]["type"], "audio");
        assert_eq!(json["config"]["eqEnabled"], true);
        assert!(json["config"]["compressionThreshold"].is_number());
        assert_eq!(json["config"]["eqBands"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_remove_preset() {
        let mut manager = PresetManager::new();
        assert!(manager.remove_preset("preset-vocal-lead").is_some());
        assert!(manager.remove_preset("preset-vocal-lead").is_none());
        assert!(manager.get_preset("preset-vocal-lead").is_none());
    }
}
