//! Built-in channel strip presets
//!
//! Always available out of the box. `built_in_presets` is a pure factory:
//! every call returns a fresh list.

use crate::effects::{EqBand, InsertSlot, PrePost, Send};
use crate::mixer::ChannelType;

use super::{ChannelStripConfig, ChannelStripPreset, PresetCategory};

/// Bus id the built-in reverb sends target
pub const REVERB_BUS: &str = "bus-reverb";

/// Bus id the built-in delay sends target
pub const DELAY_BUS: &str = "bus-delay";

fn insert(id: &str, effect: &str, params: &[(&str, f32)]) -> InsertSlot {
    let mut slot = InsertSlot::new(effect);
    slot.id = id.to_string();
    for (name, value) in params {
        slot.set_param(name, *value);
    }
    slot
}

fn send(id: &str, bus: &str, amount: f32, pre_post: PrePost) -> Send {
    Send {
        id: id.to_string(),
        destination_bus: bus.to_string(),
        amount,
        pre_post,
    }
}

fn bands(spec: &[(f32, f32, f32)]) -> Vec<EqBand> {
    spec.iter().map(|&(f, g, q)| EqBand::new(f, g, q)).collect()
}

#[allow(clippy::too_many_arguments)]
fn preset(
    id: &str,
    name: &str,
    category: PresetCategory,
    description: &str,
    icon: &str,
    color: &str,
    tags: &[&str],
    config: ChannelStripConfig,
) -> ChannelStripPreset {
    ChannelStripPreset {
        id: id.to_string(),
        name: name.to_string(),
        category,
        description: description.to_string(),
        config,
        icon: icon.to_string(),
        color: color.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// The factory catalog
pub fn built_in_presets() -> Vec<ChannelStripPreset> {
    vec![
        preset(
            "preset-vocal-lead",
            "Lead Vocal",
            PresetCategory::Vocals,
            "Present, upfront lead vocal with gentle compression and a touch of plate",
            "mic",
            "#E91E63",
            &["vocal", "lead", "bright", "upfront"],
            ChannelStripConfig {
                eq_enabled: true,
                eq_bands: bands(&[(100.0, -3.0, 0.7), (3000.0, 2.0, 1.0), (10000.0, 3.0, 0.7)]),
                compression_enabled: true,
                compression_threshold: -18.0,
                compression_ratio: 3.0,
                compression_attack: 5.0,
                compression_release: 100.0,
                inserts: vec![insert(
                    "insert-compressor",
                    "compressor",
                    &[("threshold", -24.0), ("ratio", 2.0), ("attack", 15.0), ("release", 150.0)],
                )],
                sends: vec![send("send-reverb", REVERB_BUS, 0.25, PrePost::Post)],
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-vocal-backing",
            "Backing Vocals",
            PresetCategory::Vocals,
            "Tucked-in harmonies with low cut and wide reverb",
            "mic",
            "#F06292",
            &["vocal", "backing", "harmony", "wide"],
            ChannelStripConfig {
                eq_enabled: true,
                eq_bands: bands(&[(150.0, -6.0, 0.7), (2500.0, -2.0, 1.4)]),
                compression_enabled: true,
                compression_threshold: -22.0,
                compression_ratio: 4.0,
                compression_attack: 10.0,
                compression_release: 120.0,
                sends: vec![
                    send("send-reverb", REVERB_BUS, 0.4, PrePost::Post),
                    send("send-delay", DELAY_BUS, 0.15, PrePost::Post),
                ],
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-kick-punch",
            "Punchy Kick",
            PresetCategory::Drums,
            "Tight low end with a clicky beater",
            "drum",
            "#FF5722",
            &["kick", "punch", "tight"],
            ChannelStripConfig {
                eq_enabled: true,
                eq_bands: bands(&[(60.0, 4.0, 1.0), (400.0, -5.0, 1.5), (4000.0, 3.0, 1.2)]),
                compression_enabled: true,
                compression_threshold: -12.0,
                compression_ratio: 4.0,
                compression_attack: 20.0,
                compression_release: 80.0,
                inserts: vec![insert(
                    "insert-gate",
                    "gate",
                    &[("threshold", -40.0), ("release", 60.0)],
                )],
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-snare-crack",
            "Snare Crack",
            PresetCategory::Drums,
            "Bright snare with body and short room",
            "drum",
            "#FF7043",
            &["snare", "crack", "bright"],
            ChannelStripConfig {
                eq_enabled: true,
                eq_bands: bands(&[(200.0, 2.0, 1.0), (900.0, -3.0, 2.0), (6000.0, 4.0, 0.8)]),
                compression_enabled: true,
                compression_threshold: -15.0,
                compression_ratio: 5.0,
                compression_attack: 8.0,
                compression_release: 90.0,
                sends: vec![send("send-reverb", REVERB_BUS, 0.2, PrePost::Post)],
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-drum-overheads",
            "Drum Overheads",
            PresetCategory::Drums,
            "Airy cymbals without harshness",
            "drum",
            "#FFAB91",
            &["overheads", "cymbals", "air"],
            ChannelStripConfig {
                eq_enabled: true,
                eq_bands: bands(&[(250.0, -4.0, 0.7), (12000.0, 2.5, 0.7)]),
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-bass-di",
            "DI Bass",
            PresetCategory::Bass,
            "Solid, even DI bass with saturation",
            "bass",
            "#3F51B5",
            &["bass", "di", "warm", "saturation"],
            ChannelStripConfig {
                eq_enabled: true,
                eq_bands: bands(&[(80.0, 3.0, 1.0), (250.0, -2.0, 1.2), (1500.0, 1.5, 1.0)]),
                compression_enabled: true,
                compression_threshold: -20.0,
                compression_ratio: 4.0,
                compression_attack: 15.0,
                compression_release: 150.0,
                inserts: vec![insert(
                    "insert-saturator",
                    "saturator",
                    &[("drive", 0.3), ("mix", 0.5)],
                )],
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-guitar-clean",
            "Clean Guitar",
            PresetCategory::Guitar,
            "Sparkling clean electric with slap delay",
            "guitar",
            "#4CAF50",
            &["guitar", "clean", "sparkle"],
            ChannelStripConfig {
                eq_enabled: true,
                eq_bands: bands(&[(120.0, -4.0, 0.7), (5000.0, 2.0, 1.0)]),
                sends: vec![send("send-delay", DELAY_BUS, 0.2, PrePost::Post)],
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-keys-piano",
            "Grand Piano",
            PresetCategory::Keys,
            "Natural piano with light bus compression",
            "piano",
            "#795548",
            &["piano", "keys", "natural"],
            ChannelStripConfig {
                channel_type: ChannelType::Midi,
                compression_enabled: true,
                compression_threshold: -24.0,
                compression_ratio: 2.0,
                compression_attack: 30.0,
                compression_release: 200.0,
                sends: vec![send("send-reverb", REVERB_BUS, 0.3, PrePost::Pre)],
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-synth-pad",
            "Wide Pad",
            PresetCategory::Synth,
            "Lush pad with chorus and long reverb",
            "synth",
            "#9C27B0",
            &["pad", "synth", "wide", "ambient"],
            ChannelStripConfig {
                channel_type: ChannelType::Midi,
                eq_enabled: true,
                eq_bands: bands(&[(200.0, -3.0, 0.7)]),
                inserts: vec![insert(
                    "insert-chorus",
                    "chorus",
                    &[("rate", 0.8), ("depth", 0.4), ("mix", 0.5)],
                )],
                sends: vec![send("send-reverb", REVERB_BUS, 0.5, PrePost::Post)],
                ..ChannelStripConfig::default()
            },
        ),
        preset(
            "preset-master-glue",
            "Master Glue",
            PresetCategory::Master,
            "Gentle bus compression and limiting for the mix bus",
            "master",
            "#607D8B",
            &["master", "glue", "limiter"],
            ChannelStripConfig {
                channel_type: ChannelType::Master,
                compression_enabled: true,
                compression_threshold: -10.0,
                compression_ratio: 2.0,
                compression_attack: 30.0,
                compression_release: 300.0,
                inserts: vec![insert(
                    "insert-limiter",
                    "limiter",
                    &[("ceiling", -1.0), ("release", 50.0)],
                )],
                ..ChannelStripConfig::default()
            },
        ),
    ]
}
