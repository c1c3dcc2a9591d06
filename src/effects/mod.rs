//! Insert and send descriptors for channel strips and buses
//!
//! These are plain value types. The actual DSP lives in the host audio engine,
//! which only ever sees an effect identifier plus its parameter map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Effect identifier used for synthesized EQ inserts
pub const EQ_EFFECT: &str = "eq";

/// Effect identifier used for synthesized compressor inserts
pub const COMPRESSOR_EFFECT: &str = "compressor";

/// A single parametric EQ band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    /// Center frequency in Hz
    pub frequency: f32,
    /// Gain in dB
    pub gain: f32,
    /// Quality factor
    pub q: f32,
}

impl EqBand {
    pub fn new(frequency: f32, gain: f32, q: f32) -> Self {
        Self { frequency, gain, q }
    }
}

/// An insert effect slot in a channel's signal chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertSlot {
    pub id: String,
    pub enabled: bool,
    /// Opaque effect identifier resolved by the audio engine (None = empty slot)
    #[serde(default)]
    pub effect: Option<String>,
    /// Parameter values (param_name -> value)
    #[serde(default)]
    pub parameters: BTreeMap<String, f32>,
}

impl InsertSlot {
    /// Create an enabled slot holding `effect` with no parameters
    pub fn new(effect: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            enabled: true,
            effect: Some(effect.to_string()),
            parameters: BTreeMap::new(),
        }
    }

    /// Builder-style parameter setter
    pub fn with_param(mut self, name: &str, value: f32) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    /// Build an EQ insert, flattening each band into `band_<i>_freq/gain/q`
    pub fn eq(bands: &[EqBand]) -> Self {
        let mut slot = Self::new(EQ_EFFECT);
        for (i, band) in bands.iter().enumerate() {
            slot.set_param(&format!("band_{}_freq", i), band.frequency);
            slot.set_param(&format!("band_{}_gain", i), band.gain);
            slot.set_param(&format!("band_{}_q", i), band.q);
        }
        slot
    }

    /// Build a compressor insert
    pub fn compressor(threshold: f32, ratio: f32, attack: f32, release: f32) -> Self {
        Self::new(COMPRESSOR_EFFECT)
            .with_param("threshold", threshold)
            .with_param("ratio", ratio)
            .with_param("attack", attack)
            .with_param("release", release)
    }

    /// Get a parameter value (0.0 if unset)
    pub fn get_param(&self, name: &str) -> f32 {
        self.parameters.get(name).copied().unwrap_or(0.0)
    }

    /// Set a parameter value
    pub fn set_param(&mut self, name: &str, value: f32) {
        self.parameters.insert(name.to_string(), value);
    }

    /// Whether this slot holds the given effect
    pub fn is_effect(&self, effect: &str) -> bool {
        self.effect.as_deref() == Some(effect)
    }
}

/// Where a send taps the signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrePost {
    /// Before the fader (level independent of channel volume)
    Pre,
    /// After the fader
    #[default]
    Post,
}

/// A parallel send to a bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Send {
    pub id: String,
    /// Destination bus id
    pub destination_bus: String,
    /// Send amount (0.0 - 1.0)
    pub amount: f32,
    #[serde(default)]
    pub pre_post: PrePost,
}

impl Send {
    /// Create a post-fader send with a fresh id
    pub fn new(destination_bus: &str, amount: f32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            destination_bus: destination_bus.to_string(),
            amount: amount.clamp(0.0, 1.0),
            pre_post: PrePost::Post,
        }
    }

    pub fn pre_fader(mut self) -> Self {
        self.pre_post = PrePost::Pre;
        self
    }
}

/// Insert or update the send to `destination`
///
/// A source holds at most one send per destination bus. If one already exists
/// its amount is updated in place. Returns true if a new send was appended.
pub fn upsert_send(sends: &mut Vec<Send>, destination: &str, amount: f32) -> bool {
    let amount = amount.clamp(0.0, 1.0);
    if let Some(existing) = sends.iter_mut().find(|s| s.destination_bus == destination) {
        existing.amount = amount;
        return false;
    }
    sends.push(Send::new(destination, amount));
    true
}

/// Collapse sends to the same destination into one
///
/// The first send to a destination keeps its id, tap point and position;
/// later duplicates only contribute their amount, as if upserted in order.
pub fn dedupe_sends(sends: Vec<Send>) -> Vec<Send> {
    let mut merged: Vec<Send> = Vec::with_capacity(sends.len());
    for send in sends {
        match merged
            .iter_mut()
            .find(|s| s.destination_bus == send.destination_bus)
        {
            Some(existing) => existing.amount = send.amount.clamp(0.0, 1.0),
            None => merged.push(send),
        }
    }
    merged
}

/// Remove the send to `destination`. Returns true if one was removed.
pub fn remove_send(sends: &mut Vec<Send>, destination: &str) -> bool {
    let before = sends.len();
    sends.retain(|s| s.destination_bus != destination);
    sends.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_insert_flattens_bands() {
        let bands = [
            EqBand::new(100.0, -2.0, 0.7),
            EqBand::new(3000.0, 3.0, 1.2),
        ];
        let slot = InsertSlot::eq(&bands);

        assert!(slot.is_effect(EQ_EFFECT));
        assert_eq!(slot.parameters.len(), 6);
        assert_eq!(slot.get_param("band_0_freq"), 100.0);
        assert_eq!(slot.get_param("band_1_gain"), 3.0);
        assert_eq!(slot.get_param("band_1_q"), 1.2);
    }

    #[test]
    fn test_compressor_insert_params() {
        let slot = InsertSlot::compressor(-18.0, 3.0, 10.0, 120.0);

        assert!(slot.is_effect(COMPRESSOR_EFFECT));
        assert_eq!(slot.parameters.len(), 4);
        assert_eq!(slot.get_param("ratio"), 3.0);
        assert_eq!(slot.get_param("release"), 120.0);
    }

    #[test]
    fn test_upsert_send_updates_existing() {
        let mut sends = Vec::new();
        assert!(upsert_send(&mut sends, "bus-reverb", 0.3));
        assert!(!upsert_send(&mut sends, "bus-reverb", 0.6));

        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].amount, 0.6);
        assert_eq!(sends[0].pre_post, PrePost::Post);
    }

    #[test]
    fn test_send_amount_clamped() {
        let send = Send::new("bus-delay", 1.5);
        assert_eq!(send.amount, 1.0);
    }

    #[test]
    fn test_remove_send() {
        let mut sends = vec![Send::new("a", 0.5), Send::new("b", 0.5)];
        assert!(remove_send(&mut sends, "a"));
        assert!(!remove_send(&mut sends, "a"));
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].destination_bus, "b");
    }

    #[test]
    fn test_dedupe_sends_keeps_first_with_last_amount() {
        let mut first = Send::new("bus-reverb", 0.2).pre_fader();
        first.id = "s1".to_string();
        let sends = vec![
            first,
            Send::new("bus-delay", 0.5),
            Send::new("bus-reverb", 0.4),
        ];

        let merged = dedupe_sends(sends);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "s1");
        assert_eq!(merged[0].amount, 0.4);
        assert_eq!(merged[0].pre_post, PrePost::Pre);
        assert_eq!(merged[1].destination_bus, "bus-delay");
    }

    #[test]
    fn test_send_json_shape() {
        let send = Send {
            id: "send-1".to_string(),
            destination_bus: "bus-reverb".to_string(),
            amount: 0.25,
            pre_post: PrePost::Pre,
        };
        let json = serde_json::to_value(&send).unwrap();
        assert_eq!(json["destinationBus"], "bus-reverb");
        assert_eq!(json["prePost"], "pre");
    }
}
