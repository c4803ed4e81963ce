//! `EngineConfig`: the single struct carrying every knob in spec §6.2, plus
//! per-chip radio presets supplemented from the original's
//! `radio_configuration.cpp` (spec §2.2, §9 "config-object defaults").

use mesh_proto::Role;

use crate::error::EngineError;

/// Which radio chip a config's `lora_*` fields were filled in for, used only
/// to narrow the valid spreading-factor range in [`EngineConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip {
    Sx1276,
    Sx1262,
}

impl Chip {
    fn sf_range(self) -> std::ops::RangeInclusive<u8> {
        match self {
            Chip::Sx1276 => 6..=12,
            Chip::Sx1262 => 5..=12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoraBandwidth {
    Khz125,
    Khz250,
    Khz500,
}

impl LoraBandwidth {
    pub fn khz(self) -> u32 {
        match self {
            LoraBandwidth::Khz125 => 125,
            LoraBandwidth::Khz250 => 250,
            LoraBandwidth::Khz500 => 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoraCodingRate {
    Cr4_5,
    Cr4_6,
    Cr4_7,
    Cr4_8,
}

/// Radio parameters forwarded to the driver, plus the mesh-layer knobs the
/// engine itself consumes (spec §6.2).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub max_packet_size: usize,
    pub hello_interval_s: u64,
    pub default_timeout_s: u64,
    pub min_timeout_s: u64,
    pub rt_max_size: usize,
    pub duty_cycle_pct: u8,
    pub sync_word: u8,
    pub lora_sf: u8,
    pub lora_bw: LoraBandwidth,
    pub lora_cr: LoraCodingRate,
    pub lora_preamble: u16,
    pub lora_power: i8,
    /// Centre frequency in MHz.
    pub lora_band_mhz: f32,
    pub node_role: Role,
    pub chip: Option<Chip>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_packet_size: 100,
            hello_interval_s: 120,
            default_timeout_s: 120 * 5,
            min_timeout_s: 20,
            rt_max_size: 256,
            duty_cycle_pct: 100,
            sync_word: 0x13,
            lora_sf: 7,
            lora_bw: LoraBandwidth::Khz125,
            lora_cr: LoraCodingRate::Cr4_7,
            lora_preamble: 8,
            lora_power: 6,
            lora_band_mhz: 869.9,
            node_role: Role::NONE,
            chip: None,
        }
    }
}

impl EngineConfig {
    /// Defaults tuned for the Semtech SX1276 (spec §2.2).
    pub fn for_sx1276() -> Self {
        Self {
            chip: Some(Chip::Sx1276),
            ..Self::default()
        }
    }

    /// Defaults tuned for the Semtech SX1262 (spec §2.2): same mesh-layer
    /// defaults, wider spreading-factor floor.
    pub fn for_sx1262() -> Self {
        Self {
            chip: Some(Chip::Sx1262),
            lora_sf: 7,
            ..Self::default()
        }
    }

    /// Rejects every invalid combination named in spec §6.2 before the
    /// engine is allowed to reach `start()`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(13..=255).contains(&self.max_packet_size) {
            return Err(EngineError::Configuration(format!(
                "max_packet_size {} outside [13, 255]",
                self.max_packet_size
            )));
        }
        if !(1..=100).contains(&self.duty_cycle_pct) {
            return Err(EngineError::Configuration(format!(
                "duty_cycle_pct {} outside [1, 100]",
                self.duty_cycle_pct
            )));
        }
        let sf_range = self.chip.map(Chip::sf_range).unwrap_or(6..=12);
        if !sf_range.contains(&self.lora_sf) {
            return Err(EngineError::Configuration(format!(
                "lora_sf {} outside supported range {:?}",
                self.lora_sf, sf_range
            )));
        }
        if self.lora_band_mhz <= 0.0 {
            return Err(EngineError::Configuration("lora_band_mhz must be positive".into()));
        }
        if self.rt_max_size == 0 {
            return Err(EngineError::Configuration("rt_max_size must be nonzero".into()));
        }
        if self.min_timeout_s == 0 || self.min_timeout_s > self.default_timeout_s {
            return Err(EngineError::Configuration(
                "min_timeout_s must be nonzero and no greater than default_timeout_s".into(),
            ));
        }
        Ok(())
    }

    pub fn default_timeout_ms(&self) -> u64 {
        self.default_timeout_s * 1000
    }

    pub fn hello_interval_ms(&self) -> u64 {
        self.hello_interval_s * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_max_packet_size() {
        let mut cfg = EngineConfig::default();
        cfg.max_packet_size = 5;
        assert!(cfg.validate().is_err());
        cfg.max_packet_size = 300;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_duty_cycle() {
        let mut cfg = EngineConfig::default();
        cfg.duty_cycle_pct = 0;
        assert!(cfg.validate().is_err());
        cfg.duty_cycle_pct = 150;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_spreading_factor_outside_chip_preset() {
        let mut cfg = EngineConfig::for_sx1276();
        cfg.lora_sf = 13;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn chip_presets_validate() {
        assert!(EngineConfig::for_sx1276().validate().is_ok());
        assert!(EngineConfig::for_sx1262().validate().is_ok());
    }
}
