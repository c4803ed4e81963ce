//! ETX (Expected Transmission Count) scale and thresholds (spec §4.2).
//!
//! ETX is scaled ×10 and stored as a single byte: 10 means a perfect,
//! loss-free link.

pub const MIN: u8 = 10;
pub const MAX: u8 = 255;
/// Assigned to a link before enough hello samples exist to estimate loss.
pub const BOOTSTRAP: u8 = 15;
/// Acceptance ceiling for the first multi-hop route admitted into an empty table.
pub const BOOTSTRAP_THRESHOLD: u16 = 50;
/// A route whose total ETX exceeds this is eligible for eviction regardless
/// of the normal improvement margin.
pub const UNUSABLE: u16 = 200;
/// A candidate route replaces the current one only if it beats it by this factor.
pub const HYSTERESIS: f32 = 1.1;
/// Hello-count decay trigger: once `hellos_expected` reaches this, both
/// counters are scaled down to keep the ratio meaningful over time.
pub const DECAY_THRESHOLD: u16 = 100;
pub const DECAY_FACTOR: f32 = 0.8;
/// Minimum hello samples required before trusting a measured reverse ETX.
pub const MIN_SAMPLES: u16 = 3;
