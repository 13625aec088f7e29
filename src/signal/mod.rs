//! Test Signal Generation
//!
//! Sample-rate tables and the dual-channel test tones fed to the converter.
//! Tones are placed by output FFT bin so that the expected tone location in
//! the converted signal is known before the simulator runs.

mod generator;
mod rates;

pub use generator::{ChannelTone, SignalPlan, TestSignal, TONE_AMPLITUDE};
pub use rates::{all_rates, SampleRate};
