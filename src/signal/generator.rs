//! Dual-channel test tone synthesis

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::rates::SampleRate;

/// Peak amplitude of each test tone (-6 dBFS)
pub const TONE_AMPLITUDE: f64 = 0.5;

/// Extra input frames beyond the converter's nominal requirement
const INPUT_MARGIN_FRAMES: usize = 64;

/// Where a channel's tone sits, in Hz and in the converted output spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelTone {
    pub channel: usize,
    pub frequency_hz: f64,
    /// Expected bin of the tone in an FFT of the converter output
    pub output_bin: usize,
}

/// How test tones are laid out for a rate pair
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPlan {
    /// Output transform size the tones are placed against
    pub fft_points: usize,
    /// Output samples discarded while the converter's filters settle
    pub settle_samples: usize,
    /// Input sample-rate error factor (1.0 = nominal)
    pub ferr: f64,
    /// Requested output bin per channel, relative to the lower of the two rates
    pub tone_bins: Vec<usize>,
}

impl SignalPlan {
    /// Tone placement for each channel
    ///
    /// The requested bin is scaled by `min(ip, op) / op` so the tone is below
    /// both Nyquist limits, then rounded so it lands on an exact output bin.
    pub fn tones(&self, ip_rate: SampleRate, op_rate: SampleRate) -> Vec<ChannelTone> {
        let ip = ip_rate.hz() as f64;
        let op = op_rate.hz() as f64;
        let scale = ip.min(op) / op;

        self.tone_bins
            .iter()
            .enumerate()
            .map(|(channel, &bin)| {
                let output_bin = ((bin as f64 * scale).round() as usize).max(1);
                ChannelTone {
                    channel,
                    frequency_hz: output_bin as f64 * op / self.fft_points as f64,
                    output_bin,
                }
            })
            .collect()
    }

    /// Input frames needed for the converter to emit settle + one transform block
    pub fn input_frames(&self, ip_rate: SampleRate, op_rate: SampleRate) -> usize {
        let output_needed = self.settle_samples.saturating_add(self.fft_points) as f64;
        let ratio = ip_rate.hz() as f64 / op_rate.hz() as f64;
        (output_needed * ratio).ceil() as usize + INPUT_MARGIN_FRAMES
    }

    /// Synthesize the input signal for one rate pair
    pub fn generate(&self, ip_rate: SampleRate, op_rate: SampleRate) -> TestSignal {
        let tones = self.tones(ip_rate, op_rate);
        let frames = self.input_frames(ip_rate, op_rate);
        let effective_rate = ip_rate.hz() as f64 * self.ferr;

        let channels = tones
            .iter()
            .map(|tone| {
                let step = 2.0 * PI * tone.frequency_hz / effective_rate;
                (0..frames)
                    .map(|n| TONE_AMPLITUDE * (step * n as f64).sin())
                    .collect()
            })
            .collect();

        TestSignal {
            ip_rate,
            op_rate,
            channels,
            tones,
        }
    }
}

/// Generated converter input for one rate pair
#[derive(Debug, Clone)]
pub struct TestSignal {
    pub ip_rate: SampleRate,
    pub op_rate: SampleRate,
    /// Per-channel samples at the input rate
    pub channels: Vec<Vec<f64>>,
    pub tones: Vec<ChannelTone>,
}

impl TestSignal {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn tone(&self, channel: usize) -> Option<&ChannelTone> {
        self.tones.get(channel)
    }

    /// Human-readable label for plots and reports
    pub fn label(&self, channel: usize) -> String {
        match self.tone(channel) {
            Some(tone) => format!(
                "ch{} {:.1}Hz @ {}Hz -> {}Hz",
                channel, tone.frequency_hz, self.ip_rate, self.op_rate
            ),
            None => format!("ch{} @ {}Hz -> {}Hz", channel, self.ip_rate, self.op_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute_spectrum, SNR_CEILING_DB};
    use approx::assert_relative_eq;

    fn plan() -> SignalPlan {
        SignalPlan {
            fft_points: 1024,
            settle_samples: 1024,
            ferr: 1.0,
            tone_bins: vec![1024 / 5, 1024 / 6],
        }
    }

    #[test]
    fn test_downsampling_keeps_requested_bins() {
        let tones = plan().tones(SampleRate::Hz96000, SampleRate::Hz48000);
        assert_eq!(tones[0].output_bin, 204);
        assert_eq!(tones[1].output_bin, 170);
        assert_relative_eq!(tones[0].frequency_hz, 204.0 * 48_000.0 / 1024.0);
    }

    #[test]
    fn test_upsampling_scales_below_input_nyquist() {
        let tones = plan().tones(SampleRate::Hz44100, SampleRate::Hz192000);
        for tone in &tones {
            assert!(tone.frequency_hz < 44_100.0 / 2.0);
        }
        // 204 * 44100 / 192000 = 46.86 -> 47
        assert_eq!(tones[0].output_bin, 47);
    }

    #[test]
    fn test_input_length_covers_output_block() {
        let p = plan();
        let frames = p.input_frames(SampleRate::Hz192000, SampleRate::Hz48000);
        assert!(frames >= 4 * 2048);
        let frames = p.input_frames(SampleRate::Hz48000, SampleRate::Hz48000);
        assert_eq!(frames, 2048 + 64);
    }

    #[test]
    fn test_same_rate_signal_is_clean_at_output_bin() {
        let signal = plan().generate(SampleRate::Hz48000, SampleRate::Hz48000);
        assert_eq!(signal.num_channels(), 2);

        for channel in 0..2 {
            let tone = signal.tone(channel).unwrap();
            let spectrum = compute_spectrum(&signal.channels[channel], 1024, None).unwrap();
            assert_relative_eq!(
                spectrum.magnitudes()[tone.output_bin],
                TONE_AMPLITUDE,
                epsilon = 1e-9
            );
            let snr = crate::analysis::calc_snr(&spectrum, tone.output_bin).unwrap();
            assert!(snr > 150.0 || snr == SNR_CEILING_DB);
        }
    }

    #[test]
    fn test_rate_error_shifts_tone() {
        let mut p = plan();
        p.ferr = 1.01;
        let signal = p.generate(SampleRate::Hz48000, SampleRate::Hz48000);
        let spectrum = compute_spectrum(&signal.channels[0], 1024, None).unwrap();
        assert!(spectrum.magnitudes()[204] < TONE_AMPLITUDE * 0.99);
    }

    #[test]
    fn test_label() {
        let signal = plan().generate(SampleRate::Hz48000, SampleRate::Hz48000);
        assert!(signal.label(1).starts_with("ch1 "));
        assert!(signal.label(1).ends_with("48000Hz -> 48000Hz"));
    }
}
