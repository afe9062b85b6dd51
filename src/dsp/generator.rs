//! Tone and silence generation.
//!
//! Tones are rendered one keyed span at a time, so every generated stream is
//! extended to a whole-cycle boundary and gets a short linear ramp at each
//! end to suppress key clicks between adjacent spans.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::sample::{AudioFormat, Sample};

/// Tone shapes the generator can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveShape {
    Sine,
    Sawtooth,
    Square,
    Triangle,
}

impl WaveShape {
    /// Parse a shape name; `None` for anything unrecognized.
    pub fn from_name(name: &str) -> Option<WaveShape> {
        match name.to_ascii_lowercase().as_str() {
            "sine" => Some(WaveShape::Sine),
            "sawtooth" | "saw" => Some(WaveShape::Sawtooth),
            "square" => Some(WaveShape::Square),
            "triangle" => Some(WaveShape::Triangle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WaveShape::Sine => "sine",
            WaveShape::Sawtooth => "sawtooth",
            WaveShape::Square => "square",
            WaveShape::Triangle => "triangle",
        }
    }
}

/// Wave cycles over which a tone's edges ramp linearly from and to zero.
pub const ATTENUATION_CYCLES: f64 = 2.0;

/// Render one tone as a fresh sample stream.
///
/// The stream runs past `duration_sec` to the next whole wave cycle, so a
/// tone never cuts off mid-cycle. `amplitude_percent` is capped at 100;
/// combined with the full-scale floor in
/// [`AudioFormat::peak_amplitude`] every tone renders at full scale, and
/// real output gain is applied later over the assembled stream.
pub fn generate_tone(
    format: AudioFormat,
    shape: WaveShape,
    amplitude_percent: f64,
    duration_sec: f64,
    frequency_hz: f64,
) -> Vec<Sample> {
    let amplitude = amplitude_percent.abs().min(100.0);
    let sample_rate = format.sample_rate as f64;
    let samples_per_cycle = sample_rate / frequency_hz;
    let total_samples = duration_sec * sample_rate;
    // Extend to the next whole-cycle boundary.
    let extra_samples = samples_per_cycle - (total_samples % samples_per_cycle);
    let full_length = total_samples + extra_samples;
    let attenuation_samples = samples_per_cycle * ATTENUATION_CYCLES;
    let peak = format.peak_amplitude(amplitude);

    let mut stream = Vec::with_capacity(full_length.ceil() as usize);
    let mut x = 0usize;
    while (x as f64) < full_length {
        let t = x as f64;
        let mut value = match shape {
            WaveShape::Sine => peak * ((2.0 * PI * t * frequency_hz) / sample_rate).sin(),
            WaveShape::Sawtooth => {
                ((peak * (2.0 * t / samples_per_cycle + 1.0)) % (2.0 * peak)) - peak
            }
            WaveShape::Square => {
                if (t % samples_per_cycle) < samples_per_cycle / 2.0 {
                    peak
                } else {
                    -peak
                }
            }
            WaveShape::Triangle => {
                (2.0 * peak / PI) * (((2.0 * PI * frequency_hz / sample_rate) * t).sin()).asin()
            }
        };
        if t < attenuation_samples {
            value *= t / attenuation_samples;
        } else if t > full_length - attenuation_samples {
            value *= (full_length - t) / attenuation_samples;
        }
        stream.push(Sample::new(format, value as i32));
        x += 1;
    }
    stream
}

/// Render `duration_sec` of silence, rounded up to a whole sample.
pub fn generate_silence(format: AudioFormat, duration_sec: f64) -> Vec<Sample> {
    let total = (duration_sec * format.sample_rate as f64).ceil() as usize;
    vec![Sample::new(format, 0); total]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt() -> AudioFormat {
        AudioFormat::new(8000, 16, 1)
    }

    #[test]
    fn tone_extends_to_cycle_boundary() {
        // 1 kHz at 8 kHz: 8 samples per cycle. 0.1 s is exactly 800 samples,
        // and an exact multiple still gains one extra full cycle.
        let stream = generate_tone(fmt(), WaveShape::Sine, 100.0, 0.1, 1000.0);
        assert_eq!(stream.len(), 808);
    }

    #[test]
    fn tone_extends_partial_cycle() {
        // 441 Hz at 44.1 kHz: 100 samples per cycle. 0.01 s is 441 samples,
        // extended by 59 to close the fifth cycle.
        let format = AudioFormat::new(44100, 16, 1);
        let stream = generate_tone(format, WaveShape::Sine, 100.0, 0.01, 441.0);
        assert_eq!(stream.len(), 500);
    }

    #[test]
    fn tone_edges_ramp_from_and_to_zero() {
        let stream = generate_tone(fmt(), WaveShape::Square, 100.0, 0.1, 1000.0);
        assert_eq!(stream[0].get_channel(0), 0, "first sample starts the ramp at zero");
        let last = stream[stream.len() - 1].get_channel(0);
        assert!(last.abs() < 32767 / 4, "tail should be deep into the ramp, got {last}");
    }

    #[test]
    fn square_holds_peak_between_ramps() {
        // Attenuation spans 16 samples at each end; everything between sits
        // hard on the rails.
        let stream = generate_tone(fmt(), WaveShape::Square, 100.0, 0.1, 1000.0);
        for (i, sample) in stream.iter().enumerate().take(792).skip(16) {
            assert_eq!(sample.get_channel(0).abs(), 32767, "sample {i}");
        }
    }

    #[test]
    fn sine_stays_in_range_and_reaches_near_peak() {
        let stream = generate_tone(fmt(), WaveShape::Sine, 100.0, 0.1, 1000.0);
        let mut max = 0i32;
        for sample in &stream {
            let v = sample.get_channel(0);
            assert!((-32768..=32767).contains(&v), "out of range: {v}");
            max = max.max(v.abs());
        }
        assert!(max > 29000, "sine never came near full scale, max {max}");
    }

    #[test]
    fn triangle_and_sawtooth_stay_in_range() {
        for shape in [WaveShape::Triangle, WaveShape::Sawtooth] {
            let stream = generate_tone(fmt(), shape, 100.0, 0.05, 700.0);
            for sample in &stream {
                let v = sample.get_channel(0);
                assert!((-32768..=32767).contains(&v), "{shape:?} out of range: {v}");
            }
        }
    }

    #[test]
    fn amplitude_percent_floors_to_full_scale() {
        // 50 and 150 both render identically to 100: the generator caps at
        // 100 and the peak floors at 100.
        let at_100 = generate_tone(fmt(), WaveShape::Sine, 100.0, 0.02, 700.0);
        let at_50 = generate_tone(fmt(), WaveShape::Sine, 50.0, 0.02, 700.0);
        let at_150 = generate_tone(fmt(), WaveShape::Sine, 150.0, 0.02, 700.0);
        assert_eq!(at_100, at_50);
        assert_eq!(at_100, at_150);
    }

    #[test]
    fn silence_rounds_up_to_whole_sample() {
        let format = AudioFormat::new(1000, 16, 1);
        let stream = generate_silence(format, 0.0101);
        assert_eq!(stream.len(), 11);
        assert!(stream.iter().all(|s| s.get_channel(0) == 0));
    }

    #[test]
    fn silence_zero_duration_is_empty() {
        assert!(generate_silence(fmt(), 0.0).is_empty());
    }

    #[test]
    fn shape_names_round_trip() {
        for shape in [
            WaveShape::Sine,
            WaveShape::Sawtooth,
            WaveShape::Square,
            WaveShape::Triangle,
        ] {
            assert_eq!(WaveShape::from_name(shape.name()), Some(shape));
        }
        assert_eq!(WaveShape::from_name("SQUARE"), Some(WaveShape::Square));
        assert_eq!(WaveShape::from_name("saw"), Some(WaveShape::Sawtooth));
        assert_eq!(WaveShape::from_name("noise"), None);
    }

    #[test]
    fn shape_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&WaveShape::Triangle).unwrap();
        assert_eq!(json, "\"triangle\"");
        let shape: WaveShape = serde_json::from_str("\"sine\"").unwrap();
        assert_eq!(shape, WaveShape::Sine);
    }
}
