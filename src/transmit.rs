//! Transmission orchestrator - turns transmit text into a finished WAV
//! buffer plus a per-character timeline for progress display.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::dsp::generator::{WaveShape, generate_silence, generate_tone};
use crate::dsp::sample::{AudioFormat, Sample};
use crate::dsp::stream::{append_samples, change_volume};
use crate::dsp::wav::encode_wav;
use crate::error::{MorseWaveError, OptionsError};
use crate::morse;

// ── Options ─────────────────────────────────────────────────

/// Transmission settings. Also the JSON payload a front end persists
/// between sessions; missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmitOptions {
    /// Keying speed in words per minute, PARIS standard.
    pub wpm: u32,
    /// Tone frequency in Hz.
    pub frequency: f64,
    /// Output gain percent, 0 to 100.
    pub gain: f64,
    /// Waveform shape for keyed tones.
    pub wave: WaveShape,
    /// Samples per second.
    pub sample_rate: u32,
    /// Bits per PCM sample: 8, 16, 24 or 32.
    pub bits_per_sample: u16,
    /// Output channel count.
    pub channels: u16,
}

impl Default for TransmitOptions {
    fn default() -> Self {
        TransmitOptions {
            wpm: 10,
            frequency: 700.0,
            gain: 60.0,
            wave: WaveShape::Sine,
            sample_rate: 16_000,
            bits_per_sample: 16,
            channels: 1,
        }
    }
}

impl TransmitOptions {
    /// Check the boundary preconditions the DSP layer assumes.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !matches!(self.bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(OptionsError::UnsupportedBitDepth(self.bits_per_sample));
        }
        if self.channels < 1 {
            return Err(OptionsError::NoChannels);
        }
        if self.sample_rate == 0 {
            return Err(OptionsError::ZeroSampleRate);
        }
        if self.frequency <= 0.0 {
            return Err(OptionsError::NonPositiveFrequency(self.frequency));
        }
        if !(0.0..=100.0).contains(&self.gain) {
            return Err(OptionsError::GainOutOfRange(self.gain));
        }
        Ok(())
    }

    /// The audio format these options describe.
    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.sample_rate, self.bits_per_sample, self.channels)
    }

    /// Serialize for a settings store.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Read back a settings payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ── Orchestrator output ─────────────────────────────────────

/// One character's slot on the transmission timeline.
///
/// `duration_ms` includes the character's trailing gaps, so consecutive
/// events tile the timeline without holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// The character or prosign as looked up, e.g. "Q" or "<AR>".
    pub representation: String,
    /// Offset from the start of the transmission.
    pub start_ms: f64,
    /// Total extent including trailing symbol and character gaps.
    pub duration_ms: f64,
}

/// A finished, possibly cancelled, transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    /// Complete WAV byte buffer. Empty only when cancellation fired before
    /// any synthesis happened.
    pub wav: Vec<u8>,
    /// Informational dot/dash rendering of the encoded text.
    pub rendered: String,
    /// Per-character timing, truncated to fully synthesized characters.
    pub timeline: Vec<TimedEvent>,
    /// True when the cancellation flag cut the transmission short.
    pub cancelled: bool,
}

// ── Transmission ────────────────────────────────────────────

/// Render `text` to a WAV buffer with the given options.
pub fn transmit(text: &str, options: &TransmitOptions) -> Result<Transmission, MorseWaveError> {
    transmit_cancellable(text, options, &AtomicBool::new(false))
}

/// Render `text`, polling `cancel` before each span's synthesis.
///
/// A raised flag stops synthesis early and yields a valid truncated WAV, or
/// an empty buffer when nothing was synthesized yet, with `cancelled` set.
/// Cancellation is never an error.
pub fn transmit_cancellable(
    text: &str,
    options: &TransmitOptions,
    cancel: &AtomicBool,
) -> Result<Transmission, MorseWaveError> {
    transmit_inner(text, options, &mut || cancel.load(Ordering::Relaxed))
}

/// Per-character timing for `text` without synthesizing any audio.
///
/// Validates the same preconditions as [`transmit`], though only `wpm`
/// affects the timing. The events are exactly the timeline an uncancelled
/// transmission of the same text would carry.
pub fn timeline(
    text: &str,
    options: &TransmitOptions,
) -> Result<Vec<TimedEvent>, MorseWaveError> {
    options.validate()?;
    let (characters, _) = morse::parse(text)?;
    let scaled = morse::scale_to_milliseconds(&characters, options.wpm);
    Ok(timeline_events(&scaled))
}

fn transmit_inner(
    text: &str,
    options: &TransmitOptions,
    should_cancel: &mut dyn FnMut() -> bool,
) -> Result<Transmission, MorseWaveError> {
    options.validate()?;
    let (characters, rendered) = morse::parse(text)?;
    let scaled = morse::scale_to_milliseconds(&characters, options.wpm);
    let format = options.format();

    debug!(
        "transmitting {} characters at {} ms/unit, {} Hz {}",
        scaled.len(),
        morse::wpm_factor(options.wpm),
        options.frequency,
        options.wave.name(),
    );

    let mut stream: Vec<Sample> = Vec::new();
    let mut completed = 0usize;
    let mut cancelled = false;

    'characters: for character in &scaled {
        for span in &character.spans {
            if should_cancel() {
                cancelled = true;
                break 'characters;
            }
            let duration_sec = span.duration_ms / 1000.0;
            let chunk = if span.tone {
                generate_tone(format, options.wave, 100.0, duration_sec, options.frequency)
            } else {
                generate_silence(format, duration_sec)
            };
            if stream.is_empty() {
                stream = chunk;
            } else {
                append_samples(&mut stream, vec![(None, chunk)])?;
            }
        }
        trace!("synthesized {:?}", character.representation);
        completed += 1;
    }

    if stream.is_empty() {
        debug!("transmission cancelled before any synthesis");
        return Ok(Transmission {
            wav: Vec::new(),
            rendered,
            timeline: Vec::new(),
            cancelled: true,
        });
    }

    change_volume(&mut stream, options.gain)?;
    let wav = encode_wav(&stream)?;
    let timeline = timeline_events(&scaled[..completed]);

    debug!(
        "transmission finished: {} samples, {} wav bytes, cancelled={cancelled}",
        stream.len(),
        wav.len(),
    );

    Ok(Transmission {
        wav,
        rendered,
        timeline,
        cancelled,
    })
}

/// Tile scaled characters into contiguous timeline events.
fn timeline_events(scaled: &[morse::ScaledCharacter]) -> Vec<TimedEvent> {
    let mut events = Vec::with_capacity(scaled.len());
    let mut start_ms = 0.0;
    for character in scaled {
        let duration_ms = character.duration_ms();
        events.push(TimedEvent {
            representation: character.representation.to_string(),
            start_ms,
            duration_ms,
        });
        start_ms += duration_ms;
    }
    events
}
