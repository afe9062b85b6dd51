pub mod dsp;
pub mod error;
pub mod morse;
pub mod transmit;

use wasm_bindgen::prelude::*;

use crate::error::MorseWaveError;
use crate::transmit::TransmitOptions;

pub use crate::transmit::{TimedEvent, Transmission, timeline, transmit, transmit_cancellable};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the morsewave-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Render transmit text to its dot/dash form without synthesizing audio.
pub fn preview(text: &str) -> Result<String, MorseWaveError> {
    let (_, rendered) = morse::parse(text)?;
    Ok(rendered)
}

/// WASM-exposed: dot/dash preview of the transmit text.
#[wasm_bindgen]
pub fn morse_preview(text: &str) -> Result<String, JsValue> {
    preview(text).map_err(|e| JsValue::from_str(&format!("{e}")))
}

fn options_from_json(options_json: &str) -> Result<TransmitOptions, JsValue> {
    if options_json.trim().is_empty() {
        return Ok(TransmitOptions::default());
    }
    TransmitOptions::from_json(options_json).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render transmit text to a WAV byte array. `options_json`
/// is a serialized [`TransmitOptions`]; pass an empty string for the
/// defaults.
#[wasm_bindgen]
pub fn transmit_wav(text: &str, options_json: &str) -> Result<Vec<u8>, JsValue> {
    let options = options_from_json(options_json)?;
    let transmission =
        transmit::transmit(text, &options).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(transmission.wav)
}

/// WASM-exposed: the per-character timeline for progress display, as a JS
/// array of `{ representation, start_ms, duration_ms }` objects. Timing
/// only, no audio is synthesized.
#[wasm_bindgen]
pub fn transmit_timeline(text: &str, options_json: &str) -> Result<JsValue, JsValue> {
    let options = options_from_json(options_json)?;
    let events =
        transmit::timeline(text, &options).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    serde_wasm_bindgen::to_value(&events).map_err(|e| JsValue::from_str(&format!("{e}")))
}
