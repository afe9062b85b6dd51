//! DSP engine - PCM sample model, tone generation, stream tools, and WAV
//! encoding.
//!
//! Everything here is a pure, synchronous computation over owned sample
//! streams. The same code serves native callers and the WASM boundary.

pub mod generator;
pub mod sample;
pub mod stream;
pub mod wav;
