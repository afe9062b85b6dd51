use std::fmt;

#[derive(Debug)]
pub enum MorseWaveError {
    Text(TextError),
    Options(OptionsError),
    Stream(StreamError),
}

#[derive(Debug)]
pub enum TextError {
    Blank,
    UnterminatedProsign { pos: usize },
    EmptyProsign { pos: usize },
    NoEncodableText,
}

#[derive(Debug)]
pub enum OptionsError {
    UnsupportedBitDepth(u16),
    NoChannels,
    ZeroSampleRate,
    NonPositiveFrequency(f64),
    GainOutOfRange(f64),
}

#[derive(Debug)]
pub enum StreamError {
    Empty { op: &'static str },
}

impl fmt::Display for MorseWaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorseWaveError::Text(e) => write!(f, "Text error: {e}"),
            MorseWaveError::Options(e) => write!(f, "Options error: {e}"),
            MorseWaveError::Stream(e) => write!(f, "Stream error: {e}"),
        }
    }
}

impl std::error::Error for MorseWaveError {}

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextError::Blank => write!(f, "Transmit text is blank"),
            TextError::UnterminatedProsign { pos } => {
                write!(f, "Unterminated prosign bracket at pos {pos}")
            }
            TextError::EmptyProsign { pos } => write!(f, "Empty prosign bracket at pos {pos}"),
            TextError::NoEncodableText => write!(f, "No encodable Morse characters in text"),
        }
    }
}

impl std::error::Error for TextError {}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::UnsupportedBitDepth(bits) => {
                write!(f, "Unsupported bit depth {bits}, expected 8, 16, 24 or 32")
            }
            OptionsError::NoChannels => write!(f, "Channel count must be at least 1"),
            OptionsError::ZeroSampleRate => write!(f, "Sample rate must be greater than zero"),
            OptionsError::NonPositiveFrequency(hz) => {
                write!(f, "Tone frequency must be positive, got {hz}")
            }
            OptionsError::GainOutOfRange(percent) => {
                write!(f, "Gain must be within 0..=100 percent, got {percent}")
            }
        }
    }
}

impl std::error::Error for OptionsError {}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Empty { op } => {
                write!(f, "{op}: the stream must contain at least one sample")
            }
        }
    }
}

impl std::error::Error for StreamError {}

impl From<TextError> for MorseWaveError {
    fn from(e: TextError) -> Self {
        MorseWaveError::Text(e)
    }
}

impl From<OptionsError> for MorseWaveError {
    fn from(e: OptionsError) -> Self {
        MorseWaveError::Options(e)
    }
}

impl From<StreamError> for MorseWaveError {
    fn from(e: StreamError) -> Self {
        MorseWaveError::Stream(e)
    }
}
