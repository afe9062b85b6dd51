//! Morse timing model - the alphabet, transmit-text parsing, and WPM
//! scaling.
//!
//! Terminology: a SYMBOL is an individual dit, dah or word gap; a CHARACTER
//! is a glyph or prosign built from a symbol sequence. All durations are
//! expressed in DIT units and scaled to milliseconds by the PARIS
//! words-per-minute factor.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::TextError;

// ── Unit durations ──────────────────────────────────────────

/// Base timing unit; every other duration is a multiple of one DIT.
pub const DIT_UNITS: f64 = 1.0;
/// A DAH sounds for three DITs.
pub const DAH_UNITS: f64 = 3.0 * DIT_UNITS;
/// Silent gap between the symbols of one character.
pub const SYMBOL_GAP_UNITS: f64 = DIT_UNITS;
/// Extra silence after a character, on top of the trailing symbol gap, so
/// adjacent characters sit one full DAH apart.
pub const CHARACTER_GAP_UNITS: f64 = 2.0 * DIT_UNITS;
/// Silence spanned by the word-separating space character.
pub const WORD_GAP_UNITS: f64 = 5.0 * DIT_UNITS;

// ── Symbols and characters ──────────────────────────────────

/// An individual timed symbol: a dit, a dah, or the word gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorseSymbol {
    /// Source glyph: '.', '-' or ' '.
    pub glyph: char,
    /// Duration in DIT units.
    pub units: f64,
    /// Whether the symbol keys the tone; gaps are silent.
    pub tone: bool,
}

impl MorseSymbol {
    fn dit() -> Self {
        MorseSymbol {
            glyph: '.',
            units: DIT_UNITS,
            tone: true,
        }
    }

    fn dah() -> Self {
        MorseSymbol {
            glyph: '-',
            units: DAH_UNITS,
            tone: true,
        }
    }

    fn word_gap() -> Self {
        MorseSymbol {
            glyph: ' ',
            units: WORD_GAP_UNITS,
            tone: false,
        }
    }
}

/// One encodable character: a glyph or a `<..>` prosign plus its symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct MorseCharacter {
    /// Exact lookup key, e.g. "Q" or "<AR>".
    pub representation: &'static str,
    /// Dot/dash rendering used for the informational output string.
    pub code: &'static str,
    /// Ordered timed symbols.
    pub symbols: Vec<MorseSymbol>,
}

impl MorseCharacter {
    fn from_code(representation: &'static str, code: &'static str) -> Self {
        let symbols = code
            .chars()
            .map(|glyph| match glyph {
                '.' => MorseSymbol::dit(),
                '-' => MorseSymbol::dah(),
                ' ' => MorseSymbol::word_gap(),
                other => panic!("alphabet code contains invalid glyph {other:?}"),
            })
            .collect();
        MorseCharacter {
            representation,
            code,
            symbols,
        }
    }
}

// ── Alphabet ────────────────────────────────────────────────

/// Letters, digits and punctuation, keyed by the exact upper-case glyph.
#[rustfmt::skip]
const CODES: &[(&str, &str)] = &[
    ("A", ".-"),    ("B", "-..."),  ("C", "-.-."),  ("D", "-.."),   ("E", "."),
    ("F", "..-."),  ("G", "--."),   ("H", "...."),  ("I", ".."),    ("J", ".---"),
    ("K", "-.-"),   ("L", ".-.."),  ("M", "--"),    ("N", "-."),    ("O", "---"),
    ("P", ".--."),  ("Q", "--.-"),  ("R", ".-."),   ("S", "..."),   ("T", "-"),
    ("U", "..-"),   ("V", "...-"),  ("W", ".--"),   ("X", "-..-"),  ("Y", "-.--"),
    ("Z", "--.."),
    ("1", ".----"), ("2", "..---"), ("3", "...--"), ("4", "....-"), ("5", "....."),
    ("6", "-...."), ("7", "--..."), ("8", "---.."), ("9", "----."), ("0", "-----"),
    (" ", " "),
    (".", ".-.-.-"), (",", "--..--"), ("?", "..--.."), ("'", ".----."),
    ("!", "-.-.--"), ("/", "-..-."),  (":", "---..."), (";", "-.-.-."),
    ("=", "-...-"),  ("+", ".-.-."),  ("-", "-....-"), ("_", "..--.-"),
    ("\"", ".-..-."), ("@", ".--.-."),
];

/// Procedural signals, written `<XY>` in transmit text: run-together symbol
/// sequences with no internal character gap.
#[rustfmt::skip]
const PROSIGNS: &[(&str, &str)] = &[
    ("<AR>", ".-.-."),
    ("<AS>", ".-..."),
    ("<BK>", "-...-.-"),
    ("<BT>", "-...-"),
    ("<CL>", "-.-..-.."),
    ("<CT>", "-.-.-"),
    ("<HH>", "........"),
    ("<KA>", "-.-.-"),
    ("<KN>", "-.--."),
    ("<SK>", "...-.-"),
    ("<SN>", "...-."),
    ("<SOS>", "...---..."),
];

static ALPHABET: OnceLock<HashMap<&'static str, MorseCharacter>> = OnceLock::new();

/// The process-wide alphabet table, built once on first use.
pub fn alphabet() -> &'static HashMap<&'static str, MorseCharacter> {
    ALPHABET.get_or_init(|| {
        CODES
            .iter()
            .chain(PROSIGNS.iter())
            .map(|&(representation, code)| {
                (representation, MorseCharacter::from_code(representation, code))
            })
            .collect()
    })
}

// ── WPM timing ──────────────────────────────────────────────

/// Milliseconds per DIT unit at the given speed, per the PARIS standard:
/// the word "PARIS" spans exactly 50 units.
///
/// Speeds below 1 WPM clamp up to 1.
pub fn wpm_factor(wpm: u32) -> f64 {
    let wpm = wpm.max(1) as f64;
    round2(60_000.0 / (50.0 * wpm))
}

/// Round to two decimals, the factor's millisecond precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ── Text parsing ────────────────────────────────────────────

/// Parse transmit text into its ordered Morse characters plus an
/// informational dot/dash rendering, one space between characters.
///
/// Input is trimmed and upper-cased first. `<` opens a prosign token that
/// must be closed by `>` with at least one character between. Tokens with no
/// alphabet entry are skipped silently; a text with no encodable characters
/// at all is rejected.
pub fn parse(text: &str) -> Result<(Vec<MorseCharacter>, String), TextError> {
    let cleaned = text.trim().to_uppercase();
    if cleaned.is_empty() {
        return Err(TextError::Blank);
    }

    let table = alphabet();
    let chars: Vec<char> = cleaned.chars().collect();
    let mut matched = Vec::new();
    let mut rendered = String::new();
    let mut pos = 0;

    while pos < chars.len() {
        let token: String;
        if chars[pos] == '<' {
            match chars[pos..].iter().position(|&c| c == '>') {
                None => return Err(TextError::UnterminatedProsign { pos }),
                Some(1) => return Err(TextError::EmptyProsign { pos }),
                Some(offset) => {
                    token = chars[pos..=pos + offset].iter().collect();
                    pos += offset + 1;
                }
            }
        } else {
            token = chars[pos].to_string();
            pos += 1;
        }
        if let Some(character) = table.get(token.as_str()) {
            rendered.push_str(character.code);
            rendered.push(' ');
            matched.push(character.clone());
        }
    }

    if matched.is_empty() {
        return Err(TextError::NoEncodableText);
    }
    rendered.pop(); // drop the last character's trailing space
    Ok((matched, rendered))
}

// ── Millisecond scaling ─────────────────────────────────────

/// One contiguous span of the transmission: keyed tone or silence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpan {
    pub duration_ms: f64,
    pub tone: bool,
}

/// A character's WPM-scaled spans, trailing gaps included.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledCharacter {
    pub representation: &'static str,
    pub spans: Vec<ToneSpan>,
}

impl ScaledCharacter {
    /// Total extent in milliseconds, trailing gaps included.
    pub fn duration_ms(&self) -> f64 {
        self.spans.iter().map(|span| span.duration_ms).sum()
    }
}

/// Scale characters to millisecond spans at the given WPM.
///
/// Every symbol is followed by a one-unit symbol gap and every character by
/// a further two-unit character gap, so adjacent characters are separated by
/// exactly one DAH of silence.
pub fn scale_to_milliseconds(characters: &[MorseCharacter], wpm: u32) -> Vec<ScaledCharacter> {
    let factor = wpm_factor(wpm);
    characters
        .iter()
        .map(|character| {
            let mut spans = Vec::with_capacity(character.symbols.len() * 2 + 1);
            for symbol in &character.symbols {
                spans.push(ToneSpan {
                    duration_ms: round2(symbol.units * factor),
                    tone: symbol.tone,
                });
                spans.push(ToneSpan {
                    duration_ms: round2(SYMBOL_GAP_UNITS * factor),
                    tone: false,
                });
            }
            spans.push(ToneSpan {
                duration_ms: round2(CHARACTER_GAP_UNITS * factor),
                tone: false,
            });
            ScaledCharacter {
                representation: character.representation,
                spans,
            }
        })
        .collect()
}
