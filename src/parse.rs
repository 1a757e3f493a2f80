//! Extraction of letter-prefixed numbers (`X12.5`, `G1`) from a command line.

/// Why a number couldn't be parsed.
#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum NumberError {
    #[error("no digits")]
    Empty,
    #[error("unexpected character {0:?}")]
    Unexpected(char),
    #[error("more than 9 integer digits")]
    TooLong,
}

const MAX_INTEGER_DIGITS: usize = 9;
const FRACTION_DIGITS: u32 = 6;

/// Everything before the first `\0`, `;`, `*` or `(` is command content.
pub fn content(line: &str) -> &str {
    match line.find(|c: char| c == '\0' || c == ';' || c == '*' || c == '(') {
        Some(end) => &line[..end],
        None => line,
    }
}

/// Parse a fixed-point decimal which runs until whitespace or the end of
/// `text`.
///
/// Only the first 6 fractional digits are significant. Any further digits
/// must still be digits but don't change the value.
pub fn parse_number(text: &str) -> Result<f32, NumberError> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    parse_magnitude(digits.chars()).map(|micros| micros_to_f32(micros, negative))
}

fn parse_magnitude<I>(chars: I) -> Result<i64, NumberError>
where
    I: Iterator<Item = char>,
{
    let mut integer: i64 = 0;
    let mut integer_digits = 0;
    let mut fraction: i64 = 0;
    let mut fraction_digits = 0;
    let mut seen_point = false;

    for c in chars {
        if c.is_ascii_whitespace() {
            break;
        }

        match (c, c.to_digit(10)) {
            ('.', _) if !seen_point => seen_point = true,
            (_, Some(digit)) if !seen_point => {
                integer_digits += 1;
                if integer_digits > MAX_INTEGER_DIGITS {
                    return Err(NumberError::TooLong);
                }
                integer = integer * 10 + i64::from(digit);
            },
            (_, Some(digit)) => {
                if fraction_digits < FRACTION_DIGITS {
                    fraction = fraction * 10 + i64::from(digit);
                }
                fraction_digits += 1;
            },
            (other, None) => return Err(NumberError::Unexpected(other)),
        }
    }

    if integer_digits == 0 && fraction_digits == 0 {
        return Err(NumberError::Empty);
    }

    let scale = 10_i64.pow(FRACTION_DIGITS - fraction_digits.min(FRACTION_DIGITS));

    Ok(integer * 1_000_000 + fraction * scale)
}

fn micros_to_f32(micros: i64, negative: bool) -> f32 {
    let value = micros as f64 / 1_000_000.0;

    if negative {
        -value as f32
    } else {
        value as f32
    }
}

/// Pulls fields out of a single command line.
///
/// The first malformed number *poisons* the parser: that field and every field
/// asked for afterwards fall back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParser<'a> {
    content: &'a str,
    poisoned: Option<NumberError>,
}

impl<'a> FieldParser<'a> {
    pub fn new(line: &'a str) -> FieldParser<'a> {
        FieldParser {
            content: content(line),
            poisoned: None,
        }
    }

    /// Does the line contain `letter` at all?
    pub fn has(&self, letter: char) -> bool { self.content.contains(letter) }

    /// The text directly after the first `letter`.
    fn raw(&self, letter: char) -> Option<&'a str> {
        self.content
            .find(letter)
            .map(|ix| &self.content[ix + letter.len_utf8()..])
    }

    /// Read the value of a `G` or `M` style code.
    ///
    /// Fractions are truncated. Negative, malformed or missing codes are
    /// reported as `None` and never poison the line.
    pub fn code(&self, letter: char) -> Option<u32> {
        let value = parse_number(self.raw(letter)?).ok()?;

        if value >= 0.0 {
            Some(value as u32)
        } else {
            None
        }
    }

    /// Read the number following `letter`, or `default` when it is missing or
    /// the line has been poisoned.
    pub fn field(&mut self, letter: char, default: f32) -> f32 {
        self.value(letter).unwrap_or(default)
    }

    /// Read the number following `letter`. `None` means the field is missing,
    /// malformed, or came after a malformed field.
    pub fn value(&mut self, letter: char) -> Option<f32> {
        if self.poisoned.is_some() {
            return None;
        }

        match parse_number(self.raw(letter)?) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Unable to parse the {} field: {}", letter, e);
                self.poisoned = Some(e);
                None
            },
        }
    }

    /// The error which poisoned this line, if any.
    pub fn poisoned(&self) -> Option<NumberError> { self.poisoned }
}
