//! Leading-prefix numeric parsing with canonical rendering.
//!
//! Integer and number slots accept a token only when the value parsed from
//! its longest numeric prefix renders back to the token exactly. Keeping the
//! intermediate value around lets a failed decode say what the token was
//! read as (`"1.2"` reads as integer `1`).

use std::fmt;

/// Outcome of reading the numeric prefix of a token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Parsed<T> {
    Value(T),
    NotANumber,
    OutOfRange,
}

impl<T: fmt::Display> fmt::Display for Parsed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => value.fmt(f),
            Self::NotANumber => f.write_str("NaN"),
            Self::OutOfRange => f.write_str("out of range"),
        }
    }
}

/// Reads an optionally signed run of decimal digits from the start of
/// `token`, ignoring leading whitespace.
pub(crate) fn integer_prefix(token: &str) -> Parsed<i64> {
    let trimmed = token.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = count_digits(rest.as_bytes(), 0);
    if digits == 0 {
        return Parsed::NotANumber;
    }

    let literal = if negative {
        format!("-{}", &rest[..digits])
    } else {
        rest[..digits].to_string()
    };
    match literal.parse::<i64>() {
        Ok(value) => Parsed::Value(value),
        Err(_) => Parsed::OutOfRange,
    }
}

/// Reads the longest decimal floating-point literal (or `Infinity`) from the
/// start of `token`, ignoring leading whitespace.
pub(crate) fn number_prefix(token: &str) -> Parsed<f64> {
    let trimmed = token.trim_start();
    let bytes = trimmed.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if trimmed[end..].starts_with("Infinity") {
        return Parsed::Value(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = count_digits(bytes, end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(bytes, end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return Parsed::NotANumber;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(bytes, exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    match trimmed[..end].parse::<f64>() {
        Ok(value) => Parsed::Value(value),
        Err(_) => Parsed::NotANumber,
    }
}

/// Canonical text form of a number slot value.
///
/// Magnitudes below `1e-6` or from `1e21` up use exponent notation with an
/// explicit exponent sign (`1e-7`, `1.5e+21`); everything else is plain
/// decimal.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value.abs() < 1e-6 || value.abs() >= 1e21 {
        let text = format!("{value:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        value.to_string()
    }
}

fn count_digits(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map(|tail| tail.iter().take_while(|b| b.is_ascii_digit()).count())
        .unwrap_or(0)
}
