//! Scalar value codec: UTF-8 wire forms for the individual property kinds.
//!
//! Writers append to a bounded [`Writer`] and fail with a capacity error
//! when the destination is too small; the size estimator is responsible
//! for making that impossible. Parsers take a slice positioned at the
//! value's first byte and return the typed value together with the number
//! of bytes consumed.
//!
//! Parser tolerances beyond strict JSON: every scalar also accepts its
//! value wrapped in quotes (`"123"`, `"true"`), and the `null` token is
//! valid input for any kind, yielding that kind's default.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use typed_json_buffers::Writer;

use crate::error::CodecError;

const NULL_TOKEN: &[u8] = b"null";

// ----------------------------------------------------------------
// Scanning

/// Bytes until the next value delimiter (`,`, `}`, `]`, `:`, whitespace) or
/// the end of the slice.
pub(crate) fn size_to_delimiter_or_end(buf: &[u8]) -> usize {
    let mut i = 0;
    while i < buf.len() {
        match buf[i] {
            b',' | b' ' | b'}' | b']' | b':' | b'\n' | b'\r' | b'\t' => break,
            _ => i += 1,
        }
    }
    i
}

/// Index of the closing quote in a slice positioned just past the opening
/// quote, and whether an escape sequence was seen on the way. Running off
/// the end of the slice is a structural error.
pub(crate) fn size_to_string_end(buf: &[u8]) -> Result<(usize, bool), CodecError> {
    let mut needs_decoding = false;
    let mut i = 0;
    while i < buf.len() {
        match buf[i] {
            b'\\' => {
                needs_decoding = true;
                i += 2;
            }
            b'"' => return Ok((i, needs_decoding)),
            _ => i += 1,
        }
    }
    Err(CodecError::UnexpectedEndOfContent)
}

pub(crate) fn is_null_token(token: &[u8]) -> bool {
    token == NULL_TOKEN
}

/// The raw bytes of one scalar value (quotes stripped when present) and the
/// total number of bytes consumed including the quotes.
pub(crate) fn scan_scalar_token(buf: &[u8]) -> Result<(&[u8], usize), CodecError> {
    if buf.is_empty() {
        return Err(CodecError::UnexpectedEndOfContent);
    }
    if buf[0] == b'"' {
        let (size, _) = size_to_string_end(&buf[1..])?;
        Ok((&buf[1..1 + size], size + 2))
    } else {
        let size = size_to_delimiter_or_end(buf);
        if size == 0 {
            return Err(CodecError::InvalidJson { offset: 0 });
        }
        Ok((&buf[..size], size))
    }
}

fn token_str(token: &[u8]) -> Result<&str, CodecError> {
    std::str::from_utf8(token).map_err(|_| CodecError::InvalidJson { offset: 0 })
}

// ----------------------------------------------------------------
// Parsers

/// Parses a 64-bit integer. `null` yields `0`.
pub fn parse_long(buf: &[u8]) -> Result<(i64, usize), CodecError> {
    let (token, consumed) = scan_scalar_token(buf)?;
    if is_null_token(token) {
        return Ok((0, consumed));
    }
    let value = token_str(token)?
        .parse::<i64>()
        .map_err(|_| CodecError::InvalidJson { offset: 0 })?;
    Ok((value, consumed))
}

/// Parses a double. `null` yields `0.0`.
pub fn parse_double(buf: &[u8]) -> Result<(f64, usize), CodecError> {
    let (token, consumed) = scan_scalar_token(buf)?;
    if is_null_token(token) {
        return Ok((0.0, consumed));
    }
    let value = token_str(token)?
        .parse::<f64>()
        .map_err(|_| CodecError::InvalidJson { offset: 0 })?;
    Ok((value, consumed))
}

/// Parses a fixed-point decimal. `null` yields zero. Scientific notation is
/// accepted on input even though the writer never produces it.
pub fn parse_decimal(buf: &[u8]) -> Result<(Decimal, usize), CodecError> {
    let (token, consumed) = scan_scalar_token(buf)?;
    if is_null_token(token) {
        return Ok((Decimal::ZERO, consumed));
    }
    let text = token_str(token)?;
    let value = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| CodecError::InvalidJson { offset: 0 })?;
    Ok((value, consumed))
}

/// Parses a boolean. `null` yields `false`.
pub fn parse_bool(buf: &[u8]) -> Result<(bool, usize), CodecError> {
    let (token, consumed) = scan_scalar_token(buf)?;
    match token {
        b"true" => Ok((true, consumed)),
        b"false" => Ok((false, consumed)),
        b"null" => Ok((false, consumed)),
        _ => Err(CodecError::InvalidJson { offset: 0 }),
    }
}

/// Parses a date-time in ISO-8601 / RFC 3339 text form. `null` yields
/// `None`. A bare date is accepted as midnight.
pub fn parse_date_time(buf: &[u8]) -> Result<(Option<NaiveDateTime>, usize), CodecError> {
    let (token, consumed) = scan_scalar_token(buf)?;
    if is_null_token(token) {
        return Ok((None, consumed));
    }
    let text = token_str(token)?;
    let value = NaiveDateTime::from_str(text)
        .or_else(|_| DateTime::parse_from_rfc3339(text).map(|dt| dt.naive_utc()))
        .or_else(|_| NaiveDate::from_str(text).map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| CodecError::InvalidJson { offset: 0 })?;
    Ok((Some(value), consumed))
}

/// Parses a string. The `null` token yields the absent marker (`None`).
///
/// Two paths: when the scan to the closing quote saw no `\`, the span is
/// copied verbatim; otherwise the escape sequences are decoded, including
/// full `\uXXXX` code points and surrogate pairs.
pub fn parse_string(buf: &[u8]) -> Result<(Option<String>, usize), CodecError> {
    if buf.is_empty() {
        return Err(CodecError::UnexpectedEndOfContent);
    }
    if buf[0] == b'"' {
        let (size, needs_decoding) = size_to_string_end(&buf[1..])?;
        let inner = &buf[1..1 + size];
        let value = if needs_decoding {
            decode_string(inner)?
        } else {
            token_str(inner)?.to_owned()
        };
        Ok((Some(value), size + 2))
    } else {
        let size = size_to_delimiter_or_end(buf);
        if size == 0 {
            return Err(CodecError::InvalidJson { offset: 0 });
        }
        let token = &buf[..size];
        if is_null_token(token) {
            return Ok((None, size));
        }
        Ok((Some(token_str(token)?.to_owned()), size))
    }
}

fn read_hex4(bytes: &[u8], pos: usize) -> Result<u32, CodecError> {
    if pos + 4 > bytes.len() {
        return Err(CodecError::UnexpectedEndOfContent);
    }
    let mut value = 0u32;
    for &b in &bytes[pos..pos + 4] {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return Err(CodecError::InvalidJson { offset: pos }),
        };
        value = (value << 4) | digit as u32;
    }
    Ok(value)
}

fn decode_string(bytes: &[u8]) -> Result<String, CodecError> {
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c != b'\\' {
            out.push(c);
            i += 1;
            continue;
        }
        i += 1;
        if i >= bytes.len() {
            return Err(CodecError::UnexpectedEndOfContent);
        }
        match bytes[i] {
            b'\\' => out.push(b'\\'),
            b'"' => out.push(b'"'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let mut cp = read_hex4(bytes, i + 1)?;
                i += 4;
                if (0xd800..0xdc00).contains(&cp)
                    && bytes.len() >= i + 7
                    && bytes[i + 1] == b'\\'
                    && bytes[i + 2] == b'u'
                {
                    let low = read_hex4(bytes, i + 3)?;
                    if (0xdc00..0xe000).contains(&low) {
                        cp = 0x10000 + ((cp - 0xd800) << 10) + (low - 0xdc00);
                        i += 6;
                    }
                }
                let ch = char::from_u32(cp).ok_or(CodecError::InvalidJson { offset: i })?;
                let mut tmp = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
            }
            _ => return Err(CodecError::InvalidJson { offset: i }),
        }
        i += 1;
    }
    String::from_utf8(out).map_err(|_| CodecError::InvalidJson { offset: 0 })
}

// ----------------------------------------------------------------
// Writers

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Writes a quoted JSON string. `None` (the absent marker) is written as
/// the two-byte literal `""`, never as `null`.
///
/// Escaping is limited to `\`, `"` and control bytes: the five shorthand
/// escapes where they exist, `\u00XX` with lowercase hex otherwise. Bytes
/// at or above 0x20, UTF-8 continuation bytes included, pass through.
pub fn write_string(w: &mut Writer, value: Option<&str>) -> Result<(), CodecError> {
    let Some(value) = value else {
        w.buf(b"\"\"")?;
        return Ok(());
    };
    w.u8(b'"')?;
    for &c in value.as_bytes() {
        if c >= 0x20 && c != b'\\' && c != b'"' {
            w.u8(c)?;
            continue;
        }
        match c {
            b'\\' | b'"' => {
                w.u8(b'\\')?;
                w.u8(c)?;
            }
            0x08 => w.buf(b"\\b")?,
            b'\t' => w.buf(b"\\t")?,
            b'\n' => w.buf(b"\\n")?,
            0x0c => w.buf(b"\\f")?,
            b'\r' => w.buf(b"\\r")?,
            _ => {
                w.buf(b"\\u00")?;
                w.u8(HEX_LOWER[(c >> 4) as usize])?;
                w.u8(HEX_LOWER[(c & 0x0f) as usize])?;
            }
        }
    }
    w.u8(b'"')?;
    Ok(())
}

/// Fast path for strings known a priori to need no escaping, such as
/// schema property names. Anything non-ASCII is an internal invariant
/// violation, not a fallback to the slow path.
pub fn write_string_as_is(w: &mut Writer, value: &str) -> Result<(), CodecError> {
    if !value.is_ascii() {
        return Err(CodecError::Invariant(
            "write_string_as_is requires an ASCII-clean string",
        ));
    }
    w.u8(b'"')?;
    w.ascii(value)?;
    w.u8(b'"')?;
    Ok(())
}

pub fn write_long(w: &mut Writer, value: i64) -> Result<(), CodecError> {
    w.ascii(&value.to_string())?;
    Ok(())
}

/// Writes a double as round-trip decimal text that always contains a
/// decimal point or an exponent marker, so a re-parse never reads it as an
/// integer. Non-finite values degrade the way the wire can express them:
/// NaN becomes `null`, infinities clamp to `±1e308`.
pub fn write_double(w: &mut Writer, value: f64) -> Result<(), CodecError> {
    if value.is_nan() {
        return write_null(w);
    }
    if value.is_infinite() {
        w.ascii(if value > 0.0 { "1e308" } else { "-1e308" })?;
        return Ok(());
    }
    let abs = value.abs();
    let mut text = if value != 0.0 && (abs >= 1e17 || abs < 1e-5) {
        format!("{value:e}")
    } else {
        value.to_string()
    };
    if !text.contains('.') && !text.contains('e') && !text.contains('E') {
        text.push_str(".0");
    }
    w.ascii(&text)?;
    Ok(())
}

/// Writes a decimal in fixed notation: at least one fractional digit, at
/// most 28, never an exponent.
pub fn write_decimal(w: &mut Writer, value: Decimal) -> Result<(), CodecError> {
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    w.ascii(&text)?;
    Ok(())
}

pub fn write_bool(w: &mut Writer, value: bool) -> Result<(), CodecError> {
    w.buf(if value { &b"true"[..] } else { &b"false"[..] })?;
    Ok(())
}

pub fn write_null(w: &mut Writer) -> Result<(), CodecError> {
    w.buf(NULL_TOKEN)?;
    Ok(())
}

/// Worst-case encoded size of a string property including the quotes.
///
/// Two bytes per input byte covers quoting, shorthand escapes and
/// pass-through; bare control bytes widen to six for their `\u00XX` form.
pub fn string_capacity(value: Option<&str>) -> usize {
    match value {
        None => 2,
        Some(s) => {
            2 + s
                .bytes()
                .map(|b| match b {
                    0x08 | b'\t' | b'\n' | 0x0c | b'\r' => 2,
                    b if b < 0x20 => 6,
                    _ => 2,
                })
                .sum::<usize>()
        }
    }
}
