// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Canonical textual forms of plist values.

Content digests and equality are defined over a canonical rendering of every
flattened value rather than over the decoded types. This keeps identity stable
across encodings: an XML `<real>2</real>` and a binary real `2.0` render the
same way.

There are two forms. The *display* form is what a top-level value renders as:
strings are emitted raw, booleans as `True`/`False`, reals in shortest
round-trip notation. The *quoted* form is used for elements nested inside
arrays (and dictionaries inside arrays), where strings and data are quoted so
that element boundaries remain unambiguous: `['a', b'\x00', 2]`.

Data values are special when hashing: [canonical_bytes] passes their raw
bytes through untouched.
*/

use {
    chrono::{DateTime, Datelike, Timelike, Utc},
    plist::Value,
    std::{borrow::Cow, fmt::Write, time::SystemTime},
};

/// Obtain the bytes fed to the content hasher for a value.
///
/// Data values are passed through verbatim. Everything else is the UTF-8
/// encoding of [display_string].
pub fn canonical_bytes(value: &Value) -> Cow<'_, [u8]> {
    match value {
        Value::Data(data) => Cow::Borrowed(data.as_slice()),
        Value::String(s) => Cow::Borrowed(s.as_bytes()),
        _ => Cow::Owned(display_string(value).into_bytes()),
    }
}

/// Render a value in its display form.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Date(date) => format_date(&date_time(date)),
        _ => quoted_string(value),
    }
}

/// Render a value in its quoted form.
///
/// Strings and data are quoted. Scalars render identically to [display_string].
pub fn quoted_string(value: &Value) -> String {
    let mut s = String::new();
    write_quoted(&mut s, value);
    s
}

fn write_quoted(out: &mut String, value: &Value) {
    match value {
        Value::Boolean(true) => out.push_str("True"),
        Value::Boolean(false) => out.push_str("False"),
        Value::Integer(v) => {
            if let Some(signed) = v.as_signed() {
                write!(out, "{}", signed).ok();
            } else if let Some(unsigned) = v.as_unsigned() {
                write!(out, "{}", unsigned).ok();
            }
        }
        Value::Real(v) => out.push_str(&format_real(*v)),
        Value::String(s) => out.push_str(&quote_str(s)),
        Value::Data(data) => out.push_str(&quote_bytes(data)),
        Value::Date(date) => out.push_str(&date_repr(&date_time(date))),
        Value::Uid(uid) => {
            write!(out, "UID({})", uid.get()).ok();
        }
        Value::Array(array) => {
            out.push('[');
            for (i, v) in array.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(out, v);
            }
            out.push(']');
        }
        Value::Dictionary(dict) => {
            out.push('{');
            for (i, (k, v)) in dict.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&quote_str(k));
                out.push_str(": ");
                write_quoted(out, v);
            }
            out.push('}');
        }
        other => {
            write!(out, "{:?}", other).ok();
        }
    }
}

/// Format a real in shortest round-trip notation.
///
/// Values whose decimal exponent lies in `-4..16` are written in fixed
/// notation and always carry a fractional part. Everything else uses
/// scientific notation with a signed, at least 2 digit exponent.
pub fn format_real(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v.is_sign_negative() { "-inf" } else { "inf" }.to_string();
    }

    // `{:e}` emits the shortest digits that round-trip, e.g. `1.0209e4`.
    let formatted = format!("{:e}", v.abs());
    let (mantissa, exponent) = formatted
        .split_once('e')
        .unwrap_or((formatted.as_str(), "0"));
    let exponent = exponent.parse::<i32>().unwrap_or(0);
    let digits = mantissa.replace('.', "");
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let mut out = String::new();
    if v.is_sign_negative() {
        out.push('-');
    }

    if (-4..16).contains(&exponent) {
        // Position of the decimal point relative to the start of `digits`.
        let point = exponent + 1;

        if point <= 0 {
            out.push_str("0.");
            out.push_str(&"0".repeat(-point as usize));
            out.push_str(digits);
        } else if point as usize >= digits.len() {
            out.push_str(digits);
            out.push_str(&"0".repeat(point as usize - digits.len()));
            out.push_str(".0");
        } else {
            let (whole, fraction) = digits.split_at(point as usize);
            out.push_str(whole);
            out.push('.');
            out.push_str(fraction);
        }
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        write!(
            out,
            "e{}{:02}",
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
        .ok();
    }

    out
}

fn quote_char(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

/// Quote a string, escaping the active quote character and control characters.
pub fn quote_str(s: &str) -> String {
    let quote = quote_char(s.contains('\''), s.contains('"'));

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);

    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xff {
                    write!(out, "\\x{:02x}", code).ok();
                } else {
                    write!(out, "\\u{:04x}", code).ok();
                }
            }
            c => out.push(c),
        }
    }

    out.push(quote);
    out
}

/// Quote a byte sequence as `b'...'`.
pub fn quote_bytes(data: &[u8]) -> String {
    let quote = quote_char(data.contains(&b'\''), data.contains(&b'"'));

    let mut out = String::with_capacity(data.len() + 3);
    out.push('b');
    out.push(quote);

    for b in data {
        match *b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b as char == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(*b as char),
            b => {
                write!(out, "\\x{:02x}", b).ok();
            }
        }
    }

    out.push(quote);
    out
}

fn date_time(date: &plist::Date) -> DateTime<Utc> {
    DateTime::<Utc>::from(SystemTime::from(date.clone()))
}

fn format_date(dt: &DateTime<Utc>) -> String {
    let micros = dt.nanosecond() / 1_000;

    if micros == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", dt.format("%Y-%m-%d %H:%M:%S"), micros)
    }
}

fn date_repr(dt: &DateTime<Utc>) -> String {
    let micros = dt.nanosecond() / 1_000;

    let mut out = format!(
        "datetime.datetime({}, {}, {}, {}, {}",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute()
    );
    if micros != 0 {
        write!(out, ", {}, {}", dt.second(), micros).ok();
    } else if dt.second() != 0 {
        write!(out, ", {}", dt.second()).ok();
    }
    out.push(')');

    out
}
