//! printf-style template formatting for string resources.
//!
//! Supported: `%d`, `%s`, `%f`, `%.Nf`, `%%` and positional `%N$s` / `%N$d` /
//! `%N$f` (1-based). Surplus arguments are ignored.

use std::fmt::{self, Write};

use memchr::memchr;
use thiserror::Error;

const DEFAULT_FLOAT_PRECISION: usize = 6;
const MAX_FLOAT_PRECISION: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("template needs argument {0} but fewer were supplied")]
    MissingArgument(usize),

    #[error("argument {index} cannot be formatted with `%{conversion}`")]
    InvalidArgument { index: usize, conversion: char },

    #[error("unsupported conversion `%{0}`")]
    UnknownConversion(char),

    #[error("template ends inside a conversion")]
    Incomplete,

    #[error("precision {0} is too large")]
    PrecisionTooLarge(usize),

    #[error(transparent)]
    Write(#[from] fmt::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg<'a> {
    Int(i64),
    Float(f64),
    Str(&'a str),
}

impl From<i64> for FormatArg<'_> {
    fn from(value: i64) -> Self {
        FormatArg::Int(value)
    }
}

impl From<f64> for FormatArg<'_> {
    fn from(value: f64) -> Self {
        FormatArg::Float(value)
    }
}

impl<'a> From<&'a str> for FormatArg<'a> {
    fn from(value: &'a str) -> Self {
        FormatArg::Str(value)
    }
}

impl fmt::Display for FormatArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatArg::Int(v) => write!(f, "{v}"),
            FormatArg::Float(v) => write!(f, "{v}"),
            FormatArg::Str(v) => f.write_str(v),
        }
    }
}

/// Substitute `args` into `template`.
pub fn format_template(template: &str, args: &[FormatArg<'_>]) -> Result<String, FormatError> {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + 16);
    let mut next_arg = 0usize;
    let mut pos = 0usize;

    while let Some(found) = memchr(b'%', &bytes[pos..]) {
        let start = pos + found;
        out.push_str(&template[pos..start]);
        let spec = parse_spec(&bytes[start + 1..])?;
        pos = start + 1 + spec.len;

        if spec.conversion == '%' {
            out.push('%');
            continue;
        }

        let index = match spec.position {
            Some(position) => position,
            None => {
                next_arg += 1;
                next_arg
            }
        };
        let arg = args
            .get(index - 1)
            .ok_or(FormatError::MissingArgument(index))?;
        write_arg(&mut out, arg, &spec, index)?;
    }
    out.push_str(&template[pos..]);
    Ok(out)
}

struct Spec {
    /// 1-based explicit argument position.
    position: Option<usize>,
    precision: Option<usize>,
    conversion: char,
    /// Bytes consumed after the `%`.
    len: usize,
}

fn parse_spec(rest: &[u8]) -> Result<Spec, FormatError> {
    let mut i = 0;
    let mut position = None;

    let digits = count_digits(rest);
    if digits > 0 && rest.get(digits) == Some(&b'$') {
        let value = parse_digits(&rest[..digits]);
        if value == 0 {
            return Err(FormatError::UnknownConversion('$'));
        }
        position = Some(value);
        i = digits + 1;
    }

    let mut precision = None;
    if rest.get(i) == Some(&b'.') {
        let digits = count_digits(&rest[i + 1..]);
        let value = parse_digits(&rest[i + 1..i + 1 + digits]);
        if value > MAX_FLOAT_PRECISION {
            return Err(FormatError::PrecisionTooLarge(value));
        }
        precision = Some(value);
        i += 1 + digits;
    }

    let conversion = *rest.get(i).ok_or(FormatError::Incomplete)?;
    match conversion {
        b'%' if position.is_none() && precision.is_none() => {}
        b'd' | b's' | b'f' => {}
        other => return Err(FormatError::UnknownConversion(char::from(other))),
    }

    Ok(Spec {
        position,
        precision,
        conversion: char::from(conversion),
        len: i + 1,
    })
}

fn write_arg(
    out: &mut String,
    arg: &FormatArg<'_>,
    spec: &Spec,
    index: usize,
) -> Result<(), FormatError> {
    let invalid = || FormatError::InvalidArgument {
        index,
        conversion: spec.conversion,
    };
    let written = match (spec.conversion, arg) {
        ('s', arg) => write!(out, "{arg}"),
        ('d', FormatArg::Int(v)) => write!(out, "{v}"),
        ('d', FormatArg::Float(v)) => write!(out, "{}", v.trunc() as i64),
        ('f', FormatArg::Int(v)) => write_float(out, *v as f64, spec.precision),
        ('f', FormatArg::Float(v)) => write_float(out, *v, spec.precision),
        _ => return Err(invalid()),
    };
    Ok(written?)
}

#[inline]
fn write_float(out: &mut String, value: f64, precision: Option<usize>) -> fmt::Result {
    let precision = precision.unwrap_or(DEFAULT_FLOAT_PRECISION);
    write!(out, "{value:.precision$}")
}

#[inline]
fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn parse_digits(digits: &[u8]) -> usize {
    digits.iter().fold(0usize, |acc, d| {
        acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
    })
}
