//! The host's standard coercions of a value to integer, number, truth and
//! text.
//!
//! These mirror what the host does when a script uses a value in numeric or
//! string context: strings contribute their leading numeric prefix,
//! references contribute their address, `Undef` is `0` / `""` / false.

use std::borrow::Cow;

use super::{HostValue, IntWidth};

/// The numeric reading of a string prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Num(f64),
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Num(n) => n,
        }
    }
}

/// Parse the leading numeric prefix of `s`.
///
/// Accepts leading whitespace, an optional sign, digits with an optional
/// fraction and exponent, or `Inf`/`Infinity`/`NaN` (any case). Integral
/// prefixes that fit in an `i64` are returned exactly; text with no numeric
/// prefix reads as `0`.
pub fn parse_numeric(s: &str) -> Numeric {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let unsigned = s.get(end..).unwrap_or("");
    let negative = bytes.first() == Some(&b'-');
    let lower = unsigned.to_ascii_lowercase();
    if lower.starts_with("inf") {
        return Numeric::Num(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    if lower.starts_with("nan") {
        return Numeric::Num(f64::NAN);
    }

    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let int_digits = end - digits_start;
    let mut integral = true;

    if bytes.get(end) == Some(&b'.') {
        let mut frac = end + 1;
        while bytes.get(frac).is_some_and(u8::is_ascii_digit) {
            frac += 1;
        }
        if int_digits > 0 || frac > end + 1 {
            integral = false;
            end = frac;
        }
    }

    if int_digits == 0 && integral {
        return Numeric::Int(0);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = exp;
        while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            exp += 1;
        }
        if exp > exp_digits {
            integral = false;
            end = exp;
        }
    }

    let prefix = s.get(..end).unwrap_or("");
    if integral {
        if let Ok(i) = prefix.parse::<i64>() {
            return Numeric::Int(i);
        }
    }
    Numeric::Num(prefix.parse::<f64>().unwrap_or(0.0))
}

/// Significant digits the host prints for a number.
const NUM_DIGITS: usize = 15;

/// Format a number the way the host stringifies it (`%.15g`).
///
/// Fixed notation for decimal exponents in `-4..15`, otherwise exponent
/// notation with a signed two-digit exponent (`1e+20`, `1e-07`). Trailing
/// fraction zeros are dropped.
pub fn format_num(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let inf = if n > 0.0 { "Inf" } else { "-Inf" };
        return inf.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // The exponent after rounding to the printed precision.
    let sci = format!("{:.*e}", NUM_DIGITS - 1, n);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= NUM_DIGITS as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.unsigned_abs())
    } else {
        let decimals = usize::try_from(NUM_DIGITS as i32 - 1 - exp).unwrap_or(0);
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// A float in unsigned context: negative values wrap like a negative
/// native integer.
fn num_to_uv(n: f64) -> u64 {
    if n < 0.0 { (n as i64) as u64 } else { n as u64 }
}

fn clamp_iv(i: i64, width: IntWidth) -> i64 {
    match width {
        IntWidth::W64 => i,
        IntWidth::W32 => i.clamp(i64::from(i32::MIN), i64::from(i32::MAX)),
    }
}

fn clamp_uv(u: u64, width: IntWidth) -> u64 {
    match width {
        IntWidth::W64 => u,
        IntWidth::W32 => u.min(u64::from(u32::MAX)),
    }
}

impl HostValue {
    /// Integer context, saturated to the host's native width.
    pub fn iv(&self, width: IntWidth) -> i64 {
        let raw = match self {
            Self::Undef => 0,
            Self::Int(i) => *i,
            Self::Num(n) => *n as i64,
            Self::Str(s) => match parse_numeric(&s.to_utf8()) {
                Numeric::Int(i) => i,
                Numeric::Num(n) => n as i64,
            },
            Self::Array(_) | Self::Hash(_) | Self::Object(_) => self.addr() as i64,
        };
        clamp_iv(raw, width)
    }

    /// Unsigned integer context, saturated to the host's native width.
    ///
    /// A negative value is reinterpreted as its two's-complement bits, as
    /// the host does, whether it is spelled as an integer or a float.
    pub fn uv(&self, width: IntWidth) -> u64 {
        let raw = match self {
            Self::Undef => 0,
            Self::Int(i) => *i as u64,
            Self::Num(n) => num_to_uv(*n),
            Self::Str(s) => match parse_numeric(&s.to_utf8()) {
                Numeric::Int(i) => i as u64,
                Numeric::Num(n) => num_to_uv(n),
            },
            Self::Array(_) | Self::Hash(_) | Self::Object(_) => self.addr() as u64,
        };
        clamp_uv(raw, width)
    }

    /// Floating-point context.
    pub fn nv(&self) -> f64 {
        match self {
            Self::Undef => 0.0,
            Self::Int(i) => *i as f64,
            Self::Num(n) => *n,
            Self::Str(s) => parse_numeric(&s.to_utf8()).as_f64(),
            Self::Array(_) | Self::Hash(_) | Self::Object(_) => self.addr() as f64,
        }
    }

    /// Boolean context: `Undef`, `0`, `0.0`, `""` and `"0"` are false.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Undef => false,
            Self::Int(i) => *i != 0,
            Self::Num(n) => *n != 0.0,
            Self::Str(s) => !(s.is_empty() || s.as_bytes() == b"0"),
            Self::Array(_) | Self::Hash(_) | Self::Object(_) => true,
        }
    }

    /// String context, as canonical text.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Undef => Cow::Borrowed(""),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Num(n) => Cow::Owned(format_num(*n)),
            Self::Str(s) => s.to_utf8(),
            Self::Array(_) => Cow::Owned(format!("ARRAY(0x{:x})", self.addr())),
            Self::Hash(_) => Cow::Owned(format!("HASH(0x{:x})", self.addr())),
            Self::Object(o) => Cow::Owned(format!("{}=SCALAR(0x{:x})", o.class_name(), self.addr())),
        }
    }

    fn addr(&self) -> usize {
        match self {
            Self::Array(a) => a.addr(),
            Self::Hash(h) => h.addr(),
            Self::Object(o) => o.obj().addr(),
            _ => 0,
        }
    }
}
