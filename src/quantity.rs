use core::fmt;
use std::{cmp::Ordering, str::FromStr};

use anyhow::{Context as _, bail};
use serde::{Deserialize, Serialize};

use crate::manifest::Str;

/// A Kubernetes resource quantity such as `10Gi`, `500M` or `1.5e3`.
///
/// The original text is kept for display, comparison is numeric. Values are held as integer
/// nano-units so every suffix kubernetes accepts can be compared exactly, fractions smaller
/// than a nano-unit are rounded up.
#[derive(Clone)]
pub struct Quantity {
    inner: Parsed,
}

#[derive(Clone)]
struct Parsed {
    repr: Str,
    nanos: i128,
}

impl Quantity {
    pub fn as_str(&self) -> &str {
        &self.inner.repr
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self {
            inner: Parsed {
                repr: "0".into(),
                nanos: 0,
            },
        }
    }
}

impl FromStr for Quantity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { inner: s.parse()? })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Manifests often spell small quantities as bare numbers, e.g. `cpu: 1`.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(Str),
            Int(i64),
            Float(f64),
        }

        let s = match Repr::deserialize(deserializer)? {
            Repr::Str(s) => s,
            Repr::Int(i) => i.to_string().into(),
            Repr::Float(f) => f.to_string().into(),
        };
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#""{self}""#)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.inner.nanos == other.inner.nanos
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.nanos.cmp(&other.inner.nanos)
    }
}

enum Scale {
    Binary(u32),
    Decimal(i32),
}

impl Scale {
    fn from_suffix(suffix: &str) -> anyhow::Result<Self> {
        let scale = match suffix {
            "Ki" => Scale::Binary(10),
            "Mi" => Scale::Binary(20),
            "Gi" => Scale::Binary(30),
            "Ti" => Scale::Binary(40),
            "Pi" => Scale::Binary(50),
            "Ei" => Scale::Binary(60),
            "n" => Scale::Decimal(-9),
            "u" => Scale::Decimal(-6),
            "m" => Scale::Decimal(-3),
            "" => Scale::Decimal(0),
            "k" => Scale::Decimal(3),
            "M" => Scale::Decimal(6),
            "G" => Scale::Decimal(9),
            "T" => Scale::Decimal(12),
            "P" => Scale::Decimal(15),
            "E" => Scale::Decimal(18),
            _ => match suffix.strip_prefix(['e', 'E']) {
                Some(exponent) => Scale::Decimal(
                    exponent
                        .parse()
                        .with_context(|| format!("invalid exponent `{suffix}`"))?,
                ),
                None => bail!("unknown suffix `{suffix}`"),
            },
        };

        Ok(scale)
    }
}

impl FromStr for Parsed {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_nanos(s.trim())
            .map(|nanos| Parsed {
                repr: s.trim().into(),
                nanos,
            })
            .with_context(|| format!("invalid quantity `{s}`"))
    }
}

fn parse_nanos(s: &str) -> anyhow::Result<i128> {
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let number_len = unsigned
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_len);

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        bail!("missing number");
    }

    let mut mantissa: i128 = 0;
    for digit in whole.bytes().chain(fraction.bytes()) {
        if !digit.is_ascii_digit() {
            bail!("unexpected character `{}`", digit as char);
        }
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(i128::from(digit - b'0')))
            .ok_or_else(|| anyhow::anyhow!("quantity too large"))?;
    }

    // value = mantissa * 10^-fraction_digits * scale
    let fraction_digits = i32::try_from(fraction.len())?;
    let too_large = || anyhow::anyhow!("quantity too large");
    let scaled = match Scale::from_suffix(suffix)? {
        Scale::Binary(shift) => shift_decimal(
            mantissa.checked_mul(1 << shift).ok_or_else(too_large)?,
            9 - fraction_digits,
        )?,
        Scale::Decimal(exponent) => {
            let exponent = exponent
                .checked_add(9)
                .and_then(|e| e.checked_sub(fraction_digits))
                .ok_or_else(too_large)?;
            shift_decimal(mantissa, exponent)?
        }
    };

    Ok(if negative { -scaled } else { scaled })
}

/// Multiplies `value` by `10^exponent`, rounding up when `exponent` is negative.
fn shift_decimal(value: i128, exponent: i32) -> anyhow::Result<i128> {
    if exponent >= 0 {
        return 10i128
            .checked_pow(exponent.unsigned_abs())
            .and_then(|factor| value.checked_mul(factor))
            .ok_or_else(|| anyhow::anyhow!("quantity too large"));
    }

    match 10i128.checked_pow(exponent.unsigned_abs()) {
        Some(divisor) => Ok(value.div_euclid(divisor) + i128::from(value.rem_euclid(divisor) != 0)),
        // Anything this small rounds up to a single nano-unit.
        None => Ok(i128::from(value != 0)),
    }
}
