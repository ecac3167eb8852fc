//! Value converters used by the function tables.
//!
//! Enumerations come in two flavours. Open ones (inputs, sound programs)
//! vary by model and firmware, so an unrecognized wire value decodes to the
//! enum's `Unknown` variant. Closed ones (on/off toggles) reject unknown
//! values and the cached value is left as it was.
//!
//! Some functions take one of two kinds of value, such as a fixed setting
//! or a level in dB. Those use [`Either`] with a [`WireFormat`] per side;
//! the left side is tried first.

use std::marker::PhantomData;
use std::str::FromStr;

/// Enumerations with a catch-all for values the client does not model
pub trait UnknownValue: Sized + PartialEq {
    const UNKNOWN: Self;
}

/// Relative volume steps the device accepts besides its default step
pub const VOLUME_STEPS_DB: [u32; 3] = [1, 2, 5];

/// Decode a closed enumeration; unknown values are rejected
pub fn decode_enum<E: FromStr>(raw: &str) -> Option<E> {
    raw.parse().ok()
}

/// Decode an open enumeration; unknown values map to `E::UNKNOWN`
pub fn decode_enum_or_unknown<E: FromStr + UnknownValue>(raw: &str) -> Option<E> {
    Some(raw.parse().unwrap_or(E::UNKNOWN))
}

pub fn encode_enum<E: Copy + Into<&'static str>>(value: &E) -> Result<String, String> {
    Ok((*value).into().to_string())
}

/// Encode an open enumeration; `Unknown` cannot be sent
pub fn encode_known_enum<E: Copy + Into<&'static str> + UnknownValue>(
    value: &E,
) -> Result<String, String> {
    if *value == E::UNKNOWN {
        return Err("unknown value cannot be sent".to_string());
    }
    encode_enum(value)
}

pub fn decode_float(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

pub fn decode_int(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

pub fn encode_int(value: &i32) -> Result<String, String> {
    Ok(value.to_string())
}

pub fn decode_str(raw: &str) -> Option<String> {
    Some(raw.to_string())
}

pub fn encode_str(value: &String) -> Result<String, String> {
    Ok(value.clone())
}

/// Encode a string of `MIN` to `MAX` characters
pub fn encode_bounded_str<const MIN: usize, const MAX: usize>(
    value: &String,
) -> Result<String, String> {
    let len = value.chars().count();
    if len < MIN {
        return Err(format!("{len} characters, at least {MIN} needed"));
    }
    if len > MAX {
        return Err(format!("{len} characters, at most {MAX} allowed"));
    }
    Ok(value.clone())
}

/// Volume in dB, rounded to the nearest 0.5 dB step with one decimal
pub fn encode_volume(value: &f64) -> Result<String, String> {
    if !value.is_finite() {
        return Err(format!("{value} is not a volume"));
    }
    // Adding 0.0 turns -0.0 into 0.0
    let stepped = (value * 2.0).round() / 2.0 + 0.0;
    Ok(format!("{stepped:.1}"))
}

/// A decoder and encoder pair for one kind of value, usable as one side of
/// an [`Either`]
pub trait WireFormat {
    type Value;

    fn decode(raw: &str) -> Option<Self::Value>;
    fn encode(value: &Self::Value) -> Result<String, String>;
}

/// Closed enumeration
pub struct EnumFormat<E>(PhantomData<E>);

impl<E: FromStr + Copy + Into<&'static str>> WireFormat for EnumFormat<E> {
    type Value = E;

    fn decode(raw: &str) -> Option<E> {
        decode_enum(raw)
    }

    fn encode(value: &E) -> Result<String, String> {
        encode_enum(value)
    }
}

/// Level in dB on the 0.5 dB grid
pub struct VolumeFormat;

impl WireFormat for VolumeFormat {
    type Value = f64;

    fn decode(raw: &str) -> Option<f64> {
        decode_float(raw)
    }

    fn encode(value: &f64) -> Result<String, String> {
        encode_volume(value)
    }
}

/// Value of a function that accepts two kinds of value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

/// Try the left format first, then the right one
pub fn decode_either<A: WireFormat, B: WireFormat>(raw: &str) -> Option<Either<A::Value, B::Value>> {
    A::decode(raw)
        .map(Either::Left)
        .or_else(|| B::decode(raw).map(Either::Right))
}

pub fn encode_either<A: WireFormat, B: WireFormat>(
    value: &Either<A::Value, B::Value>,
) -> Result<String, String> {
    match value {
        Either::Left(value) => A::encode(value),
        Either::Right(value) => B::encode(value),
    }
}

/// Relative volume command
///
/// Steps the device knows become `"<Up|Down> N dB"`; anything else falls
/// back to the bare command, which moves by the device's own step.
pub fn volume_step(up: bool, step_db: Option<u32>) -> String {
    let direction = if up { "Up" } else { "Down" };
    match step_db {
        Some(step) if VOLUME_STEPS_DB.contains(&step) => format!("{direction} {step} dB"),
        _ => direction.to_string(),
    }
}
