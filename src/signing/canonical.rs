// Canonical JSON Encoding
//
// The content hash in the token header is computed over the exact bytes
// produced here, and the same bytes are what goes over the wire. Both sides
// must therefore agree on one encoding: keys sorted at every depth, array
// order untouched, no whitespace, integral floats written as integers.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::signing::error::SigningError;

/// Recursively sort every mapping in `value` by key.
///
/// Arrays keep their element order; only the mappings inside them are
/// sorted. Numbers go through [`canonical_number`], other scalars are
/// returned unchanged.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(number) => Value::Number(canonical_number(number)),
        scalar => scalar.clone(),
    }
}

/// A float with no fractional part that fits an integer type becomes that
/// integer, so `10.0` and `10` encode alike and `-0.0` encodes as `0`.
pub fn canonical_number(number: &Number) -> Number {
    // 2^63 and 2^64; both are exact as f64.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

    if !number.is_f64() {
        return number.clone();
    }
    let Some(float) = number.as_f64() else {
        return number.clone();
    };
    if !float.is_finite() || float.fract() != 0.0 {
        return number.clone();
    }

    if (-I64_BOUND..I64_BOUND).contains(&float) {
        Number::from(float as i64)
    } else if (0.0..U64_BOUND).contains(&float) {
        Number::from(float as u64)
    } else {
        number.clone()
    }
}

/// Produce the compact canonical string for a JSON value.
pub fn to_canonical_string(value: &Value) -> Result<String, SigningError> {
    let sorted = canonicalize(value);
    Ok(serde_json::to_string(&sorted)?)
}

/// Convert any serializable body into its canonical string.
///
/// Types that have no JSON representation (maps with non-string keys, for
/// instance) fail with [`SigningError::Serialization`].
pub fn canonical_string_from<T: Serialize + ?Sized>(body: &T) -> Result<String, SigningError> {
    let value = serde_json::to_value(body)?;
    to_canonical_string(&value)
}
