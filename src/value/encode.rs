//! Encoders producing canonical Clarity value text
use crate::error::HarnessError;
use serde_json::Value;

pub fn ok(val: impl AsRef<str>) -> String {
    format!("(ok {})", val.as_ref())
}

pub fn err(val: impl AsRef<str>) -> String {
    format!("(err {})", val.as_ref())
}

pub fn some(val: impl AsRef<str>) -> String {
    format!("(some {})", val.as_ref())
}

pub fn none() -> String {
    "none".to_string()
}

pub fn bool(val: bool) -> String {
    val.to_string()
}

pub fn int(val: i128) -> String {
    val.to_string()
}

pub fn uint(val: u128) -> String {
    format!("u{}", val)
}

/// Quotes `val` the way a JSON string literal is quoted.
pub fn ascii(val: &str) -> String {
    quote(val)
}

pub fn utf8(val: &str) -> String {
    format!("u{}", quote(val))
}

/// Hex-encodes raw bytes; pass `str::as_bytes()` to encode text as UTF-8.
pub fn buff(val: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(val.as_ref()))
}

/// Joins pre-encoded elements. Element shape is not checked.
pub fn list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    format!("(list {})", items.join(" "))
}

pub fn principal(val: &str) -> String {
    format!("'{}", val)
}

/// Encodes a JSON object as a tuple literal.
///
/// Field values are taken as already encoded: strings are emitted verbatim,
/// numbers and booleans through their display form, and nested objects
/// recurse into nested tuples. Field order follows the object's insertion
/// order. Arrays and nulls cannot be represented and are rejected.
///
/// ```
/// use clarity_harness::value::encode;
/// use serde_json::json;
///
/// let fields = json!({ "id": encode::uint(1), "meta": { "open": encode::bool(true) } });
/// assert_eq!(encode::tuple(&fields).unwrap(), "{ id: u1, meta: { open: true } }");
/// ```
pub fn tuple(val: &Value) -> Result<String, HarnessError> {
    match val {
        Value::Object(_) => Ok(format!("{{ {} }}", serialize_tuple(val)?)),
        other => Err(HarnessError::Encoding(format!(
            "Tuple input must be an object, got {}",
            other
        ))),
    }
}

fn serialize_tuple(input: &Value) -> Result<String, HarnessError> {
    let fields = match input {
        Value::Object(fields) => fields,
        _ => return Err(HarnessError::Encoding("Tuple input must be an object".to_string())),
    };

    let mut items = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let encoded = match value {
            Value::Array(_) => {
                return Err(HarnessError::Encoding(format!(
                    "Tuple value can't be an array (field `{}`)",
                    key
                )))
            }
            Value::Null => {
                return Err(HarnessError::Encoding(format!(
                    "Tuple value can't be null (field `{}`)",
                    key
                )))
            }
            Value::Object(_) => format!("{{ {} }}", serialize_tuple(value)?),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
        };
        items.push(format!("{}: {}", key, encoded));
    }
    Ok(items.join(", "))
}

fn quote(val: &str) -> String {
    // Serializing a &str into JSON cannot fail.
    serde_json::to_string(val).unwrap_or_else(|_| format!("\"{}\"", val))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_wrappers() {
        assert_eq!(ok(uint(1)), "(ok u1)");
        assert_eq!(err(uint(102)), "(err u102)");
        assert_eq!(some(principal("ST1")), "(some 'ST1)");
        assert_eq!(none(), "none");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(bool(true), "true");
        assert_eq!(int(-7), "-7");
        assert_eq!(uint(20000), "u20000");
        assert_eq!(uint(u128::MAX), format!("u{}", u128::MAX));
    }

    #[test]
    fn test_strings_are_json_quoted() {
        assert_eq!(ascii("hello"), "\"hello\"");
        assert_eq!(ascii("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(utf8("ClearFund Campaign"), "u\"ClearFund Campaign\"");
    }

    #[test]
    fn test_buff_from_text_and_bytes() {
        assert_eq!(buff("AB"), "0x4142");
        assert_eq!(buff(Vec::<u8>::new()), "0x");
        assert_eq!(buff([0x00u8, 0xff, 0x10]), "0x00ff10");
        assert_eq!(buff("Crowdfunding"), "0x43726f776466756e64696e67");
    }

    #[test]
    fn test_list_is_space_joined() {
        assert_eq!(list([uint(1), uint(2)]), "(list u1 u2)");
        assert_eq!(list(Vec::<String>::new()), "(list )");
    }

    #[test]
    fn test_tuple_preserves_order_and_nests() {
        let input = json!({ "b": uint(2), "a": { "c": int(3) }, "flag": true });
        assert_eq!(tuple(&input).unwrap(), "{ b: u2, a: { c: 3 }, flag: true }");
    }

    #[test]
    fn test_tuple_rejects_arrays() {
        let input = json!({ "ids": [1, 2] });
        assert!(matches!(tuple(&input), Err(HarnessError::Encoding(_))));

        let nested = json!({ "outer": { "ids": [] } });
        assert!(matches!(tuple(&nested), Err(HarnessError::Encoding(_))));
    }

    #[test]
    fn test_tuple_rejects_non_object_input() {
        assert!(tuple(&json!("u1")).is_err());
        assert!(tuple(&json!({ "k": null })).is_err());
    }
}
