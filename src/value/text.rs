//! Owned canonical value text with assertion helpers
use crate::error::{HarnessError, Result};
use crate::value::encode;
use crate::value::scan::{split_key_value, split_top_level};
use indexmap::IndexMap;
use std::fmt;

/// A canonical Clarity value as printed by the host, e.g. `(ok u1)`.
///
/// Every `expect_*` method validates the text and either returns the
/// extracted payload or a [`HarnessError`], so checks chain with `?`:
///
/// ```
/// use clarity_harness::value::ClarityText;
///
/// let result = ClarityText::from("(ok u1)");
/// assert_eq!(result.expect_ok().unwrap().expect_uint(1).unwrap(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClarityText(String);

impl ClarityText {
    pub fn new(text: impl Into<String>) -> Self {
        ClarityText(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn expect_ok(&self) -> Result<ClarityText> {
        self.unwrap_response("ok")
    }

    pub fn expect_err(&self) -> Result<ClarityText> {
        self.unwrap_response("err")
    }

    pub fn expect_some(&self) -> Result<ClarityText> {
        self.unwrap_response("some")
    }

    pub fn expect_none(&self) -> Result<()> {
        self.expect_literal("none")
    }

    pub fn expect_bool(&self, value: bool) -> Result<bool> {
        self.expect_literal(&encode::bool(value))?;
        Ok(value)
    }

    pub fn expect_uint(&self, value: u128) -> Result<u128> {
        self.expect_literal(&encode::uint(value))?;
        Ok(value)
    }

    pub fn expect_int(&self, value: i128) -> Result<i128> {
        self.expect_literal(&encode::int(value))?;
        Ok(value)
    }

    pub fn expect_buff(&self, value: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let bytes = value.as_ref();
        self.expect_literal(&encode::buff(bytes))?;
        Ok(bytes.to_vec())
    }

    pub fn expect_ascii(&self, value: &str) -> Result<String> {
        self.expect_literal(&encode::ascii(value))?;
        Ok(value.to_string())
    }

    pub fn expect_utf8(&self, value: &str) -> Result<String> {
        self.expect_literal(&encode::utf8(value))?;
        Ok(value.to_string())
    }

    /// Principals are compared verbatim; no leading quote is added.
    pub fn expect_principal(&self, value: &str) -> Result<String> {
        self.expect_literal(value)?;
        Ok(value.to_string())
    }

    /// Split a host-rendered list `[a, b, c]` into its unparsed elements.
    pub fn expect_list(&self) -> Result<Vec<ClarityText>> {
        let elements = split_top_level(&self.0, b'[', b']').map_err(|e| match e {
            HarnessError::ParseMismatch { actual, .. } => HarnessError::mismatch("(list ...)", actual),
            other => other,
        })?;
        Ok(elements.into_iter().map(ClarityText::from).collect())
    }

    /// Split a tuple `{ k: v, ... }` into its fields in textual order.
    ///
    /// Values are returned unparsed, so a nested tuple stays as its raw
    /// substring.
    pub fn expect_tuple(&self) -> Result<IndexMap<String, ClarityText>> {
        let segments = split_top_level(&self.0, b'{', b'}').map_err(|e| match e {
            HarnessError::ParseMismatch { actual, .. } => HarnessError::mismatch("(tuple ...)", actual),
            other => other,
        })?;

        let mut tuple = IndexMap::with_capacity(segments.len());
        for segment in segments {
            let (key, value) = split_key_value(segment)
                .ok_or_else(|| HarnessError::mismatch("key: value", segment))?;
            tuple.insert(key.to_string(), ClarityText::from(value));
        }
        Ok(tuple)
    }

    fn expect_literal(&self, expected: &str) -> Result<()> {
        if self.0 != expected {
            return Err(HarnessError::mismatch(expected, self.0.as_str()));
        }
        Ok(())
    }

    fn unwrap_response(&self, token: &str) -> Result<ClarityText> {
        let mismatch = || HarnessError::mismatch(format!("({} ...)", token), self.0.as_str());
        let inner = self
            .0
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(mismatch)?;
        let payload = inner
            .strip_prefix(token)
            .and_then(|rest| rest.strip_prefix(' '))
            .ok_or_else(mismatch)?;
        Ok(ClarityText::from(payload))
    }
}

impl fmt::Display for ClarityText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClarityText {
    fn from(text: String) -> Self {
        ClarityText(text)
    }
}

impl From<&str> for ClarityText {
    fn from(text: &str) -> Self {
        ClarityText(text.to_string())
    }
}

impl AsRef<str> for ClarityText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ClarityText {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ClarityText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
