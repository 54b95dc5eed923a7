pub mod academics;
pub mod communication;
pub mod finance;
pub mod people;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActiveStatus {
    #[default]
    Active,
    Inactive,
}

impl ActiveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActiveStatus::Active => "active",
            ActiveStatus::Inactive => "inactive",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ActiveStatus::Active => ActiveStatus::Inactive,
            ActiveStatus::Inactive => ActiveStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    Paid,
    Partial,
    #[default]
    Pending,
}

impl FeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FeeStatus::Paid => "paid",
            FeeStatus::Partial => "partial",
            FeeStatus::Pending => "pending",
        }
    }
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Required-field check: names of the blank ones, in the order given.
pub(crate) fn blank_fields(fields: &[(&'static str, &str)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, v)| is_blank(v))
        .map(|(name, _)| *name)
        .collect()
}

pub(crate) fn overwrite(dst: &mut String, src: &str) {
    if !is_blank(src) {
        *dst = src.trim().to_string();
    }
}

pub(crate) fn trimmed(s: &str) -> String {
    s.trim().to_string()
}

/// Comma separated free text, e.g. `"10-A, 10-B"`.
pub(crate) fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number typed into a text box; anything unparsable counts as 0.
pub(crate) fn lenient_int(s: &str) -> i64 {
    let t = s.trim();
    t.parse::<i64>()
        .ok()
        .or_else(|| t.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
        .unwrap_or(0)
}

/// Parse a status word the way it is spelled on the wire.
pub(crate) fn parse_word<E: DeserializeOwned>(s: &str) -> Option<E> {
    if is_blank(s) {
        return None;
    }
    serde_json::from_value(serde_json::Value::String(s.trim().to_string())).ok()
}

/// Draft text field that also accepts a JSON number or null.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!(
            "expected text or number, got {other}"
        ))),
    }
}
