use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::clock;
use crate::filter::Query;
use crate::ipc::error::HandlerErr;
use crate::notify::NoticeLog;

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Deserialize `params[key]`; a missing key yields `T::default()`.
pub fn parse_or_default<T: DeserializeOwned + Default>(
    params: &Value,
    key: &str,
) -> Result<T, HandlerErr> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| HandlerErr::bad_params(format!("invalid {}: {}", key, e))),
    }
}

pub fn parse_required<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, HandlerErr> {
    let v = params
        .get(key)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    serde_json::from_value(v.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid {}: {}", key, e)))
}

pub fn get_required_date(params: &Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    let raw = get_required_str(params, key)?;
    clock::parse_date(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

/// `{ query?: string, filters?: { field: value } }`
pub fn query_from_params(params: &Value) -> Result<Query, HandlerErr> {
    Ok(Query {
        text: get_optional_str(params, "query").unwrap_or_default(),
        filters: parse_or_default(params, "filters")?,
    })
}

/// Attach the newest notice to `result` if one was raised after `mark`.
pub fn with_notice(mut result: Value, notices: &NoticeLog, mark: u64) -> Value {
    if notices.raised() > mark {
        if let (Some(obj), Some(n)) = (result.as_object_mut(), notices.last()) {
            obj.insert(
                "notice".to_string(),
                serde_json::to_value(n).unwrap_or(Value::Null),
            );
        }
    }
    result
}
