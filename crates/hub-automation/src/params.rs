//! Rule parameter access helpers
//!
//! Stored rule parameters arrive as a loose JSON map; numeric values show
//! up either as JSON numbers or as numeric strings depending on which
//! transport delivered the rule. The helpers here accept both.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// A stored rule parameter set
pub type Params = HashMap<String, Value>;

/// Error raised when a stored rule parameter set is unusable
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("missing required parameter: {0}")]
    Missing(&'static str),

    #[error("invalid value for parameter {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Read an integer parameter, accepting numbers and numeric strings
pub fn param_i64(params: &Params, name: &str) -> Option<i64> {
    match params.get(name)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a float parameter, accepting numbers and numeric strings
pub fn param_f64(params: &Params, name: &str) -> Option<f64> {
    match params.get(name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a string parameter
pub fn param_str<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params.get(name)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_params(entries: &[(&str, Value)]) -> Params {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let params = make_params(&[
            ("a", json!(3)),
            ("b", json!("42")),
            ("c", json!(" 2.5 ")),
            ("d", json!(true)),
        ]);

        assert_eq!(param_i64(&params, "a"), Some(3));
        assert_eq!(param_i64(&params, "b"), Some(42));
        assert_eq!(param_i64(&params, "missing"), None);
        assert_eq!(param_i64(&params, "d"), None);

        assert_eq!(param_f64(&params, "a"), Some(3.0));
        assert_eq!(param_f64(&params, "c"), Some(2.5));
    }

    #[test]
    fn test_param_str() {
        let params = make_params(&[("valueType", json!("temp")), ("n", json!(7))]);
        assert_eq!(param_str(&params, "valueType"), Some("temp"));
        assert_eq!(param_str(&params, "n"), None);
    }
}
