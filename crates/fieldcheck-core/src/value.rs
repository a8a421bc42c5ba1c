//! Loose value semantics shared by coercion and validation.
//!
//! Field values arrive from form-like sources where "no value" has two spellings:
//! an absent value (`None`) and an explicit `null`. Numeric, string and boolean
//! conversions follow the loose rules those sources expect (`"42"` is a number,
//! `""` is falsy, `[1, 2]` prints as `1,2`).

use serde_json::{Number, Value};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// True for both "no value" sentinels: absent and `null`.
pub fn is_empty(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Truthiness: absent, `null`, `false`, `0` and `""` are false, everything else is true.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Numeric conversion. `None` means not-a-number.
pub fn to_number(value: Option<&Value>) -> Option<f64> {
    match value {
        None => None,
        Some(Value::Null) => Some(0.0),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_number(s),
        Some(array @ Value::Array(_)) => parse_number(&to_display_string(array)),
        Some(Value::Object(_)) => None,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            // Long literals round instead of overflowing
            return digits.chars().try_fold(0.0, |acc: f64, c| {
                c.to_digit(radix).map(|digit| acc * f64::from(radix) + f64::from(digit))
            });
        }
    }

    // f64::from_str also accepts "inf" and "NaN", which are not numbers here
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Turn a converted number back into a JSON value.
///
/// Integral results become JSON integers. Non-finite results have no JSON
/// representation and yield `None`.
pub fn number_value(number: f64) -> Option<Value> {
    if !number.is_finite() {
        return None;
    }
    if number.fract() == 0.0 && number.abs() < MAX_SAFE_INTEGER {
        return Some(Value::from(number as i64));
    }
    Number::from_f64(number).map(Value::Number)
}

/// Print a number the way JavaScript's `String(number)` does: no trailing
/// `.0`, and exponent form (`1e+21`, `1e-7`) outside `1e-7 < |n| < 1e21`.
pub fn format_number(number: f64) -> String {
    if number == 0.0 {
        "0".to_string()
    } else if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        let sign = if number > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if number.abs() >= 1e21 || number.abs() < 1e-6 {
        let exponential = format!("{:e}", number);
        match exponential.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => exponential,
        }
    } else {
        format!("{}", number)
    }
}

/// String form of a value.
///
/// `null` prints as `"null"` at the top level but as an empty slot inside arrays.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format_number(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Short name of a value's kind, for diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render an optional value for error messages.
pub fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_sentinels() {
        assert!(is_empty(None));
        assert!(is_empty(Some(&Value::Null)));
        assert!(!is_empty(Some(&json!(""))));
        assert!(!is_empty(Some(&json!(0))));
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(Some(&falsy)), "{} should be falsy", falsy);
        }
        assert!(!is_truthy(None));
        for truthy in [json!("x"), json!(1), json!(-0.5), json!([]), json!({}), json!("false")] {
            assert!(is_truthy(Some(&truthy)), "{} should be truthy", truthy);
        }
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(Some(&json!("42"))), Some(42.0));
        assert_eq!(to_number(Some(&json!("  3.5 "))), Some(3.5));
        assert_eq!(to_number(Some(&json!(""))), Some(0.0));
        assert_eq!(to_number(Some(&json!("0x1F"))), Some(31.0));
        assert_eq!(to_number(Some(&json!("0b101"))), Some(5.0));
        assert_eq!(to_number(Some(&json!("1e3"))), Some(1000.0));
        assert_eq!(to_number(Some(&json!(null))), Some(0.0));
        assert_eq!(to_number(Some(&json!(true))), Some(1.0));
        assert_eq!(to_number(Some(&json!([7]))), Some(7.0));
        assert_eq!(to_number(Some(&json!([]))), Some(0.0));

        assert_eq!(to_number(None), None);
        assert_eq!(to_number(Some(&json!("abc"))), None);
        assert_eq!(to_number(Some(&json!("inf"))), None);
        assert_eq!(to_number(Some(&json!("NaN"))), None);
        assert_eq!(to_number(Some(&json!("0x"))), None);
        assert_eq!(to_number(Some(&json!("0xFFFFFFFFFFFFFFFFFF"))), Some(4722366482869645213696.0));
        assert_eq!(to_number(Some(&json!("0x1G"))), None);
        assert_eq!(to_number(Some(&json!([1, 2]))), None);
        assert_eq!(to_number(Some(&json!({"a": 1}))), None);
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(42.0), Some(json!(42)));
        assert_eq!(number_value(-0.0), Some(json!(0)));
        assert_eq!(number_value(2.5), Some(json!(2.5)));
        assert_eq!(number_value(f64::INFINITY), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e300), "-1.5e+300");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(2.5e-8), "2.5e-8");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_display_string() {
        assert_eq!(to_display_string(&json!(42)), "42");
        assert_eq!(to_display_string(&json!(1.5)), "1.5");
        assert_eq!(to_display_string(&json!(2.0)), "2");
        assert_eq!(to_display_string(&json!(true)), "true");
        assert_eq!(to_display_string(&json!([1, null, "a", [2, 3]])), "1,,a,2,3");
        assert_eq!(to_display_string(&json!({"a": 1})), "[object Object]");
    }
}
