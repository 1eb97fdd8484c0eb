use crate::json_path::model::Expression;
use serde_json::Value;
use serde_json_path::JsonPath;

pub fn evaluate_expression(context: &Value, exp: &Expression) -> Result<Vec<Value>, String> {
    let json_path = JsonPath::parse(exp.value.as_str())
        .map_err(|err| format!("invalid expression \"{}\": {}", exp.value, err))?;
    Ok(json_path.query(context).all().into_iter().cloned().collect())
}

/// First string found at `path`; numbers are rendered as text so numeric ids work too.
pub fn first_string(context: &Value, path: &str) -> Option<String> {
    let values = evaluate_expression(context, &Expression::new(path)).ok()?;
    match values.into_iter().next()? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn as_string(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string().trim_matches('"').to_string())
        .collect::<Vec<String>>()
        .join(",")
}
