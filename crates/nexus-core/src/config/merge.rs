//! Merge profundo de valores JSON.

use serde_json::Value;

/// Merge recursivo: los mapeos se fusionan clave por clave; escalares y
/// secuencias son reemplazados por la capa de mayor precedencia (`over`).
pub fn deep_merge(base: &Value, over: &Value) -> Value {
    match (base, over) {
        (Value::Object(a), Value::Object(b)) => {
            let mut out = a.clone();
            for (k, v) in b {
                match out.get(k) {
                    Some(existing) => {
                        let merged = deep_merge(existing, v);
                        out.insert(k.clone(), merged);
                    }
                    None => {
                        out.insert(k.clone(), v.clone());
                    }
                }
            }
            Value::Object(out)
        }
        // No-mapeos: gana la capa superior.
        (_, other) => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_present_in_one_side_carry_through() {
        let a = json!({"x": {"a": 1}, "solo": true});
        let b = json!({"x": {"b": 2}});
        let m = deep_merge(&a, &b);
        assert_eq!(m, json!({"x": {"a": 1, "b": 2}, "solo": true}));
    }

    #[test]
    fn sequences_are_replaced_not_concatenated() {
        let m = deep_merge(&json!({"v": [1, 2, 3]}), &json!({"v": [4]}));
        assert_eq!(m["v"], json!([4]));
    }
}
