use std::collections::BTreeMap;

use paramgate_common::types::{ParamKind, ParamValue, ParameterDefinition, ParameterSet};

/// Coerce textual input (query strings, form fields) into the types the
/// schema declares.
///
/// Lenient by contract: text that does not parse is kept as text, and the
/// value validator reports the mismatch later. Keys without a definition
/// pass through as text.
pub fn convert(raw: &BTreeMap<String, String>, definitions: &[ParameterDefinition]) -> ParameterSet {
    raw.iter()
        .map(|(key, text)| {
            let value = match find(definitions, key) {
                Some(def) => coerce(text, def),
                None => ParamValue::Text(text.clone()),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Apply the same coercion to `Text` values of an already-typed set, such
/// as one parsed from a JSON body. Values of any other shape are kept.
pub fn normalize(set: ParameterSet, definitions: &[ParameterDefinition]) -> ParameterSet {
    set.into_iter()
        .map(|(key, value)| {
            let value = match (&value, find(definitions, &key)) {
                (ParamValue::Text(text), Some(def)) => coerce(text, def),
                _ => value,
            };
            (key, value)
        })
        .collect()
}

fn find<'a>(definitions: &'a [ParameterDefinition], key: &str) -> Option<&'a ParameterDefinition> {
    definitions.iter().find(|d| d.key == key)
}

fn coerce(text: &str, definition: &ParameterDefinition) -> ParamValue {
    match definition.kind {
        ParamKind::Number => match text.trim().parse::<f64>() {
            // "NaN" and "inf" parse as f64 but are never legal parameter values.
            Ok(n) if n.is_finite() => ParamValue::Number(n),
            _ => ParamValue::Text(text.to_string()),
        },
        ParamKind::Boolean => {
            if text.eq_ignore_ascii_case("true") {
                ParamValue::Bool(true)
            } else if text.eq_ignore_ascii_case("false") {
                ParamValue::Bool(false)
            } else {
                ParamValue::Text(text.to_string())
            }
        }
        ParamKind::String => ParamValue::Text(text.to_string()),
        ParamKind::Select => {
            // Numeric and boolean options keep their own type; textual
            // options (and unmatched input) become enumerated text.
            match definition.options.iter().find(|o| o.matches_text(text)) {
                Some(option) if matches!(option, ParamValue::Number(_) | ParamValue::Bool(_)) => {
                    option.clone()
                }
                _ => ParamValue::Choice(text.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_number_and_boolean_conversion() {
        let defs = vec![ParameterDefinition::number("temperature")];
        let out = convert(&raw(&[("temperature", "0.9")]), &defs);
        assert_eq!(out.get("temperature"), Some(&ParamValue::Number(0.9)));

        let defs = vec![ParameterDefinition::boolean("flag")];
        let out = convert(&raw(&[("flag", "true")]), &defs);
        assert_eq!(out.get("flag"), Some(&ParamValue::Bool(true)));
        let out = convert(&raw(&[("flag", "FALSE")]), &defs);
        assert_eq!(out.get("flag"), Some(&ParamValue::Bool(false)));
    }

    #[test]
    fn test_unparseable_input_is_kept_as_text() {
        let defs = vec![
            ParameterDefinition::number("steps"),
            ParameterDefinition::boolean("hdr"),
        ];
        let out = convert(&raw(&[("steps", "lots"), ("hdr", "yes"), ("x", "NaN")]), &defs);
        assert_eq!(out.get("steps"), Some(&ParamValue::text("lots")));
        assert_eq!(out.get("hdr"), Some(&ParamValue::text("yes")));

        let defs = vec![ParameterDefinition::number("x")];
        let out = convert(&raw(&[("x", "NaN")]), &defs);
        assert_eq!(out.get("x"), Some(&ParamValue::text("NaN")));
    }

    #[test]
    fn test_strings_and_undefined_keys_pass_through() {
        let defs = vec![ParameterDefinition::string("prompt")];
        let out = convert(&raw(&[("prompt", "42"), ("unknown", "true")]), &defs);
        assert_eq!(out.get("prompt"), Some(&ParamValue::text("42")));
        assert_eq!(out.get("unknown"), Some(&ParamValue::text("true")));
    }

    #[test]
    fn test_select_options_keep_their_type() {
        let defs = vec![
            ParameterDefinition::select("n", [1, 2, 4]),
            ParameterDefinition::select("quality", ["standard", "hd"]),
        ];
        let out = convert(&raw(&[("n", "2"), ("quality", "hd")]), &defs);
        assert_eq!(out.get("n"), Some(&ParamValue::Number(2.0)));
        assert!(matches!(out.get("quality"), Some(ParamValue::Choice(s)) if s == "hd"));

        let out = convert(&raw(&[("quality", "ultra")]), &defs);
        assert!(matches!(out.get("quality"), Some(ParamValue::Choice(s)) if s == "ultra"));
    }

    #[test]
    fn test_normalize_only_touches_text() {
        let defs = vec![
            ParameterDefinition::number("temperature"),
            ParameterDefinition::boolean("stream"),
        ];
        let set: ParameterSet = [
            ("temperature", ParamValue::text("0.5")),
            ("stream", ParamValue::Bool(true)),
            ("stop", ParamValue::Json(serde_json::json!(["END"]))),
        ]
        .into_iter()
        .collect();

        let out = normalize(set, &defs);
        assert_eq!(out.get("temperature"), Some(&ParamValue::Number(0.5)));
        assert_eq!(out.get("stream"), Some(&ParamValue::Bool(true)));
        assert_eq!(out.get("stop").map(ParamValue::type_name), Some("array"));
    }
}
