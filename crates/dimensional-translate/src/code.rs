use serde_json::{Map, Value};

use crate::call::FunctionCall;
use crate::config::TranslationSettings;

/// Renders a call as a source snippet, e.g.
/// `filterFactory.members(DM.Commerce.Gender, ['Female'])`.
///
/// A call's first argument is emitted bare when it is an attribute path under the model
/// prefix. Every other string, including member values inside arrays and config objects, is
/// single-quoted.
pub fn function_call_to_code(call: &FunctionCall, settings: &TranslationSettings) -> String {
    let mut out = String::new();
    write_call(&mut out, call, settings);
    out
}

fn write_call(out: &mut String, call: &FunctionCall, settings: &TranslationSettings) {
    out.push_str(&call.function);
    out.push('(');
    for (i, arg) in call.args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match arg {
            Value::String(path) if i == 0 && is_attribute_path(path, settings) => {
                out.push_str(path)
            }
            _ => write_value(out, arg, settings),
        }
    }
    out.push(')');
}

fn write_list(out: &mut String, values: &[Value], settings: &TranslationSettings) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(out, value, settings);
    }
}

fn write_value(out: &mut String, value: &Value, settings: &TranslationSettings) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_quoted(out, s),
        Value::Array(items) => {
            out.push('[');
            write_list(out, items, settings);
            out.push(']');
        }
        Value::Object(obj) => match FunctionCall::from_json(value) {
            Some(call) => write_call(out, &call, settings),
            None => write_object(out, obj, settings),
        },
    }
}

fn write_object(out: &mut String, obj: &Map<String, Value>, settings: &TranslationSettings) {
    if obj.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{ ");
    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if is_identifier(key) {
            out.push_str(key);
        } else {
            write_quoted(out, key);
        }
        out.push_str(": ");
        write_value(out, value, settings);
    }
    out.push_str(" }");
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('\'');
}

fn is_attribute_path(s: &str, settings: &TranslationSettings) -> bool {
    s.strip_prefix(settings.model_prefix.as_str())
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|rest| !rest.is_empty() && rest.split('.').all(is_identifier))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn code(value: Value) -> String {
        let call: FunctionCall = serde_json::from_value(value).unwrap();
        function_call_to_code(&call, &TranslationSettings::default())
    }

    #[test]
    fn renders_attribute_paths_bare_and_strings_quoted() {
        assert_eq!(
            code(json!({
                "function": "filterFactory.members",
                "args": ["DM.Commerce.Gender", ["Female", "O'Brien"]]
            })),
            r"filterFactory.members(DM.Commerce.Gender, ['Female', 'O\'Brien'])"
        );
    }

    #[test]
    fn renders_nested_calls_and_config_objects() {
        assert_eq!(
            code(json!({
                "function": "filterFactory.topRanking",
                "args": [
                    "DM.Commerce.Category",
                    { "function": "measureFactory.sum", "args": ["DM.Commerce.Revenue"] },
                    5,
                    { "guid": "top-5", "disabled": false }
                ]
            })),
            concat!(
                "filterFactory.topRanking(DM.Commerce.Category, ",
                "measureFactory.sum(DM.Commerce.Revenue), 5, { disabled: false, guid: 'top-5' })"
            )
        );
    }

    #[test]
    fn paths_need_identifier_segments() {
        assert_eq!(
            code(json!({
                "function": "filterFactory.contains",
                "args": ["DM.Commerce.Product Name", "DM."]
            })),
            "filterFactory.contains('DM.Commerce.Product Name', 'DM.')"
        );
        assert_eq!(
            code(json!({
                "function": "filterFactory.dateRange",
                "args": ["DM.Commerce.Date.Years", null, "2021"]
            })),
            "filterFactory.dateRange(DM.Commerce.Date.Years, null, '2021')"
        );
    }

    #[test]
    fn only_attribute_arguments_render_bare() {
        assert_eq!(
            code(json!({
                "function": "filterFactory.members",
                "args": ["DM.Commerce.Gender", ["DM.Female"], { "guid": "DM.Gender" }]
            })),
            "filterFactory.members(DM.Commerce.Gender, ['DM.Female'], { guid: 'DM.Gender' })"
        );
        assert_eq!(
            code(json!({
                "function": "filterFactory.equals",
                "args": ["DM.Commerce.Condition", "DM.Used"]
            })),
            "filterFactory.equals(DM.Commerce.Condition, 'DM.Used')"
        );
    }
}
