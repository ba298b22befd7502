//! Serializes [`crate::Value`] back to JSON text.
//!
//! Written by hand rather than routed back through `serde_json::Value`:
//! a `Number::BigInt` has no `serde_json::Number` equivalent without
//! `serde_json`'s unstable raw-number constructor, and this crate's
//! object/array variants already carry everything `serde_json` would
//! need recomputed from a `Serialize` impl anyway.

use crate::Value;

pub fn to_string(value: &Value, pretty: bool) -> String {
    let mut out = String::new();
    write_value(value, &mut out, if pretty { Some(0) } else { None });
    out
}

fn write_value(value: &Value, out: &mut String, indent: Option<usize>) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => write_array(items, out, indent),
        Value::Object(entries) => write_object(entries, out, indent),
    }
}

fn write_array(items: &[Value], out: &mut String, indent: Option<usize>) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    let next_indent = indent.map(|level| level + 1);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if let Some(level) = next_indent {
            out.push('\n');
            push_indent(out, level);
        }
        write_value(item, out, next_indent);
    }
    if let Some(level) = indent {
        out.push('\n');
        push_indent(out, level);
    }
    out.push(']');
}

fn write_object(entries: &[(String, Value)], out: &mut String, indent: Option<usize>) {
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    let next_indent = indent.map(|level| level + 1);
    for (i, (key, val)) in entries.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if let Some(level) = next_indent {
            out.push('\n');
            push_indent(out, level);
        }
        write_string(key, out);
        out.push(':');
        if next_indent.is_some() {
            out.push(' ');
        }
        write_value(val, out, next_indent);
    }
    if let Some(level) = indent {
        out.push('\n');
        push_indent(out, level);
    }
    out.push('}');
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::super::parse::parse;
    use crate::Value;

    #[test]
    fn compact_round_trips_through_parse() {
        let mut obj = Value::object();
        obj.insert("name", "pool");
        obj.insert("active", true);
        obj.insert("count", 7i64);
        let text = obj.to_json_string();
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed, obj);
    }

    #[test]
    fn escapes_control_characters_and_quotes() {
        let value = Value::String("line1\nline2\t\"quoted\"".to_owned());
        assert_eq!(value.to_json_string(), "\"line1\\nline2\\t\\\"quoted\\\"\"");
    }

    #[test]
    fn pretty_print_indents_nested_values() {
        let mut obj = Value::object();
        obj.insert("a", 1i64);
        let pretty = obj.to_json_string_pretty();
        assert_eq!(pretty, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn empty_containers_stay_on_one_line_even_when_pretty() {
        assert_eq!(Value::object().to_json_string_pretty(), "{}");
        assert_eq!(Value::array().to_json_string_pretty(), "[]");
    }
}
