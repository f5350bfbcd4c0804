//! Inline attribute list codec.
//!
//! Blocks serialize their attributes as `{: id="..." title="..."}`. Values are attribute
//! escaped (`&`, `<`, `>`, `"`), keys are bare words.

/// Parses a serialized attribute list into ordered key/value pairs.
///
/// Malformed trailing input is ignored; everything parsed before it is kept.
pub fn parse_ial(input: &str) -> Vec<(String, String)> {
    let mut s = input.trim();
    if let Some(rest) = s.strip_prefix("{:") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix('}') {
        s = rest;
    }

    let mut pairs = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        let Some(eq) = rest.find("=\"") else {
            break;
        };
        let key = rest[..eq].trim();
        let value_start = eq + 2;
        let Some(len) = rest[value_start..].find('"') else {
            break;
        };
        let value = &rest[value_start..value_start + len];
        if !key.is_empty() && !key.contains(char::is_whitespace) {
            pairs.push((key.to_string(), unescape_attr(value)));
        }
        rest = rest[value_start + len + 1..].trim_start();
    }
    pairs
}

/// Serializes attribute pairs as `{: key="value" ...}`.
pub fn ial_to_string(pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let body: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", escape_attr(v)))
        .collect();
    format!("{{: {}}}", body.join(" "))
}

/// Escapes an attribute value.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_attr`].
pub fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ial() {
        let pairs = parse_ial(r#"{: id="20230101120000-abcdefg" title="Plan &quot;A&quot;"}"#);
        assert_eq!(
            pairs,
            vec![
                ("id".to_string(), "20230101120000-abcdefg".to_string()),
                ("title".to_string(), "Plan \"A\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(parse_ial("").is_empty());
        assert!(parse_ial("{: }").is_empty());
        let pairs = parse_ial(r#"{: a="1" b="unterminated}"#);
        assert_eq!(pairs, vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_serialize_ial() {
        let pairs = vec![
            ("id".to_string(), "x".to_string()),
            ("memo".to_string(), "a < b".to_string()),
        ];
        let s = ial_to_string(&pairs);
        assert_eq!(s, r#"{: id="x" memo="a &lt; b"}"#);
        assert_eq!(parse_ial(&s), pairs);
        assert_eq!(ial_to_string(&[]), "");
    }
}
