/// Replace `${ENV_VAR}` placeholders in config string values.
///
/// Unresolvable or malformed placeholders are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

/// Placeholder replacement with a caller-supplied lookup, so tests never
/// mutate the process environment.
fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        match tail.find('}') {
            Some(end) if end > 0 => {
                let name = &tail[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &tail[end + 1..];
            },
            // "${}" or an unterminated placeholder: emit literally.
            _ => {
                out.push_str("${");
                rest = tail;
            },
        }
    }

    out.push_str(rest);
    out
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "TEMPVOX_TOKEN" => Some("tok-123".into()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_vars() {
        assert_eq!(
            substitute_with("token = \"${TEMPVOX_TOKEN}\"", lookup),
            "token = \"tok-123\""
        );
    }

    #[test]
    fn leaves_unknown_vars_intact() {
        assert_eq!(substitute_with("${NOPE_XYZ}", lookup), "${NOPE_XYZ}");
    }

    #[test]
    fn handles_multiple_placeholders() {
        assert_eq!(
            substitute_with("${TEMPVOX_TOKEN}/${EMPTY}/${NOPE}", lookup),
            "tok-123//${NOPE}"
        );
    }

    #[test]
    fn malformed_placeholders_pass_through() {
        assert_eq!(substitute_with("${}", lookup), "${}");
        assert_eq!(substitute_with("tail ${OPEN", lookup), "tail ${OPEN");
        assert_eq!(substitute_with("plain text", lookup), "plain text");
    }
}
