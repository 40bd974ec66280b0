const MAX_VISIBLE_CHARS: usize = 100;

const SENSITIVE_PREFIXES: [&str; 6] = [
    "Bearer ",
    "api_key=",
    "api-key=",
    "password=",
    "secret=",
    "token=",
];

/// Shortens prompts and raw service payloads for logging and masks anything
/// that looks like a credential.
pub fn sanitize_for_log(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total_chars = trimmed.chars().count();
    let visible = if total_chars > MAX_VISIBLE_CHARS {
        let head: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{head}... ({total_chars} chars total)")
    } else {
        trimmed.to_string()
    };

    SENSITIVE_PREFIXES
        .iter()
        .fold(visible, |acc, prefix| redact_after(&acc, prefix))
}

fn redact_after(text: &str, prefix: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(prefix) {
        let value_start = idx + prefix.len();
        result.push_str(&rest[..value_start]);
        result.push_str("[REDACTED]");

        let value_len = rest[value_start..]
            .find(|c: char| c.is_whitespace() || matches!(c, '&' | '"' | '\''))
            .unwrap_or(rest.len() - value_start);
        rest = &rest[value_start + value_len..];
    }

    result.push_str(rest);
    result
}
