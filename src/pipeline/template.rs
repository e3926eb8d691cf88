//! Instruction rendering

/// Replace `{name}` placeholders with their substitutions.
///
/// Rendering is a single left-to-right pass: substituted text is never
/// re-scanned, so a knowledge file or stage output containing braces cannot
/// inject placeholders. Placeholders without a substitution are left as
/// written.
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match substitutions.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Names of all `{placeholder}`s in a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let key = &after[..end];
        if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            names.push(key);
            rest = &after[end + 1..];
        } else {
            rest = after;
        }
    }

    names
}
