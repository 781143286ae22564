// Shared prompt fragments.
// Each page that calls the model defines its own prompts.rs alongside it;
// this file holds the pieces they have in common.

/// Appended to every prompt whose answer is decoded as JSON.
pub const JSON_ONLY_RULES: &str = "\
Strict rules:
- Output ONLY valid JSON. Do NOT write explanations, markdown, or any prose before or after.
- Use double quotes for every key and string value.
- No trailing commas and no comments inside the JSON.";

/// Fills `{name}` placeholders in a single pass. Substituted values are
/// never re-scanned, so braces in user text stay as they are.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = values
            .iter()
            .find(|(name, _)| after.starts_with(name) && after[name.len()..].starts_with('}'));
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
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
