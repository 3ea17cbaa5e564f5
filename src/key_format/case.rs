//! Case conversion helpers behind the `camelize` and `underscore` strategies.

use super::InitialCase;

/// `snake_case` to `CamelCase` / `camelCase`.
///
/// The first segment keeps its remaining characters as written so an already
/// camel-cased key survives (`camelStyle` → `CamelStyle`). Every later segment
/// is capitalized.
pub(super) fn camelize(key: &str, initial: InitialCase) -> String {
    let mut out = String::with_capacity(key.len());

    for (index, segment) in key.split('_').enumerate() {
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            continue;
        };

        if index == 0 {
            match initial {
                InitialCase::Upper => out.extend(first.to_uppercase()),
                InitialCase::Lower => out.extend(first.to_lowercase()),
            }
            out.push_str(chars.as_str());
        } else {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }

    out
}

/// `CamelCase`, `camelCase` or `dashed-key` to `snake_case`.
///
/// Runs of capitals are treated as one word (`HTTPServer` → `http_server`).
pub(super) fn underscore(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }

        out.extend(c.to_lowercase());
    }

    out
}
