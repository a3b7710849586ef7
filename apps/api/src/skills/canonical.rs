use std::collections::HashMap;

/// Alias → canonical topic pairs used when no other table is supplied.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("venv", "py.env.venv"),
    ("pip", "py.pkg.pip"),
    ("pygame", "py.graphics.pygame"),
    ("keyboard", "py.input.keyboard"),
    ("fps", "py.timing.fps"),
    ("loops", "py.basics.loops"),
];

/// Maps free-text topic names onto stable dotted identifiers.
///
/// Lookup happens after trimming and lowercasing, so `"VENV "` and `"venv"`
/// resolve to the same key. Topics without an alias pass through in their
/// normalized form.
#[derive(Debug, Clone)]
pub struct TopicCanonicalizer {
    aliases: HashMap<String, String>,
}

impl TopicCanonicalizer {
    /// Builds a canonicalizer from an arbitrary alias table.
    /// Keys and targets are normalized the same way lookups are, which keeps
    /// canonicalization idempotent.
    pub fn new<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(k, v)| (normalize_key(k.as_ref()), normalize_key(&v.into())))
                .collect(),
        }
    }

    pub fn canonicalize(&self, raw: &str) -> String {
        let key = normalize_key(raw);
        match self.aliases.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    pub fn canonicalize_all(&self, topics: &[String]) -> Vec<String> {
        topics.iter().map(|t| self.canonicalize(t)).collect()
    }
}

impl Default for TopicCanonicalizer {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES.iter().copied())
    }
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_with_casing_and_whitespace() {
        let c = TopicCanonicalizer::default();
        assert_eq!(c.canonicalize("VENV "), "py.env.venv");
        assert_eq!(c.canonicalize("  Pip"), "py.pkg.pip");
    }

    #[test]
    fn test_custom_topic_is_lowercased() {
        let c = TopicCanonicalizer::default();
        assert_eq!(c.canonicalize("Custom-Topic"), "custom-topic");
    }

    #[test]
    fn test_empty_input() {
        let c = TopicCanonicalizer::default();
        assert_eq!(c.canonicalize(""), "");
        assert_eq!(c.canonicalize("   "), "");
    }

    #[test]
    fn test_idempotent() {
        let c = TopicCanonicalizer::default();
        for raw in ["venv", "FPS", " Loops ", "py.env.venv", "Rust.Ownership", ""] {
            let once = c.canonicalize(raw);
            assert_eq!(c.canonicalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_custom_table_replaces_defaults() {
        let c = TopicCanonicalizer::new([("Borrowck", "rust.ownership.borrowck")]);
        assert_eq!(c.canonicalize("borrowck"), "rust.ownership.borrowck");
        assert_eq!(c.canonicalize("venv"), "venv");
    }

    #[test]
    fn test_canonicalize_all_preserves_order() {
        let c = TopicCanonicalizer::default();
        let topics = vec!["keyboard".to_string(), "Sockets".to_string()];
        assert_eq!(
            c.canonicalize_all(&topics),
            vec!["py.input.keyboard".to_string(), "sockets".to_string()]
        );
    }
}
