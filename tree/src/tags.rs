//! PGN tag pairs.
//!
//! Tags are a thin pass-through: an ordered mapping from name to value,
//! emitted verbatim by the PGN writer. Order is preserved so that a
//! parsed game serializes its tag section byte-identically.

/// Ordered PGN tag pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    pub fn new() -> Tags {
        Tags::default()
    }

    /// The seven-tag roster a fresh game starts with
    pub fn roster() -> Tags {
        Tags(
            [
                ("Event", "?"),
                ("Site", "?"),
                ("Date", "????.??.??"),
                ("Round", "?"),
                ("White", "?"),
                ("Black", "?"),
                ("Result", "*"),
            ]
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a tag, replacing an existing value or appending a new pair
    pub fn set(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_owned(),
            None => self.0.push((name.to_owned(), value.to_owned())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster() {
        let tags = Tags::roster();
        assert_eq!(tags.len(), 7);
        assert_eq!(tags.get("Event"), Some("?"));
        assert_eq!(tags.get("Result"), Some("*"));
        assert_eq!(tags.get("FEN"), None);
    }

    #[test]
    fn test_set_preserves_order() {
        let mut tags = Tags::roster();
        tags.set("White", "Steinitz, Wilhelm");
        tags.set("ECO", "C25");
        let names: Vec<&str> = tags.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            ["Event", "Site", "Date", "Round", "White", "Black", "Result", "ECO"]
        );
        assert_eq!(tags.get("White"), Some("Steinitz, Wilhelm"));
    }
}
