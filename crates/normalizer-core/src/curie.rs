//! A CURIE ("compact URI") is an identifier of the form `prefix:local`.

use std::fmt;

/// A parsed CURIE, borrowing from the original string.
///
/// Prefix comparison is case-sensitive; the local part is opaque. Splitting
/// happens on the *first* colon only, so local parts may themselves contain
/// colons (e.g. `UMLS:C0032961:1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Curie<'a> {
    pub prefix: &'a str,
    pub local: &'a str,
}

impl<'a> Curie<'a> {
    /// Parses `s` as `prefix:local`. Returns `None` if `s` has no colon.
    pub fn parse(s: &'a str) -> Option<Self> {
        let (prefix, local) = s.split_once(':')?;
        Some(Curie { prefix, local })
    }
}

impl fmt::Display for Curie<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

/// The uppercased form of `curie`, used as the lookup key into the
/// equivalent-id-to-canonical store. Uppercasing is applied to the whole
/// string, not just the prefix.
pub fn lookup_key(curie: &str) -> String {
    curie.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefix_and_local() {
        let c = Curie::parse("MONDO:0005002").unwrap();
        assert_eq!(c.prefix, "MONDO");
        assert_eq!(c.local, "0005002");
    }

    #[test]
    fn splits_on_first_colon_only() {
        let c = Curie::parse("UMLS:C0032961:1").unwrap();
        assert_eq!(c.prefix, "UMLS");
        assert_eq!(c.local, "C0032961:1");
    }

    #[test]
    fn no_colon_is_none() {
        assert!(Curie::parse("not-a-curie").is_none());
    }

    #[test]
    fn lookup_key_uppercases_whole_string() {
        assert_eq!(lookup_key("mondo:0005002"), "MONDO:0005002");
    }
}
