//! Free-text search term

/// Search state; the term is stored verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    term: String,
}

impl SearchState {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    pub fn set_search(&mut self, term: impl Into<String>) -> &mut Self {
        self.term = term.into();
        self
    }

    pub fn search(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    pub fn reset(&mut self) -> &mut Self {
        self.term.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_is_stored_verbatim() {
        let mut search = SearchState::default();
        assert_eq!(search.search(), "");

        search.set_search("  test query ");
        assert_eq!(search.search(), "  test query ");
        assert!(!search.is_empty());
    }

    #[test]
    fn test_search_reset() {
        let mut search = SearchState::new("initial");
        search.reset();
        assert!(search.is_empty());
    }
}
