/// Prefix trie used by the bad-query cache.
use std::collections::HashMap;

/// A simple Trie (prefix tree) over chars.
///
/// Stores query roots and answers "does this text start with any stored
/// root" in time proportional to the text length.
///
/// # Example
/// ```
/// use suggestions_core::trie::PrefixTrie;
///
/// let mut trie = PrefixTrie::new();
/// trie.insert("Jam");
///
/// assert!(trie.contains_word("Jam"));
/// assert!(!trie.contains_word("Ja"));
/// assert!(trie.has_prefix_of("Jamaica"));
/// assert!(!trie.has_prefix_of("Ja"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct PrefixTrie {
    children: HashMap<char, Box<PrefixTrie>>,
    is_end: bool,
    /// When `is_end` is true, `word` contains the stored text.
    word: Option<String>,
}

impl PrefixTrie {
    /// Create a new empty trie root.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            is_end: false,
            word: None,
        }
    }

    /// Insert a word. Returns `false` if it was already present.
    pub fn insert(&mut self, word: &str) -> bool {
        let mut node = self;
        for ch in word.chars() {
            node = node
                .children
                .entry(ch)
                .or_insert_with(|| Box::new(PrefixTrie::new()));
        }
        if node.is_end {
            return false;
        }
        node.is_end = true;
        node.word = Some(word.to_string());
        true
    }

    /// Check whether the trie contains exactly the given word.
    pub fn contains_word(&self, word: &str) -> bool {
        let mut node = self;
        for ch in word.chars() {
            if let Some(child) = node.children.get(&ch) {
                node = child;
            } else {
                return false;
            }
        }
        node.is_end
    }

    /// True if some stored word is a prefix of `text` (or equals it).
    pub fn has_prefix_of(&self, text: &str) -> bool {
        let mut node = self;
        if node.is_end {
            return true;
        }
        for ch in text.chars() {
            match node.children.get(&ch) {
                Some(child) => {
                    node = child;
                    if node.is_end {
                        return true;
                    }
                }
                None => return false,
            }
        }
        false
    }

    /// All stored words that are prefixes of `text`, shortest first.
    pub fn walk_prefixes(&self, text: &str) -> Vec<String> {
        let mut res = Vec::new();
        let mut node = self;
        for ch in text.chars() {
            if let Some(child) = node.children.get(&ch) {
                node = child;
                if node.is_end {
                    if let Some(w) = &node.word {
                        res.push(w.clone());
                    }
                }
            } else {
                break;
            }
        }
        res
    }

    /// Drop every stored word.
    pub fn clear(&mut self) {
        self.children.clear();
        self.is_end = false;
        self.word = None;
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && !self.is_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_insert_and_contains() {
        let mut trie = PrefixTrie::new();
        assert!(trie.insert("Jam"));
        assert!(trie.insert("Lon"));
        assert!(!trie.insert("Jam"));

        assert!(trie.contains_word("Jam"));
        assert!(trie.contains_word("Lon"));
        assert!(!trie.contains_word("Ja"));
        assert!(!trie.contains_word("Jama"));
    }

    #[test]
    fn test_has_prefix_of() {
        let mut trie = PrefixTrie::new();
        trie.insert("Jam");

        assert!(trie.has_prefix_of("Jam"));
        assert!(trie.has_prefix_of("Jama"));
        assert!(trie.has_prefix_of("Jamaica"));
        assert!(!trie.has_prefix_of("Ja"));
        assert!(!trie.has_prefix_of("jam"));
        assert!(!trie.has_prefix_of(""));
    }

    #[test]
    fn test_walk_prefixes_multiple_matches() {
        let mut trie = PrefixTrie::new();
        trie.insert("J");
        trie.insert("Ja");
        trie.insert("Jam");

        assert_eq!(trie.walk_prefixes("Jamaica"), vec!["J", "Ja", "Jam"]);
        assert!(trie.walk_prefixes("Xam").is_empty());
    }

    #[test]
    fn test_unicode_roots() {
        let mut trie = PrefixTrie::new();
        trie.insert("Моск");

        assert!(trie.has_prefix_of("Москва"));
        assert!(!trie.has_prefix_of("Мос"));
    }

    #[test]
    fn test_clear() {
        let mut trie = PrefixTrie::new();
        trie.insert("Jam");
        assert!(!trie.is_empty());
        trie.clear();
        assert!(trie.is_empty());
        assert!(!trie.has_prefix_of("Jamaica"));
    }
}
