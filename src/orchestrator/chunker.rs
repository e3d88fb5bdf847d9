//! Word-granularity chunking of streamed text
//!
//! Model deltas split words at arbitrary points. The chunker holds back the
//! trailing partial word and releases only whole words, each carrying the
//! whitespace that follows it.

#[derive(Debug, Default)]
pub struct WordChunker {
    pending: String,
}

impl WordChunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a delta and take every word it completed.
    pub fn push(&mut self, delta: &str) -> Vec<String> {
        self.pending.push_str(delta);

        let Some(cut) = self
            .pending
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
        else {
            return Vec::new();
        };

        let tail = self.pending.split_off(cut);
        let ready = std::mem::replace(&mut self.pending, tail);
        split_words(&ready)
    }

    /// Release whatever is left at the end of a turn.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Split into chunks of the form `word + trailing whitespace`.
pub fn split_words(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut after_space = false;

    for c in text.chars() {
        let space = c.is_whitespace();
        if !space && after_space {
            chunks.push(std::mem::take(&mut current));
        }
        after_space = space;
        current.push(c);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_holds_partial_word() {
        let mut chunker = WordChunker::new();
        assert!(chunker.push("Hel").is_empty());
        assert_eq!(chunker.push("lo wor"), vec!["Hello "]);
        assert_eq!(chunker.push("ld, you're free"), vec!["world, ", "you're "]);
        assert_eq!(chunker.flush(), Some("free".to_string()));
        assert_eq!(chunker.flush(), None);
    }

    #[test]
    fn test_newlines_stay_attached() {
        assert_eq!(split_words("a\n\nb c"), vec!["a\n\n", "b ", "c"]);
    }

    #[test]
    fn test_multibyte_text() {
        let mut chunker = WordChunker::new();
        assert_eq!(chunker.push("Café à "), vec!["Café ", "à "]);
        assert_eq!(chunker.push("midi"), Vec::<String>::new());
        assert_eq!(chunker.flush(), Some("midi".to_string()));
    }

    proptest! {
        /// Chunks reassemble to exactly the input, however it was split
        #[test]
        fn prop_chunks_reassemble(parts in proptest::collection::vec("[a-zé ,\n]{0,8}", 0..12)) {
            let mut chunker = WordChunker::new();
            let mut out = String::new();
            for part in &parts {
                for chunk in chunker.push(part) {
                    out.push_str(&chunk);
                }
            }
            if let Some(rest) = chunker.flush() {
                out.push_str(&rest);
            }
            prop_assert_eq!(out, parts.concat());
        }

        /// No released chunk contains whitespace followed by a word character
        #[test]
        fn prop_one_word_per_chunk(text in "[a-z ]{0,40}") {
            for chunk in split_words(&text) {
                let trimmed = chunk.trim_start();
                prop_assert!(!trimmed.trim_end().contains(' '), "chunk {:?}", chunk);
            }
        }
    }
}
