//! Sentence-packing chunking strategy

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{normalize_whitespace, word_count, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

/// Greedily packs whole sentences into chunks of at most `max_words` words.
///
/// A sentence longer than `max_words` becomes its own chunk; sentences are
/// never split.
#[derive(Debug, Clone, Default)]
pub struct SentenceChunker;

impl SentenceChunker {
    pub fn new() -> Self {
        Self
    }
}

impl ChunkingStrategy for SentenceChunker {
    fn split(&self, text: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
        config.validate()?;

        let normalized = normalize_whitespace(text);

        if normalized.is_empty() {
            return Ok(vec![]);
        }

        let mut chunks = Vec::new();
        let mut start: Option<usize> = None;
        let mut end = 0;
        let mut words = 0;

        for (offset, sentence) in normalized.split_sentence_bound_indices() {
            let sentence_words = word_count(sentence);
            if sentence_words == 0 {
                continue;
            }

            if let Some(chunk_start) = start {
                if words + sentence_words > config.max_words {
                    chunks.push(normalized[chunk_start..end].trim().to_string());
                    start = None;
                    words = 0;
                }
            }

            start.get_or_insert(offset);
            end = offset + sentence.len();
            words += sentence_words;
        }

        if let Some(chunk_start) = start {
            chunks.push(normalized[chunk_start..end].trim().to_string());
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "sentence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainName;

    fn split(text: &str, max_words: usize) -> Vec<String> {
        SentenceChunker::new()
            .split(text, &ChunkingConfig::new(max_words))
            .unwrap()
    }

    #[test]
    fn test_empty_content() {
        assert!(split("", 200).is_empty());
        assert!(split("  \n\t  ", 200).is_empty());
    }

    #[test]
    fn test_single_sentence() {
        assert_eq!(
            split("This is a single sentence.", 200),
            vec!["This is a single sentence."]
        );
    }

    #[test]
    fn test_whitespace_is_normalized() {
        assert_eq!(
            split("  A car\n\naccident   claim\trequires proof.  ", 200),
            vec!["A car accident claim requires proof."]
        );
    }

    #[test]
    fn test_greedy_packing() {
        let chunks = split("One two three. Four five six. Seven.", 5);

        assert_eq!(chunks, vec!["One two three.", "Four five six. Seven."]);
    }

    #[test]
    fn test_exact_fit_stays_together() {
        let chunks = split("One two. Three four.", 4);

        assert_eq!(chunks, vec!["One two. Three four."]);
    }

    #[test]
    fn test_oversized_sentence_is_own_chunk() {
        let long = "One two three four five six seven eight nine ten.";
        let text = format!("Short one. {} Tail here.", long);

        let chunks = split(&text, 4);

        assert_eq!(chunks, vec!["Short one.", long, "Tail here."]);
    }

    #[test]
    fn test_period_before_lowercase_continues_sentence() {
        let chunks = split("Short one. one two three four. Tail here.", 4);

        assert_eq!(
            chunks,
            vec!["Short one. one two three four.", "Tail here."]
        );
    }

    #[test]
    fn test_word_bound_holds() {
        let text = "Alpha beta gamma. Delta epsilon. Zeta eta theta iota. Kappa. \
                    Lambda mu nu xi omicron. Pi rho sigma.";

        for chunk in split(text, 6) {
            assert!(word_count(&chunk) <= 6, "chunk too long: {}", chunk);
        }
    }

    #[test]
    fn test_coverage_reproduces_normalized_text() {
        let text = "First sentence here.\n\nSecond   sentence here! Third one? \
                    And a fourth, somewhat longer sentence to finish.";

        let chunks = split(text, 5);

        assert!(chunks.len() > 1);
        assert_eq!(chunks.join(" "), normalize_whitespace(text));
    }

    #[test]
    fn test_deterministic() {
        let text = "Repeatable. Output every time. For the same input.";
        assert_eq!(split(text, 3), split(text, 3));
    }

    #[test]
    fn test_zero_max_words_rejected() {
        let result = SentenceChunker::new().split("text", &ChunkingConfig::new(0));
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_chunk_carries_provenance() {
        let domain = DomainName::new("law").unwrap();
        let chunks = SentenceChunker::new()
            .chunk(
                &domain,
                "claims.txt",
                "One two three. Four five six.",
                &ChunkingConfig::new(3),
            )
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].document, "claims.txt");
        assert_eq!(chunks[1].ordinal, 1);
        assert_eq!(chunks[1].text, "Four five six.");
        assert_eq!(chunks[1].domain, domain);
    }
}
