use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub position: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkerError {
    #[error("max_length must be positive")]
    ZeroLength,

    #[error("overlap ({overlap}) must be smaller than max_length ({max_length})")]
    OverlapTooLarge { max_length: usize, overlap: usize },
}

/// Fixed-size sliding window splitter measured in `char`s.
///
/// Consecutive chunks share exactly `overlap` characters; the last chunk may
/// be shorter than `max_length`.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_length: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(max_length: usize, overlap: usize) -> Result<Self, ChunkerError> {
        if max_length == 0 {
            return Err(ChunkerError::ZeroLength);
        }
        if overlap >= max_length {
            return Err(ChunkerError::OverlapTooLarge {
                max_length,
                overlap,
            });
        }
        Ok(Self {
            max_length,
            overlap,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Splits `text` into overlapping windows, in document order.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, including the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        let step = self.max_length - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.max_length).min(char_count);
            chunks.push(Chunk {
                content: text[boundaries[start]..boundaries[end]].to_string(),
                position: chunks.len(),
            });
            if end == char_count {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_chunker() -> Chunker {
        Chunker::new(1000, 200).unwrap()
    }

    fn expected_count(len: usize, max: usize, overlap: usize) -> usize {
        if len == 0 {
            0
        } else if len <= max {
            1
        } else {
            (len - overlap).div_ceil(max - overlap)
        }
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(Chunker::new(0, 0).unwrap_err(), ChunkerError::ZeroLength);
        assert!(matches!(
            Chunker::new(100, 100),
            Err(ChunkerError::OverlapTooLarge { .. })
        ));
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_split_empty_text() {
        assert!(default_chunker().split("").is_empty());
    }

    #[test]
    fn test_split_short_text() {
        let chunks = default_chunker().split("Paragraph 1\n\nParagraph 2");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Paragraph 1\n\nParagraph 2");
        assert_eq!(chunks[0].position, 0);
    }

    #[test]
    fn test_split_exact_length() {
        let text = "a".repeat(1000);
        let chunks = default_chunker().split(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content.len(), 1000);
    }

    #[test]
    fn test_split_3000_chars_gives_four_chunks() {
        let text: String = (0..3000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = default_chunker().split(&text);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].content, text[0..1000]);
        assert_eq!(chunks[1].content, text[800..1800]);
        assert_eq!(chunks[2].content, text[1600..2600]);
        assert_eq!(chunks[3].content, text[2400..3000]);
    }

    #[test]
    fn test_chunk_count_formula() {
        let chunker = default_chunker();
        for len in [0, 1, 999, 1000, 1001, 1800, 1801, 2600, 3000, 5432, 10_000] {
            let text = "x".repeat(len);
            assert_eq!(
                chunker.split(&text).len(),
                expected_count(len, 1000, 200),
                "length {len}"
            );
        }
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let text: String = (0..4321).map(|i| char::from(b'A' + (i % 23) as u8)).collect();
        let chunks = Chunker::new(500, 120).unwrap().split(&text);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].content.chars().collect();
            let next: Vec<char> = pair[1].content.chars().collect();
            assert_eq!(prev[prev.len() - 120..], next[..120]);
        }
    }

    #[test]
    fn test_reassembly_drops_nothing() {
        let text: String = (0..2777).map(|i| char::from(b'0' + (i % 10) as u8)).collect();
        let chunker = Chunker::new(300, 50).unwrap();
        let chunks = chunker.split(&text);

        let mut rebuilt = chunks[0].content.clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.content.chars().skip(chunker.overlap()));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_split_multibyte_characters() {
        let text = "これは日本語のテストです。".repeat(100);
        let chunks = Chunker::new(100, 20).unwrap().split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.content.chars().count(), 100);
        }
    }

    #[test]
    fn test_zero_overlap() {
        let chunks = Chunker::new(4, 0).unwrap().split("abcdefghij");
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcd", "efgh", "ij"]);
    }
}
