//! Sliding-window text chunking with overlap.
//!
//! Break points prefer paragraph breaks, then sentence ends (both CJK and
//! latin punctuation, since the QA tool sees documents in either), then
//! clause marks and whitespace.

use uuid::Uuid;

use crate::config::ChunkingConfig;

#[derive(Debug, Clone)]
pub struct ChunkResult {
    pub id: Uuid,
    pub text: String,
    pub index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_size: usize,
}

// Highest-priority separator first. The empty-suffix fallback is the raw
// window edge snapped to a char boundary.
const BREAKS: &[&str] = &["\n\n", "。", "！", "？", ". ", ".\n", "\n", "，", "、", " "];

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize, min_chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            min_chunk_size,
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, config.min_chunk_size)
    }

    pub fn chunk(&self, text: &str) -> Vec<ChunkResult> {
        if text.len() <= self.chunk_size {
            if text.len() < self.min_chunk_size {
                return Vec::new();
            }
            return vec![ChunkResult {
                id: Uuid::new_v4(),
                text: text.to_string(),
                index: 0,
                start_offset: 0,
                end_offset: text.len(),
            }];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut index = 0;

        while start < text.len() {
            let raw_end = (start + self.chunk_size).min(text.len());
            let end = snap_to_char_boundary(text, raw_end);

            let actual_end = if end < text.len() {
                self.find_break_point(text, start, end)
            } else {
                end
            };

            let chunk_text = &text[start..actual_end];
            if chunk_text.len() >= self.min_chunk_size {
                chunks.push(ChunkResult {
                    id: Uuid::new_v4(),
                    text: chunk_text.to_string(),
                    index,
                    start_offset: start,
                    end_offset: actual_end,
                });
                index += 1;
            }

            // Move forward with overlap
            let step = if actual_end - start > self.chunk_overlap {
                actual_end - start - self.chunk_overlap
            } else {
                actual_end - start
            };
            let mut next = snap_to_char_boundary(text, start + step);
            if next <= start {
                // A break point inside the overlap plus downward snapping
                // can land back on the window start; force at least one
                // char of progress.
                next = next_char_boundary(text, start + 1);
            }
            start = next;
            if start >= text.len() {
                break;
            }
        }

        chunks
    }

    fn find_break_point(&self, text: &str, start: usize, preferred_end: usize) -> usize {
        let raw_search_start = if preferred_end > 200 {
            preferred_end - 200
        } else {
            start
        };
        let search_start = snap_to_char_boundary(text, raw_search_start.max(start));
        let safe_end = snap_to_char_boundary(text, preferred_end);

        if search_start >= safe_end {
            return safe_end;
        }

        let search_region = &text[search_start..safe_end];
        for sep in BREAKS {
            if let Some(pos) = search_region.rfind(sep) {
                return search_start + pos + sep.len();
            }
        }

        safe_end
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(1000, 50, 20)
    }
}

/// Snap a byte offset up to the next valid UTF-8 char boundary.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos;
    while p < text.len() && !text.is_char_boundary(p) {
        p += 1;
    }
    p
}

/// Snap a byte offset to the nearest valid UTF-8 char boundary (rounding down).
fn snap_to_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos;
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunker = TextChunker::default();
        let chunks = chunker.chunk("A short paragraph about nothing in particular.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn tiny_text_below_minimum_is_dropped() {
        let chunker = TextChunker::default();
        assert!(chunker.chunk("hi").is_empty());
    }

    #[test]
    fn long_text_is_split_with_overlap() {
        let chunker = TextChunker::new(100, 20, 10);
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let text = sentence.repeat(10);

        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 100);
        }
        // Consecutive windows overlap
        assert!(chunks[1].start_offset < chunks[0].end_offset);
    }

    #[test]
    fn breaks_prefer_sentence_ends() {
        let chunker = TextChunker::new(60, 10, 5);
        let text = "First sentence here. Second sentence follows on and on and on past the window.";
        let chunks = chunker.chunk(text);
        assert!(chunks[0].text.ends_with(". "));
    }

    #[test]
    fn cjk_text_splits_on_char_boundaries() {
        let chunker = TextChunker::new(100, 10, 5);
        let text = "这是一段用于测试的中文文本。".repeat(10);
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // Would panic inside chunk() on a bad boundary; double-check here
            assert!(chunk.text.is_char_boundary(0));
            assert!(!chunk.text.is_empty());
        }
    }

    #[test]
    fn cjk_breaks_prefer_full_stop() {
        let chunker = TextChunker::new(100, 10, 5);
        let text = "这是一段用于测试的中文文本。".repeat(10);
        let chunks = chunker.chunk(&text);
        assert!(chunks[0].text.ends_with('。'));
    }

    #[test]
    fn break_point_inside_overlap_still_advances() {
        // A separator just past the overlap used to snap the next window
        // back onto the same multi-byte start and re-scan it forever
        let chunker = TextChunker::new(80, 10, 20);
        let text = format!("哈哈哈。{}", "哈".repeat(40));

        let chunks = chunker.chunk(&text);
        assert!(!chunks.is_empty());
        for pair in chunks.windows(2) {
            assert!(pair[1].start_offset > pair[0].start_offset);
        }
    }

    #[test]
    fn offsets_index_into_source() {
        let chunker = TextChunker::new(80, 10, 5);
        let text = "word ".repeat(60);
        for chunk in chunker.chunk(&text) {
            assert_eq!(&text[chunk.start_offset..chunk.end_offset], chunk.text);
        }
    }
}
