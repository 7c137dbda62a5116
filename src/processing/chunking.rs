//! Section-aware chunking with paragraph-packing fallback.
//!
//! Two policies share one packing rule:
//!
//! - Boundary path: when the segmenter found more than one boundary but fewer than
//!   `max_sections`, each span between consecutive boundaries becomes a chunk. Spans longer
//!   than 1.5x the target size are re-split by packing their paragraphs.
//! - Fallback path: otherwise the whole text is packed paragraph by paragraph.
//!
//! Packing treats a paragraph together with its trailing blank-line separator as one piece,
//! so emitted chunks are exact substrings of the source and concatenate back to it. A piece is
//! appended to the open chunk while the chunk stays within the target size; a single piece
//! larger than the target is emitted whole. Sizes are measured in characters.

use std::ops::Range;

use super::types::{Chunk, ChunkingError};

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Size and policy knobs for [`create_chunks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    /// Target chunk size in characters.
    pub target_size: usize,
    /// Exclusive upper bound on the boundary count accepted by the boundary path.
    pub max_sections: usize,
}

/// Which policy produced a chunk list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkingPath {
    /// Chunks follow detected section boundaries.
    Boundaries,
    /// Chunks come from packing paragraphs across the whole text.
    Paragraphs,
}

/// Choose the chunking policy for a boundary list.
pub fn select_path(boundary_count: usize, max_sections: usize) -> ChunkingPath {
    if boundary_count > 1 && boundary_count < max_sections {
        ChunkingPath::Boundaries
    } else {
        ChunkingPath::Paragraphs
    }
}

/// Split `text` into ordered chunks using the segmenter's `boundaries`.
///
/// `boundaries` must be strictly increasing, start at `0`, and lie on character boundaries,
/// as produced by [`super::segment::detect_section_boundaries`]. Empty text yields a single
/// empty chunk.
pub fn create_chunks(
    text: &str,
    boundaries: &[usize],
    options: &ChunkingOptions,
) -> Result<Vec<Chunk>, ChunkingError> {
    if options.target_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if text.is_empty() {
        return Ok(vec![Chunk {
            index: 0,
            offset: 0,
            text: String::new(),
        }]);
    }

    let path = select_path(boundaries.len(), options.max_sections);
    let spans = match path {
        ChunkingPath::Boundaries => split_on_boundaries(text, boundaries, options.target_size),
        ChunkingPath::Paragraphs => pack_paragraphs(text, 0..text.len(), options.target_size),
    };

    tracing::debug!(
        ?path,
        boundaries = boundaries.len(),
        chunks = spans.len(),
        target_size = options.target_size,
        "Chunked document"
    );

    Ok(spans
        .into_iter()
        .enumerate()
        .map(|(index, span)| Chunk {
            index,
            offset: span.start,
            text: text[span].to_string(),
        })
        .collect())
}

fn split_on_boundaries(
    text: &str,
    boundaries: &[usize],
    target_size: usize,
) -> Vec<Range<usize>> {
    let resplit_threshold = target_size.saturating_mul(3) / 2;
    let mut spans = Vec::new();

    for (position, &start) in boundaries.iter().enumerate() {
        let end = boundaries
            .get(position + 1)
            .copied()
            .unwrap_or(text.len())
            .min(text.len());
        if start >= end {
            continue;
        }
        let section = start..end;
        if char_len(text, &section) > resplit_threshold {
            spans.extend(pack_paragraphs(text, section, target_size));
        } else {
            spans.push(section);
        }
    }

    spans
}

/// Greedily pack the paragraphs of `text[span]` into sub-spans of at most `target_size`
/// characters, except where one paragraph alone is larger.
fn pack_paragraphs(text: &str, span: Range<usize>, target_size: usize) -> Vec<Range<usize>> {
    let mut packed = Vec::new();
    let mut current: Option<(Range<usize>, usize)> = None;

    for piece in paragraph_pieces(text, span) {
        let piece_len = char_len(text, &piece);
        current = match current.take() {
            None => Some((piece, piece_len)),
            Some((open, open_len)) if open_len + piece_len <= target_size => {
                Some((open.start..piece.end, open_len + piece_len))
            }
            Some((open, _)) => {
                packed.push(open);
                Some((piece, piece_len))
            }
        };
    }

    if let Some((open, _)) = current {
        packed.push(open);
    }
    packed
}

/// Paragraph spans within `span`, each including its trailing separator when present.
fn paragraph_pieces(text: &str, span: Range<usize>) -> Vec<Range<usize>> {
    let slice = &text[span.clone()];
    let mut pieces = Vec::new();
    let mut start = 0;

    for (found, _) in slice.match_indices(PARAGRAPH_SEPARATOR) {
        let end = found + PARAGRAPH_SEPARATOR.len();
        pieces.push(span.start + start..span.start + end);
        start = end;
    }
    if start < slice.len() {
        pieces.push(span.start + start..span.end);
    }
    pieces
}

fn char_len(text: &str, span: &Range<usize>) -> usize {
    text[span.clone()].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::segment::detect_section_boundaries;

    fn options(target_size: usize) -> ChunkingOptions {
        ChunkingOptions {
            target_size,
            max_sections: 30,
        }
    }

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|chunk| chunk.text.as_str()).collect()
    }

    fn assert_covers(text: &str, chunks: &[Chunk]) {
        let joined: String = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        assert_eq!(joined, text);
        for (position, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, position);
            assert_eq!(&text[chunk.offset..chunk.offset + chunk.text.len()], chunk.text);
        }
    }

    #[test]
    fn rejects_zero_target_size() {
        let error = create_chunks("text", &[0], &options(0)).unwrap_err();
        assert!(matches!(error, ChunkingError::InvalidChunkSize));
    }

    #[test]
    fn empty_text_yields_single_empty_chunk() {
        let chunks = create_chunks("", &[0], &options(10)).expect("chunks");
        assert_eq!(texts(&chunks), vec![""]);
    }

    #[test]
    fn path_selection_respects_range() {
        assert_eq!(select_path(0, 30), ChunkingPath::Paragraphs);
        assert_eq!(select_path(1, 30), ChunkingPath::Paragraphs);
        assert_eq!(select_path(2, 30), ChunkingPath::Boundaries);
        assert_eq!(select_path(29, 30), ChunkingPath::Boundaries);
        assert_eq!(select_path(30, 30), ChunkingPath::Paragraphs);
    }

    #[test]
    fn two_small_paragraphs_pack_into_one_chunk() {
        let text = "alpha beta\n\ngamma delta";
        let chunks = create_chunks(text, &[0], &options(100)).expect("chunks");
        assert_eq!(texts(&chunks), vec![text]);
    }

    #[test]
    fn two_paragraphs_over_target_split_in_two() {
        let text = "alpha beta\n\ngamma delta";
        let chunks = create_chunks(text, &[0], &options(15)).expect("chunks");
        assert_eq!(texts(&chunks), vec!["alpha beta\n\n", "gamma delta"]);
        assert_covers(text, &chunks);
    }

    #[test]
    fn oversized_paragraph_is_emitted_whole() {
        let big = "x".repeat(50);
        let text = format!("short\n\n{big}\n\ntail");
        let chunks = create_chunks(&text, &[0], &options(10)).expect("chunks");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].text, format!("{big}\n\n"));
        assert_covers(&text, &chunks);
    }

    #[test]
    fn boundary_path_splits_between_boundaries() {
        let text = "Preface\nSECTION 1: Scope of work\nSECTION 2: Payment terms";
        let boundaries = detect_section_boundaries(text);
        assert_eq!(boundaries.len(), 3);
        let chunks = create_chunks(text, &boundaries, &options(1000)).expect("chunks");
        assert_eq!(
            texts(&chunks),
            vec!["Preface", "\nSECTION 1: Scope of work", "\nSECTION 2: Payment terms"]
        );
        assert_covers(text, &chunks);
        assert!(chunks.windows(2).all(|pair| pair[0].offset < pair[1].offset));
    }

    #[test]
    fn boundary_path_resplits_only_oversized_sections() {
        let paragraph = "word ".repeat(4);
        let long_section = [paragraph.as_str(); 6].join("\n\n");
        let text = format!("intro\nSection 1: Long\n\n{long_section}\nSection 2: Short");
        let boundaries = detect_section_boundaries(&text);
        assert_eq!(boundaries.len(), 3);

        let target = 30;
        let chunks = create_chunks(&text, &boundaries, &options(target)).expect("chunks");
        assert_covers(&text, &chunks);
        assert_eq!(chunks.first().map(|chunk| chunk.text.as_str()), Some("intro"));
        assert_eq!(
            chunks.last().map(|chunk| chunk.text.as_str()),
            Some("\nSection 2: Short")
        );
        assert!(chunks.len() > 3);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= target);
        }
    }

    #[test]
    fn section_within_tolerance_is_not_resplit() {
        let text = "intro\nSection 1: Body\n\nmore body text";
        let boundaries = detect_section_boundaries(text);
        // Second section is 32 chars: above a target of 25 but within 1.5x of it.
        let chunks = create_chunks(text, &boundaries, &options(25)).expect("chunks");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text, "\nSection 1: Body\n\nmore body text");
    }

    #[test]
    fn too_many_boundaries_fall_back_to_paragraphs() {
        let text = "a\n\nb\n\nc";
        let boundaries = vec![0, 1, 2, 3, 4];
        let options = ChunkingOptions {
            target_size: 100,
            max_sections: 5,
        };
        let chunks = create_chunks(text, &boundaries, &options).expect("chunks");
        assert_eq!(texts(&chunks), vec![text]);
    }

    #[test]
    fn near_duplicate_boundaries_yield_short_chunks() {
        let text = "abc\ndef";
        let chunks = create_chunks(text, &[0, 3, 4], &options(100)).expect("chunks");
        assert_eq!(texts(&chunks), vec!["abc", "\n", "def"]);
    }

    #[test]
    fn packing_counts_characters_not_bytes() {
        let text = "ééééé\n\nüüüüü";
        // 7 + 5 chars, but 12 + 10 bytes.
        let chunks = create_chunks(text, &[0], &options(7)).expect("chunks");
        assert_eq!(texts(&chunks), vec!["ééééé\n\n", "üüüüü"]);
        let joined = create_chunks(text, &[0], &options(12)).expect("chunks");
        assert_eq!(texts(&joined), vec![text]);
    }
}
