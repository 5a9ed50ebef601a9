//! Script chunking for speech synthesis.
//!
//! The speech endpoint caps the length of a single request, so a script is
//! split into chunks that break only at paragraph boundaries. Paragraphs are
//! packed greedily; a paragraph that is longer than the limit on its own is
//! emitted as a single oversized chunk rather than being cut mid-paragraph.

use serde::{Deserialize, Serialize};

/// Separator placed between paragraphs inside a chunk.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// A piece of the script sent to speech synthesis in one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptChunk {
    /// Position of this chunk in the script.
    pub order: usize,
    /// Text of the chunk, paragraphs joined by a blank line.
    pub text: String,
}

impl ScriptChunk {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Paragraph-aligned chunker.
#[derive(Debug, Clone, Copy)]
pub struct ScriptChunker {
    max_len: usize,
}

impl ScriptChunker {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Split `text` into ordered chunks.
    ///
    /// A paragraph joins the running chunk when
    /// `len(current) + len(paragraph) < max_len`, where `current` includes the
    /// separator after each paragraph already in it. Otherwise the running
    /// chunk is closed and the paragraph starts the next one.
    pub fn split(&self, text: &str) -> Vec<ScriptChunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for paragraph in paragraphs(text) {
            let paragraph_len = paragraph.chars().count();

            if current_len + paragraph_len >= self.max_len && !current.is_empty() {
                push_chunk(&mut chunks, &current);
                current.clear();
                current_len = 0;
            }

            current.push_str(&paragraph);
            current.push_str(PARAGRAPH_SEPARATOR);
            current_len += paragraph_len + PARAGRAPH_SEPARATOR.len();
        }

        if !current.is_empty() {
            push_chunk(&mut chunks, &current);
        }

        chunks
    }
}

fn push_chunk(chunks: &mut Vec<ScriptChunk>, text: &str) {
    chunks.push(ScriptChunk {
        order: chunks.len(),
        text: text.trim_end().to_string(),
    });
}

/// Split `text` into chunks of at most `max_len` characters (see [`ScriptChunker::split`]).
pub fn split_script(text: &str, max_len: usize) -> Vec<String> {
    ScriptChunker::new(max_len)
        .split(text)
        .into_iter()
        .map(|c| c.text)
        .collect()
}

/// Split text into paragraphs on blank lines.
///
/// Lines inside a paragraph keep their single newlines; lines are trimmed of
/// trailing whitespace and empty paragraphs are dropped.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !lines.is_empty() {
                result.push(lines.join("\n"));
                lines.clear();
            }
        } else {
            lines.push(line.trim_end());
        }
    }

    if !lines.is_empty() {
        result.push(lines.join("\n"));
    }

    result
}
