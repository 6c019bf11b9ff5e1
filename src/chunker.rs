use crate::{
    error::{Error, Result},
    scorer::Candidate,
};
use tracing::debug;

/// Default window size in words.
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Default number of words shared by consecutive windows.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// A contiguous window of words taken from a longer document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Sequential chunk index (0-based)
    pub index: usize,

    /// Words of the window joined by single spaces
    pub text: String,

    /// Number of words in the window
    pub word_count: usize,
}

impl Chunk {
    /// Returns the label used when this chunk competes as a candidate.
    #[must_use]
    pub fn label(&self) -> String {
        format!("chunk-{}", self.index + 1)
    }

    /// Converts the chunk into a selection candidate.
    #[must_use]
    pub fn into_candidate(self) -> Candidate {
        Candidate::new(self.label(), self.text)
    }
}

/// Splits documents into fixed-size, overlapping word windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Chunker {
    /// Creates a chunker with the given window size and overlap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChunkConfiguration`] unless `chunk_size > overlap`,
    /// since the window start would otherwise never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size <= overlap {
            return Err(Error::invalid_chunk_configuration(chunk_size, overlap));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Returns the window size in words.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the overlap in words.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Number of words the window start advances between chunks.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Returns a lazy iterator over the chunks of `text`.
    ///
    /// Each call starts again from the first word.
    #[must_use]
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            words: text.split_whitespace().collect(),
            chunk_size: self.chunk_size,
            stride: self.stride(),
            start: 0,
            index: 0,
        }
    }

    /// Collects every chunk of `text`.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = self.chunks(text).collect();
        debug!(
            "Split document into {} chunks (size={}, overlap={})",
            chunks.len(),
            self.chunk_size,
            self.overlap
        );
        chunks
    }
}

/// Iterator over the windows of a document, created by [`Chunker::chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    words: Vec<&'a str>,
    chunk_size: usize,
    stride: usize,
    start: usize,
    index: usize,
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start >= self.words.len() {
            return None;
        }

        let end = self.start.saturating_add(self.chunk_size).min(self.words.len());
        let window = &self.words[self.start..end];
        let chunk = Chunk {
            index: self.index,
            text: window.join(" "),
            word_count: window.len(),
        };

        self.start += self.stride;
        self.index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .words
            .len()
            .saturating_sub(self.start)
            .div_ceil(self.stride);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

/// Splits `text` into overlapping windows of `chunk_size` words.
///
/// # Errors
///
/// Returns [`Error::InvalidChunkConfiguration`] if `chunk_size <= overlap`.
///
/// # Examples
///
/// ```
/// use llm_assist::chunk;
///
/// let chunks = chunk("a b c d e", 3, 1)?;
/// let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, ["a b c", "c d e", "e"]);
/// # Ok::<(), llm_assist::Error>(())
/// ```
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(Chunker::new(chunk_size, overlap)?.split(text))
}
