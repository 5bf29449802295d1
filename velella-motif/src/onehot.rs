//! One-hot sequence encoding over the fixed ACGT alphabet.
//!
//! A one-hot sequence is conceptually a 4 x L binary matrix with at most one
//! set bit per column; an all-zero column is an ignored base. [`OneHot`]
//! stores the equivalent compact form, one symbol index per position, and
//! materializes the matrix on demand.

use velella_core::{Result, VelellaError};

/// The fixed DNA alphabet, in index order (A=0, C=1, G=2, T=3).
pub const ALPHABET: [u8; 4] = *b"ACGT";

/// Default ignore set: bases encoded as all-zero columns.
pub const DEFAULT_IGNORE: &[u8] = b"N";

/// Map a base (any case) to its alphabet index.
pub(crate) fn base_index(b: u8) -> Option<usize> {
    match b.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// A one-hot encoded DNA sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHot {
    /// Symbol index per position; `None` is an ignored base.
    indices: Vec<Option<u8>>,
}

impl OneHot {
    /// Encode a sequence with the default ignore set (`N`).
    ///
    /// # Errors
    ///
    /// Returns an error on any symbol that is neither a base nor ignored.
    pub fn encode(seq: &[u8]) -> Result<Self> {
        Self::encode_with_ignore(seq, DEFAULT_IGNORE)
    }

    /// Encode a sequence; bytes in `ignore` produce all-zero columns.
    ///
    /// Input is case-insensitive for both the sequence and the ignore set.
    ///
    /// # Errors
    ///
    /// Returns an error if the ignore set overlaps the alphabet, or on any
    /// symbol that is neither a base nor ignored.
    pub fn encode_with_ignore(seq: &[u8], ignore: &[u8]) -> Result<Self> {
        let ignore: Vec<u8> = ignore.iter().map(|b| b.to_ascii_uppercase()).collect();
        for &b in &ignore {
            if base_index(b).is_some() {
                return Err(VelellaError::InvalidInput(format!(
                    "OneHot: ignore set overlaps alphabet at '{}'",
                    b as char
                )));
            }
        }

        let mut indices = Vec::with_capacity(seq.len());
        for (pos, &b) in seq.iter().enumerate() {
            if let Some(idx) = base_index(b) {
                indices.push(Some(idx as u8));
            } else if ignore.contains(&b.to_ascii_uppercase()) {
                indices.push(None);
            } else {
                return Err(VelellaError::InvalidInput(format!(
                    "OneHot: invalid symbol '{}' at position {}",
                    b as char, pos
                )));
            }
        }
        Ok(Self { indices })
    }

    /// Sequence length (number of columns).
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Index of the set row in column `pos`, or `None` for an ignored base.
    #[inline]
    pub fn symbol_index(&self, pos: usize) -> Option<usize> {
        self.indices[pos].map(usize::from)
    }

    /// Materialize the binary matrix, one `[A, C, G, T]` column per
    /// position.
    pub fn columns(&self) -> Vec<[u8; 4]> {
        self.indices
            .iter()
            .map(|idx| {
                let mut col = [0u8; 4];
                if let Some(i) = idx {
                    col[usize::from(*i)] = 1;
                }
                col
            })
            .collect()
    }

    /// Reverse complement: reverses column order and swaps A/T and C/G.
    /// Ignored columns stay ignored.
    pub fn reverse_complement(&self) -> Self {
        let indices = self
            .indices
            .iter()
            .rev()
            .map(|idx| idx.map(|i| 3 - i))
            .collect();
        Self { indices }
    }

    /// Decode back to text; ignored columns render as `N`.
    pub fn characters(&self) -> String {
        self.indices
            .iter()
            .map(|idx| match idx {
                Some(i) => ALPHABET[usize::from(*i)] as char,
                None => 'N',
            })
            .collect()
    }
}
