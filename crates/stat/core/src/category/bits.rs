//! Resizable bit vector backing [`CategoryFlagSet`](super::CategoryFlagSet).
//!
//! Category domains may grow past any native integer width, so flags are kept
//! in a `Vec<u64>` sized to the domain rather than a fixed bit mask.

const WORD_BITS: usize = u64::BITS as usize;

/// Growable vector of bits packed into 64-bit words.
///
/// Bits past `len` are always zero, so whole-word comparisons are exact.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// Create a vector of `len` cleared bits.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read a bit. Indices past the end read as `false`.
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|word| (word >> (index % WORD_BITS)) & 1 == 1)
    }

    /// Write a bit. Returns `false` (and does nothing) if `index` is out of range.
    pub fn set(&mut self, index: usize, value: bool) -> bool {
        if index >= self.len {
            return false;
        }
        let Some(word) = self.words.get_mut(index / WORD_BITS) else {
            return false;
        };
        let mask = 1u64 << (index % WORD_BITS);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        true
    }

    /// Change the length, clearing any bits that fall off the end.
    pub fn resize(&mut self, len: usize) {
        self.words.resize(len.div_ceil(WORD_BITS), 0);
        self.len = len;
        let tail = len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    /// Clear every bit, keeping the length.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn any(&self) -> bool {
        self.words.iter().any(|&word| word != 0)
    }

    /// Iterate the indices of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                SetBits { word }.map(move |bit| word_index * WORD_BITS + bit)
            })
    }

    /// Returns true if every bit set in `self` is also set in `other`,
    /// ignoring the bit at `skip`.
    pub fn is_subset_except(&self, other: &Self, skip: usize) -> bool {
        self.words.iter().enumerate().all(|(index, &word)| {
            let mut word = word;
            if index == skip / WORD_BITS {
                word &= !(1u64 << (skip % WORD_BITS));
            }
            let theirs = other.words.get(index).copied().unwrap_or(0);
            word & !theirs == 0
        })
    }

    /// Render as one `'1'`/`'0'` character per bit.
    pub fn to_bit_string(&self) -> String {
        (0..self.len)
            .map(|index| if self.get(index) { '1' } else { '0' })
            .collect()
    }
}

/// Iterator over the set bit positions of a single word.
struct SetBits {
    word: u64,
}

impl Iterator for SetBits {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let bit = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1;
        Some(bit)
    }
}
