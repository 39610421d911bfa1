//! Comparing fixed width, Huffman and arithmetic encoding sizes of names
use crate::{arithmetic::ArithmeticCoder, error::Result, huffman};
use derive_more::Display;
use std::fmt;

/// bytes per symbol of the fixed width baseline
const FIXED_WIDTH: u64 = 2;

/// Encoded sizes of one name under the three schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeEstimate {
    /// fixed width size in bytes
    pub fixed: u64,
    /// Huffman size in bits, see [SizeEstimate::huffman_bytes]
    pub huffman_bits: u64,
    /// arithmetic coder output in bytes
    pub arithmetic: u64,
}

impl SizeEstimate {
    pub fn of(name: &str) -> Result<Self> {
        let fixed = name.chars().count() as u64 * FIXED_WIDTH;
        let huffman_bits = huffman::encoded_bits(name);
        let arithmetic = ArithmeticCoder::from_sample(name)?.compress(name)?.len() as u64;
        Ok(Self {
            fixed,
            huffman_bits,
            arithmetic,
        })
    }

    /// Huffman size rounded up to whole bytes
    pub fn huffman_bytes(&self) -> u64 {
        (self.huffman_bits + 7) / 8
    }

    pub fn is_equal(&self) -> bool {
        self.fixed == self.huffman_bytes() && self.fixed == self.arithmetic
    }

    pub fn is_all_smaller(&self) -> bool {
        self.fixed < self.huffman_bytes() && self.fixed < self.arithmetic
    }

    pub fn is_huffman_best(&self) -> bool {
        self.huffman_bytes() < self.fixed && self.huffman_bytes() < self.arithmetic
    }

    pub fn is_arithmetic_best(&self) -> bool {
        self.arithmetic < self.fixed && self.arithmetic < self.huffman_bytes()
    }

    pub fn is_tie(&self) -> bool {
        self.huffman_bytes() == self.arithmetic
    }

    /// The one exclusive outcome that applies, if any
    pub fn category(&self) -> Option<Category> {
        [
            (self.is_equal(), Category::Equal),
            (self.is_all_smaller(), Category::AllSmaller),
            (self.is_huffman_best(), Category::HuffmanBest),
            (self.is_arithmetic_best(), Category::ArithmeticBest),
        ]
        .iter()
        .find(|(applies, _)| *applies)
        .map(|(_, category)| *category)
    }
}

/// Mutually exclusive outcomes of a comparison
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// all three sizes are the same
    Equal,
    /// the fixed width encoding beats both others
    AllSmaller,
    HuffmanBest,
    ArithmeticBest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub estimate: SizeEstimate,
    pub category: Option<Category>,
    /// Huffman and arithmetic sizes are the same. Independent of the category.
    pub tie: bool,
}

impl From<SizeEstimate> for Classification {
    fn from(estimate: SizeEstimate) -> Self {
        Self {
            estimate,
            category: estimate.category(),
            tie: estimate.is_tie(),
        }
    }
}

/// Outcome counters for one batch of classifications
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub equal: u64,
    pub all_smaller: u64,
    pub huffman_best: u64,
    pub arithmetic_best: u64,
    pub tie: u64,
}

impl Tally {
    pub fn record(&mut self, classification: &Classification) {
        match classification.category {
            Some(Category::Equal) => self.equal += 1,
            Some(Category::AllSmaller) => self.all_smaller += 1,
            Some(Category::HuffmanBest) => self.huffman_best += 1,
            Some(Category::ArithmeticBest) => self.arithmetic_best += 1,
            None => {}
        }
        if classification.tie {
            self.tie += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Equal: {}", self.equal)?;
        writeln!(f, "Decompress: {}", self.all_smaller)?;
        writeln!(f, "Huffman: {}", self.huffman_best)?;
        writeln!(f, "Arithmetic: {}", self.arithmetic_best)?;
        writeln!(f, "Tie: {}", self.tie)
    }
}

/// Classifies names and keeps a running [Tally]
#[derive(Debug, Default)]
pub struct Classifier {
    tally: Tally,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, name: &str) -> Result<Classification> {
        let classification = Classification::from(SizeEstimate::of(name)?);
        tracing::debug!("{:?} -> {:?}", name, classification);
        self.tally.record(&classification);
        Ok(classification)
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// clears the counters for the next batch
    pub fn reset(&mut self) {
        self.tally.reset();
    }
}
