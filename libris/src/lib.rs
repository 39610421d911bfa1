//! # Libris
//!
//! An in-memory catalog of book records, and a small laboratory for comparing how compactly the
//! names of those books can be encoded.
//!
//! ## Catalog
//!
//! Books are kept in a multiway search tree ordered by isbn, with at most four keys per node. The
//! tree is rebalanced top-down: an insert splits every full node on its way down, and a remove
//! refills every underfull node on its way down by borrowing a key from a sibling or by merging with
//! one. Both operations therefore finish in a single pass from the root to a leaf.
//!
//! Besides the tree, the [Catalog] keeps two hash indexes, one by isbn and one by name. Both keys
//! are unique: inserting a book whose isbn or name is already taken does nothing.
//!
//! ## Size estimation
//!
//! For a given name, three encodings are compared:
//!
//! - a fixed width encoding with two bytes per symbol,
//! - a static [Huffman] code built from the name's own symbol frequencies,
//! - an [arithmetic coder] with 16 bit integer registers, again using the name's own frequencies
//!   as the model.
//!
//! The [Classifier] decides which encoding is smallest and counts the outcomes over a batch.
//!
//! [Catalog]: catalog::Catalog
//! [Classifier]: classify::Classifier
//! [Huffman]: https://en.wikipedia.org/wiki/Huffman_coding
//! [arithmetic coder]: https://en.wikipedia.org/wiki/Arithmetic_coding
pub mod arithmetic;
pub mod book;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod huffman;
pub mod tree;
mod util;

pub use arithmetic::{ArithmeticCoder, Interval, Model};
pub use book::{Book, BookPatch};
pub use catalog::Catalog;
pub use classify::{Category, Classification, Classifier, SizeEstimate, Tally};
pub use error::{Error, Result};
pub use tree::{Tree, MAX_KEYS, MIN_KEYS};
pub use util::frequencies;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
