//! The book catalog: a multiway tree ordered by isbn, plus hash indexes by isbn and by name
//!
//! The isbn index owns the records, the tree holds the isbns in order, and the name index maps each
//! name to the isbn of the record carrying it. Every mutation updates all three or none of them.
use crate::{
    book::{Book, BookPatch},
    tree::Tree,
};
use fnv::FnvHashMap;
use smol_str::SmolStr;
use tracing::*;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tree: Tree<SmolStr>,
    by_isbn: FnvHashMap<SmolStr, Book>,
    by_name: FnvHashMap<String, SmolStr>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// number of books
    pub fn len(&self) -> usize {
        self.by_isbn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_isbn.is_empty()
    }

    /// the isbn tree, for inspection
    pub fn tree(&self) -> &Tree<SmolStr> {
        &self.tree
    }

    /// Inserts a book, unless its isbn or its name is already taken.
    ///
    /// Returns false if the book was ignored.
    pub fn insert(&mut self, book: Book) -> bool {
        if !book.has_keys() {
            debug!("ignoring book without isbn or name");
            return false;
        }
        if self.by_name.contains_key(&book.name) {
            debug!("ignoring {}, name {:?} is taken", book.isbn, book.name);
            return false;
        }
        if self.by_isbn.contains_key(&book.isbn) {
            debug!("ignoring {}, isbn is taken", book.isbn);
            return false;
        }
        self.by_name.insert(book.name.clone(), book.isbn.clone());
        self.tree.insert(book.isbn.clone());
        self.by_isbn.insert(book.isbn.clone(), book);
        true
    }

    /// Applies the changes to the book with the given isbn.
    ///
    /// Returns false if there is no such book, or if the patch would give it an empty name or the
    /// name of another book. In that case nothing is changed. An empty patch only checks that the
    /// book exists.
    pub fn update(&mut self, isbn: &str, patch: &BookPatch) -> bool {
        let isbn = match self.tree.get(isbn) {
            Some(isbn) => isbn.clone(),
            None => return false,
        };
        let book = match self.by_isbn.get_mut(&isbn) {
            Some(book) => book,
            None => return false,
        };
        if patch.is_empty() {
            trace!("empty patch for {}", isbn);
            return true;
        }
        let old_name = match patch.renames(book) {
            Some(new_name) if new_name.is_empty() || self.by_name.contains_key(new_name) => {
                warn!("rejecting patch for {}, name {:?} not usable", isbn, new_name);
                return false;
            }
            Some(_) => Some(book.name.clone()),
            None => None,
        };
        patch.apply(book);
        if let Some(old_name) = old_name {
            self.by_name.remove(&old_name);
            self.by_name.insert(book.name.clone(), isbn);
        }
        true
    }

    /// Removes the book with the given isbn
    pub fn remove(&mut self, isbn: &str) -> Option<Book> {
        let book = self.by_isbn.remove(isbn);
        if let Some(book) = &book {
            self.by_name.remove(&book.name);
        }
        if !self.tree.remove(isbn) && book.is_some() {
            error!("{} was indexed but not in the tree", isbn);
        }
        book
    }

    pub fn find_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.by_isbn.get(isbn)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Book> {
        self.by_name
            .get(name)
            .and_then(|isbn| self.by_isbn.get(isbn))
    }

    /// all books in isbn order
    pub fn iter(&self) -> impl Iterator<Item = &Book> + '_ {
        self.tree
            .keys()
            .into_iter()
            .filter_map(move |isbn| self.by_isbn.get(isbn))
    }

    /// Checks that the tree is well formed and agrees with both indexes
    pub fn check_invariants(&self) -> Vec<String> {
        let mut msgs = self.tree.check_invariants();
        macro_rules! check {
            ($expression:expr) => {
                if !$expression {
                    let text = stringify!($expression);
                    msgs.push(text.to_owned());
                }
            };
        }
        let isbns = self.tree.keys();
        check!(isbns.len() == self.by_isbn.len());
        check!(self.by_name.len() == self.by_isbn.len());
        for isbn in isbns {
            match self.by_isbn.get(isbn) {
                Some(book) => {
                    check!(book.isbn == *isbn);
                    check!(self.by_name.get(&book.name) == Some(isbn));
                }
                None => msgs.push(format!("{} is not indexed by isbn", isbn)),
            }
        }
        msgs
    }

    pub fn assert_invariants(&self) {
        let msgs = self.check_invariants();
        if !msgs.is_empty() {
            let invariants = msgs.join(",");
            for msg in msgs {
                error!("Invariant failed: {}", msg);
            }
            panic!("assert_invariants failed {}", invariants);
        }
    }
}
