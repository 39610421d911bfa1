#![allow(dead_code)]
//! helper methods for the tests
use libris::{Book, BookPatch, Catalog};
use quickcheck::{Arbitrary, Gen};
use std::collections::BTreeMap;

/// isbns and names are drawn from small ranges so that collisions are frequent
const KEY_SPACE: u8 = 48;

pub fn isbn(i: u8) -> String {
    format!("978-{:04}", i)
}

pub fn name(i: u8) -> String {
    format!("book number {}", i)
}

pub fn book(isbn_nr: u8, name_nr: u8) -> Book {
    Book::new(isbn(isbn_nr), name(name_nr))
        .with_author("someone")
        .with_price(format!("{}.99", isbn_nr))
        .with_quantity("1")
}

/// A single catalog operation
#[derive(Debug, Clone)]
pub enum Op {
    Insert { isbn: u8, name: u8 },
    Patch { isbn: u8, name: Option<u8>, price: u8 },
    Delete { isbn: u8 },
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let isbn = u8::arbitrary(g) % KEY_SPACE;
        match u8::arbitrary(g) % 4 {
            0 | 1 => Op::Insert {
                isbn,
                name: u8::arbitrary(g) % KEY_SPACE,
            },
            2 => Op::Patch {
                isbn,
                name: Option::<u8>::arbitrary(g).map(|n| n % KEY_SPACE),
                price: u8::arbitrary(g),
            },
            _ => Op::Delete { isbn },
        }
    }
}

impl Op {
    pub fn apply(&self, catalog: &mut Catalog) {
        match self {
            Op::Insert { isbn, name } => {
                catalog.insert(book(*isbn, *name));
            }
            Op::Patch { isbn, name, price } => {
                catalog.update(&self::isbn(*isbn), &patch(*name, *price));
            }
            Op::Delete { isbn } => {
                catalog.remove(&self::isbn(*isbn));
            }
        }
    }
}

pub fn patch(name_nr: Option<u8>, price: u8) -> BookPatch {
    BookPatch {
        name: name_nr.map(name),
        price: Some(price.to_string()),
        ..Default::default()
    }
}

/// The obvious implementation of a catalog, to compare against
#[derive(Debug, Default)]
pub struct Reference(BTreeMap<String, Book>);

impl Reference {
    fn name_taken(&self, name: &str) -> bool {
        self.0.values().any(|b| b.name == name)
    }

    pub fn apply(&mut self, op: &Op) {
        match op {
            Op::Insert { isbn: i, name: n } => {
                let b = book(*i, *n);
                if !self.0.contains_key(&isbn(*i)) && !self.name_taken(&b.name) {
                    self.0.insert(isbn(*i), b);
                }
            }
            Op::Patch {
                isbn: i,
                name: n,
                price,
            } => {
                let new_name = n.map(name);
                let taken = match (&new_name, self.0.get(&isbn(*i))) {
                    (Some(new_name), Some(b)) => *new_name != b.name && self.name_taken(new_name),
                    _ => false,
                };
                if taken {
                    return;
                }
                if let Some(b) = self.0.get_mut(&isbn(*i)) {
                    if let Some(new_name) = new_name {
                        b.name = new_name;
                    }
                    b.price = price.to_string();
                }
            }
            Op::Delete { isbn: i } => {
                self.0.remove(&isbn(*i));
            }
        }
    }

    pub fn books(&self) -> Vec<&Book> {
        self.0.values().collect()
    }
}

/// installs a subscriber that honours `RUST_LOG`, once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
