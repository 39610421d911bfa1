//! Book records and field changes
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A book record. `isbn` is the primary key, `name` a secondary unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: SmolStr,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub quantity: String,
}

impl Book {
    pub fn new(isbn: impl Into<SmolStr>, name: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            name: name.into(),
            author: String::new(),
            price: String::new(),
            quantity: String::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = quantity.into();
        self
    }

    /// both keys are present
    pub fn has_keys(&self) -> bool {
        !self.isbn.is_empty() && !self.name.is_empty()
    }
}

/// Changes to apply to a stored book. The isbn can not be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
}

impl BookPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.author.is_none() && self.price.is_none() && self.quantity.is_none()
    }

    /// the new name, if it differs from the current one
    pub fn renames(&self, book: &Book) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| *name != book.name.as_str())
    }

    pub(crate) fn apply(&self, book: &mut Book) {
        let fields = [
            (&self.name, &mut book.name),
            (&self.author, &mut book.author),
            (&self.price, &mut book.price),
            (&self.quantity, &mut book.quantity),
        ];
        for (change, field) in fields {
            if let Some(value) = change {
                field.clone_from(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_applies_only_present_fields() {
        let mut book = Book::new("1", "Dune").with_author("Herbert").with_price("10");
        let patch = BookPatch {
            price: Some("12".into()),
            quantity: Some("3".into()),
            ..Default::default()
        };
        patch.apply(&mut book);
        assert_eq!(
            book,
            Book::new("1", "Dune")
                .with_author("Herbert")
                .with_price("12")
                .with_quantity("3")
        );
        assert_eq!(patch.renames(&book), None);
        assert_eq!(BookPatch::name("Dune").renames(&book), None);
        assert_eq!(BookPatch::name("Emma").renames(&book), Some("Emma"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let book: Book = serde_json::from_str(r#"{"isbn":"42","name":"Ulysses","extra":1}"#).unwrap();
        assert_eq!(book, Book::new("42", "Ulysses"));
        assert!(book.has_keys());
        let patch: BookPatch = serde_json::from_str(r#"{"author":"Joyce"}"#).unwrap();
        assert_eq!(patch.author.as_deref(), Some("Joyce"));
        assert!(!patch.is_empty());
    }
}
