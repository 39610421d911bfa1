//! Answering name queries and writing the size report
use crate::{
    error::{Error, Result},
    ingest::split_line,
};
use libris::{Book, Catalog, Classification, Classifier, Tally};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tracing::*;

#[derive(Deserialize)]
struct Query {
    name: String,
}

/// Extracts the queried name from a `LABEL;{json}` line. The label is not interpreted.
pub fn parse_query(line: &str) -> Result<String> {
    let (_, json) = split_line(line)?;
    let Query { name } = serde_json::from_str(json)?;
    Ok(name)
}

/// One line of the report, all values as strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine<'a> {
    pub isbn: &'a str,
    pub name: &'a str,
    pub author: &'a str,
    pub price: &'a str,
    pub quantity: &'a str,
    #[serde(rename = "namesize")]
    pub fixed: String,
    /// raw bit count, not rounded to bytes
    #[serde(rename = "namesizeHuffman")]
    pub huffman_bits: String,
    #[serde(rename = "namesizearithmetic")]
    pub arithmetic: String,
}

impl<'a> ReportLine<'a> {
    pub fn new(book: &'a Book, classification: &Classification) -> Self {
        let estimate = &classification.estimate;
        Self {
            isbn: &book.isbn,
            name: &book.name,
            author: &book.author,
            price: &book.price,
            quantity: &book.quantity,
            fixed: estimate.fixed.to_string(),
            huffman_bits: estimate.huffman_bits.to_string(),
            arithmetic: estimate.arithmetic.to_string(),
        }
    }
}

/// Looks up one name and writes its report line, if the book exists
fn answer(
    name: &str,
    catalog: &Catalog,
    classifier: &mut Classifier,
    mut writer: impl Write,
) -> Result<bool> {
    let book = match catalog.find_by_name(name) {
        Some(book) => book,
        None => {
            debug!("no book named {:?}", name);
            return Ok(false);
        }
    };
    let classification = classifier.classify(&book.name)?;
    serde_json::to_writer(&mut writer, &ReportLine::new(book, &classification))?;
    writeln!(writer)?;
    Ok(true)
}

/// Answers every query of `reader` and writes the report, followed by the summary counters.
///
/// Malformed queries and names that can not be estimated are logged and skipped.
pub fn run_queries(
    reader: impl BufRead,
    catalog: &Catalog,
    classifier: &mut Classifier,
    mut writer: impl Write,
) -> Result<Tally> {
    classifier.reset();
    let mut found = 0u64;
    for (nr, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let name = match parse_query(&line) {
            Ok(name) => name,
            Err(cause) => {
                warn!("skipping query {}: {}", nr + 1, cause);
                continue;
            }
        };
        match answer(&name, catalog, classifier, &mut writer) {
            Ok(hit) => found += u64::from(hit),
            Err(Error::Libris(cause)) => warn!("can not estimate {:?}: {}", name, cause),
            Err(cause) => return Err(cause),
        }
    }
    let tally = *classifier.tally();
    write!(writer, "{}", tally)?;
    writer.flush()?;
    info!("answered {} queries", found);
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris::arithmetic::MAX_SCALE;
    use maplit::btreemap;
    use std::collections::BTreeMap;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(
            Book::new("978-1", "aaab")
                .with_author("anon")
                .with_price("5")
                .with_quantity("1"),
        );
        catalog.insert(Book::new("978-2", "aaaa"));
        catalog
    }

    #[test]
    fn query_label_is_ignored() {
        assert_eq!(parse_query(r#"SEARCH;{"name":"Dune"}"#).unwrap(), "Dune");
        assert_eq!(parse_query(r#";{"name":"Dune","isbn":"1"}"#).unwrap(), "Dune");
        assert!(matches!(parse_query("Dune"), Err(Error::MissingSeparator(_))));
        assert!(matches!(parse_query(r#"X;{"isbn":"1"}"#), Err(Error::Json(_))));
    }

    #[test]
    fn report_line_format() {
        let catalog = catalog();
        let mut out = Vec::new();
        let mut classifier = Classifier::new();
        assert!(answer("aaab", &catalog, &mut classifier, &mut out).unwrap());
        assert!(!answer("zzz", &catalog, &mut classifier, &mut out).unwrap());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"isbn\":\"978-1\",\"name\":\"aaab\",\"author\":\"anon\",\"price\":\"5\",\"quantity\":\"1\",\
             \"namesize\":\"8\",\"namesizeHuffman\":\"4\",\"namesizearithmetic\":\"1\"}\n"
        );
    }

    #[test]
    fn summary_follows_report() {
        let catalog = catalog();
        let queries = "X;{\"name\":\"aaab\"}\nX;{\"name\":\"aaaa\"}\nbroken\nX;{\"name\":\"nope\"}\n";
        let mut out = Vec::new();
        let mut classifier = Classifier::new();
        let tally = run_queries(queries.as_bytes(), &catalog, &mut classifier, &mut out).unwrap();
        assert_eq!(tally.huffman_best, 1);
        assert_eq!(tally.tie, 1);
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 7);
        assert!(lines[1].contains("\"isbn\":\"978-2\""));
        assert_eq!(
            &lines[2..],
            &["Equal: 0", "Decompress: 0", "Huffman: 1", "Arithmetic: 0", "Tie: 1"]
        );
    }

    #[test]
    fn report_line_keys() {
        let book = Book::new("978-3", "Emma").with_author("Austen");
        let classification = Classifier::new().classify(&book.name).unwrap();
        let json = serde_json::to_string(&ReportLine::new(&book, &classification)).unwrap();
        let fields: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
        let estimate = classification.estimate;
        assert_eq!(
            fields,
            btreemap! {
                "isbn".to_owned() => "978-3".to_owned(),
                "name".to_owned() => "Emma".to_owned(),
                "author".to_owned() => "Austen".to_owned(),
                "price".to_owned() => String::new(),
                "quantity".to_owned() => String::new(),
                "namesize".to_owned() => "8".to_owned(),
                "namesizeHuffman".to_owned() => estimate.huffman_bits.to_string(),
                "namesizearithmetic".to_owned() => estimate.arithmetic.to_string(),
            }
        );
    }

    #[test]
    fn unestimable_name_is_skipped() {
        let mut catalog = catalog();
        let long = "ab".repeat(MAX_SCALE as usize);
        assert!(catalog.insert(Book::new("978-9", long.clone())));
        let queries = format!(
            "X;{{\"name\":\"aaab\"}}\nX;{{\"name\":\"{}\"}}\nX;{{\"name\":\"aaaa\"}}\n",
            long
        );
        let mut out = Vec::new();
        let mut classifier = Classifier::new();
        let tally = run_queries(queries.as_bytes(), &catalog, &mut classifier, &mut out).unwrap();

        let mut expected_out = Vec::new();
        let expected = run_queries(
            "X;{\"name\":\"aaab\"}\nX;{\"name\":\"aaaa\"}\n".as_bytes(),
            &catalog,
            &mut Classifier::new(),
            &mut expected_out,
        )
        .unwrap();
        assert_eq!(tally, expected);
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("978-9"));
        assert_eq!(text, String::from_utf8(expected_out).unwrap());
    }
}
