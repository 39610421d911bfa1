use std::collections::BTreeMap;

pub(crate) fn is_strictly_sorted<T: Ord>(iter: impl Iterator<Item = T>) -> bool {
    iter.collect::<Vec<_>>().windows(2).all(|x| x[0] < x[1])
}

/// Occurrence count per symbol, ordered by symbol
pub fn frequencies(text: &str) -> BTreeMap<char, u32> {
    let mut res = BTreeMap::new();
    for c in text.chars() {
        *res.entry(c).or_insert(0) += 1;
    }
    res
}

/// Accumulates single bits, most significant bit of each byte first
#[derive(Debug, Default, Clone)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    len: usize,
}

impl BitWriter {
    pub fn push(&mut self, bit: bool) {
        let shift = 7 - (self.len % 8);
        if shift == 7 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << shift;
            }
        }
        self.len += 1;
    }

    pub fn push_n(&mut self, bit: bool, n: u32) {
        for _ in 0..n {
            self.push(bit);
        }
    }

    /// number of bits written so far
    pub fn len(&self) -> usize {
        self.len
    }

    /// Pads with zero bits up to the next byte boundary
    pub fn into_bytes(self) -> Vec<u8> {
        // the unused low bits of the last byte are already zero
        self.bytes
    }
}

/// Reads bits in the order [BitWriter] wrote them. Reading past the end yields zeros.
#[derive(Debug, Clone)]
pub(crate) struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn next_bit(&mut self) -> bool {
        let bit = self
            .bytes
            .get(self.pos / 8)
            .map(|byte| byte & (0x80 >> (self.pos % 8)) != 0)
            .unwrap_or_default();
        self.pos += 1;
        bit
    }
}
