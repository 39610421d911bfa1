//! Integer arithmetic coding with 16 bit registers
//!
//! The coder keeps an interval `[low, high]` of 16 bit integers. Each symbol narrows the interval
//! in proportion to its share of the model's scale. As soon as the top bits of both ends agree they
//! can no longer change, so they are shifted out. When the interval straddles the midpoint without
//! agreeing on the top bit, the second bit is dropped and remembered as a pending underflow bit,
//! which is emitted (complemented) after the next determined bit.
//!
//! The scale is limited to 14 bits, which keeps every symbol's share of a renormalized interval
//! non-empty.
use crate::{
    error::{Error, Result},
    util::{frequencies, BitReader, BitWriter},
};
use derive_more::Display;

const TOP: u16 = 0x8000;
const SECOND: u16 = 0x4000;
/// largest supported model scale
pub const MAX_SCALE: u32 = (SECOND as u32) - 1;

/// Half open cumulative count interval of a symbol
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display(fmt = "[{}, {})", low, high)]
pub struct Interval {
    pub low: u32,
    pub high: u32,
}

impl Interval {
    pub fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    fn contains(&self, count: u64) -> bool {
        u64::from(self.low) <= count && count < u64::from(self.high)
    }
}

/// Cumulative frequency model: an ordered list of symbol intervals out of a total `scale`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    symbols: Vec<(char, Interval)>,
    scale: u32,
}

impl Model {
    /// Creates a model from explicit intervals.
    ///
    /// Intervals must be non-empty and lie within `[0, scale)`. They are searched in the given order
    /// when decoding.
    pub fn new(symbols: Vec<(char, Interval)>, scale: u32) -> Result<Self> {
        if symbols.is_empty() {
            return Err(Error::EmptyModel);
        }
        if scale == 0 || scale > MAX_SCALE {
            return Err(Error::ScaleOutOfRange {
                scale: scale.into(),
                max: MAX_SCALE,
            });
        }
        for (symbol, interval) in &symbols {
            if interval.low >= interval.high || interval.high > scale {
                return Err(Error::InvalidInterval {
                    symbol: *symbol,
                    low: interval.low,
                    high: interval.high,
                    scale,
                });
            }
        }
        Ok(Self { symbols, scale })
    }

    /// Derives a model from the symbol frequencies of `text`.
    ///
    /// Symbols are ordered by ascending frequency, ties by symbol, and partition `[0, len)`.
    pub fn from_sample(text: &str) -> Result<Self> {
        let mut counts = frequencies(text).into_iter().collect::<Vec<_>>();
        counts.sort_by_key(|(symbol, count)| (*count, *symbol));
        let total = counts.iter().map(|(_, count)| u64::from(*count)).sum::<u64>();
        if total > u64::from(MAX_SCALE) {
            return Err(Error::ScaleOutOfRange {
                scale: total,
                max: MAX_SCALE,
            });
        }
        let mut low = 0;
        let symbols = counts
            .into_iter()
            .map(|(symbol, count)| {
                let interval = Interval::new(low, low + count);
                low = interval.high;
                (symbol, interval)
            })
            .collect();
        Self::new(symbols, low)
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn symbols(&self) -> &[(char, Interval)] {
        &self.symbols
    }

    pub fn interval(&self, symbol: char) -> Option<Interval> {
        self.symbols
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, interval)| *interval)
    }

    /// first symbol whose interval contains `count`
    fn lookup(&self, count: u64) -> Option<(char, Interval)> {
        self.symbols
            .iter()
            .find(|(_, interval)| interval.contains(count))
            .copied()
    }
}

/// The `[low, high]` register pair shared by encoder and decoder
#[derive(Debug, Clone, Copy)]
struct Registers {
    low: u16,
    high: u16,
}

impl Registers {
    fn new() -> Self {
        Self {
            low: 0x0000,
            high: 0xFFFF,
        }
    }

    fn range(&self) -> u64 {
        u64::from(self.high) - u64::from(self.low) + 1
    }

    fn narrow(&mut self, interval: Interval, scale: u32) {
        let range = self.range();
        let low = u64::from(self.low);
        let scale = u64::from(scale);
        // both results lie within the old [low, high], so they fit into 16 bits
        self.high = (low + range * u64::from(interval.high) / scale - 1) as u16;
        self.low = (low + range * u64::from(interval.low) / scale) as u16;
    }

    fn top_bits_agree(&self) -> bool {
        self.high & TOP == self.low & TOP
    }

    fn underflow(&self) -> bool {
        self.low & SECOND != 0 && self.high & SECOND == 0
    }

    /// drops the second highest bit of both registers
    fn drop_second(&mut self) {
        self.low &= SECOND - 1;
        self.high |= SECOND;
    }

    fn shift(&mut self) {
        self.low <<= 1;
        self.high = (self.high << 1) | 1;
    }
}

/// Arithmetic coder over a fixed [Model]
#[derive(Debug, Clone)]
pub struct ArithmeticCoder {
    model: Model,
}

impl ArithmeticCoder {
    /// Creates a coder whose model is derived from the symbol frequencies of `sample`
    pub fn from_sample(sample: &str) -> Result<Self> {
        Ok(Self::new(Model::from_sample(sample)?))
    }

    pub fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Encodes `text`. The result is padded with zero bits to whole bytes.
    pub fn compress(&self, text: &str) -> Result<Vec<u8>> {
        let scale = self.model.scale;
        let mut out = BitWriter::default();
        let mut r = Registers::new();
        let mut pending = 0u32;
        for symbol in text.chars() {
            let interval = self
                .model
                .interval(symbol)
                .ok_or(Error::UnknownSymbol(symbol))?;
            r.narrow(interval, scale);
            loop {
                if r.top_bits_agree() {
                    let bit = r.high & TOP != 0;
                    out.push(bit);
                    out.push_n(!bit, pending);
                    pending = 0;
                } else if r.underflow() {
                    pending += 1;
                    r.drop_second();
                } else {
                    break;
                }
                r.shift();
            }
        }
        // two more bits select a value inside the final interval
        let bit = r.low & SECOND != 0;
        out.push(bit);
        out.push_n(!bit, pending + 1);
        tracing::trace!("encoded {} symbols into {} bits", text.chars().count(), out.len());
        Ok(out.into_bytes())
    }

    /// Decodes `size` symbols from `data`
    pub fn decompress(&self, data: &[u8], size: usize) -> Result<String> {
        let scale = self.model.scale;
        let mut input = BitReader::new(data);
        let mut code = 0u16;
        for _ in 0..16 {
            code = (code << 1) | u16::from(input.next_bit());
        }
        let mut r = Registers::new();
        let mut res = String::with_capacity(size);
        for _ in 0..size {
            let count = (u64::from(code.wrapping_sub(r.low)) + 1) * u64::from(scale) - 1;
            let count = count / r.range();
            let (symbol, interval) = self
                .model
                .lookup(count)
                .ok_or(Error::Decode { count, scale })?;
            res.push(symbol);
            r.narrow(interval, scale);
            loop {
                if !r.top_bits_agree() {
                    if r.underflow() {
                        code ^= SECOND;
                        r.drop_second();
                    } else {
                        break;
                    }
                }
                r.shift();
                code = (code << 1) | u16::from(input.next_bit());
            }
        }
        Ok(res)
    }
}
