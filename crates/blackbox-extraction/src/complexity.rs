//! Weighted complexity scoring shared by every extractor.
//!
//! Each extractor counts the factors it sees; the scorer turns the weighted
//! sum into a 1-5 band so scores are comparable across metadata formats.

use std::fmt;

use smallvec::SmallVec;

/// A countable complexity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    Decisions,
    Loops,
    RecordOps,
    Screens,
    Conditions,
    Formulas,
    Fields,
    Elements,
    NestingDepth,
    Subflows,
    /// Anything else; weighs 1.
    Other(&'static str),
}

impl Factor {
    pub fn weight(&self) -> f64 {
        match self {
            Self::Decisions => 3.0,
            Self::Loops => 3.0,
            Self::RecordOps => 2.0,
            Self::Screens => 2.0,
            Self::Conditions => 1.0,
            Self::Formulas => 2.0,
            Self::Fields => 0.5,
            Self::Elements => 0.3,
            Self::NestingDepth => 4.0,
            Self::Subflows => 3.0,
            Self::Other(_) => 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Decisions => "decisions",
            Self::Loops => "loops",
            Self::RecordOps => "record_ops",
            Self::Screens => "screens",
            Self::Conditions => "conditions",
            Self::Formulas => "formulas",
            Self::Fields => "fields",
            Self::Elements => "elements",
            Self::NestingDepth => "nesting_depth",
            Self::Subflows => "subflows",
            Self::Other(name) => name,
        }
    }
}

/// Factor counts for one pattern. Adding to a factor twice accumulates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexityFactors {
    counts: SmallVec<[(Factor, u32); 8]>,
}

impl ComplexityFactors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `add`.
    pub fn with(mut self, factor: Factor, count: usize) -> Self {
        self.add(factor, count);
        self
    }

    pub fn add(&mut self, factor: Factor, count: usize) {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        match self.counts.iter_mut().find(|(f, _)| *f == factor) {
            Some((_, existing)) => *existing = existing.saturating_add(count),
            None => self.counts.push((factor, count)),
        }
    }

    pub fn get(&self, factor: Factor) -> u32 {
        self.counts
            .iter()
            .find(|(f, _)| *f == factor)
            .map_or(0, |(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, u32)> + '_ {
        self.counts.iter().copied()
    }
}

/// `decisions=2 fields=3`, in insertion order.
impl fmt::Display for ComplexityFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (factor, count)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={count}", factor.name())?;
        }
        Ok(())
    }
}

/// Maps factor counts to a 1-5 complexity band.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityScorer;

impl ComplexityScorer {
    /// Σ count × weight.
    pub fn raw_score(factors: &ComplexityFactors) -> f64 {
        factors
            .iter()
            .map(|(factor, count)| f64::from(count) * factor.weight())
            .sum()
    }

    /// ≤3 → 1, ≤8 → 2, ≤18 → 3, ≤35 → 4, else 5.
    pub fn band(raw: f64) -> u8 {
        if raw <= 3.0 {
            1
        } else if raw <= 8.0 {
            2
        } else if raw <= 18.0 {
            3
        } else if raw <= 35.0 {
            4
        } else {
            5
        }
    }

    pub fn score(factors: &ComplexityFactors) -> u8 {
        Self::band(Self::raw_score(factors))
    }
}
