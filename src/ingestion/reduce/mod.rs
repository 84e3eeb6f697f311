//! Reducers - fold report rows into per-property summary records
//!
//! Each reducer builds a fresh [`PropertyLedger`] per call and consumes it
//! when finalizing, so no accumulator outlives the file it was built from.

pub mod counts;
pub mod delinquency;
pub mod rent_roll;

pub use counts::{
    reduce_applications, reduce_guest_cards, reduce_mtd_receivables, reduce_showings,
    reduce_unit_status,
};
pub use delinquency::reduce_delinquency;
pub use rent_roll::reduce_rent_roll;

use std::collections::HashMap;

/// Accumulators keyed by property id, iterated in first-seen order
#[derive(Debug)]
pub struct PropertyLedger<A> {
    index: HashMap<String, usize>,
    entries: Vec<(String, A)>,
}

impl<A: Default> PropertyLedger<A> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Accumulator for `property_id`, created on first sight
    pub fn entry(&mut self, property_id: &str) -> &mut A {
        let slot = match self.index.get(property_id) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(property_id.to_string(), slot);
                self.entries.push((property_id.to_string(), A::default()));
                slot
            }
        };
        &mut self.entries[slot].1
    }
}

impl<A: Default> Default for PropertyLedger<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> PropertyLedger<A> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, property_id: &str) -> Option<&A> {
        self.index.get(property_id).map(|&slot| &self.entries[slot].1)
    }
}

impl<A> IntoIterator for PropertyLedger<A> {
    type Item = (String, A);
    type IntoIter = std::vec::IntoIter<(String, A)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
pub(crate) mod test_rows {
    use crate::ingestion::types::RawRow;

    pub fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
