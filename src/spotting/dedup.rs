use std::collections::HashMap;

use crate::types::{Location, Occurrence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    /// Same key, strictly higher confidence.
    Replaced,
    /// Same key, not better; the earlier occurrence stays.
    Kept,
}

/// Best occurrence per (location, decoded text), in first-seen order.
#[derive(Debug, Default)]
pub struct OccurrenceSet {
    entries: Vec<Occurrence>,
    index: HashMap<(Location, String), usize>,
}

impl OccurrenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, mut candidate: Occurrence) -> Upsert {
        let key = (candidate.location.clone(), candidate.text.clone());
        match self.index.get(&key) {
            Some(&slot) => {
                let existing = &mut self.entries[slot];
                if candidate.confidence > existing.confidence {
                    candidate.hit_ordinal = existing.hit_ordinal;
                    *existing = candidate;
                    Upsert::Replaced
                } else {
                    Upsert::Kept
                }
            }
            None => {
                let per_location = self
                    .entries
                    .iter()
                    .filter(|o| o.location == candidate.location)
                    .count();
                candidate.hit_ordinal = per_location + 1;
                self.index.insert(key, self.entries.len());
                self.entries.push(candidate);
                Upsert::Inserted
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Occurrence> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Occurrence> {
        self.entries
    }
}
