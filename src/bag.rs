//! Phased weighted random selection.

use std::{collections::BTreeMap, fmt::Display};

use rand::Rng;

use crate::error::{CraftError, Result};

// -------------------------------------------------------------------------------------------------

/// A bag of weighted marbles, grouped into phases.
///
/// Picking walks the phases in ascending order and draws from the first phase which can yield
/// a marble. Within a phase, each marble is drawn with a probability proportional
/// to its weight. Lower phases thus take strict precedence over higher ones: they hold the
/// preferred candidates, higher phases the fallbacks.
#[derive(Debug, Clone)]
pub struct MarbleBag<Id> {
    phases: BTreeMap<u32, Vec<(Id, u32)>>,
}

impl<Id> Default for MarbleBag<Id> {
    fn default() -> Self {
        Self {
            phases: BTreeMap::new(),
        }
    }
}

impl<Id: Copy + PartialEq> MarbleBag<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` marbles of the given id to the given phase. Adding the same id twice to
    /// a phase accumulates its weight.
    pub fn add(&mut self, phase: u32, id: Id, quantity: u32) {
        let marbles = self.phases.entry(phase).or_default();
        if let Some((_, weight)) = marbles.iter_mut().find(|(other, _)| *other == id) {
            *weight = weight.saturating_add(quantity);
        } else {
            marbles.push((id, quantity));
        }
    }

    /// Number of distinct marbles in all phases.
    pub fn len(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pick a marble from the first non-empty phase. A phase with a total weight of 0 only
    /// yields a marble when it holds exactly one, otherwise picking falls through to the next
    /// phase. Fails with `NoCandidates` when no phase yields a marble.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Id> {
        for marbles in self.phases.values() {
            let total = marbles
                .iter()
                .fold(0_u64, |sum, (_, weight)| sum + *weight as u64);
            if total == 0 {
                if let [(id, _)] = marbles.as_slice() {
                    return Ok(*id);
                }
                continue;
            }
            let mut ticket = rng.random_range(0..total);
            for (id, weight) in marbles {
                let weight = *weight as u64;
                if ticket < weight {
                    return Ok(*id);
                }
                ticket -= weight;
            }
        }
        Err(CraftError::NoCandidates)
    }
}

impl<Id: Display> Display for MarbleBag<Id> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phases = self
            .phases
            .iter()
            .map(|(phase, marbles)| {
                let marbles = marbles
                    .iter()
                    .map(|(id, weight)| format!("{}:{}", id, weight))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}] {}", phase, marbles)
            })
            .collect::<Vec<_>>();
        write!(f, "{}", phases.join("; "))
    }
}

// -------------------------------------------------------------------------------------------------
