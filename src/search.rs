//! Sequential multi-container packing and the container-order search loop.
//!
//! One permutation of the container list is packed strictly sequentially:
//! the leftover of container N becomes the input of container N+1. The outer
//! loop enumerates every permutation and keeps the cheapest result, stopping
//! early once a configured number of consecutive permutations fails to
//! improve on the best known cost. Permutation count is factorial in the
//! number of container units; the no-improvement cutoff is the only bound,
//! matching the observable behavior of the production system.

use std::time::Instant;

use crate::algorithm::Algorithm;
use crate::cancel::CancelToken;
use crate::error::SolverError;
use crate::model::{Container, Item, PackingResult};
use crate::packer::PackerConfig;
use crate::runner;

/// Final outcome of a container-order search.
///
/// Cancellation is a normal termination path and still carries the best
/// result found so far. `NoSolution` is distinct from a complete-status
/// result with unpacked leftovers: it means no permutation was ever
/// evaluated.
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    /// All permutations were evaluated.
    Completed(PackingResult),
    /// The search stopped early; the best result so far is attached.
    Cancelled(PackingResult),
    /// No permutation produced a result.
    NoSolution,
}

impl SearchOutcome {
    /// The best packing result, if any permutation produced one.
    pub fn best(&self) -> Option<&PackingResult> {
        match self {
            SearchOutcome::Completed(result) | SearchOutcome::Cancelled(result) => Some(result),
            SearchOutcome::NoSolution => None,
        }
    }
}

/// Packs an ordered container sequence, feeding leftovers forward.
///
/// Stops as soon as a container pack leaves zero unpacked items or the
/// cancellation token fires; a cancelled sequence returns the containers
/// already packed plus the current backlog as the unpacked remainder.
pub async fn pack_sequence(
    containers: &[Container],
    items: Vec<Item>,
    algorithms: &[Algorithm],
    config: PackerConfig,
    cancel: &CancelToken,
) -> Result<PackingResult, SolverError> {
    let mut results = Vec::new();
    let mut remaining = items;

    for container in containers {
        if cancel.is_cancelled() {
            break;
        }

        let container_result =
            runner::pack_container(container, &remaining, algorithms, config, cancel).await?;

        remaining = container_result.primary_result().unpacked_items.clone();
        results.push(container_result);

        if remaining.is_empty() {
            break;
        }
    }

    Ok(PackingResult {
        results,
        unpacked_items: remaining,
    })
}

/// Tracks the no-improvement cancellation policy of the search loop.
///
/// The very first observed cost is accepted unconditionally; afterwards only
/// a strictly lower cost counts as an improvement. `should_stop` becomes
/// true once `threshold` consecutive observations failed to improve.
#[derive(Debug)]
struct ImprovementTracker {
    threshold: u32,
    since_last_improvement: u32,
    best_cost: Option<f64>,
}

impl ImprovementTracker {
    fn new(threshold: u32) -> Self {
        Self {
            threshold,
            since_last_improvement: 0,
            best_cost: None,
        }
    }

    fn should_stop(&self) -> bool {
        self.best_cost.is_some() && self.since_last_improvement >= self.threshold
    }

    /// Records a candidate cost. Returns true if it becomes the new best.
    fn observe(&mut self, cost: f64) -> bool {
        match self.best_cost {
            None => {
                self.best_cost = Some(cost);
                true
            }
            Some(best) if cost < best => {
                self.best_cost = Some(cost);
                self.since_last_improvement = 0;
                true
            }
            Some(_) => {
                self.since_last_improvement += 1;
                false
            }
        }
    }
}

/// Sum of the costs of the containers actually used by a result.
fn sequence_cost(containers: &[Container], result: &PackingResult) -> f64 {
    result
        .results
        .iter()
        .filter_map(|r| {
            containers
                .iter()
                .find(|c| c.id == r.container_id)
                .map(|c| c.cost)
        })
        .sum()
}

/// Searches container orderings for a low-cost, near-complete pack.
///
/// Every permutation of `containers` is packed sequentially; the cheapest
/// result wins. After `no_improve_threshold` consecutive permutations
/// without improvement the shared cancellation token fires, all in-flight
/// work drains, and the best-so-far result is returned as `Cancelled`.
pub async fn search_container_orders(
    containers: &[Container],
    items: &[Item],
    algorithms: &[Algorithm],
    config: PackerConfig,
    no_improve_threshold: u32,
    cancel: &CancelToken,
) -> Result<SearchOutcome, SolverError> {
    if algorithms.is_empty() {
        return Err(SolverError::Input(
            "No packing algorithms requested.".to_string(),
        ));
    }

    let started = Instant::now();
    let mut tracker = ImprovementTracker::new(no_improve_threshold);
    let mut best: Option<PackingResult> = None;
    let mut cancelled = false;

    for permutation in permutations(containers.to_vec()) {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        if tracker.should_stop() {
            println!(
                "No improvement in solver cost after {} permutations, exiting.",
                tracker.since_last_improvement
            );
            cancel.cancel();
            cancelled = true;
            break;
        }

        let candidate =
            pack_sequence(&permutation, items.to_vec(), algorithms, config, cancel).await?;
        let cost = sequence_cost(containers, &candidate);
        println!("Total cost of containers for this permutation: ${}", cost);

        if tracker.observe(cost) {
            best = Some(candidate);
        }
    }

    println!(
        "Computed permutations in {} ms",
        started.elapsed().as_millis()
    );

    Ok(match best {
        Some(result) if cancelled => SearchOutcome::Cancelled(result),
        Some(result) => SearchOutcome::Completed(result),
        None => SearchOutcome::NoSolution,
    })
}

/// Enumerates all permutations of `items` with Heap's algorithm.
///
/// The first yielded permutation is the input order itself; each subsequent
/// permutation differs from its predecessor by a single swap.
fn permutations<T: Clone>(items: Vec<T>) -> Permutations<T> {
    let len = items.len();
    Permutations {
        items,
        counters: vec![0; len],
        index: 1,
        first: true,
    }
}

struct Permutations<T> {
    items: Vec<T>,
    counters: Vec<usize>,
    index: usize,
    first: bool,
}

impl<T: Clone> Iterator for Permutations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.first {
            self.first = false;
            return Some(self.items.clone());
        }

        while self.index < self.items.len() {
            if self.counters[self.index] < self.index {
                if self.index % 2 == 0 {
                    self.items.swap(0, self.index);
                } else {
                    self.items.swap(self.counters[self.index], self.index);
                }
                self.counters[self.index] += 1;
                self.index = 1;
                return Some(self.items.clone());
            }

            self.counters[self.index] = 0;
            self.index += 1;
        }

        None
    }
}
