//! Per-container multi-algorithm runner.
//!
//! Runs the requested algorithm variants against one container concurrently,
//! bounded by the machine's available parallelism. Every variant reads the
//! same shared item list — items are immutable values, so no per-task cloning
//! is needed. Elapsed time is recorded per run for observability only; the
//! result order is always the deterministic sort by algorithm name, never
//! completion order.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::algorithm::Algorithm;
use crate::cancel::CancelToken;
use crate::error::SolverError;
use crate::model::{AlgorithmPackingResult, Container, ContainerPackingResult, Item};
use crate::packer::PackerConfig;

/// Rounds a percentage to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Fills in the derived percentage metrics of an algorithm result.
///
/// If the attempted item volume is zero, the item-volume percentage is
/// defined as 100% rather than dividing by zero.
fn finalize_metrics(result: &mut AlgorithmPackingResult, container_volume: f64) {
    let packed = result.packed_volume();
    let attempted = packed + result.unpacked_volume();

    result.percent_container_volume_packed = round2(packed / container_volume * 100.0);
    result.percent_item_volume_packed = if attempted <= 0.0 {
        100.0
    } else {
        round2(packed / attempted * 100.0)
    };
}

/// Packs one container with every requested algorithm variant.
///
/// Each variant runs on the blocking pool with a concurrency cap of the
/// available parallelism. A panicking variant aborts the whole request; the
/// cancellation token is observed cooperatively inside each run.
pub async fn pack_container(
    container: &Container,
    items: &[Item],
    algorithms: &[Algorithm],
    config: PackerConfig,
    cancel: &CancelToken,
) -> Result<ContainerPackingResult, SolverError> {
    let semaphore = Arc::new(Semaphore::new(available_parallelism()));
    let shared_items: Arc<[Item]> = items.to_vec().into();
    let shared_container = Arc::new(container.clone());

    let tasks = algorithms.iter().copied().map(|algorithm| {
        let semaphore = Arc::clone(&semaphore);
        let items = Arc::clone(&shared_items);
        let container = Arc::clone(&shared_container);
        let cancel = cancel.clone();

        async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("runner semaphore is never closed");

            tokio::task::spawn_blocking(move || {
                let started = Instant::now();
                let mut result = algorithm.run(&container, &items, &config, &cancel);
                result.pack_time_ms = started.elapsed().as_millis() as u64;
                finalize_metrics(&mut result, container.volume);
                result
            })
            .await
        }
    });

    let mut algorithm_results = Vec::with_capacity(algorithms.len());
    for joined in join_all(tasks).await {
        match joined {
            Ok(result) => algorithm_results.push(result),
            Err(err) => return Err(SolverError::AlgorithmFailure(err.to_string())),
        }
    }

    algorithm_results.sort_by(|a, b| a.algorithm.name().cmp(b.algorithm.name()));

    Ok(ContainerPackingResult {
        container_id: container.id.clone(),
        algorithm_results,
    })
}
