//! The packing service: manifest in, persisted packing output out.
//!
//! Resolves a manifest identifier through the store boundary, expands the
//! shipment's (type, quantity) tuples into per-unit containers and items,
//! drives the container-order search and writes the best result back.
//! Internally the packer works in corner-origin coordinates; the
//! midpoint-origin convention is applied here, at the persistence boundary,
//! and nowhere else.

use crate::algorithm::Algorithm;
use crate::cancel::CancelToken;
use crate::error::SolverError;
use crate::model::{Container, Item, PackingResult, Placement};
use crate::packer::PackerConfig;
use crate::search::{self, SearchOutcome};
use crate::store::{
    Coordinate, Dimension, ManifestStore, PackingContainerRecord, PackingItemRecord,
    PackingOutput, ShipmentRecord, UnpackedItemRecord,
};
use crate::types::Vec3;

/// Everything the service needs to know to run one packing request.
///
/// Always passed in explicitly; the solver holds no global configuration.
#[derive(Clone, Debug)]
pub struct SolverSettings {
    /// Algorithm variants to run per container.
    pub algorithms: Vec<Algorithm>,
    /// Consecutive non-improving permutations before the search stops.
    pub no_improve_permutations: u32,
    /// Tolerances for the decomposition packer.
    pub packer: PackerConfig,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            algorithms: vec![Algorithm::DecompositionVolumeFirst],
            no_improve_permutations: 15,
            packer: PackerConfig::default(),
        }
    }
}

/// What happened to a packing request that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum PackOutcome {
    /// A best result was found and persisted.
    Saved {
        total_cost: f64,
        /// True iff the persisted result packed every item.
        complete: bool,
    },
    /// No permutation ever produced a result; nothing was persisted.
    NoSolution,
}

/// Runs one packing request end to end.
///
/// Any failure marks the manifest with the error status and propagates; no
/// partial output is ever persisted. A cancelled search is not a failure —
/// its best-so-far result is saved like a completed one.
pub async fn execute_pack<S: ManifestStore>(
    store: &S,
    manifest_id: &str,
    settings: &SolverSettings,
) -> Result<PackOutcome, SolverError> {
    if manifest_id.trim().is_empty() {
        return Err(SolverError::Input(
            "Manifest ID cannot be blank or null.".to_string(),
        ));
    }

    match run_pack(store, manifest_id, settings).await {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            eprintln!(
                "⚠️ An error occurred trying to pack manifest ID {}: {}",
                manifest_id, err
            );
            if let Err(save_err) = store.save_error(manifest_id).await {
                eprintln!("⚠️ Could not record the error status: {}", save_err);
            }
            Err(err)
        }
    }
}

async fn run_pack<S: ManifestStore>(
    store: &S,
    manifest_id: &str,
    settings: &SolverSettings,
) -> Result<PackOutcome, SolverError> {
    let manifest = store.manifest(manifest_id).await?;
    let shipment = store.shipment(&manifest.shipment_id).await?;

    let containers = expand_containers(store, &shipment).await?;
    let items = expand_items(store, &shipment).await?;

    if containers.is_empty() {
        return Err(SolverError::Input(format!(
            "Shipment {} does not request any containers.",
            shipment.id
        )));
    }
    if items.is_empty() {
        return Err(SolverError::Input(format!(
            "Shipment {} does not contain any items.",
            shipment.id
        )));
    }

    println!(
        "Packing manifest {} with {} containers and {} items.",
        manifest_id,
        containers.len(),
        items.len()
    );

    let cancel = CancelToken::new();
    let outcome = search::search_container_orders(
        &containers,
        &items,
        &settings.algorithms,
        settings.packer,
        settings.no_improve_permutations,
        &cancel,
    )
    .await?;

    match outcome {
        SearchOutcome::Completed(best) | SearchOutcome::Cancelled(best) => {
            println!("Most optimal solution:");
            print_packing_result(&best);

            let complete = best.is_complete();
            let output = build_output(manifest_id, &containers, &best);
            let total_cost = output.total_cost;
            store.save_packing(manifest_id, output).await?;

            Ok(PackOutcome::Saved {
                total_cost,
                complete,
            })
        }
        SearchOutcome::NoSolution => {
            println!("Could not find a solution.");
            Ok(PackOutcome::NoSolution)
        }
    }
}

/// Expands the shipment's container tuples into per-unit containers.
///
/// Every unit gets a fresh identifier unique within the request.
async fn expand_containers<S: ManifestStore>(
    store: &S,
    shipment: &ShipmentRecord,
) -> Result<Vec<Container>, SolverError> {
    let mut containers = Vec::new();
    for entry in &shipment.containers {
        let container_type = store.container_type(&entry.container_type_id).await?;
        for _ in 0..entry.quantity {
            let unit = containers.len() + 1;
            containers.push(Container::new(
                format!("{}-{}", container_type.id, unit),
                Vec3::from_tuple(container_type.dimension.as_tuple()),
                container_type.id.clone(),
                entry.cost,
                container_type.max_weight,
                container_type.features.clone(),
            )?);
        }
    }
    Ok(containers)
}

/// Expands the shipment's item tuples into per-unit items.
async fn expand_items<S: ManifestStore>(
    store: &S,
    shipment: &ShipmentRecord,
) -> Result<Vec<Item>, SolverError> {
    let mut items = Vec::new();
    for entry in &shipment.items {
        let item_type = store.item_type(&entry.item_type_id).await?;
        for _ in 0..entry.quantity {
            let unit = items.len() + 1;
            items.push(Item::new(
                format!("{}-{}", item_type.id, unit),
                Vec3::from_tuple(item_type.dimension.as_tuple()),
                item_type.weight,
                item_type.required_features.clone(),
                item_type.id.clone(),
            )?);
        }
    }
    Ok(items)
}

/// Converts a corner-origin placement into the midpoint-origin convention
/// of the persistence boundary.
///
/// The container's geometric center becomes the origin; the recorded
/// coordinate is the center of the placed item.
pub fn recenter(container_dims: Vec3, placement: &Placement) -> Coordinate {
    Coordinate {
        x: container_dims.x / 2.0 * -1.0 + placement.position.x + placement.dims.x / 2.0,
        y: container_dims.y / 2.0 * -1.0 + placement.position.y + placement.dims.y / 2.0,
        z: container_dims.z / 2.0 * -1.0 + placement.position.z + placement.dims.z / 2.0,
    }
}

/// Builds the persisted output records from the best search result.
fn build_output(
    manifest_id: &str,
    containers: &[Container],
    best: &PackingResult,
) -> PackingOutput {
    let mut out_containers = Vec::new();
    let mut out_items = Vec::new();
    let mut total_cost = 0.0;

    for (index, result) in best.results.iter().enumerate() {
        let Some(container) = containers.iter().find(|c| c.id == result.container_id) else {
            continue;
        };
        total_cost += container.cost;

        let packing_container_id = format!("{}-pc-{}", manifest_id, index + 1);
        let primary = result.primary_result();

        out_containers.push(PackingContainerRecord {
            id: packing_container_id.clone(),
            manifest_id: manifest_id.to_string(),
            container_type_id: container.container_type_id.clone(),
            packed_percent: primary.percent_container_volume_packed,
        });

        for packed in &primary.packed_items {
            out_items.push(PackingItemRecord {
                id: format!("{}-pi-{}", manifest_id, out_items.len() + 1),
                manifest_id: manifest_id.to_string(),
                packing_container_id: packing_container_id.clone(),
                container_type_id: container.container_type_id.clone(),
                item_type_id: packed.item.item_type_id.clone(),
                coordinates: recenter(container.dims, &packed.placement),
                packing_dimension: Dimension {
                    length: packed.placement.dims.x,
                    width: packed.placement.dims.y,
                    height: packed.placement.dims.z,
                },
            });
        }
    }

    PackingOutput {
        containers: out_containers,
        items: out_items,
        unpacked_items: group_unpacked(&best.unpacked_items),
        total_cost,
    }
}

/// Groups unpacked items by item type, in first-appearance order.
fn group_unpacked(unpacked: &[Item]) -> Vec<UnpackedItemRecord> {
    let mut grouped: Vec<UnpackedItemRecord> = Vec::new();
    for item in unpacked {
        match grouped
            .iter_mut()
            .find(|g| g.item_type_id == item.item_type_id)
        {
            Some(group) => group.quantity += 1,
            None => grouped.push(UnpackedItemRecord {
                item_type_id: item.item_type_id.clone(),
                quantity: 1,
            }),
        }
    }
    grouped
}

/// Prints one best solution in the established console format.
fn print_packing_result(best: &PackingResult) {
    for result in &best.results {
        let primary = result.primary_result();
        println!("Container {}", result.container_id);
        println!("-----------------------------");
        println!("Packed Volume: {}", primary.percent_container_volume_packed);
        println!("Packed Items:");
        for packed in &primary.packed_items {
            println!(
                "Item {} packed in container {} at {} x {} x {}",
                packed.item.id,
                result.container_id,
                packed.placement.position.x,
                packed.placement.position.y,
                packed.placement.position.z
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EPSILON_GENERAL;

    #[test]
    fn recenter_moves_the_origin_to_the_container_midpoint() {
        let container_dims = Vec3::new(1000.0, 1000.0, 1000.0);
        let placement = Placement {
            position: Vec3::zero(),
            dims: Vec3::new(500.0, 500.0, 500.0),
        };

        let coordinate = recenter(container_dims, &placement);
        assert!((coordinate.x - -250.0).abs() < EPSILON_GENERAL);
        assert!((coordinate.y - -250.0).abs() < EPSILON_GENERAL);
        assert!((coordinate.z - -250.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn recenter_centers_an_exactly_filling_item() {
        let container_dims = Vec3::new(100.0, 80.0, 60.0);
        let placement = Placement {
            position: Vec3::zero(),
            dims: container_dims,
        };

        let coordinate = recenter(container_dims, &placement);
        assert!(coordinate.x.abs() < EPSILON_GENERAL);
        assert!(coordinate.y.abs() < EPSILON_GENERAL);
        assert!(coordinate.z.abs() < EPSILON_GENERAL);
    }

    #[test]
    fn recenter_respects_the_raw_offset() {
        let container_dims = Vec3::new(1000.0, 1000.0, 1000.0);
        let placement = Placement {
            position: Vec3::new(500.0, 0.0, 0.0),
            dims: Vec3::new(500.0, 500.0, 500.0),
        };

        let coordinate = recenter(container_dims, &placement);
        assert!((coordinate.x - 250.0).abs() < EPSILON_GENERAL);
        assert!((coordinate.y - -250.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn group_unpacked_counts_by_type_in_first_appearance_order() {
        let item = |id: &str, type_id: &str| {
            Item::new(
                id.to_string(),
                Vec3::new(1.0, 1.0, 1.0),
                1.0,
                Vec::new(),
                type_id.to_string(),
            )
            .unwrap()
        };

        let unpacked = vec![
            item("a", "type-b"),
            item("b", "type-a"),
            item("c", "type-b"),
        ];

        let grouped = group_unpacked(&unpacked);
        assert_eq!(
            grouped,
            vec![
                UnpackedItemRecord {
                    item_type_id: "type-b".to_string(),
                    quantity: 2,
                },
                UnpackedItemRecord {
                    item_type_id: "type-a".to_string(),
                    quantity: 1,
                },
            ]
        );
    }

    #[test]
    fn blank_manifest_id_is_rejected_without_store_access() {
        // A store that panics on every call; the guard must fire first.
        struct NoStore;
        impl ManifestStore for NoStore {
            async fn manifest(
                &self,
                _: &str,
            ) -> Result<crate::store::ManifestRecord, crate::store::StoreError> {
                unreachable!("store must not be touched")
            }
            async fn shipment(
                &self,
                _: &str,
            ) -> Result<ShipmentRecord, crate::store::StoreError> {
                unreachable!("store must not be touched")
            }
            async fn container_type(
                &self,
                _: &str,
            ) -> Result<crate::store::ContainerTypeRecord, crate::store::StoreError> {
                unreachable!("store must not be touched")
            }
            async fn item_type(
                &self,
                _: &str,
            ) -> Result<crate::store::ItemTypeRecord, crate::store::StoreError> {
                unreachable!("store must not be touched")
            }
            async fn save_packing(
                &self,
                _: &str,
                _: PackingOutput,
            ) -> Result<(), crate::store::StoreError> {
                unreachable!("store must not be touched")
            }
            async fn save_error(&self, _: &str) -> Result<(), crate::store::StoreError> {
                unreachable!("store must not be touched")
            }
        }

        let outcome = futures::executor::block_on(execute_pack(
            &NoStore,
            "   ",
            &SolverSettings::default(),
        ));
        assert!(matches!(outcome, Err(SolverError::Input(_))));
    }
}
