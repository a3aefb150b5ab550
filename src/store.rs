//! The data-store collaborator boundary.
//!
//! The solver core is triggered with a manifest identifier and resolves it
//! through this boundary into a shipment specification; on completion it
//! writes the packing output back. The record shapes mirror the upstream
//! tables (camelCase field names); persistence technology is the store's
//! concern, not the core's.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Store failure.
#[derive(Debug)]
pub enum StoreError {
    /// An entity was not found under the given identifier.
    NotFound { entity: &'static str, id: String },
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound { entity, id } => {
                write!(f, "{} with ID {} was not found.", entity, id)
            }
            StoreError::Io(err) => write!(f, "I/O error: {}", err),
            StoreError::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Serialization(err) => Some(err),
            StoreError::NotFound { .. } => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

/// Externally visible processing state of a manifest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestStatus {
    #[default]
    Processing,
    Complete,
    Error,
}

/// A dimension record as stored upstream.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    /// Maps (length, width, height) onto the solver's (x, y, z) axes.
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.length, self.width, self.height)
    }
}

/// A container type: dimensions, weight limit, capability tags.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerTypeRecord {
    pub id: String,
    pub dimension: Dimension,
    pub max_weight: f64,
    #[serde(default)]
    pub features: Vec<String>,
}

/// An item type: dimensions, weight, required capability tags.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTypeRecord {
    pub id: String,
    pub dimension: Dimension,
    pub weight: f64,
    #[serde(default)]
    pub required_features: Vec<String>,
}

/// One (container type, quantity, cost) tuple of a shipment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentContainer {
    pub container_type_id: String,
    pub quantity: u32,
    pub cost: f64,
}

/// One (item type, quantity) tuple of a shipment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItem {
    pub item_type_id: String,
    pub quantity: u32,
}

/// A shipment specification.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    pub id: String,
    pub containers: Vec<ShipmentContainer>,
    pub items: Vec<ShipmentItem>,
}

/// A packed-container output record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingContainerRecord {
    pub id: String,
    pub manifest_id: String,
    pub container_type_id: String,
    pub packed_percent: f64,
}

/// A coordinate in the midpoint-origin convention of the output boundary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A packed-item output record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingItemRecord {
    pub id: String,
    pub manifest_id: String,
    pub packing_container_id: String,
    pub container_type_id: String,
    pub item_type_id: String,
    pub coordinates: Coordinate,
    pub packing_dimension: Dimension,
}

/// Count of unpacked instances of one item type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpackedItemRecord {
    pub item_type_id: String,
    pub quantity: u32,
}

/// A manifest as stored upstream, including the packing output once solved.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRecord {
    pub id: String,
    pub shipment_id: String,
    #[serde(default)]
    pub status: ManifestStatus,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub packing_containers: Vec<PackingContainerRecord>,
    #[serde(default)]
    pub packing_items: Vec<PackingItemRecord>,
    #[serde(default)]
    pub unpacked_items: Vec<UnpackedItemRecord>,
    #[serde(default)]
    pub updated_at_ms: Option<u64>,
}

/// The complete packing output persisted for a solved manifest.
#[derive(Clone, Debug)]
pub struct PackingOutput {
    pub containers: Vec<PackingContainerRecord>,
    pub items: Vec<PackingItemRecord>,
    pub unpacked_items: Vec<UnpackedItemRecord>,
    pub total_cost: f64,
}

/// The data-store collaborator.
///
/// Implementations resolve manifest/shipment/type records and persist the
/// final packing output. The solver never persists partial results: either
/// `save_packing` with the complete output or `save_error`.
#[allow(async_fn_in_trait)]
pub trait ManifestStore {
    async fn manifest(&self, manifest_id: &str) -> Result<ManifestRecord, StoreError>;

    async fn shipment(&self, shipment_id: &str) -> Result<ShipmentRecord, StoreError>;

    async fn container_type(&self, id: &str) -> Result<ContainerTypeRecord, StoreError>;

    async fn item_type(&self, id: &str) -> Result<ItemTypeRecord, StoreError>;

    /// Marks the manifest complete and stores the packing output.
    async fn save_packing(
        &self,
        manifest_id: &str,
        output: PackingOutput,
    ) -> Result<(), StoreError>;

    /// Marks the manifest failed. No partial output is written.
    async fn save_error(&self, manifest_id: &str) -> Result<(), StoreError>;
}

/// Everything a store file contains.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub manifests: Vec<ManifestRecord>,
    #[serde(default)]
    pub shipments: Vec<ShipmentRecord>,
    #[serde(default)]
    pub container_types: Vec<ContainerTypeRecord>,
    #[serde(default)]
    pub item_types: Vec<ItemTypeRecord>,
}

/// A file-backed manifest store.
///
/// Loads the whole dataset at open and rewrites the file on every save.
/// Stands in for the upstream database in the batch binary and in tests.
pub struct JsonManifestStore {
    path: PathBuf,
    state: Mutex<Dataset>,
}

impl JsonManifestStore {
    /// Opens a store file and parses the dataset.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let raw = std::fs::read_to_string(&path)?;
        let dataset: Dataset = serde_json::from_str(&raw)?;

        Ok(Self {
            path,
            state: Mutex::new(dataset),
        })
    }

    fn with_manifest<R>(
        &self,
        manifest_id: &str,
        update: impl FnOnce(&mut ManifestRecord) -> R,
    ) -> Result<R, StoreError> {
        let mut dataset = self.state.lock().expect("store mutex poisoned");
        let manifest = dataset
            .manifests
            .iter_mut()
            .find(|m| m.id == manifest_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "Manifest",
                id: manifest_id.to_string(),
            })?;

        let result = update(manifest);
        let serialized = serde_json::to_string_pretty(&*dataset)?;
        std::fs::write(&self.path, serialized)?;
        Ok(result)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl ManifestStore for JsonManifestStore {
    async fn manifest(&self, manifest_id: &str) -> Result<ManifestRecord, StoreError> {
        let dataset = self.state.lock().expect("store mutex poisoned");
        dataset
            .manifests
            .iter()
            .find(|m| m.id == manifest_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "Manifest",
                id: manifest_id.to_string(),
            })
    }

    async fn shipment(&self, shipment_id: &str) -> Result<ShipmentRecord, StoreError> {
        let dataset = self.state.lock().expect("store mutex poisoned");
        dataset
            .shipments
            .iter()
            .find(|s| s.id == shipment_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "Shipment",
                id: shipment_id.to_string(),
            })
    }

    async fn container_type(&self, id: &str) -> Result<ContainerTypeRecord, StoreError> {
        let dataset = self.state.lock().expect("store mutex poisoned");
        dataset
            .container_types
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "ContainerType",
                id: id.to_string(),
            })
    }

    async fn item_type(&self, id: &str) -> Result<ItemTypeRecord, StoreError> {
        let dataset = self.state.lock().expect("store mutex poisoned");
        dataset
            .item_types
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "ItemType",
                id: id.to_string(),
            })
    }

    async fn save_packing(
        &self,
        manifest_id: &str,
        output: PackingOutput,
    ) -> Result<(), StoreError> {
        self.with_manifest(manifest_id, |manifest| {
            manifest.status = ManifestStatus::Complete;
            manifest.total_cost = output.total_cost;
            manifest.packing_containers = output.containers;
            manifest.packing_items = output.items;
            manifest.unpacked_items = output.unpacked_items;
            manifest.updated_at_ms = Some(now_ms());
        })
    }

    async fn save_error(&self, manifest_id: &str) -> Result<(), StoreError> {
        self.with_manifest(manifest_id, |manifest| {
            manifest.status = ManifestStatus::Error;
            manifest.updated_at_ms = Some(now_ms());
        })
    }
}
