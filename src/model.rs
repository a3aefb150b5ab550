//! Data models for the manifest packing solver.
//!
//! This module defines the fundamental data structures for 3D packing:
//! - `Container`: a packing target with cost, weight limit and feature tags
//! - `Item`: an object to be packed with dimensions, weight and requirements
//! - `Placement` / `PackedItem`: the packing outcome, kept separate from the
//!   immutable item value
//! - the per-algorithm, per-container and per-sequence result types
//!
//! Items are immutable once constructed; packing never mutates them. The
//! outcome of a pack lives in `Placement` records next to the item, which is
//! what allows concurrent algorithm runs to share one item list.

use crate::algorithm::Algorithm;
use crate::types::{BoundingBox, Dimensional, Positioned, Vec3, Weighted};

/// Validation error for entity data.
#[derive(Debug, Clone)]
pub enum ValidationError {
    InvalidDimension(String),
    InvalidWeight(String),
    InvalidCost(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
            ValidationError::InvalidWeight(msg) => write!(f, "Invalid weight: {}", msg),
            ValidationError::InvalidCost(msg) => write!(f, "Invalid cost: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Helper function to validate a dimension triple.
fn validate_dims(dims: Vec3, what: &str) -> Result<(), ValidationError> {
    if !dims.is_valid_dimension() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} dimensions must be positive and finite, got: ({}, {}, {})",
            what, dims.x, dims.y, dims.z
        )));
    }
    Ok(())
}

/// Helper function to validate a weight value.
fn validate_weight_value(value: f64, what: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidWeight(format!(
            "{} must be positive, got: {}",
            what, value
        )));
    }
    Ok(())
}

/// Helper function to validate a monetary cost.
fn validate_cost_value(value: f64) -> Result<(), ValidationError> {
    if value < 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidCost(format!(
            "Cost must be non-negative, got: {}",
            value
        )));
    }
    Ok(())
}

/// The container to pack items into.
///
/// Immutable once constructed for a given pack attempt.
///
/// # Fields
/// * `id` - Unique identifier of this container unit
/// * `dims` - Interior dimensions (length, width, height) mapped to (x, y, z)
/// * `volume` - Derived volume, computed once at construction
/// * `container_type_id` - Reference to the container type this unit came from
/// * `cost` - Monetary cost of using this container
/// * `max_weight` - Maximum payload weight in kg
/// * `features` - Capability tags (e.g. "refrigerated")
#[derive(Clone, Debug)]
pub struct Container {
    pub id: String,
    pub dims: Vec3,
    pub volume: f64,
    pub container_type_id: String,
    pub cost: f64,
    pub max_weight: f64,
    pub features: Vec<String>,
}

impl Container {
    /// Creates a new container with validation.
    ///
    /// # Parameters
    /// * `id` - Unique identifier
    /// * `dims` - Interior dimensions (length, width, height)
    /// * `container_type_id` - Container type reference
    /// * `cost` - Monetary cost
    /// * `max_weight` - Maximum payload weight
    /// * `features` - Supported feature tags
    pub fn new(
        id: String,
        dims: Vec3,
        container_type_id: String,
        cost: f64,
        max_weight: f64,
        features: Vec<String>,
    ) -> Result<Self, ValidationError> {
        validate_dims(dims, "Container")?;
        validate_weight_value(max_weight, "Maximum payload weight")?;
        validate_cost_value(cost)?;

        Ok(Self {
            id,
            dims,
            volume: dims.volume(),
            container_type_id,
            cost,
            max_weight,
            features,
        })
    }

    /// Checks whether the container supports every required feature of an item.
    pub fn supports_features(&self, item: &Item) -> bool {
        item.required_features
            .iter()
            .all(|required| self.features.iter().any(|f| f == required))
    }
}

impl Dimensional for Container {
    fn dimensions(&self) -> Vec3 {
        self.dims
    }
}

/// An item to be packed.
///
/// The item is an immutable value: the packing outcome is recorded in a
/// separate [`Placement`], never written back into the item. `volume` is
/// computed once from the intrinsic dimensions and is invariant across
/// orientation changes.
///
/// # Fields
/// * `id` - Unique identifier of this item unit
/// * `dims` - Intrinsic dimensions, pre-orientation
/// * `volume` - Derived volume, computed once at construction
/// * `weight` - Weight in kg
/// * `required_features` - Feature tags the container must support
/// * `item_type_id` - Reference to the item type this unit came from
#[derive(Clone, Debug)]
pub struct Item {
    pub id: String,
    pub dims: Vec3,
    pub volume: f64,
    pub weight: f64,
    pub required_features: Vec<String>,
    pub item_type_id: String,
}

impl Item {
    /// Creates a new item with validation.
    ///
    /// # Examples
    /// ```
    /// use stow_it_now::model::Item;
    /// use stow_it_now::types::Vec3;
    ///
    /// let item = Item::new(
    ///     "unit-1".to_string(),
    ///     Vec3::new(10.0, 20.0, 30.0),
    ///     5.0,
    ///     Vec::new(),
    ///     "type-1".to_string(),
    /// );
    /// assert!(item.is_ok());
    /// ```
    pub fn new(
        id: String,
        dims: Vec3,
        weight: f64,
        required_features: Vec<String>,
        item_type_id: String,
    ) -> Result<Self, ValidationError> {
        validate_dims(dims, "Item")?;
        validate_weight_value(weight, "Item weight")?;

        Ok(Self {
            id,
            dims,
            volume: dims.volume(),
            weight,
            required_features,
            item_type_id,
        })
    }
}

impl Dimensional for Item {
    fn dimensions(&self) -> Vec3 {
        self.dims
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

impl Weighted for Item {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// The packing outcome for one item within one container.
///
/// `position` is the lower left front corner of the placed item, relative to
/// the container's reference corner. The midpoint-origin convention of the
/// persistence boundary is applied later, never here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub dims: Vec3,
}

/// An item together with its placement in a container.
#[derive(Clone, Debug)]
pub struct PackedItem {
    pub item: Item,
    pub placement: Placement,
}

impl PackedItem {
    /// Calculates the bounding box of the placed item.
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(self.placement.position, self.placement.dims)
    }
}

impl Positioned for PackedItem {
    fn position(&self) -> Vec3 {
        self.placement.position
    }
}

impl Dimensional for PackedItem {
    fn dimensions(&self) -> Vec3 {
        self.placement.dims
    }

    fn volume(&self) -> f64 {
        self.item.volume
    }
}

impl Weighted for PackedItem {
    fn weight(&self) -> f64 {
        self.item.weight
    }
}

/// Result of one algorithm run against one container.
#[derive(Clone, Debug)]
pub struct AlgorithmPackingResult {
    pub algorithm: Algorithm,
    /// True iff the unpacked list is empty.
    pub is_complete_pack: bool,
    pub packed_items: Vec<PackedItem>,
    pub unpacked_items: Vec<Item>,
    pub pack_time_ms: u64,
    /// Percent of the container volume filled by packed items.
    pub percent_container_volume_packed: f64,
    /// Percent of the attempted item volume that ended up packed.
    pub percent_item_volume_packed: f64,
}

impl AlgorithmPackingResult {
    /// Sum of the volumes of all packed items.
    pub fn packed_volume(&self) -> f64 {
        self.packed_items.iter().map(|p| p.item.volume).sum()
    }

    /// Sum of the volumes of all unpacked items.
    pub fn unpacked_volume(&self) -> f64 {
        self.unpacked_items.iter().map(|i| i.volume).sum()
    }

    /// Sum of the weights of all packed items.
    pub fn packed_weight(&self) -> f64 {
        self.packed_items.iter().map(|p| p.item.weight).sum()
    }
}

/// All algorithm results for one container, ordered by algorithm name.
#[derive(Clone, Debug)]
pub struct ContainerPackingResult {
    pub container_id: String,
    pub algorithm_results: Vec<AlgorithmPackingResult>,
}

impl ContainerPackingResult {
    /// The result used by the surrounding container sequence.
    ///
    /// Always the first entry after the deterministic name sort.
    pub fn primary_result(&self) -> &AlgorithmPackingResult {
        &self.algorithm_results[0]
    }
}

/// Result of packing one container sequence.
///
/// One entry per container actually used, in sequence order, plus the
/// residual unpacked items after the whole sequence.
#[derive(Clone, Debug)]
pub struct PackingResult {
    pub results: Vec<ContainerPackingResult>,
    pub unpacked_items: Vec<Item>,
}

impl PackingResult {
    /// Indicates whether every item of the request was packed.
    pub fn is_complete(&self) -> bool {
        self.unpacked_items.is_empty()
    }

    /// Returns the number of containers used by this result.
    pub fn container_count(&self) -> usize {
        self.results.len()
    }

    /// IDs of the containers actually used, in sequence order.
    pub fn used_container_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|r| r.container_id.as_str())
            .collect()
    }
}
