//! Packing algorithm identities and dispatch.
//!
//! Both variants share the decomposition engine in `packer` and differ only
//! in item priority. The name strings double as the deterministic sort key
//! for per-container result lists.

use crate::cancel::CancelToken;
use crate::error::SolverError;
use crate::model::{AlgorithmPackingResult, Container, Item};
use crate::packer::{PackPriority, PackerConfig, pack_single_container};

/// The packing algorithm variants known to the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Decomposition packer, largest items first.
    DecompositionVolumeFirst,
    /// Decomposition packer, heaviest items first.
    DecompositionWeightFirst,
}

impl Algorithm {
    /// Every known algorithm variant.
    pub const ALL: [Algorithm; 2] = [
        Algorithm::DecompositionVolumeFirst,
        Algorithm::DecompositionWeightFirst,
    ];

    /// Resolves an algorithm from its numeric type id.
    ///
    /// Unknown ids are an input error and fail the request.
    pub fn from_id(id: u32) -> Result<Self, SolverError> {
        match id {
            1 => Ok(Algorithm::DecompositionVolumeFirst),
            2 => Ok(Algorithm::DecompositionWeightFirst),
            other => Err(SolverError::Input(format!(
                "Invalid algorithm type id: {}",
                other
            ))),
        }
    }

    /// Numeric type id of the variant.
    pub fn id(self) -> u32 {
        match self {
            Algorithm::DecompositionVolumeFirst => 1,
            Algorithm::DecompositionWeightFirst => 2,
        }
    }

    /// Stable display name, used for deterministic result ordering.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::DecompositionVolumeFirst => "decomposition-volume-first",
            Algorithm::DecompositionWeightFirst => "decomposition-weight-first",
        }
    }

    /// The item priority this variant packs with.
    fn priority(self) -> PackPriority {
        match self {
            Algorithm::DecompositionVolumeFirst => PackPriority::VolumeDescending,
            Algorithm::DecompositionWeightFirst => PackPriority::WeightDescending,
        }
    }

    /// Runs the variant against one container.
    ///
    /// Timing and percentage metrics are filled in by the runner afterwards;
    /// the algorithm itself only produces the packed/unpacked partition.
    pub fn run(
        self,
        container: &Container,
        items: &[Item],
        config: &PackerConfig,
        cancel: &CancelToken,
    ) -> AlgorithmPackingResult {
        let pack = pack_single_container(container, items, self.priority(), config, cancel);

        AlgorithmPackingResult {
            algorithm: self,
            is_complete_pack: pack.unpacked.is_empty(),
            packed_items: pack.packed,
            unpacked_items: pack.unpacked,
            pack_time_ms: 0,
            percent_container_volume_packed: 0.0,
            percent_item_volume_packed: 0.0,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_ids() {
        assert_eq!(
            Algorithm::from_id(1).unwrap(),
            Algorithm::DecompositionVolumeFirst
        );
        assert_eq!(
            Algorithm::from_id(2).unwrap(),
            Algorithm::DecompositionWeightFirst
        );
        for algo in Algorithm::ALL {
            assert_eq!(Algorithm::from_id(algo.id()).unwrap(), algo);
        }
    }

    #[test]
    fn rejects_unknown_id() {
        assert!(matches!(
            Algorithm::from_id(99),
            Err(SolverError::Input(_))
        ));
    }

    #[test]
    fn names_are_distinct_and_sortable() {
        let mut names: Vec<_> = Algorithm::ALL.iter().map(|a| a.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Algorithm::ALL.len());
    }
}
