//! Zerlegungsbasierter Packalgorithmus für einen einzelnen Container.
//!
//! Dieses Modul implementiert eine konstruktive Heuristik zur Platzierung
//! von Objekten in einem Container unter Berücksichtigung von:
//! - Gewichtsgrenze des Containers
//! - Feature-Kompatibilität (benötigte Features ⊆ Container-Features)
//! - Freiraum-Zerlegung (Guillotine-Schnitt in bis zu drei Teilräume)
//!
//! Der Algorithmus ist bewusst nicht kombinatorisch: jedes Objekt wird genau
//! einmal versucht, ohne Backtracking. Die kombinatorische Suche findet
//! ausschließlich in der äußeren Permutationsschleife statt.

use std::cmp::Ordering;

use crate::cancel::CancelToken;
use crate::geometry::orientations;
use crate::model::{Container, Item, PackedItem, Placement};
use crate::types::{EPSILON_GENERAL, Vec3};

/// Konfiguration für den Packalgorithmus.
///
/// Enthält die Toleranzen zur Steuerung des Platzierungsverhaltens.
#[derive(Copy, Clone, Debug)]
pub struct PackerConfig {
    /// Allgemeine numerische Toleranz für Passform- und Gewichtsvergleiche
    pub general_epsilon: f64,
    /// Mindestausdehnung eines Teilraums; kleinere Reste werden verworfen
    pub min_space_dim: f64,
}

impl PackerConfig {
    pub const DEFAULT_GENERAL_EPSILON: f64 = EPSILON_GENERAL;
    pub const DEFAULT_MIN_SPACE_DIM: f64 = 1e-6;

    /// Erstellt einen Builder für benutzerdefinierte Konfiguration.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::default()
    }
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            general_epsilon: Self::DEFAULT_GENERAL_EPSILON,
            min_space_dim: Self::DEFAULT_MIN_SPACE_DIM,
        }
    }
}

/// Builder für PackerConfig.
#[derive(Clone, Debug)]
pub struct PackerConfigBuilder {
    config: PackerConfig,
}

impl Default for PackerConfigBuilder {
    fn default() -> Self {
        Self {
            config: PackerConfig::default(),
        }
    }
}

impl PackerConfigBuilder {
    /// Setzt die allgemeine Toleranz.
    pub fn general_epsilon(mut self, epsilon: f64) -> Self {
        self.config.general_epsilon = epsilon;
        self
    }

    /// Setzt die Mindestausdehnung für Teilräume.
    pub fn min_space_dim(mut self, min: f64) -> Self {
        self.config.min_space_dim = min;
        self
    }

    /// Erstellt die finale Konfiguration.
    pub fn build(self) -> PackerConfig {
        self.config
    }
}

/// Sortierpriorität der Objekte vor der Platzierung.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackPriority {
    /// Große Objekte zuerst (Standard, verbessert die Raumausnutzung)
    VolumeDescending,
    /// Schwere Objekte zuerst
    WeightDescending,
}

impl PackPriority {
    /// Sortiert die Objekte absteigend nach der Priorität.
    ///
    /// Die Sortierung ist stabil: bei Gleichstand bleibt die
    /// Eingabereihenfolge erhalten.
    fn order(self, items: &[Item]) -> Vec<Item> {
        let mut ordered = items.to_vec();
        match self {
            PackPriority::VolumeDescending => ordered.sort_by(|a, b| {
                b.volume
                    .partial_cmp(&a.volume)
                    .unwrap_or(Ordering::Equal)
            }),
            PackPriority::WeightDescending => ordered.sort_by(|a, b| {
                b.weight
                    .partial_cmp(&a.weight)
                    .unwrap_or(Ordering::Equal)
            }),
        }
        ordered
    }
}

/// Ein achsenparalleler leerer Teilraum innerhalb des Containers.
///
/// Verankert an seiner unteren linken vorderen Ecke, mit den verbleibenden
/// Ausdehnungen entlang der drei Achsen.
#[derive(Clone, Copy, Debug)]
struct FreeSpace {
    origin: Vec3,
    dims: Vec3,
}

/// Ergebnis eines einzelnen Container-Packlaufs.
#[derive(Clone, Debug)]
pub struct SingleContainerPack {
    pub packed: Vec<PackedItem>,
    pub unpacked: Vec<Item>,
}

/// Packt Objekte in einen einzelnen Container.
///
/// Die Objekte werden nach der Priorität sortiert und nacheinander in die
/// Freiraummenge eingepasst (zuletzt erzeugte Teilräume zuerst, alle sechs
/// Orientierungen in der dokumentierten Reihenfolge, First-Fit). Jede
/// erfolgreiche Platzierung zerlegt den verbrauchten Freiraum per
/// Guillotine-Schnitt in bis zu drei neue Teilräume.
///
/// Objekte, deren benötigte Features der Container nicht unterstützt oder
/// deren Gewicht die Restkapazität überschreitet, werden ohne geometrischen
/// Versuch als unverpackt markiert. Geometrische Unplatzierbarkeit ist kein
/// Fehler, sondern das normale "unverpackt"-Ergebnis.
///
/// # Parameter
/// * `container` - Der Zielcontainer
/// * `items` - Die zu verpackenden Objekte
/// * `priority` - Sortierpriorität der Objekte
/// * `config` - Konfigurationsparameter
/// * `cancel` - Kooperatives Abbruchsignal, geprüft zwischen Platzierungen
///
/// # Rückgabewert
/// Partition der Eingabe in verpackte und unverpackte Objekte
pub fn pack_single_container(
    container: &Container,
    items: &[Item],
    priority: PackPriority,
    config: &PackerConfig,
    cancel: &CancelToken,
) -> SingleContainerPack {
    let mut packed: Vec<PackedItem> = Vec::new();
    let mut unpacked: Vec<Item> = Vec::new();

    let mut spaces = vec![FreeSpace {
        origin: Vec3::zero(),
        dims: container.dims,
    }];

    let mut packed_weight = 0.0;
    let ordered = priority.order(items);

    for (index, item) in ordered.iter().enumerate() {
        if cancel.is_cancelled() {
            unpacked.extend(ordered[index..].iter().cloned());
            break;
        }

        // Degenerierte Eingaben sind niemals platzierbar.
        if !item.dims.is_valid_dimension() {
            unpacked.push(item.clone());
            continue;
        }

        if !container.supports_features(item) {
            unpacked.push(item.clone());
            continue;
        }

        if packed_weight + item.weight > container.max_weight + config.general_epsilon {
            unpacked.push(item.clone());
            continue;
        }

        match find_placement(&spaces, item, config) {
            Some((space_index, placement)) => {
                let space = spaces.remove(space_index);
                push_split_spaces(&mut spaces, &space, placement.dims, config.min_space_dim);

                packed_weight += item.weight;
                packed.push(PackedItem {
                    item: item.clone(),
                    placement,
                });
            }
            None => unpacked.push(item.clone()),
        }
    }

    SingleContainerPack { packed, unpacked }
}

/// Sucht den ersten passenden Teilraum und die erste passende Orientierung.
///
/// Teilräume werden in umgekehrter Erzeugungsreihenfolge durchsucht (zuletzt
/// erzeugte zuerst), Orientierungen in der festen Reihenfolge aus
/// [`orientations`]. First-Fit: die erste Kombination gewinnt.
fn find_placement(
    spaces: &[FreeSpace],
    item: &Item,
    config: &PackerConfig,
) -> Option<(usize, Placement)> {
    for space_index in (0..spaces.len()).rev() {
        let space = &spaces[space_index];
        for orientation in orientations(item.dims) {
            if orientation.fits_within(&space.dims, config.general_epsilon) {
                return Some((
                    space_index,
                    Placement {
                        position: space.origin,
                        dims: orientation,
                    },
                ));
            }
        }
    }
    None
}

/// Zerlegt einen verbrauchten Freiraum per Guillotine-Schnitt.
///
/// Es entstehen bis zu drei disjunkte Teilräume jenseits der Stellfläche des
/// platzierten Objekts: der Rest entlang X, der Rest entlang Y über der
/// Stellflächenbreite und der Rest entlang Z direkt über dem Objekt. Die
/// Teilräume werden in dieser Reihenfolge eingefügt; der Z-Rest ist damit
/// der zuletzt erzeugte und wird als nächstes durchsucht.
///
/// Teilräume mit einer Ausdehnung unterhalb von `min_dim` werden verworfen.
fn push_split_spaces(spaces: &mut Vec<FreeSpace>, consumed: &FreeSpace, placed: Vec3, min_dim: f64) {
    let candidates = [
        FreeSpace {
            origin: consumed.origin + Vec3::new(placed.x, 0.0, 0.0),
            dims: Vec3::new(consumed.dims.x - placed.x, consumed.dims.y, consumed.dims.z),
        },
        FreeSpace {
            origin: consumed.origin + Vec3::new(0.0, placed.y, 0.0),
            dims: Vec3::new(placed.x, consumed.dims.y - placed.y, consumed.dims.z),
        },
        FreeSpace {
            origin: consumed.origin + Vec3::new(0.0, 0.0, placed.z),
            dims: Vec3::new(placed.x, placed.y, consumed.dims.z - placed.z),
        },
    ];

    for candidate in candidates {
        if candidate.dims.x > min_dim && candidate.dims.y > min_dim && candidate.dims.z > min_dim {
            spaces.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{contained_in, intersects};

    fn container(dims: (f64, f64, f64), max_weight: f64, features: &[&str]) -> Container {
        Container::new(
            "c-1".to_string(),
            Vec3::from_tuple(dims),
            "ct-1".to_string(),
            50.0,
            max_weight,
            features.iter().map(|f| f.to_string()).collect(),
        )
        .unwrap()
    }

    fn item(id: &str, dims: (f64, f64, f64), weight: f64) -> Item {
        Item::new(
            id.to_string(),
            Vec3::from_tuple(dims),
            weight,
            Vec::new(),
            "t-1".to_string(),
        )
        .unwrap()
    }

    fn pack(container: &Container, items: &[Item]) -> SingleContainerPack {
        pack_single_container(
            container,
            items,
            PackPriority::VolumeDescending,
            &PackerConfig::default(),
            &CancelToken::new(),
        )
    }

    #[test]
    fn packs_three_half_cubes_into_cube() {
        let cont = container((1000.0, 1000.0, 1000.0), 1000.0, &[]);
        let items = vec![
            item("a", (500.0, 500.0, 500.0), 10.0),
            item("b", (500.0, 500.0, 500.0), 10.0),
            item("c", (500.0, 500.0, 500.0), 10.0),
        ];

        let result = pack(&cont, &items);
        assert_eq!(result.packed.len(), 3, "alle drei Objekte müssen passen");
        assert!(result.unpacked.is_empty());

        for a in &result.packed {
            assert!(contained_in(a, &cont, EPSILON_GENERAL));
            for b in &result.packed {
                if a.item.id != b.item.id {
                    assert!(!intersects(a, b));
                }
            }
        }
    }

    #[test]
    fn oversized_item_is_unpacked_not_an_error() {
        let cont = container((100.0, 100.0, 100.0), 1000.0, &[]);
        let items = vec![item("big", (200.0, 50.0, 50.0), 5.0)];

        let result = pack(&cont, &items);
        assert!(result.packed.is_empty());
        assert_eq!(result.unpacked.len(), 1);
        assert_eq!(result.unpacked[0].id, "big");
    }

    #[test]
    fn rotates_item_to_fit() {
        let cont = container((5.0, 12.0, 5.0), 100.0, &[]);
        let items = vec![item("rotate-me", (12.0, 5.0, 5.0), 5.0)];

        let result = pack(&cont, &items);
        assert_eq!(result.packed.len(), 1);

        let placement = result.packed[0].placement;
        assert_eq!(placement.dims, Vec3::new(5.0, 12.0, 5.0));
        // Das Volumen bleibt über die Rotation erhalten.
        assert!(
            (placement.dims.volume() - result.packed[0].item.volume).abs() < EPSILON_GENERAL
        );
    }

    #[test]
    fn missing_feature_skips_geometric_attempt() {
        let cont = container((100.0, 100.0, 100.0), 1000.0, &[]);
        let mut cold = item("cold", (10.0, 10.0, 10.0), 5.0);
        cold.required_features = vec!["refrigerated".to_string()];

        let result = pack(&cont, &[cold]);
        assert!(result.packed.is_empty());
        assert_eq!(result.unpacked.len(), 1);
    }

    #[test]
    fn feature_superset_is_accepted() {
        let cont = container((100.0, 100.0, 100.0), 1000.0, &["refrigerated", "padded"]);
        let mut cold = item("cold", (10.0, 10.0, 10.0), 5.0);
        cold.required_features = vec!["refrigerated".to_string()];

        let result = pack(&cont, &[cold]);
        assert_eq!(result.packed.len(), 1);
    }

    #[test]
    fn respects_cumulative_weight_limit() {
        let cont = container((100.0, 100.0, 100.0), 25.0, &[]);
        let items = vec![
            item("a", (10.0, 10.0, 10.0), 10.0),
            item("b", (10.0, 10.0, 10.0), 10.0),
            item("c", (10.0, 10.0, 10.0), 10.0),
        ];

        let result = pack(&cont, &items);
        assert_eq!(result.packed.len(), 2);
        assert_eq!(result.unpacked.len(), 1);

        let total: f64 = result.packed.iter().map(|p| p.item.weight).sum();
        assert!(total <= cont.max_weight + EPSILON_GENERAL);
    }

    #[test]
    fn stacks_into_most_recent_space_first() {
        let cont = container((10.0, 10.0, 20.0), 100.0, &[]);
        let items = vec![
            item("bottom", (10.0, 10.0, 10.0), 5.0),
            item("top", (10.0, 10.0, 10.0), 5.0),
        ];

        let result = pack(&cont, &items);
        assert_eq!(result.packed.len(), 2);

        // Der erste Würfel füllt die Grundfläche; nur der Z-Rest bleibt übrig.
        assert_eq!(result.packed[0].placement.position, Vec3::zero());
        assert_eq!(result.packed[1].placement.position, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn volume_priority_places_large_items_first() {
        let cont = container((10.0, 10.0, 10.0), 100.0, &[]);
        let items = vec![
            item("small", (2.0, 2.0, 2.0), 1.0),
            item("large", (8.0, 8.0, 8.0), 1.0),
        ];

        let result = pack(&cont, &items);
        assert_eq!(result.packed[0].item.id, "large");
    }

    #[test]
    fn weight_priority_places_heavy_items_first() {
        let cont = container((10.0, 10.0, 10.0), 100.0, &[]);
        let items = vec![
            item("light", (2.0, 2.0, 2.0), 1.0),
            item("heavy", (2.0, 2.0, 2.0), 9.0),
        ];

        let result = pack_single_container(
            &cont,
            &items,
            PackPriority::WeightDescending,
            &PackerConfig::default(),
            &CancelToken::new(),
        );
        assert_eq!(result.packed[0].item.id, "heavy");
    }

    #[test]
    fn equal_priority_keeps_input_order() {
        let cont = container((100.0, 100.0, 100.0), 1000.0, &[]);
        let items = vec![
            item("first", (10.0, 10.0, 10.0), 5.0),
            item("second", (10.0, 10.0, 10.0), 5.0),
            item("third", (10.0, 10.0, 10.0), 5.0),
        ];

        let result = pack(&cont, &items);
        let order: Vec<_> = result.packed.iter().map(|p| p.item.id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        let cont = container((50.0, 50.0, 50.0), 60.0, &[]);
        let mut items = Vec::new();
        for i in 0..20 {
            items.push(item(
                &format!("i-{}", i),
                (20.0 + i as f64, 15.0, 10.0),
                7.0,
            ));
        }

        let result = pack(&cont, &items);
        assert_eq!(result.packed.len() + result.unpacked.len(), items.len());

        let mut seen: Vec<&str> = result
            .packed
            .iter()
            .map(|p| p.item.id.as_str())
            .chain(result.unpacked.iter().map(|i| i.id.as_str()))
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), items.len(), "kein Objekt doppelt oder verloren");
    }

    #[test]
    fn packed_dims_are_a_permutation_of_item_dims() {
        let cont = container((30.0, 20.0, 10.0), 100.0, &[]);
        let items = vec![item("a", (10.0, 30.0, 20.0), 5.0)];

        let result = pack(&cont, &items);
        assert_eq!(result.packed.len(), 1);

        let packed = &result.packed[0];
        let mut intrinsic = [packed.item.dims.x, packed.item.dims.y, packed.item.dims.z];
        let mut oriented = [
            packed.placement.dims.x,
            packed.placement.dims.y,
            packed.placement.dims.z,
        ];
        intrinsic.sort_by(|a, b| a.partial_cmp(b).unwrap());
        oriented.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(intrinsic, oriented);
    }

    #[test]
    fn cancelled_token_leaves_everything_unpacked() {
        let cont = container((100.0, 100.0, 100.0), 1000.0, &[]);
        let items = vec![
            item("a", (10.0, 10.0, 10.0), 5.0),
            item("b", (10.0, 10.0, 10.0), 5.0),
        ];

        let token = CancelToken::new();
        token.cancel();

        let result = pack_single_container(
            &cont,
            &items,
            PackPriority::VolumeDescending,
            &PackerConfig::default(),
            &token,
        );
        assert!(result.packed.is_empty());
        assert_eq!(result.unpacked.len(), 2);
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let cont = container((40.0, 40.0, 40.0), 500.0, &[]);
        let items: Vec<_> = (0..12)
            .map(|i| item(&format!("i-{}", i), (10.0 + (i % 4) as f64, 12.0, 9.0), 3.0))
            .collect();

        let first = pack(&cont, &items);
        let second = pack(&cont, &items);

        assert_eq!(first.packed.len(), second.packed.len());
        for (a, b) in first.packed.iter().zip(second.packed.iter()) {
            assert_eq!(a.item.id, b.item.id);
            assert_eq!(a.placement, b.placement);
        }
    }
}
