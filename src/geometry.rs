//! Geometrische Hilfsfunktionen für 3D-Kollisionserkennung und Orientierungssuche.
//!
//! Dieses Modul bietet die Aufzählung der sechs achsenparallelen Rotationen
//! eines Quaders sowie Funktionen zur Überschneidungs- und Enthaltenseinsprüfung
//! zwischen platzierten Objekten.

use crate::model::{Container, PackedItem};
use crate::types::{BoundingBox, Vec3};

/// Anzahl der achsenparallelen Orientierungen eines Quaders.
pub const ORIENTATION_COUNT: usize = 6;

/// Zählt alle sechs achsenparallelen Orientierungen eines Quaders auf.
///
/// Die Reihenfolge ist fest und wird vom Packer als First-Fit-Suchreihenfolge
/// verwendet:
///
/// 1. `(x, y, z)` — Originalausrichtung
/// 2. `(x, z, y)`
/// 3. `(y, x, z)`
/// 4. `(y, z, x)`
/// 5. `(z, x, y)`
/// 6. `(z, y, x)`
///
/// Das Volumen ist für alle sechs Orientierungen identisch.
///
/// # Parameter
/// * `dims` - Intrinsische Abmessungen des Objekts
///
/// # Rückgabewert
/// Alle sechs Dimensionstripel in der dokumentierten Reihenfolge
pub fn orientations(dims: Vec3) -> [Vec3; ORIENTATION_COUNT] {
    let Vec3 { x, y, z } = dims;
    [
        Vec3::new(x, y, z),
        Vec3::new(x, z, y),
        Vec3::new(y, x, z),
        Vec3::new(y, z, x),
        Vec3::new(z, x, y),
        Vec3::new(z, y, x),
    ]
}

/// Prüft, ob zwei platzierte Objekte sich räumlich überschneiden.
///
/// Verwendet Axis-Aligned Bounding Box (AABB) Kollisionserkennung.
/// Zwei Boxen überschneiden sich NICHT, wenn sie in mindestens einer Achse
/// getrennt sind.
///
/// # Parameter
/// * `a` - Erstes platziertes Objekt
/// * `b` - Zweites platziertes Objekt
///
/// # Rückgabewert
/// `true` wenn sich die Objekte überschneiden, sonst `false`
pub fn intersects(a: &PackedItem, b: &PackedItem) -> bool {
    a.bounding_box().intersects(&b.bounding_box())
}

/// Prüft, ob ein platziertes Objekt vollständig im Container liegt.
///
/// # Parameter
/// * `packed` - Das platzierte Objekt
/// * `container` - Der Container
/// * `tolerance` - Numerische Toleranz für den Vergleich
///
/// # Rückgabewert
/// `true` wenn das Objekt den Containerraum nicht verlässt
pub fn contained_in(packed: &PackedItem, container: &Container, tolerance: f64) -> bool {
    let hull = BoundingBox::from_position_and_dims(Vec3::zero(), container.dims);
    hull.contains_box(&packed.bounding_box(), tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, Placement};
    use crate::types::EPSILON_GENERAL;

    fn item(dims: (f64, f64, f64)) -> Item {
        Item::new(
            "item-1".to_string(),
            Vec3::from_tuple(dims),
            1.0,
            Vec::new(),
            "type-1".to_string(),
        )
        .unwrap()
    }

    fn packed(dims: (f64, f64, f64), pos: (f64, f64, f64)) -> PackedItem {
        PackedItem {
            item: item(dims),
            placement: Placement {
                position: Vec3::from_tuple(pos),
                dims: Vec3::from_tuple(dims),
            },
        }
    }

    #[test]
    fn orientations_are_permutations_of_the_same_volume() {
        let dims = Vec3::new(2.0, 3.0, 5.0);
        let all = orientations(dims);

        assert_eq!(all.len(), ORIENTATION_COUNT);
        for orientation in all {
            assert!((orientation.volume() - dims.volume()).abs() < EPSILON_GENERAL);
        }

        // Die erste Orientierung ist immer die Originalausrichtung.
        assert_eq!(all[0], dims);
    }

    #[test]
    fn orientations_are_pairwise_distinct_for_distinct_dims() {
        let all = orientations(Vec3::new(2.0, 3.0, 5.0));
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j]);
            }
        }
    }

    #[test]
    fn detects_overlapping_boxes() {
        let a = packed((10.0, 10.0, 10.0), (0.0, 0.0, 0.0));
        let b = packed((10.0, 10.0, 10.0), (5.0, 5.0, 5.0));
        let c = packed((10.0, 10.0, 10.0), (10.0, 0.0, 0.0));

        assert!(intersects(&a, &b));
        // Berührung an der Kante ist keine Überschneidung.
        assert!(!intersects(&a, &c));
    }

    #[test]
    fn containment_respects_container_bounds() {
        let container = Container::new(
            "c-1".to_string(),
            Vec3::new(20.0, 20.0, 20.0),
            "ct-1".to_string(),
            100.0,
            500.0,
            Vec::new(),
        )
        .unwrap();

        let inside = packed((10.0, 10.0, 10.0), (5.0, 5.0, 5.0));
        let outside = packed((10.0, 10.0, 10.0), (15.0, 0.0, 0.0));

        assert!(contained_in(&inside, &container, EPSILON_GENERAL));
        assert!(!contained_in(&outside, &container, EPSILON_GENERAL));
    }
}
