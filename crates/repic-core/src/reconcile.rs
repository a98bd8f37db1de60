//! Image reconciliation across pickers.

use crate::model::{CoordinateSet, Image, ImageKey};
use std::collections::{BTreeMap, BTreeSet};

/// Images present in every input set, keyed by image key.
///
/// The first set seeds the accumulated key set and every following set
/// intersects against it, in input order. The representative image for a
/// key is cloned from the last set that contributed it. A set without images
/// empties the result; so does an empty input.
///
/// # Examples
///
/// ```
/// use repic_core::model::{CoordinateSet, Dimensionality, Image};
/// use repic_core::reconcile::reconcile_images;
///
/// let a = CoordinateSet::new("a", Dimensionality::Two, 64)
///     .with_images(vec![Image::micrograph("/m/mic1"), Image::micrograph("/m/mic2")]);
/// let b = CoordinateSet::new("b", Dimensionality::Two, 64)
///     .with_images(vec![Image::micrograph("/m/mic2"), Image::micrograph("/m/mic3")]);
///
/// let shared = reconcile_images(&[a, b]);
/// assert_eq!(shared.keys().collect::<Vec<_>>(), vec!["mic2"]);
/// ```
pub fn reconcile_images(sets: &[CoordinateSet]) -> BTreeMap<ImageKey, Image> {
    let mut representatives: BTreeMap<ImageKey, Image> = BTreeMap::new();
    let mut shared: Option<BTreeSet<ImageKey>> = None;

    for set in sets {
        let mut keys = BTreeSet::new();
        for image in &set.images {
            let key = image.key();
            representatives.insert(key.clone(), image.clone());
            keys.insert(key);
        }

        shared = Some(match shared {
            None => keys,
            Some(accumulated) => accumulated.intersection(&keys).cloned().collect(),
        });

        tracing::debug!(
            set = %set.name,
            contributed = set.images.len(),
            remaining = shared.as_ref().map_or(0, BTreeSet::len),
            "intersected picker images"
        );
    }

    shared
        .unwrap_or_default()
        .into_iter()
        .filter_map(|key| representatives.remove_entry(&key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimensionality;

    fn micrographs(name: &str, files: &[&str]) -> CoordinateSet {
        CoordinateSet::new(name, Dimensionality::Two, 64)
            .with_images(files.iter().map(|f| Image::micrograph(*f)).collect())
    }

    fn keys(map: &BTreeMap<ImageKey, Image>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_two_pickers_share_one_image() {
        let a = micrographs("a", &["/m/mic1", "/m/mic2"]);
        let b = micrographs("b", &["/m/mic2", "/m/mic3"]);
        assert_eq!(keys(&reconcile_images(&[a, b])), vec!["mic2"]);
    }

    #[test]
    fn test_order_of_sets_does_not_change_keys() {
        let a = micrographs("a", &["/m/mic1", "/m/mic2", "/m/mic4"]);
        let b = micrographs("b", &["/m/mic2", "/m/mic3", "/m/mic4"]);
        let c = micrographs("c", &["/m/mic4", "/m/mic2", "/m/mic5"]);

        let forward = reconcile_images(&[a.clone(), b.clone(), c.clone()]);
        let backward = reconcile_images(&[c, b, a]);
        assert_eq!(keys(&forward), vec!["mic2", "mic4"]);
        assert_eq!(keys(&forward), keys(&backward));
    }

    #[test]
    fn test_representative_comes_from_last_set() {
        let a = CoordinateSet::new("a", Dimensionality::Two, 64)
            .with_images(vec![Image::micrograph("/first/mic1").with_sampling_rate(1.0)]);
        let b = CoordinateSet::new("b", Dimensionality::Two, 64)
            .with_images(vec![Image::micrograph("/second/mic1").with_sampling_rate(2.0)]);

        let shared = reconcile_images(&[a, b]);
        assert_eq!(shared["mic1"].sampling_rate, Some(2.0));
    }

    #[test]
    fn test_empty_set_empties_result() {
        let a = micrographs("a", &["/m/mic1"]);
        let empty = micrographs("empty", &[]);
        let b = micrographs("b", &["/m/mic1"]);

        assert!(reconcile_images(&[a.clone(), empty.clone(), b.clone()]).is_empty());
        assert!(reconcile_images(&[empty, a, b]).is_empty());
    }

    #[test]
    fn test_no_sets_and_disjoint_sets() {
        assert!(reconcile_images(&[]).is_empty());

        let a = micrographs("a", &["/m/mic1"]);
        let b = micrographs("b", &["/m/mic2"]);
        assert!(reconcile_images(&[a, b]).is_empty());
    }

    #[test]
    fn test_tomograms_keyed_by_series() {
        let a = CoordinateSet::new("a", Dimensionality::Three, 32).with_images(vec![
            Image::tomogram("/a/tomo_1.mrc", "TS_01"),
            Image::tomogram("/a/tomo_2.mrc", "TS_02"),
        ]);
        let b = CoordinateSet::new("b", Dimensionality::Three, 32)
            .with_images(vec![Image::tomogram("/b/other_name.mrc", "TS_02")]);

        let shared = reconcile_images(&[a, b]);
        assert_eq!(keys(&shared), vec!["TS_02"]);
        assert_eq!(shared["TS_02"].file_name.to_str(), Some("/b/other_name.mrc"));
    }
}
