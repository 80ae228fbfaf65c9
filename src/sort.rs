//! The sorting stages: extrema scan, classification, class boundaries, cycle
//! permutation and the final insertion sort.

use core::{cmp::Ordering, mem};

use alloc::{vec, vec::Vec};
use log::{debug, trace};

use crate::{error::ConfigError, key::Key};

/// Fraction of the slice length used as the number of classes, unless
/// configured otherwise.
pub const DEFAULT_CLASSIFICATION_RATIO: f64 = 0.45;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    classification_ratio: f64,
}

impl Config {
    pub const fn with_default_ratio() -> Self {
        Self {
            classification_ratio: DEFAULT_CLASSIFICATION_RATIO,
        }
    }

    /// Validates the ratio, it has to be in the open interval `(0, 1)`.
    pub fn with_classification_ratio(classification_ratio: f64) -> Result<Self, ConfigError> {
        // Written so that NaN fails as well.
        if classification_ratio > 0.0 && classification_ratio < 1.0 {
            Ok(Self {
                classification_ratio,
            })
        } else {
            debug!("rejected classification ratio {}", classification_ratio);
            Err(ConfigError::InvalidClassificationRatio(classification_ratio))
        }
    }

    pub const fn classification_ratio(&self) -> f64 {
        self.classification_ratio
    }

    /// Number of classes used for a slice of length `len`, at least one.
    pub fn class_count(&self, len: usize) -> usize {
        ((self.classification_ratio * len as f64) as usize).max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_default_ratio()
    }
}

/// Dispatches the sort. Slices which are trivially sorted are not touched.
pub(crate) fn dispatch_sort<T, K, F>(slice: &mut [T], key_fn: F, config: Config)
where
    K: Key,
    F: FnMut(&T) -> K,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if mem::size_of::<T>() == 0 {
        return;
    }

    if slice.len() < 2 {
        return;
    }

    sort(slice, key_fn, config);
}

/// Sorts the slice based on the keys returned by the key function.
///
/// # Panics
///
/// Panics on a best effort basis if the key function returned different keys
/// when called repeatedly with the same parameter.
#[inline(never)]
fn sort<T, K, F>(input: &mut [T], mut key_fn: F, config: Config)
where
    K: Key,
    F: FnMut(&T) -> K,
{
    let (min, max_index) = find_extrema(input, &mut key_fn);
    let max = key_fn(&input[max_index]);

    // All keys are equal. Must be caught here, the classifier would divide by
    // a zero range.
    if max.compare(&min) == Ordering::Equal {
        trace!("all {} keys are equal, skipping the sort", input.len());
        return;
    }

    let class_count = config.class_count(input.len());
    trace!(
        "distributing {} elements into {} classes",
        input.len(),
        class_count
    );

    let classifier = Classifier::new(min, max, class_count);

    let mut class_ends = calc_class_sizes(input, &classifier, &mut key_fn);
    convert_class_sizes_to_ends(&mut class_ends);

    if let Err(()) = permute(input, &mut class_ends, &classifier, &mut key_fn) {
        // The class sizes do not match the keys seen while permuting, the key
        // function is unreliable (programming mistake).
        panic!(
            "The key function is not reliable: when called repeatedly, \
            it returned different keys for the same element."
        )
    }

    insertion_sort(input, &mut key_fn);
}

/// Finds the smallest key and the index of a largest element in a single
/// pass. Ties are resolved by the first occurrence.
///
/// The slice must not be empty.
fn find_extrema<T, K, F>(input: &[T], mut key_fn: F) -> (K, usize)
where
    K: Key,
    F: FnMut(&T) -> K,
{
    let first = key_fn(&input[0]);
    let mut min = first;
    let mut max = first;
    let mut max_index = 0;

    for (index, t) in input.iter().enumerate().skip(1) {
        let key = key_fn(t);
        if key.compare(&min) == Ordering::Less {
            min = key;
        }
        if key.compare(&max) == Ordering::Greater {
            max = key;
            max_index = index;
        }
    }

    (min, max_index)
}

/// Maps keys to classes by their distance from the smallest key.
///
/// ```plaintext
/// class = floor(distance(key, min) * (class_count - 1) / distance(max, min))
/// ```
///
/// The result is always a valid class index. The minimum goes to the first
/// class, the maximum to the last one, and anything the float arithmetic does
/// not place in between (rounding, infinities, NaN) is clamped.
pub(crate) struct Classifier<K> {
    min: K,
    range: f64,
    scale: f64,
    last_class: usize,
}

impl<K: Key> Classifier<K> {
    /// Creates the classifier. `class_count` must be at least one.
    pub(crate) fn new(min: K, max: K, class_count: usize) -> Self {
        let last_class = class_count - 1;
        let range = max.distance(min);
        Self {
            min,
            range,
            scale: last_class as f64 / range,
            last_class,
        }
    }

    #[inline(always)]
    pub(crate) fn classify(&self, key: K) -> usize {
        let distance = key.distance(self.min);
        if distance >= self.range {
            return self.last_class;
        }
        // Saturating cast, negative numbers and NaN become zero.
        ((distance * self.scale) as usize).min(self.last_class)
    }

    pub(crate) fn class_count(&self) -> usize {
        self.last_class + 1
    }
}

/// Calculates the class sizes.
fn calc_class_sizes<T, K, F>(input: &[T], classifier: &Classifier<K>, mut key_fn: F) -> Vec<usize>
where
    K: Key,
    F: FnMut(&T) -> K,
{
    let mut class_sizes = vec![0; classifier.class_count()];
    for t in input.iter() {
        class_sizes[classifier.classify(key_fn(t))] += 1;
    }
    class_sizes
}

/// Turns the class sizes in-place into class ends (exclusive) by calculating
/// a prefix sum.
///
/// ```plaintext
/// Sizes:     |---c1---|-c2-|---c3---|----c4----|
/// Ends:               c1   c1+c2    c1+c2+c3   len
/// ```
fn convert_class_sizes_to_ends(class_sizes: &mut [usize]) {
    let mut end_acc = 0;
    for size in class_sizes.iter_mut() {
        end_acc += *size;
        *size = end_acc;
    }
}

/// Moves every element into the range of its class by following cycles.
///
/// The element being carried always sits at `scan`. It is swapped with the
/// slot just below the end of its class, the end moves down by one, and the
/// element that was in that slot is carried on. The cycle closes when an
/// element is placed at `scan` itself.
///
/// ```plaintext
/// class:        0     1      2
///            |-----|-----|--------|
/// ends:            ^     ^        ^   next free slot of a class is end - 1
/// ```
///
/// Elements left of `scan` are in place. An element at `scan` is in place if
/// `scan` is at or above the current end of its class. Once all but one
/// element have been moved, the last one is in place as well.
///
/// Afterwards the slice consists of runs of elements of the same class,
/// ordered by class. The runs are not sorted.
///
/// Returns an error if the classes of the elements do not add up to the
/// class sizes, i.e. the key function is unreliable. The slice is still a
/// permutation of the input in that case.
fn permute<T, K, F>(
    input: &mut [T],
    class_ends: &mut [usize],
    classifier: &Classifier<K>,
    mut key_fn: F,
) -> Result<(), ()>
where
    K: Key,
    F: FnMut(&T) -> K,
{
    let len = input.len();
    let mut moved = 0;
    let mut scan = 0;
    let mut class = class_ends.len() - 1;

    while moved < len - 1 {
        // Skip the elements which are already in place.
        while scan >= class_ends[class] {
            scan += 1;
            if scan == len {
                return Err(());
            }
            class = classifier.classify(key_fn(&input[scan]));
        }

        while scan != class_ends[class] {
            class = classifier.classify(key_fn(&input[scan]));
            let end = &mut class_ends[class];
            if *end == 0 {
                return Err(());
            }
            *end -= 1;
            input.swap(scan, *end);
            moved += 1;
        }
    }

    Ok(())
}

/// Sorts the slice with insertion sort. Each element is rotated into place
/// past all the strictly greater elements before it.
///
/// Quadratic in general, but close to linear after `permute`, since then
/// every element is at most a class away from its final position.
fn insertion_sort<T, K, F>(input: &mut [T], mut key_fn: F)
where
    K: Key,
    F: FnMut(&T) -> K,
{
    for i in 1..input.len() {
        let key = key_fn(&input[i]);
        let mut j = i;
        while j > 0 && key_fn(&input[j - 1]).compare(&key) == Ordering::Greater {
            j -= 1;
        }
        input[j..=i].rotate_right(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity<K: Copy>(k: &K) -> K {
        *k
    }

    fn is_sorted<K: Key>(input: &[K]) -> bool {
        input
            .windows(2)
            .all(|w| w[0].compare(&w[1]) != Ordering::Greater)
    }

    #[test]
    fn test_config_ratio_bounds() {
        assert!(Config::with_classification_ratio(0.0).is_err());
        assert!(Config::with_classification_ratio(1.0).is_err());
        assert!(Config::with_classification_ratio(-0.5).is_err());
        assert!(Config::with_classification_ratio(f64::NAN).is_err());
        assert!(Config::with_classification_ratio(0.0001).is_ok());
        assert!(Config::with_classification_ratio(0.9999).is_ok());
        assert_eq!(
            Config::with_classification_ratio(2.0),
            Err(ConfigError::InvalidClassificationRatio(2.0))
        );
    }

    #[test]
    fn test_config_class_count() {
        let config = Config::default();
        assert_eq!(config.classification_ratio(), 0.45);
        assert_eq!(config.class_count(6), 2);
        assert_eq!(config.class_count(100), 45);
        // Never less than one class.
        assert_eq!(config.class_count(2), 1);
        let config = Config::with_classification_ratio(0.0001).unwrap();
        assert_eq!(config.class_count(1000), 1);
    }

    #[test]
    fn test_find_extrema() {
        assert_eq!(find_extrema(&[5, 3, 8, 1, 9, 2], identity), (1, 4));
        assert_eq!(find_extrema(&[7], identity), (7, 0));
        // First occurrence of the maximum.
        assert_eq!(find_extrema(&[2, 9, 1, 9, 9], identity), (1, 1));
        assert_eq!(find_extrema(&[-1.5f64, 0.5, -3.0], identity), (-3.0, 1));
    }

    #[test]
    fn test_classifier_bounds() {
        let classifier = Classifier::new(0u32, 999, 45);
        assert_eq!(classifier.class_count(), 45);
        assert_eq!(classifier.classify(0), 0);
        assert_eq!(classifier.classify(999), 44);
        for v in 0..1000 {
            assert!(classifier.classify(v) < 45);
        }
        for pair in (0..1000).collect::<Vec<_>>().windows(2) {
            assert!(classifier.classify(pair[0]) <= classifier.classify(pair[1]));
        }
    }

    #[test]
    fn test_classifier_maps_max_to_last_class() {
        // The maximum must not round down into the class below the last.
        for &(min, max) in &[(0.1f64, 0.7), (-1e-300, 3e-300), (0.0, 49.0), (1.0, 1.0 + 1e-12)] {
            for class_count in 1..200 {
                let classifier = Classifier::new(min, max, class_count);
                assert_eq!(classifier.classify(min), 0);
                assert_eq!(classifier.classify(max), class_count - 1);
            }
        }
    }

    #[test]
    fn test_classifier_non_finite() {
        let classifier = Classifier::new(f64::NEG_INFINITY, 1.0, 10);
        assert_eq!(classifier.classify(f64::NEG_INFINITY), 0);
        assert_eq!(classifier.classify(1.0), 9);
        assert!(classifier.classify(0.0) < 10);

        let classifier = Classifier::new(0.0, f64::NAN, 10);
        assert_eq!(classifier.classify(0.0), 0);
        assert!(classifier.classify(f64::NAN) < 10);

        let classifier = Classifier::new(0.0, f64::INFINITY, 10);
        assert_eq!(classifier.classify(f64::INFINITY), 9);
        assert_eq!(classifier.classify(f64::MAX), 0);
    }

    #[test]
    fn test_classifier_single_class() {
        let classifier = Classifier::new(-10i64, 10, 1);
        for v in -10..=10 {
            assert_eq!(classifier.classify(v), 0);
        }
    }

    #[test]
    fn test_calc_class_sizes() {
        let input = [5, 3, 8, 1, 9, 2];
        let classifier = Classifier::new(1, 9, 2);
        // 1/8 per unit of distance, only the maximum reaches class 1.
        assert_eq!(calc_class_sizes(&input, &classifier, identity), vec![5, 1]);

        let classifier = Classifier::new(1, 9, 3);
        assert_eq!(calc_class_sizes(&input, &classifier, identity), vec![3, 2, 1]);
    }

    #[test]
    fn test_convert_class_sizes_to_ends() {
        let mut sizes = [3, 0, 2, 1, 0];
        convert_class_sizes_to_ends(&mut sizes);
        assert_eq!(sizes, [3, 3, 5, 6, 6]);

        let mut sizes = [4];
        convert_class_sizes_to_ends(&mut sizes);
        assert_eq!(sizes, [4]);
    }

    #[test]
    fn test_permute_groups_by_class() {
        let mut input: Vec<u32> = (0..1000).map(|i| (i * 7919) % 1000).collect();
        let classifier = Classifier::new(0, 999, 450);
        let mut class_ends = calc_class_sizes(&input, &classifier, identity);
        convert_class_sizes_to_ends(&mut class_ends);

        assert_eq!(permute(&mut input, &mut class_ends, &classifier, identity), Ok(()));

        for pair in input.windows(2) {
            assert!(classifier.classify(pair[0]) <= classifier.classify(pair[1]));
        }
        let mut sorted = input.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_permute_moves_ends_to_class_starts() {
        let mut input = [9, 1, 8, 2, 7, 3, 6, 4, 5, 0];
        let classifier = Classifier::new(0, 9, 5);
        let mut class_ends = calc_class_sizes(&input, &classifier, identity);
        convert_class_sizes_to_ends(&mut class_ends);
        assert_eq!(class_ends, [3, 5, 7, 9, 10]);

        assert_eq!(permute(&mut input, &mut class_ends, &classifier, identity), Ok(()));

        // Each end has moved down to the start of its class, except that one
        // element may be left unmoved.
        let starts = [0, 3, 5, 7, 9];
        let excess: usize = class_ends.iter().zip(starts.iter()).map(|(e, s)| e - s).sum();
        assert!(excess <= 1);

        let classes: Vec<usize> = input.iter().map(|&v| classifier.classify(v)).collect();
        assert_eq!(classes, [0, 0, 0, 1, 1, 2, 2, 3, 3, 4]);
    }

    #[test]
    fn test_permute_detects_unreliable_keys() {
        let mut input: Vec<u32> = (0..100).collect();
        let classifier = Classifier::new(0, 99, 45);
        let mut class_ends = calc_class_sizes(&input, &classifier, identity);
        convert_class_sizes_to_ends(&mut class_ends);

        // Every element now claims to be in the first class.
        let result = permute(&mut input, &mut class_ends, &classifier, |_: &u32| 0u32);
        assert_eq!(result, Err(()));

        input.sort_unstable();
        assert_eq!(input, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_insertion_sort() {
        let mut input = [5, 3, 8, 1, 9, 2];
        insertion_sort(&mut input, identity);
        assert_eq!(input, [1, 2, 3, 5, 8, 9]);

        let mut input: [u8; 0] = [];
        insertion_sort(&mut input, identity);

        let mut input: Vec<i32> = (0..300).rev().collect();
        insertion_sort(&mut input, identity);
        assert!(is_sorted(&input));
    }

    #[test]
    fn test_insertion_sort_is_stable() {
        let mut input = [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        insertion_sort(&mut input, |t| t.0);
        assert_eq!(input, [(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_sort_all_equal_keys() {
        let mut input = [(3, 'c'), (3, 'a'), (3, 'b')];
        dispatch_sort(&mut input, |t| t.0, Config::default());
        // Untouched, not even reordered.
        assert_eq!(input, [(3, 'c'), (3, 'a'), (3, 'b')]);
    }

    #[test]
    fn test_sort_stages() {
        let mut input = [5, 3, 8, 1, 9, 2];
        dispatch_sort(&mut input, identity, Config::default());
        assert_eq!(input, [1, 2, 3, 5, 8, 9]);

        let mut input = [2i8, -1];
        dispatch_sort(&mut input, identity, Config::default());
        assert_eq!(input, [-1, 2]);
    }
}
