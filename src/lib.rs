//! `flashsort` is an in-place distribution sort (Flash Sort) for sorting by
//! scalar keys (integers, floats, chars, bools) or any key type implementing
//! [`Key`].
//!
//! - close to `O(n)` on uniformly distributed keys, degrading towards
//! `O(n²)` on heavily clustered keys
//! - space complexity is `O(m)`, where `m` is the number of classes, a
//! configurable fraction of the slice length (45% by default)
//! - not stable, i.e. may reorder equal elements
//! - uses `#![no_std]`, but needs an allocator
//!
//! The sort works in four stages:
//!
//! 1. Find the minimum and the maximum key.
//! 2. Classify every element by the distance of its key from the minimum and
//! count the elements per class. A prefix sum of the counts gives the range
//! of positions each class occupies.
//! 3. Move the elements into the range of their class in-place, following
//! cycles: the element taken out of a slot is carried on to its own class.
//! 4. Finish with an insertion sort, which only has to move each element
//! within its class.
//!
//! Slices where all keys are equal are detected in the first stage and left
//! untouched.
//!
//! # Floating-point numbers
//!
//! Floating-point number keys are sorted according to their total order (see
//! `f64::total_cmp`), with `NaN` values at the beginning (before the negative
//! infinity) and at the end (after the positive infinity), depending on the
//! sign bit of each `NaN`.
//!
//! # Examples
//!
//! Slices of scalar types (integers, floating-point numbers, Booleans, and
//! characters) can be sorted directly:
//! ```rust
//! let mut data = [5i32, 3, 8, 1, 9, 2];
//!
//! flashsort::sort(&mut data);
//!
//! assert_eq!(data, [1, 2, 3, 5, 8, 9]);
//! ```
//!
//! Use a key extraction function to sort other types:
//! ```rust
//! let mut friends = ["Punchy", "Isabelle", "Sly", "Puddles", "Gladys"];
//!
//! // sort by the length of the string in bytes
//! flashsort::sort_by_key(&mut friends, |s| s.len());
//!
//! assert_eq!(friends[0], "Sly");
//! assert_eq!(friends[4], "Isabelle");
//! ```
//!
//! Tune the number of classes with [`FlashSort`]:
//! ```rust
//! use flashsort::FlashSort;
//!
//! let sorter = FlashSort::with_classification_ratio(0.2).unwrap();
//! let mut data = [0.5f64, -1.25, 3.0, 0.0];
//!
//! sorter.sort(&mut data);
//!
//! assert_eq!(data, [-1.25, 0.0, 0.5, 3.0]);
//! ```
//!
//! [`Key`]: ./trait.Key.html
//! [`FlashSort`]: ./struct.FlashSort.html

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

mod error;
mod key;
mod sort;

pub use crate::error::ConfigError;
pub use crate::key::Key;
pub use crate::sort::DEFAULT_CLASSIFICATION_RATIO;

use crate::sort::Config;

/// Sorts the slice.
///
/// Slice elements can be any scalar type, or any type implementing [`Key`].
///
/// This sort is unstable (i.e., may reorder equal elements) and close to
/// `O(n)` for uniformly distributed keys.
///
/// Allocates temporary storage for the class boundaries, 45% of the slice
/// length. Returns the slice for chaining.
///
/// # Examples
/// ```rust
/// let mut data = [5i32, -1, 3, 15, -42];
///
/// flashsort::sort(&mut data);
///
/// assert_eq!(data, [-42, -1, 3, 5, 15]);
/// ```
/// [`Key`]: trait.Key.html
pub fn sort<T: Key>(slice: &mut [T]) -> &mut [T] {
    FlashSort::new().sort(slice)
}

/// Sorts the slice using a key extraction function.
///
/// Key can be any scalar type, or any type implementing [`Key`].
///
/// This sort is unstable (i.e., may reorder equal elements). The key function
/// is called several times per element.
///
/// See [`sort_by_cached_key`] if you use an expensive key function.
///
/// # Panics
///
/// Can panic if the key function returns different keys for the same element
/// when called repeatedly. The panic is on a best-effort basis. In case of
/// panic, the order of elements in the slice is not specified, but no element
/// is lost or duplicated.
///
/// # Examples
///
/// ```rust
/// let mut points = [(3, 'c'), (-1, 'a'), (2, 'b')];
///
/// flashsort::sort_by_key(&mut points, |p| p.0);
///
/// assert_eq!(points, [(-1, 'a'), (2, 'b'), (3, 'c')]);
/// ```
///
/// [`Key`]: trait.Key.html
/// [`sort_by_cached_key`]: fn.sort_by_cached_key.html
pub fn sort_by_key<T, F, K>(slice: &mut [T], key_fn: F) -> &mut [T]
where
    F: FnMut(&T) -> K,
    K: Key,
{
    FlashSort::new().sort_by_key(slice, key_fn)
}

/// Sorts the slice indirectly, using a key extraction function and caching the keys.
///
/// Key can be any scalar type, or any type implementing [`Key`].
///
/// The key function is called exactly once per element. The keys are sorted
/// together with the original positions, which are then used to permute the
/// slice in-place.
///
/// Allocates a temporary `Vec<(K, usize)>` (or a narrower index type for
/// short slices) the length of the slice.
///
/// # Examples
///
/// ```rust
/// let mut data = ["-6", "2", "15", "-1", "0"];
///
/// flashsort::sort_by_cached_key(&mut data, |s| s.parse::<i32>().unwrap());
///
/// assert_eq!(data, ["-6", "-1", "0", "2", "15"]);
/// ```
///
/// [`Key`]: ./trait.Key.html
pub fn sort_by_cached_key<T, F, K>(slice: &mut [T], key_fn: F) -> &mut [T]
where
    F: FnMut(&T) -> K,
    K: Key,
{
    FlashSort::new().sort_by_cached_key(slice, key_fn)
}

/// A Flash Sort with a configured classification ratio.
///
/// The classification ratio is the fraction of the slice length used as the
/// number of classes. More classes mean less work for the final insertion
/// sort, but more memory and more scattered writes while permuting. The
/// default of 0.45 suits uniformly distributed keys.
///
/// # Examples
///
/// ```rust
/// use flashsort::{ConfigError, FlashSort};
///
/// let mut sorter = FlashSort::new();
/// assert_eq!(sorter.classification_ratio(), 0.45);
///
/// sorter.set_classification_ratio(0.1)?;
/// assert_eq!(sorter.class_count(1000), 100);
///
/// assert!(sorter.set_classification_ratio(1.0).is_err());
/// assert_eq!(sorter.classification_ratio(), 0.1);
/// # Ok::<(), ConfigError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlashSort {
    config: Config,
}

impl FlashSort {
    /// Creates a sorter with the default classification ratio of 0.45.
    pub const fn new() -> Self {
        Self {
            config: Config::with_default_ratio(),
        }
    }

    /// Creates a sorter with the given classification ratio.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::InvalidClassificationRatio`] unless
    /// `0 < classification_ratio < 1`.
    ///
    /// [`ConfigError::InvalidClassificationRatio`]: enum.ConfigError.html#variant.InvalidClassificationRatio
    pub fn with_classification_ratio(classification_ratio: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            config: Config::with_classification_ratio(classification_ratio)?,
        })
    }

    pub const fn classification_ratio(&self) -> f64 {
        self.config.classification_ratio()
    }

    /// Replaces the classification ratio. On error the sorter keeps its
    /// previous ratio.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::InvalidClassificationRatio`] unless
    /// `0 < classification_ratio < 1`.
    ///
    /// [`ConfigError::InvalidClassificationRatio`]: enum.ConfigError.html#variant.InvalidClassificationRatio
    pub fn set_classification_ratio(&mut self, classification_ratio: f64) -> Result<(), ConfigError> {
        self.config = Config::with_classification_ratio(classification_ratio)?;
        Ok(())
    }

    /// Number of classes used for a slice of length `len`. Never zero.
    pub fn class_count(&self, len: usize) -> usize {
        self.config.class_count(len)
    }

    /// Sorts the slice. See [`sort`](fn.sort.html).
    pub fn sort<'a, T: Key>(&self, slice: &'a mut [T]) -> &'a mut [T] {
        sort::dispatch_sort(slice, |v| *v, self.config);
        slice
    }

    /// Sorts the slice using a key extraction function. See
    /// [`sort_by_key`](fn.sort_by_key.html).
    pub fn sort_by_key<'a, T, F, K>(&self, slice: &'a mut [T], mut key_fn: F) -> &'a mut [T]
    where
        F: FnMut(&T) -> K,
        K: Key,
    {
        sort::dispatch_sort(slice, |t| key_fn(t), self.config);
        slice
    }

    /// Sorts the slice indirectly, caching the keys. See
    /// [`sort_by_cached_key`](fn.sort_by_cached_key.html).
    pub fn sort_by_cached_key<'a, T, F, K>(&self, slice: &'a mut [T], key_fn: F) -> &'a mut [T]
    where
        F: FnMut(&T) -> K,
        K: Key,
    {
        sort_by_cached_key_internal(slice, key_fn, self.config);
        slice
    }
}

fn sort_by_cached_key_internal<T, F, K>(slice: &mut [T], mut key_fn: F, config: Config)
where
    F: FnMut(&T) -> K,
    K: Key,
{
    // Adapted from std::slice::sort_by_cached_key

    macro_rules! flashsort_by_cached_key {
        ($index:ty) => {{
            let mut indices: Vec<(K, $index)> = slice
                .iter()
                .map(|t| key_fn(t))
                .enumerate()
                .map(|(i, k)| (k, i as $index))
                .collect();

            sort::dispatch_sort(&mut indices, |(k, _)| *k, config);

            for i in 0..slice.len() {
                let mut index = indices[i].1;
                while (index as usize) < i {
                    // The previous value was swapped somewhere else. The index to which
                    // the original value was swapped was marked into the index array.
                    // Follow the indices to find out where the original value ended up.
                    index = indices[index as usize].1;
                }
                // Mark down the index to which the current value goes
                indices[i].1 = index;
                slice.swap(i, index as usize);
            }
        }};
    }

    match slice.len() {
        len if len < 2 => (),
        len if len <= core::u8::MAX as usize + 1 => {
            flashsort_by_cached_key!(u8);
        }
        #[cfg(not(target_pointer_width = "16"))]
        len if len <= core::u16::MAX as usize + 1 => {
            flashsort_by_cached_key!(u16);
        }
        #[cfg(not(any(target_pointer_width = "16", target_pointer_width = "32")))]
        len if len <= core::u32::MAX as usize + 1 => {
            flashsort_by_cached_key!(u32);
        }
        _ => {
            flashsort_by_cached_key!(usize);
        }
    }
}
