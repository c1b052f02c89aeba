//! Fast hash map and hash set type aliases.
//!
//! This module provides type aliases for [`FxHashMap`] and [`FxHashSet`] from the
//! `rustc-hash` crate. The directory synchronizer keys its tree snapshots by
//! relative path, and Fx hashing is noticeably cheaper than SipHash for those
//! short path keys. None of the maps are exposed to untrusted input, so
//! denial-of-service resistance is not required.
//!
//! # Examples
//!
//! ```
//! use sg_core::{FxHashMap, FxHashSet};
//!
//! let mut map: FxHashMap<String, u64> = FxHashMap::default();
//! map.insert("css/site.css".to_owned(), 42);
//!
//! let set: FxHashSet<&str> = FxHashSet::default();
//! assert!(set.is_empty());
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;
