//! Hash map backing the sparse tick, bitmap-word and position tables.
//!
//! The hasher is chosen by cargo feature. `std-hash`, or any combination of
//! more than one backend, falls back to `std::collections::HashMap`.

#[cfg(all(
    feature = "rustc-hash",
    not(any(feature = "ahash", feature = "std-hash"))
))]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(
    feature = "ahash",
    not(any(feature = "rustc-hash", feature = "std-hash"))
))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

#[cfg(not(any(
    all(
        feature = "rustc-hash",
        not(any(feature = "ahash", feature = "std-hash"))
    ),
    all(
        feature = "ahash",
        not(any(feature = "rustc-hash", feature = "std-hash"))
    ),
)))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
