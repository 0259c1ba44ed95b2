//! # planfft - Cached transform plans for Rust
//!
//! A thread-safe memoization layer over plan-based transform engines. Plan
//! construction is expensive; execution is cheap. `planfft` remembers every
//! plan it builds, keyed by the transform's full shape, so repeated
//! transforms of the same configuration pay the planning cost exactly once
//! per process.
//!
//! ## Features
//!
//! - **Shape-keyed plan cache**: kind, rank, extents, direction, and
//!   per-axis variant all participate in the key
//! - **At-most-one plan per shape**, even under concurrent first use
//! - **Concurrent execution across shapes**, serialized per shape
//! - **Four transform kinds**: complex-to-complex, real-to-complex,
//!   complex-to-real, real-to-real (8 DCT/DST variants), ranks 1 to 3
//! - **Batched one-shot transforms** that bypass the cache entirely
//! - **Generic over the engine**: bring any [`TransformEngine`], or use the
//!   bundled pure-Rust [`ScalarEngine`]
//! - **Shared per-precision caches** for `f32` and `f64` via free functions
//!
//! ## Cargo Features
//!
//! - `verbose-logging`: emit `log` records on cache misses, duplicate-plan
//!   discards, and teardown
//!
//! ## Example
//!
//! ```
//! use planfft::{Complex, PlanCache, ScalarEngine, Sign};
//!
//! let cache = PlanCache::new(ScalarEngine::<f64>::new());
//! let input = vec![Complex::new(1.0, 0.0); 8];
//! let mut output = vec![Complex::zero(); 8];
//!
//! // First call plans and caches; later calls for [8]/Forward reuse it.
//! cache.transform_c2c(&[8], Sign::Forward, &input, &mut output)?;
//! assert_eq!(cache.len(), 1);
//! # Ok::<(), planfft::PlanError>(())
//! ```
//!
//! Or go through the process-wide cache for the precision:
//!
//! ```
//! use planfft::{c2c, Complex, Sign};
//!
//! let input = vec![Complex::<f32>::new(1.0, 0.0); 8];
//! let mut output = vec![Complex::zero(); 8];
//! c2c(&[8], Sign::Forward, &input, &mut output)?;
//! # Ok::<(), planfft::PlanError>(())
//! ```
//!
//! ## Concurrency
//!
//! Three locks, never nested: the table lock (membership only), the planner
//! lock (one plan construction at a time per cache), and one execution lock
//! per cached plan. Threads transforming different shapes run fully in
//! parallel; threads sharing a shape take turns on its plan. Transforms are
//! unnormalized in both directions, matching the usual plan-based engine
//! convention.
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or https://opensource.org/licenses/MIT)
//!
//! at your option.

/// Plan cache and shared plan handles.
pub mod cache;
/// The engine adapter trait, planning effort, and error type.
pub mod engine;
mod facade;
/// Process-wide per-precision caches.
pub mod global;
/// Float and complex scalar types.
pub mod num;
mod oneshot;
/// Bundled pure-Rust reference engine.
pub mod scalar;
/// Shape descriptors: the cache key vocabulary.
pub mod shape;

pub use cache::{PlanCache, PlanHandle};
pub use engine::{PlanError, PlanningEffort, TransformEngine};
pub use global::{c2c, c2r, clear, r2c, r2r, CachedPrecision};
pub use num::{Complex, Complex32, Complex64, Float};
pub use scalar::ScalarEngine;
pub use shape::{R2rKind, ShapeDescriptor, Sign, TransformKind, MAX_RANK};
