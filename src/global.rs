//! Process-wide plan caches, one per precision.
//!
//! Most programs want a single shared cache so every call site benefits from
//! every previously planned shape. The statics here are lazily initialized
//! on first use and live for the rest of the process; [`clear`] empties a
//! precision's table without tearing down the cache itself.

use std::sync::OnceLock;

use crate::cache::PlanCache;
use crate::engine::PlanError;
use crate::num::{Complex, Float};
use crate::scalar::ScalarEngine;
use crate::shape::{R2rKind, Sign};

static F32_CACHE: OnceLock<PlanCache<f32, ScalarEngine<f32>>> = OnceLock::new();
static F64_CACHE: OnceLock<PlanCache<f64, ScalarEngine<f64>>> = OnceLock::new();

/// A precision with a process-wide plan cache.
///
/// Implemented for `f32` and `f64`; the two caches are independent and never
/// contend with each other.
pub trait CachedPrecision: Float {
    fn plan_cache() -> &'static PlanCache<Self, ScalarEngine<Self>>;
}

impl CachedPrecision for f32 {
    fn plan_cache() -> &'static PlanCache<f32, ScalarEngine<f32>> {
        F32_CACHE.get_or_init(|| PlanCache::new(ScalarEngine::new()))
    }
}

impl CachedPrecision for f64 {
    fn plan_cache() -> &'static PlanCache<f64, ScalarEngine<f64>> {
        F64_CACHE.get_or_init(|| PlanCache::new(ScalarEngine::new()))
    }
}

/// Complex-to-complex transform through the shared cache for `T`.
pub fn c2c<T: CachedPrecision>(
    extents: &[usize],
    sign: Sign,
    input: &[Complex<T>],
    output: &mut [Complex<T>],
) -> Result<(), PlanError> {
    T::plan_cache().transform_c2c(extents, sign, input, output)
}

/// Real-to-complex transform through the shared cache for `T`.
pub fn r2c<T: CachedPrecision>(
    extents: &[usize],
    input: &[T],
    output: &mut [Complex<T>],
) -> Result<(), PlanError> {
    T::plan_cache().transform_r2c(extents, input, output)
}

/// Complex-to-real transform through the shared cache for `T`.
pub fn c2r<T: CachedPrecision>(
    extents: &[usize],
    input: &[Complex<T>],
    output: &mut [T],
) -> Result<(), PlanError> {
    T::plan_cache().transform_c2r(extents, input, output)
}

/// Real-to-real transform through the shared cache for `T`.
pub fn r2r<T: CachedPrecision>(
    extents: &[usize],
    kinds: &[R2rKind],
    input: &[T],
    output: &mut [T],
) -> Result<(), PlanError> {
    T::plan_cache().transform_r2r(extents, kinds, input, output)
}

/// Empty the shared cache for `T`, releasing every installed plan.
pub fn clear<T: CachedPrecision>() {
    T::plan_cache().clear();
}
