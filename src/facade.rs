//! Cached execution entry points.
//!
//! These are the calls most users want: hand over flat input/output slices
//! plus the logical extents, and the cache supplies (building on first use)
//! the matching plan and runs it against the caller's buffers. Rank is the
//! number of extents, 1 to 3.

use crate::cache::PlanCache;
use crate::engine::{PlanError, TransformEngine};
use crate::num::{Complex, Float};
use crate::shape::{R2rKind, ShapeDescriptor, Sign};

impl<T: Float, E: TransformEngine<T>> PlanCache<T, E> {
    /// Complex-to-complex transform over `extents` in `sign` direction.
    /// Unnormalized: a forward/inverse round trip scales by the element
    /// count.
    pub fn transform_c2c(
        &self,
        extents: &[usize],
        sign: Sign,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError> {
        let handle = self.get_or_create(ShapeDescriptor::c2c(extents, sign)?)?;
        handle.execute_c2c(input, output)
    }

    /// Real-to-complex transform; `output` is the packed half-spectrum with
    /// `extents[last]/2 + 1` complex values on the last axis.
    pub fn transform_r2c(
        &self,
        extents: &[usize],
        input: &[T],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError> {
        let handle = self.get_or_create(ShapeDescriptor::r2c(extents)?)?;
        handle.execute_r2c(input, output)
    }

    /// Complex-to-real transform from a packed half-spectrum. `extents` are
    /// the real output's logical sizes. Unnormalized inverse of
    /// [`transform_r2c`](Self::transform_r2c).
    pub fn transform_c2r(
        &self,
        extents: &[usize],
        input: &[Complex<T>],
        output: &mut [T],
    ) -> Result<(), PlanError> {
        let handle = self.get_or_create(ShapeDescriptor::c2r(extents)?)?;
        handle.execute_c2r(input, output)
    }

    /// Real-to-real transform with one cosine/sine variant per axis
    /// (`kinds.len()` must equal `extents.len()`).
    pub fn transform_r2r(
        &self,
        extents: &[usize],
        kinds: &[R2rKind],
        input: &[T],
        output: &mut [T],
    ) -> Result<(), PlanError> {
        let handle = self.get_or_create(ShapeDescriptor::r2r(extents, kinds)?)?;
        handle.execute_r2r(input, output)
    }
}
