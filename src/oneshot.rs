//! Cache-free batched transforms.
//!
//! The `*_many_once` entry points run `howmany` identical transforms packed
//! contiguously into one buffer pair (batch stride = one transform's
//! element count). The plan is built with [`PlanningEffort::Estimate`]
//! under the cache's planner lock, used for every batch, and destroyed
//! before returning; nothing is installed in the table. This is the
//! degenerate case for shapes that will not recur, where remembering a
//! measured plan is not worth the planning time.

use crate::cache::PlanCache;
use crate::engine::{PlanError, PlanningEffort, TransformEngine};
use crate::num::{Complex, Float};
use crate::shape::{R2rKind, ShapeDescriptor, Sign};

fn batch_lens(
    shape: &ShapeDescriptor,
    howmany: usize,
    in_len: usize,
    out_len: usize,
) -> Result<(usize, usize), PlanError> {
    if howmany == 0 {
        return Err(PlanError::InvalidShape);
    }
    let per_in = shape.input_len();
    let per_out = shape.output_len();
    if in_len != per_in * howmany || out_len != per_out * howmany {
        return Err(PlanError::MismatchedLengths);
    }
    Ok((per_in, per_out))
}

impl<T: Float, E: TransformEngine<T>> PlanCache<T, E> {
    fn plan_once(&self, shape: &ShapeDescriptor) -> Result<E::Plan, PlanError> {
        let _planner = self.planner_guard();
        self.build_plan(shape, PlanningEffort::Estimate)
    }

    /// `howmany` contiguous complex-to-complex transforms over `extents`.
    pub fn c2c_many_once(
        &self,
        extents: &[usize],
        howmany: usize,
        sign: Sign,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError> {
        let shape = ShapeDescriptor::c2c(extents, sign)?;
        let (per_in, per_out) = batch_lens(&shape, howmany, input.len(), output.len())?;
        let mut plan = self.plan_once(&shape)?;
        let result = (0..howmany).try_for_each(|b| {
            self.engine().execute_c2c(
                &mut plan,
                &input[b * per_in..(b + 1) * per_in],
                &mut output[b * per_out..(b + 1) * per_out],
            )
        });
        self.engine().destroy(plan);
        result
    }

    /// `howmany` contiguous real-to-complex transforms; each batch's output
    /// is one packed half-spectrum.
    pub fn r2c_many_once(
        &self,
        extents: &[usize],
        howmany: usize,
        input: &[T],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError> {
        let shape = ShapeDescriptor::r2c(extents)?;
        let (per_in, per_out) = batch_lens(&shape, howmany, input.len(), output.len())?;
        let mut plan = self.plan_once(&shape)?;
        let result = (0..howmany).try_for_each(|b| {
            self.engine().execute_r2c(
                &mut plan,
                &input[b * per_in..(b + 1) * per_in],
                &mut output[b * per_out..(b + 1) * per_out],
            )
        });
        self.engine().destroy(plan);
        result
    }

    /// `howmany` contiguous complex-to-real transforms from packed
    /// half-spectra.
    pub fn c2r_many_once(
        &self,
        extents: &[usize],
        howmany: usize,
        input: &[Complex<T>],
        output: &mut [T],
    ) -> Result<(), PlanError> {
        let shape = ShapeDescriptor::c2r(extents)?;
        let (per_in, per_out) = batch_lens(&shape, howmany, input.len(), output.len())?;
        let mut plan = self.plan_once(&shape)?;
        let result = (0..howmany).try_for_each(|b| {
            self.engine().execute_c2r(
                &mut plan,
                &input[b * per_in..(b + 1) * per_in],
                &mut output[b * per_out..(b + 1) * per_out],
            )
        });
        self.engine().destroy(plan);
        result
    }

    /// `howmany` contiguous real-to-real transforms.
    pub fn r2r_many_once(
        &self,
        extents: &[usize],
        kinds: &[R2rKind],
        howmany: usize,
        input: &[T],
        output: &mut [T],
    ) -> Result<(), PlanError> {
        let shape = ShapeDescriptor::r2r(extents, kinds)?;
        let (per_in, per_out) = batch_lens(&shape, howmany, input.len(), output.len())?;
        let mut plan = self.plan_once(&shape)?;
        let result = (0..howmany).try_for_each(|b| {
            self.engine().execute_r2r(
                &mut plan,
                &input[b * per_in..(b + 1) * per_in],
                &mut output[b * per_out..(b + 1) * per_out],
            )
        });
        self.engine().destroy(plan);
        result
    }
}
