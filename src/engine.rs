//! Transform engine adapter boundary.
//!
//! The plan cache is generic over a [`TransformEngine`]: anything that can
//! build an opaque plan for a shape, execute a built plan against fresh
//! same-shaped buffers ("new-array execution"), and release it. One engine
//! instance serves one numeric precision; instances for different precisions
//! share no state and may plan and execute fully concurrently with each
//! other.
//!
//! Contract the cache relies on:
//! - plan construction is NOT safe to call concurrently with another
//!   construction on the same engine (the cache serializes it behind a
//!   planner lock);
//! - executing two *different* plans concurrently is safe;
//! - executing the *same* plan from two threads at once is not (each cached
//!   handle carries its own execution lock).

use crate::num::{Complex, Float};
use crate::shape::{R2rKind, Sign};

/// How much work the engine should put into plan construction.
///
/// Passed through to the engine uninterpreted. Cached plans are built with
/// [`Measure`](PlanningEffort::Measure) since the cost is paid once per
/// shape; the cache-free one-shot entry points use
/// [`Estimate`](PlanningEffort::Estimate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlanningEffort {
    /// Cheapest plan to construct.
    Estimate,
    /// Spend planning time for a faster plan.
    #[default]
    Measure,
}

/// Errors surfaced by the cache, the facade, and engine implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanError {
    /// Rank, extent, batch count, or per-axis variant outside what the
    /// engine can plan for.
    InvalidShape,
    /// The engine declined to build a plan for a well-formed shape.
    PlanningFailed,
    /// A caller buffer does not match the plan's shape geometry.
    MismatchedLengths,
    /// The operation's transform kind does not match the plan's kind.
    UnsupportedKind,
}

impl core::fmt::Display for PlanError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            PlanError::InvalidShape => "invalid transform shape",
            PlanError::PlanningFailed => "engine failed to build a plan",
            PlanError::MismatchedLengths => "buffer length does not match plan shape",
            PlanError::UnsupportedKind => "transform kind does not match plan",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for PlanError {}

/// One numeric precision's binding to a plan-building transform engine.
///
/// The `plan_*` constructors receive freshly allocated scratch buffers sized
/// for the shape; engines that probe memory during planning may write to
/// them freely. Only the returned plan survives — the scratch is discarded
/// by the caller. The `execute_*` operations re-point the built plan at the
/// caller's buffers, which must have the same geometry as the scratch the
/// plan was built with.
pub trait TransformEngine<T: Float>: Send + Sync + 'static {
    /// Opaque execution schedule for one fixed shape.
    type Plan: Send + 'static;

    fn plan_c2c(
        &self,
        extents: &[usize],
        sign: Sign,
        scratch_in: &mut [Complex<T>],
        scratch_out: &mut [Complex<T>],
        effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError>;

    fn plan_r2c(
        &self,
        extents: &[usize],
        scratch_in: &mut [T],
        scratch_out: &mut [Complex<T>],
        effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError>;

    /// `extents` are the real output's logical sizes; `scratch_in` is the
    /// packed half-spectrum.
    fn plan_c2r(
        &self,
        extents: &[usize],
        scratch_in: &mut [Complex<T>],
        scratch_out: &mut [T],
        effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError>;

    fn plan_r2r(
        &self,
        extents: &[usize],
        kinds: &[R2rKind],
        scratch_in: &mut [T],
        scratch_out: &mut [T],
        effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError>;

    fn execute_c2c(
        &self,
        plan: &mut Self::Plan,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError>;

    fn execute_r2c(
        &self,
        plan: &mut Self::Plan,
        input: &[T],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError>;

    fn execute_c2r(
        &self,
        plan: &mut Self::Plan,
        input: &[Complex<T>],
        output: &mut [T],
    ) -> Result<(), PlanError>;

    fn execute_r2r(
        &self,
        plan: &mut Self::Plan,
        input: &[T],
        output: &mut [T],
    ) -> Result<(), PlanError>;

    /// Release a plan's resources. The default is to drop it; engines
    /// wrapping native handles override this to call the native destroy
    /// routine, and instrumented test engines override it to count releases.
    fn destroy(&self, plan: Self::Plan) {
        drop(plan);
    }
}
