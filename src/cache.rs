//! The transform-plan cache.
//!
//! A [`PlanCache`] memoizes built plans by [`ShapeDescriptor`], one cache
//! per numeric precision. It guarantees that at most one plan is ever
//! *installed* per shape, serializes the engine's plan construction behind a
//! planner lock, and hands out shared [`PlanHandle`]s whose per-handle lock
//! serializes execution of that one plan while leaving different shapes
//! fully concurrent.
//!
//! Lock discipline: the table lock is held only for membership checks and
//! mutations, never across a plan build or an execute call; the planner
//! lock is held for exactly one engine planning call; each handle's
//! execution lock is held for exactly one engine execute call. The three
//! are never nested.

use std::sync::{Arc, Mutex, MutexGuard};

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

#[cfg(feature = "verbose-logging")]
use log::debug;

use crate::engine::{PlanError, PlanningEffort, TransformEngine};
use crate::num::{Complex, Float};
use crate::shape::{R2rKind, ShapeDescriptor, Sign, TransformKind, MAX_RANK};

/// A poisoned lock only means another caller panicked mid-operation; the
/// protected state is still structurally sound, so keep serving.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// One cached plan, shared by the cache table and every in-flight caller.
///
/// The handle owns the engine plan behind its execution lock; the plan is
/// handed back to the engine for destruction when the last shared reference
/// drops. A caller still executing while the cache is cleared therefore
/// keeps its plan alive until it finishes.
pub struct PlanHandle<T: Float, E: TransformEngine<T>> {
    shape: ShapeDescriptor,
    engine: Arc<E>,
    plan: Mutex<Option<E::Plan>>,
}

impl<T: Float, E: TransformEngine<T>> PlanHandle<T, E> {
    fn new(shape: ShapeDescriptor, engine: Arc<E>, plan: E::Plan) -> Self {
        Self {
            shape,
            engine,
            plan: Mutex::new(Some(plan)),
        }
    }

    /// The descriptor this plan was built for.
    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    fn check(&self, kind: TransformKind, in_len: usize, out_len: usize) -> Result<(), PlanError> {
        if self.shape.kind() != kind {
            return Err(PlanError::UnsupportedKind);
        }
        if in_len != self.shape.input_len() || out_len != self.shape.output_len() {
            return Err(PlanError::MismatchedLengths);
        }
        Ok(())
    }

    fn with_plan<R>(
        &self,
        f: impl FnOnce(&E, &mut E::Plan) -> Result<R, PlanError>,
    ) -> Result<R, PlanError> {
        let mut guard = lock_unpoisoned(&self.plan);
        // Only `drop` takes the plan out, so a live handle always has one.
        let plan = guard.as_mut().ok_or(PlanError::PlanningFailed)?;
        f(&self.engine, plan)
    }

    /// Run a complex-to-complex transform against fresh caller buffers.
    ///
    /// Serialized against every other execution of this same handle; callers
    /// holding handles for other shapes are unaffected.
    pub fn execute_c2c(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError> {
        self.check(TransformKind::C2c, input.len(), output.len())?;
        self.with_plan(|engine, plan| engine.execute_c2c(plan, input, output))
    }

    /// Run a real-to-complex transform; `output` receives the packed
    /// half-spectrum (`n/2 + 1` complex values on the last axis).
    pub fn execute_r2c(&self, input: &[T], output: &mut [Complex<T>]) -> Result<(), PlanError> {
        self.check(TransformKind::R2c, input.len(), output.len())?;
        self.with_plan(|engine, plan| engine.execute_r2c(plan, input, output))
    }

    /// Run a complex-to-real transform from a packed half-spectrum.
    pub fn execute_c2r(&self, input: &[Complex<T>], output: &mut [T]) -> Result<(), PlanError> {
        self.check(TransformKind::C2r, input.len(), output.len())?;
        self.with_plan(|engine, plan| engine.execute_c2r(plan, input, output))
    }

    /// Run a real-to-real transform.
    pub fn execute_r2r(&self, input: &[T], output: &mut [T]) -> Result<(), PlanError> {
        self.check(TransformKind::R2r, input.len(), output.len())?;
        self.with_plan(|engine, plan| engine.execute_r2r(plan, input, output))
    }
}

impl<T: Float, E: TransformEngine<T>> Drop for PlanHandle<T, E> {
    fn drop(&mut self) {
        let plan = self
            .plan
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(plan) = plan {
            self.engine.destroy(plan);
        }
    }
}

/// Thread-safe memoization table from shape descriptors to shared plans.
pub struct PlanCache<T: Float, E: TransformEngine<T>> {
    engine: Arc<E>,
    table: Mutex<HashMap<ShapeDescriptor, Arc<PlanHandle<T, E>>>>,
    /// Serializes engine plan construction; the engine's planner is not
    /// safe to call concurrently with itself, for any pair of shapes.
    planner_lock: Mutex<()>,
    effort: PlanningEffort,
}

impl<T: Float, E: TransformEngine<T>> PlanCache<T, E> {
    /// Cache over `engine`, building cached plans with
    /// [`PlanningEffort::Measure`].
    pub fn new(engine: E) -> Self {
        Self::with_effort(engine, PlanningEffort::Measure)
    }

    /// Cache over `engine` with an explicit planning effort for cached
    /// plans.
    pub fn with_effort(engine: E, effort: PlanningEffort) -> Self {
        Self {
            engine: Arc::new(engine),
            table: Mutex::new(HashMap::new()),
            planner_lock: Mutex::new(()),
            effort,
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Number of distinct shapes currently cached.
    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.table).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hold this guard for exactly one engine planning call.
    pub(crate) fn planner_guard(&self) -> MutexGuard<'_, ()> {
        lock_unpoisoned(&self.planner_lock)
    }

    /// Look up the plan for `shape`, building it on first use.
    ///
    /// Double-checked insertion: the table lock is released before planning
    /// so one shape's (possibly slow) construction never blocks lookups of
    /// other shapes. Two threads may therefore race to build the same
    /// shape; the first insert wins and the loser's plan is destroyed, so
    /// installed plans stay unique per shape and equal descriptors always
    /// resolve to the identity-same handle.
    pub fn get_or_create(
        &self,
        shape: ShapeDescriptor,
    ) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        {
            let table = lock_unpoisoned(&self.table);
            if let Some(handle) = table.get(&shape) {
                return Ok(Arc::clone(handle));
            }
        }

        #[cfg(feature = "verbose-logging")]
        debug!("plan cache miss, building {:?}", shape);

        let plan = {
            let _planner = self.planner_guard();
            self.build_plan(&shape, self.effort)?
        };

        let mut table = lock_unpoisoned(&self.table);
        match table.entry(shape) {
            Entry::Occupied(entry) => {
                // Lost the build race; keep the installed plan.
                #[cfg(feature = "verbose-logging")]
                debug!("discarding duplicate plan for {:?}", shape);
                self.engine.destroy(plan);
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                let handle = Arc::new(PlanHandle::new(shape, Arc::clone(&self.engine), plan));
                entry.insert(Arc::clone(&handle));
                Ok(handle)
            }
        }
    }

    /// Build one engine plan for `shape`, allocating scratch buffers of the
    /// geometry the engine expects for the shape's kind. Only the plan
    /// survives; the scratch is dropped here.
    pub(crate) fn build_plan(
        &self,
        shape: &ShapeDescriptor,
        effort: PlanningEffort,
    ) -> Result<E::Plan, PlanError> {
        let extents = shape.extents();
        match shape.kind() {
            TransformKind::C2c => {
                let sign = shape.sign().ok_or(PlanError::InvalidShape)?;
                let mut scratch_in = vec![Complex::<T>::zero(); shape.logical_len()];
                let mut scratch_out = vec![Complex::<T>::zero(); shape.logical_len()];
                self.engine
                    .plan_c2c(extents, sign, &mut scratch_in, &mut scratch_out, effort)
            }
            TransformKind::R2c => {
                let mut scratch_in = vec![T::zero(); shape.logical_len()];
                let mut scratch_out = vec![Complex::<T>::zero(); shape.spectrum_len()];
                self.engine
                    .plan_r2c(extents, &mut scratch_in, &mut scratch_out, effort)
            }
            TransformKind::C2r => {
                let mut scratch_in = vec![Complex::<T>::zero(); shape.spectrum_len()];
                let mut scratch_out = vec![T::zero(); shape.logical_len()];
                self.engine
                    .plan_c2r(extents, &mut scratch_in, &mut scratch_out, effort)
            }
            TransformKind::R2r => {
                let mut kinds = [R2rKind::Dct2; MAX_RANK];
                for (axis, slot) in kinds[..shape.rank()].iter_mut().enumerate() {
                    *slot = shape.subkind(axis).ok_or(PlanError::InvalidShape)?;
                }
                let mut scratch_in = vec![T::zero(); shape.logical_len()];
                let mut scratch_out = vec![T::zero(); shape.logical_len()];
                self.engine.plan_r2r(
                    extents,
                    &kinds[..shape.rank()],
                    &mut scratch_in,
                    &mut scratch_out,
                    effort,
                )
            }
        }
    }

    // Per-(kind, rank) accessors. Each builds the descriptor for one
    // transform configuration and delegates to `get_or_create`.

    pub fn c2c_1d(&self, n0: usize, sign: Sign) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::c2c(&[n0], sign)?)
    }

    pub fn c2c_2d(
        &self,
        n0: usize,
        n1: usize,
        sign: Sign,
    ) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::c2c(&[n0, n1], sign)?)
    }

    pub fn c2c_3d(
        &self,
        n0: usize,
        n1: usize,
        n2: usize,
        sign: Sign,
    ) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::c2c(&[n0, n1, n2], sign)?)
    }

    pub fn r2c_1d(&self, n0: usize) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::r2c(&[n0])?)
    }

    pub fn r2c_2d(&self, n0: usize, n1: usize) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::r2c(&[n0, n1])?)
    }

    pub fn r2c_3d(
        &self,
        n0: usize,
        n1: usize,
        n2: usize,
    ) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::r2c(&[n0, n1, n2])?)
    }

    pub fn c2r_1d(&self, n0: usize) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::c2r(&[n0])?)
    }

    pub fn c2r_2d(&self, n0: usize, n1: usize) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::c2r(&[n0, n1])?)
    }

    pub fn c2r_3d(
        &self,
        n0: usize,
        n1: usize,
        n2: usize,
    ) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::c2r(&[n0, n1, n2])?)
    }

    pub fn r2r_1d(&self, n0: usize, kind: R2rKind) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::r2r(&[n0], &[kind])?)
    }

    pub fn r2r_2d(
        &self,
        n0: usize,
        n1: usize,
        kind0: R2rKind,
        kind1: R2rKind,
    ) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::r2r(&[n0, n1], &[kind0, kind1])?)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn r2r_3d(
        &self,
        n0: usize,
        n1: usize,
        n2: usize,
        kind0: R2rKind,
        kind1: R2rKind,
        kind2: R2rKind,
    ) -> Result<Arc<PlanHandle<T, E>>, PlanError> {
        self.get_or_create(ShapeDescriptor::r2r(&[n0, n1, n2], &[kind0, kind1, kind2])?)
    }

    /// Drop every cached plan and empty the table.
    ///
    /// A whole-cache reset for shutdown or test isolation, not steady-state
    /// eviction. Callers should be quiescent: a handle still held by an
    /// in-flight caller survives (and is destroyed when that caller's
    /// reference drops), but the next lookup for its shape rebuilds from
    /// scratch.
    pub fn clear(&self) {
        let mut table = lock_unpoisoned(&self.table);
        #[cfg(feature = "verbose-logging")]
        debug!("clearing {} cached plans", table.len());
        table.clear();
    }
}
