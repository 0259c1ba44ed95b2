//! Instrumented engine for exercising cache behavior without real math.
//!
//! `CountingEngine` builds trivial plans instantly and records how many
//! plans were built and destroyed, whether two executions of one plan ever
//! overlapped, and (optionally) rendezvouses executions on a barrier to
//! prove that distinct plans really run concurrently.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use planfft::{Complex, PlanError, PlanningEffort, R2rKind, Sign, TransformEngine};

/// Route `log` records (emitted with the `verbose-logging` feature) to the
/// test harness output.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct CountingPlan {
    /// Busy flag for this one plan.
    active: Arc<AtomicBool>,
}

pub struct CountingEngine {
    pub builds: AtomicUsize,
    pub destroys: AtomicUsize,
    /// Executions that began while another execution of the *same* plan was
    /// still running, summed over all plans.
    pub overlaps: AtomicUsize,
    /// Executions hold the plan busy this long, widening any race window.
    pub hold: Duration,
    /// When set, every execution waits here once before finishing.
    pub gate: Mutex<Option<Arc<Barrier>>>,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self {
            builds: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
            hold: Duration::from_millis(0),
            gate: Mutex::new(None),
        }
    }

    pub fn with_hold(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::new()
        }
    }

    pub fn set_gate(&self, gate: Arc<Barrier>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn build(&self) -> CountingPlan {
        self.builds.fetch_add(1, Ordering::SeqCst);
        CountingPlan {
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    fn run(&self, plan: &CountingPlan) {
        if plan.active.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        if !self.hold.is_zero() {
            thread::sleep(self.hold);
        }
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.wait();
        }
        plan.active.store(false, Ordering::SeqCst);
    }
}

impl TransformEngine<f32> for CountingEngine {
    type Plan = CountingPlan;

    fn plan_c2c(
        &self,
        _extents: &[usize],
        _sign: Sign,
        _scratch_in: &mut [Complex<f32>],
        _scratch_out: &mut [Complex<f32>],
        _effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError> {
        Ok(self.build())
    }

    fn plan_r2c(
        &self,
        _extents: &[usize],
        _scratch_in: &mut [f32],
        _scratch_out: &mut [Complex<f32>],
        _effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError> {
        Ok(self.build())
    }

    fn plan_c2r(
        &self,
        _extents: &[usize],
        _scratch_in: &mut [Complex<f32>],
        _scratch_out: &mut [f32],
        _effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError> {
        Ok(self.build())
    }

    fn plan_r2r(
        &self,
        _extents: &[usize],
        _kinds: &[R2rKind],
        _scratch_in: &mut [f32],
        _scratch_out: &mut [f32],
        _effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError> {
        Ok(self.build())
    }

    fn execute_c2c(
        &self,
        plan: &mut Self::Plan,
        _input: &[Complex<f32>],
        _output: &mut [Complex<f32>],
    ) -> Result<(), PlanError> {
        self.run(plan);
        Ok(())
    }

    fn execute_r2c(
        &self,
        plan: &mut Self::Plan,
        _input: &[f32],
        _output: &mut [Complex<f32>],
    ) -> Result<(), PlanError> {
        self.run(plan);
        Ok(())
    }

    fn execute_c2r(
        &self,
        plan: &mut Self::Plan,
        _input: &[Complex<f32>],
        _output: &mut [f32],
    ) -> Result<(), PlanError> {
        self.run(plan);
        Ok(())
    }

    fn execute_r2r(
        &self,
        plan: &mut Self::Plan,
        _input: &[f32],
        _output: &mut [f32],
    ) -> Result<(), PlanError> {
        self.run(plan);
        Ok(())
    }

    fn destroy(&self, plan: Self::Plan) {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        drop(plan);
    }
}
