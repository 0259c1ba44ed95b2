//! Bundled pure-Rust transform engine.
//!
//! [`ScalarEngine`] implements the [`TransformEngine`] boundary without any
//! native library. Plan construction precomputes per-axis twiddle or
//! cosine/sine tables plus the workspaces execution needs; execution is the
//! row-column algorithm, one axis pass at a time. Both directions are
//! unnormalized, real-input transforms use the packed `n/2 + 1` spectrum,
//! and the real-to-real variants follow the REDFT/RODFT definitions.
//!
//! Power-of-two axis lengths use an iterative radix-2 kernel; other lengths
//! fall back to a direct table-driven DFT. This engine exists to make the
//! cache functional and testable, not to compete on throughput.

use core::marker::PhantomData;

use crate::engine::{PlanError, PlanningEffort, TransformEngine};
use crate::num::{Complex, Float};
use crate::shape::{R2rKind, Sign, MAX_RANK};

/// Stateless engine front; all per-shape state lives in the plan.
pub struct ScalarEngine<T: Float> {
    _precision: PhantomData<fn() -> T>,
}

impl<T: Float> ScalarEngine<T> {
    pub fn new() -> Self {
        Self {
            _precision: PhantomData,
        }
    }
}

impl<T: Float> Default for ScalarEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

enum AxisOp<T: Float> {
    /// Forward twiddles `exp(-2πik/n)` for `k = 0..n`; the inverse pass
    /// conjugates on the fly.
    Dft(Vec<Complex<T>>),
    /// Dense `n × n` coefficient matrix, row `k` holding the weights of
    /// output bin `k`. Boundary terms of the DCT-I/DST-III style variants
    /// are folded into the matrix.
    R2r(Vec<T>),
}

struct Axis<T: Float> {
    n: usize,
    op: AxisOp<T>,
}

enum PlanKind {
    C2c(Sign),
    R2c,
    C2r,
    R2r,
}

/// Execution schedule built by [`ScalarEngine`].
///
/// Execution mutates the plan's workspaces, so one plan must never run from
/// two threads at once; the cache's per-handle lock provides that.
pub struct ScalarPlan<T: Float> {
    kind: PlanKind,
    rank: usize,
    extents: [usize; MAX_RANK],
    axes: Vec<Axis<T>>,
    cwork: Vec<Complex<T>>,
    cline: Vec<Complex<T>>,
    cline_tmp: Vec<Complex<T>>,
    rwork: Vec<T>,
    rline: Vec<T>,
    rline_tmp: Vec<T>,
}

impl<T: Float> ScalarPlan<T> {
    fn extents(&self) -> &[usize] {
        &self.extents[..self.rank]
    }

    fn logical_len(&self) -> usize {
        self.extents().iter().product()
    }

    fn spectrum_len(&self) -> usize {
        let ext = self.extents();
        ext[..ext.len() - 1].iter().product::<usize>() * (ext[ext.len() - 1] / 2 + 1)
    }
}

fn usize_to_float<T: Float>(x: usize) -> Result<T, PlanError> {
    T::from_usize(x).ok_or(PlanError::InvalidShape)
}

fn checked_extents(extents: &[usize]) -> Result<(usize, [usize; MAX_RANK]), PlanError> {
    let rank = extents.len();
    if rank == 0 || rank > MAX_RANK {
        return Err(PlanError::InvalidShape);
    }
    let mut padded = [1usize; MAX_RANK];
    for (slot, &n) in padded.iter_mut().zip(extents) {
        if n == 0 {
            return Err(PlanError::InvalidShape);
        }
        *slot = n;
    }
    Ok((rank, padded))
}

fn dft_twiddles<T: Float>(n: usize) -> Result<Vec<Complex<T>>, PlanError> {
    let step = -(T::from_f32(2.0) * T::pi()) / usize_to_float::<T>(n)?;
    let mut table = Vec::with_capacity(n);
    for k in 0..n {
        table.push(Complex::expi(step * usize_to_float::<T>(k)?));
    }
    Ok(table)
}

fn r2r_matrix<T: Float>(n: usize, kind: R2rKind) -> Result<Vec<T>, PlanError> {
    if n == 0 || (kind == R2rKind::Dct1 && n < 2) {
        return Err(PlanError::InvalidShape);
    }
    let pi = T::pi();
    let half = T::from_f32(0.5);
    let two = T::from_f32(2.0);
    let fl = usize_to_float::<T>;
    let sign_pow = |k: usize| if k % 2 == 0 { T::one() } else { -T::one() };

    let mut m = vec![T::zero(); n * n];
    for k in 0..n {
        for j in 0..n {
            let v = match kind {
                R2rKind::Dct1 => {
                    if j == 0 {
                        T::one()
                    } else if j == n - 1 {
                        sign_pow(k)
                    } else {
                        two * (pi * fl(j)? * fl(k)? / fl(n - 1)?).cos()
                    }
                }
                R2rKind::Dct2 => two * (pi * (fl(j)? + half) * fl(k)? / fl(n)?).cos(),
                R2rKind::Dct3 => {
                    if j == 0 {
                        T::one()
                    } else {
                        two * (pi * fl(j)? * (fl(k)? + half) / fl(n)?).cos()
                    }
                }
                R2rKind::Dct4 => two * (pi * (fl(j)? + half) * (fl(k)? + half) / fl(n)?).cos(),
                R2rKind::Dst1 => two * (pi * fl(j + 1)? * fl(k + 1)? / fl(n + 1)?).sin(),
                R2rKind::Dst2 => two * (pi * (fl(j)? + half) * fl(k + 1)? / fl(n)?).sin(),
                R2rKind::Dst3 => {
                    if j == n - 1 {
                        sign_pow(k)
                    } else {
                        two * (pi * fl(j + 1)? * (fl(k)? + half) / fl(n)?).sin()
                    }
                }
                R2rKind::Dst4 => two * (pi * (fl(j)? + half) * (fl(k)? + half) / fl(n)?).sin(),
            };
            m[k * n + j] = v;
        }
    }
    Ok(m)
}

/// Row-major strides for the given extents.
fn strides(extents: &[usize]) -> [usize; MAX_RANK] {
    let rank = extents.len();
    let mut s = [1usize; MAX_RANK];
    for i in (0..rank.saturating_sub(1)).rev() {
        s[i] = s[i + 1] * extents[i + 1];
    }
    s
}

/// Visit every 1-D line along `axis`, yielding the line's base offset; the
/// stride between consecutive line elements is `strides(extents)[axis]`.
fn for_each_line(extents: &[usize], axis: usize, mut f: impl FnMut(usize)) {
    let n = extents[axis];
    let stride = strides(extents)[axis];
    let total: usize = extents.iter().product();
    let blocks = total / (n * stride);
    for block in 0..blocks {
        let block_base = block * n * stride;
        for inner in 0..stride {
            f(block_base + inner);
        }
    }
}

fn bit_reverse_permute<T: Float>(line: &mut [Complex<T>]) {
    let n = line.len();
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            line.swap(i, j);
        }
    }
}

/// One 1-D DFT over `line[..n]`. `twiddles` is the full forward table for
/// this length; the inverse direction conjugates each factor.
fn dft_line<T: Float>(
    twiddles: &[Complex<T>],
    inverse: bool,
    line: &mut [Complex<T>],
    tmp: &mut [Complex<T>],
) {
    let n = line.len();
    if n <= 1 {
        return;
    }
    if n.is_power_of_two() {
        bit_reverse_permute(line);
        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let step = n / len;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let mut w = twiddles[k * step];
                    if inverse {
                        w = w.conj();
                    }
                    let a = line[start + k];
                    let b = line[start + k + half] * w;
                    line[start + k] = a + b;
                    line[start + k + half] = a - b;
                }
            }
            len <<= 1;
        }
    } else {
        for (k, out) in tmp[..n].iter_mut().enumerate() {
            let mut acc = Complex::zero();
            for (j, &x) in line.iter().enumerate() {
                let mut w = twiddles[(j * k) % n];
                if inverse {
                    w = w.conj();
                }
                acc = acc + x * w;
            }
            *out = acc;
        }
        line.copy_from_slice(&tmp[..n]);
    }
}

impl<T: Float> ScalarPlan<T> {
    /// Full-array complex transform: one DFT pass per axis.
    fn dft_all_axes(&mut self, inverse: bool) {
        let rank = self.rank;
        let extents = self.extents;
        let ScalarPlan {
            axes,
            cwork,
            cline,
            cline_tmp,
            ..
        } = self;
        for (axis, axis_plan) in axes.iter().enumerate() {
            let (n, twiddles) = match axis_plan {
                Axis {
                    n,
                    op: AxisOp::Dft(t),
                } => (*n, t),
                // r2r plans never reach this path
                _ => unreachable!("complex pass over a real-to-real axis"),
            };
            let stride = strides(&extents[..rank])[axis];
            for_each_line(&extents[..rank], axis, |base| {
                for k in 0..n {
                    cline[k] = cwork[base + k * stride];
                }
                dft_line(twiddles, inverse, &mut cline[..n], &mut cline_tmp[..n]);
                for k in 0..n {
                    cwork[base + k * stride] = cline[k];
                }
            });
        }
    }

    /// One real matrix pass per axis for the real-to-real variants.
    fn r2r_all_axes(&mut self) {
        let rank = self.rank;
        let extents = self.extents;
        let ScalarPlan {
            axes,
            rwork,
            rline,
            rline_tmp,
            ..
        } = self;
        for (axis, axis_plan) in axes.iter().enumerate() {
            let (n, matrix) = match axis_plan {
                Axis {
                    n,
                    op: AxisOp::R2r(m),
                } => (*n, m),
                _ => unreachable!("real pass over a complex axis"),
            };
            let stride = strides(&extents[..rank])[axis];
            for_each_line(&extents[..rank], axis, |base| {
                for k in 0..n {
                    rline[k] = rwork[base + k * stride];
                }
                for k in 0..n {
                    let row = &matrix[k * n..(k + 1) * n];
                    let mut acc = T::zero();
                    for j in 0..n {
                        acc = row[j].mul_add(rline[j], acc);
                    }
                    rline_tmp[k] = acc;
                }
                for k in 0..n {
                    rwork[base + k * stride] = rline_tmp[k];
                }
            });
        }
    }

    /// Copy the packed half-spectrum out of the full-size workspace.
    fn pack_spectrum(&self, output: &mut [Complex<T>]) {
        let ext = self.extents();
        let rank = ext.len();
        let h = ext[rank - 1] / 2 + 1;
        let mut pext = [1usize; MAX_RANK];
        pext[..rank].copy_from_slice(ext);
        pext[rank - 1] = h;
        let fs = strides(ext);
        let ps = strides(&pext[..rank]);
        for (p, slot) in output.iter_mut().enumerate() {
            let mut rem = p;
            let mut full = 0usize;
            for i in 0..rank {
                let c = rem / ps[i];
                rem %= ps[i];
                full += c * fs[i];
            }
            *slot = self.cwork[full];
        }
    }

    /// Rebuild the full spectrum from the packed half-spectrum using the
    /// conjugate symmetry `X[c] = conj(X[-c mod extents])` across all axes.
    fn unpack_spectrum(&mut self, input: &[Complex<T>]) {
        let rank = self.rank;
        let ext = self.extents;
        let ext = &ext[..rank];
        let h = ext[rank - 1] / 2 + 1;
        let mut pext = [1usize; MAX_RANK];
        pext[..rank].copy_from_slice(ext);
        pext[rank - 1] = h;
        let fs = strides(ext);
        let ps = strides(&pext[..rank]);
        for full in 0..self.cwork.len() {
            let mut rem = full;
            let mut coords = [0usize; MAX_RANK];
            for i in 0..rank {
                coords[i] = rem / fs[i];
                rem %= fs[i];
            }
            self.cwork[full] = if coords[rank - 1] < h {
                let mut p = 0usize;
                for i in 0..rank {
                    p += coords[i] * ps[i];
                }
                input[p]
            } else {
                let mut p = 0usize;
                for i in 0..rank - 1 {
                    let mirrored = (ext[i] - coords[i]) % ext[i];
                    p += mirrored * ps[i];
                }
                p += ext[rank - 1] - coords[rank - 1];
                input[p].conj()
            };
        }
    }
}

impl<T: Float> ScalarEngine<T> {
    fn complex_plan(
        &self,
        kind: PlanKind,
        extents: &[usize],
    ) -> Result<ScalarPlan<T>, PlanError> {
        let (rank, padded) = checked_extents(extents)?;
        let mut axes = Vec::with_capacity(rank);
        for &n in extents {
            axes.push(Axis {
                n,
                op: AxisOp::Dft(dft_twiddles(n)?),
            });
        }
        let logical: usize = extents.iter().product();
        let max_axis = extents.iter().copied().max().unwrap_or(1);
        Ok(ScalarPlan {
            kind,
            rank,
            extents: padded,
            axes,
            cwork: vec![Complex::zero(); logical],
            cline: vec![Complex::zero(); max_axis],
            cline_tmp: vec![Complex::zero(); max_axis],
            rwork: Vec::new(),
            rline: Vec::new(),
            rline_tmp: Vec::new(),
        })
    }
}

impl<T: Float> TransformEngine<T> for ScalarEngine<T> {
    type Plan = ScalarPlan<T>;

    fn plan_c2c(
        &self,
        extents: &[usize],
        sign: Sign,
        scratch_in: &mut [Complex<T>],
        scratch_out: &mut [Complex<T>],
        _effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError> {
        // Effort is accepted for interface parity; this engine has a single
        // planning strategy.
        let plan = self.complex_plan(PlanKind::C2c(sign), extents)?;
        if scratch_in.len() != plan.logical_len() || scratch_out.len() != plan.logical_len() {
            return Err(PlanError::MismatchedLengths);
        }
        Ok(plan)
    }

    fn plan_r2c(
        &self,
        extents: &[usize],
        scratch_in: &mut [T],
        scratch_out: &mut [Complex<T>],
        _effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError> {
        let plan = self.complex_plan(PlanKind::R2c, extents)?;
        if scratch_in.len() != plan.logical_len() || scratch_out.len() != plan.spectrum_len() {
            return Err(PlanError::MismatchedLengths);
        }
        Ok(plan)
    }

    fn plan_c2r(
        &self,
        extents: &[usize],
        scratch_in: &mut [Complex<T>],
        scratch_out: &mut [T],
        _effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError> {
        let plan = self.complex_plan(PlanKind::C2r, extents)?;
        if scratch_in.len() != plan.spectrum_len() || scratch_out.len() != plan.logical_len() {
            return Err(PlanError::MismatchedLengths);
        }
        Ok(plan)
    }

    fn plan_r2r(
        &self,
        extents: &[usize],
        kinds: &[R2rKind],
        scratch_in: &mut [T],
        scratch_out: &mut [T],
        _effort: PlanningEffort,
    ) -> Result<Self::Plan, PlanError> {
        let (rank, padded) = checked_extents(extents)?;
        if kinds.len() != rank {
            return Err(PlanError::InvalidShape);
        }
        let mut axes = Vec::with_capacity(rank);
        for (&n, &kind) in extents.iter().zip(kinds) {
            axes.push(Axis {
                n,
                op: AxisOp::R2r(r2r_matrix(n, kind)?),
            });
        }
        let logical: usize = extents.iter().product();
        if scratch_in.len() != logical || scratch_out.len() != logical {
            return Err(PlanError::MismatchedLengths);
        }
        let max_axis = extents.iter().copied().max().unwrap_or(1);
        Ok(ScalarPlan {
            kind: PlanKind::R2r,
            rank,
            extents: padded,
            axes,
            cwork: Vec::new(),
            cline: Vec::new(),
            cline_tmp: Vec::new(),
            rwork: vec![T::zero(); logical],
            rline: vec![T::zero(); max_axis],
            rline_tmp: vec![T::zero(); max_axis],
        })
    }

    fn execute_c2c(
        &self,
        plan: &mut Self::Plan,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError> {
        let sign = match plan.kind {
            PlanKind::C2c(sign) => sign,
            _ => return Err(PlanError::UnsupportedKind),
        };
        let n = plan.logical_len();
        if input.len() != n || output.len() != n {
            return Err(PlanError::MismatchedLengths);
        }
        plan.cwork.copy_from_slice(input);
        plan.dft_all_axes(sign == Sign::Inverse);
        output.copy_from_slice(&plan.cwork);
        Ok(())
    }

    fn execute_r2c(
        &self,
        plan: &mut Self::Plan,
        input: &[T],
        output: &mut [Complex<T>],
    ) -> Result<(), PlanError> {
        if !matches!(plan.kind, PlanKind::R2c) {
            return Err(PlanError::UnsupportedKind);
        }
        if input.len() != plan.logical_len() || output.len() != plan.spectrum_len() {
            return Err(PlanError::MismatchedLengths);
        }
        for (slot, &x) in plan.cwork.iter_mut().zip(input) {
            *slot = Complex::new(x, T::zero());
        }
        plan.dft_all_axes(false);
        plan.pack_spectrum(output);
        Ok(())
    }

    fn execute_c2r(
        &self,
        plan: &mut Self::Plan,
        input: &[Complex<T>],
        output: &mut [T],
    ) -> Result<(), PlanError> {
        if !matches!(plan.kind, PlanKind::C2r) {
            return Err(PlanError::UnsupportedKind);
        }
        if input.len() != plan.spectrum_len() || output.len() != plan.logical_len() {
            return Err(PlanError::MismatchedLengths);
        }
        plan.unpack_spectrum(input);
        plan.dft_all_axes(true);
        for (slot, c) in output.iter_mut().zip(&plan.cwork) {
            *slot = c.re;
        }
        Ok(())
    }

    fn execute_r2r(
        &self,
        plan: &mut Self::Plan,
        input: &[T],
        output: &mut [T],
    ) -> Result<(), PlanError> {
        if !matches!(plan.kind, PlanKind::R2r) {
            return Err(PlanError::UnsupportedKind);
        }
        let n = plan.logical_len();
        if input.len() != n || output.len() != n {
            return Err(PlanError::MismatchedLengths);
        }
        plan.rwork.copy_from_slice(input);
        plan.r2r_all_axes();
        output.copy_from_slice(&plan.rwork);
        Ok(())
    }
}
