//! Transform shape descriptors.
//!
//! A [`ShapeDescriptor`] identifies one transform configuration (kind, rank,
//! per-axis extents, direction, per-axis real-to-real variant) and is the
//! key under which a built plan is cached. Two descriptors are equal iff all
//! fields compare equal, and equal descriptors always resolve to the same
//! cached plan handle.

use crate::engine::PlanError;

/// Maximum supported dimensionality.
pub const MAX_RANK: usize = 3;

/// The four transform families a plan can be built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Complex input, complex output.
    C2c,
    /// Packed half-spectrum input, real output.
    C2r,
    /// Real input, packed half-spectrum output.
    R2c,
    /// Real input, real output (cosine/sine family).
    R2r,
}

/// Transform direction for complex-to-complex plans.
///
/// The numeric values follow the usual engine convention: forward is the
/// negative-exponent transform. Both directions are unnormalized; a
/// forward/inverse round trip scales the data by the logical element count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    Forward,
    Inverse,
}

impl Sign {
    /// The conventional integer encoding (`-1` forward, `+1` inverse).
    pub fn value(self) -> i32 {
        match self {
            Sign::Forward => -1,
            Sign::Inverse => 1,
        }
    }
}

/// Per-axis variant of a real-to-real transform.
///
/// The definitions (and the inverse pairings) follow the standard
/// REDFT/RODFT conventions: DCT-II and DCT-III are inverses of each other up
/// to a factor of `2n`, DCT-I and DCT-IV are self-inverse up to `2(n-1)` and
/// `2n` respectively, and analogously for the sine family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum R2rKind {
    Dct1,
    Dct2,
    Dct3,
    Dct4,
    Dst1,
    Dst2,
    Dst3,
    Dst4,
}

/// Immutable value identifying one transform configuration.
///
/// Cheap to construct and copy; built by the execution facade from call
/// parameters on every invocation and discarded after the cache lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeDescriptor {
    kind: TransformKind,
    rank: usize,
    /// Per-axis logical sizes; unused trailing axes fixed at 1.
    extents: [usize; MAX_RANK],
    /// `Sign::value()` for complex-to-complex, 0 otherwise.
    sign: i32,
    /// Per-axis variants for real-to-real, `None` otherwise.
    subkinds: [Option<R2rKind>; MAX_RANK],
}

impl ShapeDescriptor {
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

    /// Descriptor for a complex-to-complex transform over `extents`.
    pub fn c2c(extents: &[usize], sign: Sign) -> Result<Self, PlanError> {
        let (rank, extents) = Self::checked_extents(extents)?;
        Ok(Self {
            kind: TransformKind::C2c,
            rank,
            extents,
            sign: sign.value(),
            subkinds: [None; MAX_RANK],
        })
    }

    /// Descriptor for a real-to-complex transform of real logical `extents`.
    pub fn r2c(extents: &[usize]) -> Result<Self, PlanError> {
        let (rank, extents) = Self::checked_extents(extents)?;
        Ok(Self {
            kind: TransformKind::R2c,
            rank,
            extents,
            sign: 0,
            subkinds: [None; MAX_RANK],
        })
    }

    /// Descriptor for a complex-to-real transform. `extents` are the real
    /// output's logical sizes; the complex input is packed (`n/2 + 1` on the
    /// last axis).
    pub fn c2r(extents: &[usize]) -> Result<Self, PlanError> {
        let (rank, extents) = Self::checked_extents(extents)?;
        Ok(Self {
            kind: TransformKind::C2r,
            rank,
            extents,
            sign: 0,
            subkinds: [None; MAX_RANK],
        })
    }

    /// Descriptor for a real-to-real transform with one variant per axis.
    pub fn r2r(extents: &[usize], kinds: &[R2rKind]) -> Result<Self, PlanError> {
        let (rank, extents) = Self::checked_extents(extents)?;
        if kinds.len() != rank {
            return Err(PlanError::InvalidShape);
        }
        let mut subkinds = [None; MAX_RANK];
        for (slot, &k) in subkinds.iter_mut().zip(kinds) {
            *slot = Some(k);
        }
        Ok(Self {
            kind: TransformKind::R2r,
            rank,
            extents,
            sign: 0,
            subkinds,
        })
    }

    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The logical per-axis sizes, `rank` entries.
    pub fn extents(&self) -> &[usize] {
        &self.extents[..self.rank]
    }

    /// Direction of a complex-to-complex transform; `None` for other kinds.
    pub fn sign(&self) -> Option<Sign> {
        match self.sign {
            -1 => Some(Sign::Forward),
            1 => Some(Sign::Inverse),
            _ => None,
        }
    }

    /// Real-to-real variant of one axis; `None` for other kinds.
    pub fn subkind(&self, axis: usize) -> Option<R2rKind> {
        self.subkinds.get(axis).copied().flatten()
    }

    /// Total logical element count (product of the extents).
    pub fn logical_len(&self) -> usize {
        self.extents().iter().product()
    }

    /// Element count of the packed half-spectrum: the last axis carries
    /// `n/2 + 1` complex values, all other axes keep their full extent.
    pub fn spectrum_len(&self) -> usize {
        let ext = self.extents();
        let last = ext[ext.len() - 1] / 2 + 1;
        ext[..ext.len() - 1].iter().product::<usize>() * last
    }

    /// Element count of the input buffer for this shape's kind. Complex
    /// kinds count `Complex<T>` elements, real kinds count `T` elements.
    pub fn input_len(&self) -> usize {
        match self.kind {
            TransformKind::C2c | TransformKind::R2c | TransformKind::R2r => self.logical_len(),
            TransformKind::C2r => self.spectrum_len(),
        }
    }

    /// Element count of the output buffer for this shape's kind.
    pub fn output_len(&self) -> usize {
        match self.kind {
            TransformKind::C2c | TransformKind::C2r | TransformKind::R2r => self.logical_len(),
            TransformKind::R2c => self.spectrum_len(),
        }
    }
}
