//! 4x4 Matrices — row-major, vectorized multiply/transform
//!
//! A plain value type: 16 packed f32s, rows contiguous. Multiply and
//! transform dispatch between an SSE kernel and a scalar kernel; both
//! accumulate in the same pairwise order `(a0·b0 + a1·b1) + (a2·b2 + a3·b3)`,
//! so the two strategies produce bit-identical results and the toggle
//! trades speed only. No FMA contraction in either kernel — it would
//! change rounding between paths. On aarch64 the scalar kernel is left to
//! auto-vectorize under NEON.

use crate::strategy::{Strategy, Toggle};

static ACCEL: Toggle = Toggle::new();

/// Enable the SSE multiply/transform kernels.
/// Returns whether this CPU actually has them.
pub fn initialize() -> bool {
    ACCEL.enable("matrix")
}

/// Fall back to the scalar kernels.
pub fn shutdown() {
    ACCEL.disable("matrix")
}

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// 4x4 matrix, 16 packed f32 values in row-major order.
///
/// Default construction yields the identity. Copy/assign replace all 16
/// values at once; multiply and transform leave their operands untouched
/// and write only the designated output.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C, align(16))]
pub struct Matrix4x4 {
    m: [f32; 16],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 16]> for Matrix4x4 {
    fn from(m: [f32; 16]) -> Self {
        Self { m }
    }
}

impl From<&[f32; 16]> for Matrix4x4 {
    fn from(m: &[f32; 16]) -> Self {
        Self { m: *m }
    }
}

impl Matrix4x4 {
    #[must_use]
    pub const fn identity() -> Self {
        Self { m: IDENTITY }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self { m: [0.0; 16] }
    }

    /// Build from 16 row-major values.
    #[must_use]
    pub const fn from_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Replace all 16 values at once, row-major.
    pub fn set(&mut self, data: &[f32; 16]) {
        self.m = *data;
    }

    pub fn set_identity(&mut self) {
        self.m = IDENTITY;
    }

    pub fn set_zero(&mut self) {
        self.m = [0.0; 16];
    }

    /// Read access to the packed row-major buffer.
    #[must_use]
    pub const fn data(&self) -> &[f32; 16] {
        &self.m
    }

    /// Standard row-by-column product: `result = self * other`.
    ///
    /// Dispatches on the module toggle; before [`initialize`] this is the
    /// correct scalar product, never a no-op.
    #[inline(always)]
    pub fn multiply(&self, other: &Matrix4x4, result: &mut Matrix4x4) {
        self.multiply_with(ACCEL.strategy(), other, result);
    }

    /// [`multiply`](Self::multiply) with the execution strategy supplied by
    /// the caller. Both strategies compute identical bits.
    pub fn multiply_with(&self, strategy: Strategy, other: &Matrix4x4, result: &mut Matrix4x4) {
        if strategy == Strategy::Accelerated {
            #[cfg(target_arch = "x86_64")]
            // SAFETY: SSE support is checked at runtime. The kernel loads and
            // stores through unaligned intrinsics on &[f32; 16] buffers with
            // indices in 0..16; result is a distinct &mut, so no aliasing.
            unsafe {
                if is_x86_feature_detected!("sse") {
                    mul4x4_sse(&self.m, &other.m, &mut result.m);
                    return;
                }
            }
        }
        mul4x4_scalar(&self.m, &other.m, &mut result.m);
    }

    /// Matrix-vector product: `result = self * vector`.
    #[inline(always)]
    pub fn transform(&self, vector: &[f32; 4], result: &mut [f32; 4]) {
        self.transform_with(ACCEL.strategy(), vector, result);
    }

    /// [`transform`](Self::transform) with the execution strategy supplied
    /// by the caller.
    pub fn transform_with(&self, strategy: Strategy, vector: &[f32; 4], result: &mut [f32; 4]) {
        if strategy == Strategy::Accelerated {
            #[cfg(target_arch = "x86_64")]
            // SAFETY: SSE support is checked at runtime. Loads are unaligned
            // reads of &[f32; 16] / &[f32; 4]; only `result` is written.
            unsafe {
                if is_x86_feature_detected!("sse") {
                    transform_sse(&self.m, vector, result);
                    return;
                }
            }
        }
        transform_scalar(&self.m, vector, result);
    }
}

impl core::ops::Mul for Matrix4x4 {
    type Output = Matrix4x4;

    fn mul(self, rhs: Matrix4x4) -> Matrix4x4 {
        let mut out = Matrix4x4::zero();
        self.multiply(&rhs, &mut out);
        out
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn mul4x4_sse(a: &[f32; 16], b: &[f32; 16], out: &mut [f32; 16]) {
    use core::arch::x86_64::{
        _mm_add_ps, _mm_loadu_ps, _mm_mul_ps, _mm_set1_ps, _mm_storeu_ps,
    };
    let b0 = _mm_loadu_ps(b.as_ptr());
    let b1 = _mm_loadu_ps(b.as_ptr().add(4));
    let b2 = _mm_loadu_ps(b.as_ptr().add(8));
    let b3 = _mm_loadu_ps(b.as_ptr().add(12));
    for row in 0..4 {
        let a0 = _mm_set1_ps(a[4 * row]);
        let a1 = _mm_set1_ps(a[4 * row + 1]);
        let a2 = _mm_set1_ps(a[4 * row + 2]);
        let a3 = _mm_set1_ps(a[4 * row + 3]);
        // Association must stay in sync with mul4x4_scalar.
        let lo = _mm_add_ps(_mm_mul_ps(a0, b0), _mm_mul_ps(a1, b1));
        let hi = _mm_add_ps(_mm_mul_ps(a2, b2), _mm_mul_ps(a3, b3));
        _mm_storeu_ps(out.as_mut_ptr().add(4 * row), _mm_add_ps(lo, hi));
    }
}

#[inline(always)]
fn mul4x4_scalar(a: &[f32; 16], b: &[f32; 16], out: &mut [f32; 16]) {
    for row in 0..4 {
        for col in 0..4 {
            // Association must stay in sync with mul4x4_sse.
            let lo = a[4 * row] * b[col] + a[4 * row + 1] * b[4 + col];
            let hi = a[4 * row + 2] * b[8 + col] + a[4 * row + 3] * b[12 + col];
            out[4 * row + col] = lo + hi;
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn transform_sse(m: &[f32; 16], v: &[f32; 4], out: &mut [f32; 4]) {
    use core::arch::x86_64::{
        _mm_add_ps, _mm_add_ss, _mm_cvtss_f32, _mm_loadu_ps, _mm_movehl_ps, _mm_mul_ps,
        _mm_shuffle_ps,
    };
    let vv = _mm_loadu_ps(v.as_ptr());
    for row in 0..4 {
        let prod = _mm_mul_ps(_mm_loadu_ps(m.as_ptr().add(4 * row)), vv);
        // Pairwise reduction (p0+p1) + (p2+p3) — same association as
        // transform_scalar.
        let swapped = _mm_shuffle_ps::<0b1011_0001>(prod, prod); // (p1, p0, p3, p2)
        let pairs = _mm_add_ps(prod, swapped);
        let upper = _mm_movehl_ps(pairs, pairs); // lane 0 = p2 + p3
        out[row] = _mm_cvtss_f32(_mm_add_ss(pairs, upper));
    }
}

#[inline(always)]
fn transform_scalar(m: &[f32; 16], v: &[f32; 4], out: &mut [f32; 4]) {
    for row in 0..4 {
        // Association must stay in sync with transform_sse.
        let lo = m[4 * row] * v[0] + m[4 * row + 1] * v[1];
        let hi = m[4 * row + 2] * v[2] + m[4 * row + 3] * v[3];
        out[row] = lo + hi;
    }
}
