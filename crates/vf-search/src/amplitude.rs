//! Real amplitude vectors over `2^dim` configurations.
//!
//! Bit `i` of an index is design choice `i`. Every operation acts on pairs of
//! indices that differ only in one bit, so the vector stays a valid
//! superposition (unit norm) as long as it started as one.

use std::f64::consts::FRAC_1_SQRT_2;

use vf_types::{ConfigurationDistribution, VfResult};

use crate::MAX_DIM;

pub(crate) fn check_dim(dim: usize) -> VfResult<()> {
    if dim == 0 || dim > MAX_DIM {
        return Err(vf_types::invalid_input!(
            "dim must be between 1 and {MAX_DIM}, got {dim}"
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeVector {
    dim: usize,
    amplitudes: Vec<f64>,
}

impl AmplitudeVector {
    /// The all-off configuration with unit amplitude.
    pub fn ground(dim: usize) -> VfResult<Self> {
        check_dim(dim)?;
        let mut amplitudes = vec![0.0; 1 << dim];
        amplitudes[0] = 1.0;
        Ok(Self { dim, amplitudes })
    }

    /// Kronecker product of per-bit `(off, on)` pairs; `pairs[i]` drives bit `i`.
    pub fn product(pairs: &[(f64, f64)]) -> VfResult<Self> {
        check_dim(pairs.len())?;
        let mut amplitudes = Vec::with_capacity(1 << pairs.len());
        amplitudes.push(1.0);
        for &(off, on) in pairs {
            let half = amplitudes.len();
            amplitudes.extend_from_within(..);
            for a in &mut amplitudes[..half] {
                *a *= off;
            }
            for a in &mut amplitudes[half..] {
                *a *= on;
            }
        }
        Ok(Self {
            dim: pairs.len(),
            amplitudes,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a * a).sum()
    }

    /// Apply a 2x2 real matrix `[[m00, m01], [m10, m11]]` to `bit`.
    fn apply_pairwise(&mut self, bit: usize, m: [[f64; 2]; 2]) {
        let stride = 1 << bit;
        for base in 0..self.amplitudes.len() {
            if base & stride != 0 {
                continue;
            }
            let a0 = self.amplitudes[base];
            let a1 = self.amplitudes[base | stride];
            self.amplitudes[base] = m[0][0] * a0 + m[0][1] * a1;
            self.amplitudes[base | stride] = m[1][0] * a0 + m[1][1] * a1;
        }
    }

    pub fn hadamard(&mut self, bit: usize) {
        self.apply_pairwise(
            bit,
            [[FRAC_1_SQRT_2, FRAC_1_SQRT_2], [FRAC_1_SQRT_2, -FRAC_1_SQRT_2]],
        );
    }

    pub fn hadamard_all(&mut self) {
        for bit in 0..self.dim {
            self.hadamard(bit);
        }
    }

    /// Rotate amplitude between the off and on states of `bit` by `theta`.
    pub fn rotate(&mut self, bit: usize, theta: f64) {
        let (s, c) = (theta / 2.0).sin_cos();
        self.apply_pairwise(bit, [[c, -s], [s, c]]);
    }

    /// Flip `target` wherever `control` is set.
    pub fn controlled_not(&mut self, control: usize, target: usize) {
        let c = 1 << control;
        let t = 1 << target;
        for index in 0..self.amplitudes.len() {
            if index & c != 0 && index & t == 0 {
                self.amplitudes.swap(index, index | t);
            }
        }
    }

    /// Negate the amplitude of every configuration accepted by `marked`.
    pub fn invert_marked(&mut self, marked: impl Fn(usize) -> bool) {
        for (index, a) in self.amplitudes.iter_mut().enumerate() {
            if marked(index) {
                *a = -*a;
            }
        }
    }

    pub fn into_distribution(self) -> VfResult<ConfigurationDistribution> {
        ConfigurationDistribution::normalize(self.amplitudes.into_iter().map(|a| a * a).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-12, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn product_places_bit_i_at_stride_two_to_the_i() {
        let v = AmplitudeVector::product(&[(1.0, 0.0), (0.0, 1.0)]).unwrap();
        // bit 0 off, bit 1 on => index 0b10
        assert_close(v.as_slice(), &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn product_of_unit_pairs_has_unit_norm() {
        let pairs: Vec<(f64, f64)> = [0.3_f64, 1.1, -0.7]
            .iter()
            .map(|t| (t.cos(), t.sin()))
            .collect();
        let v = AmplitudeVector::product(&pairs).unwrap();
        assert_eq!(v.as_slice().len(), 8);
        assert!((v.norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hadamard_is_self_inverse() {
        let mut v = AmplitudeVector::product(&[(0.6, 0.8), (1.0, 0.0)]).unwrap();
        let before = v.clone();
        v.hadamard_all();
        v.hadamard_all();
        assert_close(v.as_slice(), before.as_slice());
    }

    #[test]
    fn entangling_sequence_builds_all_off_all_on_superposition() {
        let mut v = AmplitudeVector::ground(3).unwrap();
        v.hadamard(0);
        v.controlled_not(0, 1);
        v.controlled_not(0, 2);
        let h = FRAC_1_SQRT_2;
        assert_close(v.as_slice(), &[h, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, h]);
    }

    #[test]
    fn rotate_by_pi_moves_all_mass_to_on() {
        let mut v = AmplitudeVector::ground(1).unwrap();
        v.rotate(0, std::f64::consts::PI);
        assert!(v.as_slice()[0].abs() < 1e-12);
        assert!((v.as_slice()[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invert_marked_preserves_norm() {
        let mut v = AmplitudeVector::ground(2).unwrap();
        v.hadamard_all();
        v.invert_marked(|i| i == 3);
        assert_close(v.as_slice(), &[0.5, 0.5, 0.5, -0.5]);
        assert!((v.norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_out_of_range_dim() {
        assert!(AmplitudeVector::ground(0).is_err());
        assert!(AmplitudeVector::ground(MAX_DIM + 1).is_err());
        assert!(AmplitudeVector::product(&[]).is_err());
    }
}
