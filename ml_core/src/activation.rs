use ndarray::{Array2, Axis};

use crate::Activation;

impl Activation {
    /// Returns true when the activation is applied element-wise and has an
    /// element-wise derivative the backward pass must chain through.
    pub(crate) fn is_elementwise(self) -> bool {
        matches!(self, Activation::Relu | Activation::Sigmoid)
    }

    pub(crate) fn f(self, z: f32) -> f32 {
        match self {
            Activation::Relu => z.max(0.),
            Activation::Sigmoid => 1. / (1. + (-z).exp()),
            Activation::Linear | Activation::Softmax => z,
        }
    }

    pub(crate) fn df(self, z: f32) -> f32 {
        match self {
            Activation::Relu => {
                if z > 0. {
                    1.
                } else {
                    0.
                }
            }
            Activation::Sigmoid => {
                let s = 1. / (1. + (-z).exp());
                s * (1. - s)
            }
            Activation::Linear | Activation::Softmax => 1.,
        }
    }
}

/// Normalizes every row of `a` into a probability distribution, shifted by
/// the row maximum for numeric stability.
pub(crate) fn softmax_rows(a: &mut Array2<f32>) {
    for mut row in a.axis_iter_mut(Axis(0)) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        row.mapv_inplace(|z| (z - max).exp());
        let sum = row.sum();
        if sum > 0. {
            row.mapv_inplace(|e| e / sum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn softmax_rows_sum_to_one() {
        let mut a = array![[1.0_f32, 2.0, 3.0], [0.0, 0.0, 0.0]];
        softmax_rows(&mut a);

        for row in a.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-6);
        }
        // Largest logit keeps the largest probability.
        assert!(a[[0, 2]] > a[[0, 1]] && a[[0, 1]] > a[[0, 0]]);
    }

    #[test]
    fn relu_and_sigmoid_derivatives() {
        assert_eq!(Activation::Relu.f(-1.), 0.);
        assert_eq!(Activation::Relu.df(2.), 1.);
        assert!((Activation::Sigmoid.f(0.) - 0.5).abs() < 1e-6);
        assert!((Activation::Sigmoid.df(0.) - 0.25).abs() < 1e-6);
    }
}
