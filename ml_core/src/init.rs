use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::{MlErr, Result};

/// Samples `n` weights using Xavier uniform initialization.
///
/// # Arguments
/// * `rng` - A random number generator.
/// * `fan_in` - The number of input units in the weight tensor.
/// * `fan_out` - The number of output units in the weight tensor.
/// * `n` - The amount of weights to sample.
pub fn xavier_uniform<R: Rng>(rng: &mut R, fan_in: usize, fan_out: usize, n: usize) -> Result<Vec<f32>> {
    if fan_in + fan_out == 0 {
        return Err(MlErr::InvalidInput("xavier init needs a nonzero fan"));
    }

    let range = (6. / (fan_in + fan_out) as f32).sqrt();
    let distribution = Uniform::new(-range, range)
        .map_err(|_| MlErr::InvalidInput("xavier init produced an empty range"))?;

    Ok((0..n).map(|_| distribution.sample(rng)).collect())
}
