use optics::*;

use std::iter;
pub use rand;

pub trait Random: Sized {
    /// Generate a randomized value of this type using the provided `rng`
    ///
    /// This method must not fail. If creating a value is faillible, keep trying until success
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

/// Half the side of the square random positions are drawn from.
pub const SCENE_HALF_WIDTH: Float = 7.0;

impl Random for Ray {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        let origin = rand_vect(rng, SCENE_HALF_WIDTH);

        loop {
            if let Some(ray) = Ray::try_new(origin, rand_vect(rng, 1.0)) {
                break ray;
            }
        }
    }
}

/// Generates a random scene, and between 1 and 31 rays to trace through it.
pub fn random_simulation<S: Random>(rng: &mut (impl rand::Rng + ?Sized)) -> (S, Vec<Ray>) {
    const MIN_NUM_RAYS: usize = 1;
    const MAX_NUM_RAYS: usize = 32;
    let num_rays = rng.gen_range(MIN_NUM_RAYS..MAX_NUM_RAYS);

    (S::random(rng), random_rays(rng, num_rays))
}

pub fn random_rays(rng: &mut (impl rand::Rng + ?Sized), n: usize) -> Vec<Ray> {
    iter::repeat_with(|| Ray::random(rng)).take(n).collect()
}

/// A vector whose coordinates are uniformly distributed in `-max_coord_mag..max_coord_mag`.
pub fn rand_vect(rng: &mut (impl rand::Rng + ?Sized), max_coord_mag: Float) -> Vec2 {
    // the rng generates floats in 0.0..1.0, scale and translate the range accordingly

    Vec2::from_fn(|_, _| (rng.gen::<Float>() - 0.5) * (max_coord_mag.abs() * 2.0))
}

/// A direction uniformly distributed on the unit circle.
pub fn random_unit_vec(rng: &mut (impl rand::Rng + ?Sized)) -> Vec2 {
    unit_vec(rng.gen_range(0.0..std::f64::consts::TAU))
}
