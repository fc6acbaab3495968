use std::{ops::Deref, rc::Rc, sync::Arc};

pub use nalgebra;

mod dump;
mod ray;
mod trace;
mod vector;

pub use dump::*;
pub use ray::*;
pub use trace::*;
pub use vector::*;

pub type Float = f64;

/// A two dimensional vector, used both for positions and directions.
pub type Vec2 = nalgebra::Vector2<Float>;

/// Absolute tolerance used when none is configured.
///
/// Hit times at or below this value are treated as the ray still sitting
/// on the surface it just left.
pub const DEFAULT_ATOL: Float = 1e-8;

/// The core trait of this library: anything a ray can interact with.
///
/// A component reports when (if ever) a ray will next reach it, and knows
/// how to change the ray once it does.
///
/// Both methods must be deterministic with respect to the ray: for the same
/// ray (and without modifying `self` in between) [`Self::test_hit`] always
/// reports the same time and [`Self::hit`] always performs the same change.
pub trait Component {
    /// Returns the smallest time `t > atol` such that
    /// [`ray.at(t)`](Ray::at) lies on this component, or
    /// [`Float::INFINITY`] if there is none.
    ///
    /// Never reporting times within `atol` of zero keeps a ray that has just
    /// left a surface from immediately hitting it again.
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float;

    /// Moves `ray` forward to its next intersection with this component,
    /// appending the hit position to its history, then updates its direction
    /// (or stops it) according to what this component does to light.
    ///
    /// Does nothing if [`Self::test_hit`] reports no hit.
    fn hit(&self, ray: &mut Ray, atol: Float);

    /// Combines [`Self::test_hit`] and [`Self::hit`]: performs the next
    /// interaction, if any, and returns the time it took place at.
    ///
    /// Collections override this to avoid searching their children twice.
    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        let t = self.test_hit(ray, atol);
        is_valid_time(t).then(|| {
            self.hit(ray, atol);
            t
        })
    }
}

#[inline]
fn is_valid_time(t: Float) -> bool {
    t.is_finite() && t > 0.0
}

/// Determines which, if any, of `components` the ray interacts with next.
///
/// Returns the index of the component with the strictly smallest finite,
/// positive hit time, along with that time. Ties go to the component found
/// first.
#[inline]
#[must_use]
pub fn next_component<T: Component>(
    components: &[T],
    ray: &Ray,
    atol: Float,
) -> Option<(usize, Float)> {
    let mut best: Option<(usize, Float)> = None;

    for (i, c) in components.iter().enumerate() {
        let t = c.test_hit(ray, atol);

        if is_valid_time(t) && best.map_or(true, |(_, best_t)| t < best_t) {
            best = Some((i, t));
        }
    }

    best
}

use impl_trait_for_tuples::impl_for_tuples;

#[impl_for_tuples(1, 12)]
impl Component for T {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        let mut best = Float::INFINITY;
        for_tuples!( #( best = best.min(T.test_hit(ray, atol)); )* );
        best
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        let _ = self.interact(ray, atol);
    }

    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        let t = self.test_hit(ray, atol);

        if !is_valid_time(t) {
            return None;
        }

        // the first member reporting the winning time takes the hit
        let mut pending = true;
        for_tuples!( #(
            if pending && T.test_hit(ray, atol) == t {
                T.hit(ray, atol);
                pending = false;
            }
        )* );

        Some(t)
    }
}

impl<T: Component> Component for [T] {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        next_component(self, ray, atol).map_or(Float::INFINITY, |(_, t)| t)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        let _ = self.interact(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        next_component(self, ray, atol).map(|(i, t)| {
            self[i].hit(ray, atol);
            t
        })
    }
}

impl<const N: usize, T: Component> Component for [T; N] {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        self.as_slice().test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        self.as_slice().hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        self.as_slice().interact(ray, atol)
    }
}

impl<T: Component> Component for Vec<T> {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        self.as_slice().test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        self.as_slice().hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        self.as_slice().interact(ray, atol)
    }
}

// It's clear that all these impls use the `Deref` trait, but writing a blanket impl over all types
// implementing `Deref` makes it impossible to implement `Component` for new types downstream.

impl<T: Component + ?Sized> Component for Box<T> {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        self.deref().test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        self.deref().hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        self.deref().interact(ray, atol)
    }
}

impl<T: Component + ?Sized> Component for Rc<T> {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        self.deref().test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        self.deref().hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        self.deref().interact(ray, atol)
    }
}

impl<T: Component + ?Sized> Component for Arc<T> {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        self.deref().test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        self.deref().hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        self.deref().interact(ray, atol)
    }
}

impl<'a, T: Component + ?Sized> Component for &'a T {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        (*self).test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        (*self).hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        (*self).interact(ray, atol)
    }
}

impl<'a, T: Component + ?Sized> Component for &'a mut T {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        self.deref().test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        self.deref().hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        self.deref().interact(ray, atol)
    }
}

#[cfg(test)]
pub(crate) mod test_components {
    use super::*;

    /// An infinite vertical line at `x` that either reflects or absorbs.
    #[derive(Clone, Copy, Debug)]
    pub struct Wall {
        pub x: Float,
        pub absorbs: bool,
    }

    impl Component for Wall {
        fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
            let (r, v) = (ray.position(), ray.direction());

            if v.x.abs() <= atol {
                return Float::INFINITY;
            }

            let t = (self.x - r.x) / v.x;

            if t > 0.0 && !is_close(t, 0.0, atol) {
                t
            } else {
                Float::INFINITY
            }
        }

        fn hit(&self, ray: &mut Ray, atol: Float) {
            let t = self.test_hit(ray, atol);

            if !t.is_finite() {
                return;
            }

            let p = ray.at(t);
            ray.push_position(p);

            if self.absorbs {
                ray.stop();
            } else {
                let v = ray.direction();
                ray.set_direction(Vec2::new(-v.x, v.y));
            }
        }
    }
}
