use rayon::prelude::*;

use super::*;

/// Parameters shared by every ray of a trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceOptions {
    /// Maximum number of interactions per ray.
    pub interactions: usize,
    /// Pad the path of rays that stop early, so that every traced ray ends up
    /// with the same number of positions. See [`trace_ray`].
    pub fill: bool,
    /// Absolute tolerance used by hit tests.
    pub atol: Float,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            interactions: 100,
            fill: true,
            atol: DEFAULT_ATOL,
        }
    }
}

impl TraceOptions {
    #[inline]
    #[must_use]
    pub fn new(interactions: usize, fill: bool) -> Self {
        Self {
            interactions,
            fill,
            ..Default::default()
        }
    }
}

/// Where a ray is in its trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceState {
    /// The ray can still interact with the scene.
    Advancing,
    /// The ray left the scene: no component is ahead of it.
    NoHit,
    /// The ray was absorbed.
    Absorbed,
    /// The interaction budget was used up.
    Done,
}

impl TraceState {
    #[inline]
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        !matches!(self, Self::Advancing)
    }
}

/// An iterator over the successive interactions of a ray with a scene.
///
/// Each call to `next` renormalizes the ray's direction, moves it to the
/// closest component ahead of it, lets that component act on it, and returns
/// the new position. Iteration ends once the ray escapes or is absorbed, and
/// [`Self::state`] tells which.
#[derive(Debug)]
pub struct RayPath<'a, C: ?Sized> {
    ray: &'a mut Ray,
    scene: &'a C,
    atol: Float,
    state: TraceState,
}

impl<'a, C: Component + ?Sized> RayPath<'a, C> {
    #[inline]
    pub fn new(scene: &'a C, ray: &'a mut Ray, atol: Float) -> Self {
        let state = if ray.continue_tracing() {
            TraceState::Advancing
        } else {
            TraceState::Absorbed
        };

        Self {
            ray,
            scene,
            atol,
            state,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> TraceState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn ray(&self) -> &Ray {
        self.ray
    }
}

impl<'a, C: Component + ?Sized> Iterator for RayPath<'a, C> {
    type Item = Vec2;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminated() {
            return None;
        }

        // keep |v| from drifting away from 1 over many interactions
        renorm_unit_vec(self.ray.direction_mut());

        let Some(t) = self.scene.interact(self.ray, self.atol) else {
            self.state = TraceState::NoHit;
            return None;
        };

        let p = *self.ray.position();
        log::trace!("interaction at t = {t}, position = ({}, {})", p.x, p.y);

        if !self.ray.continue_tracing() {
            self.state = TraceState::Absorbed;
        }

        Some(p)
    }
}

/// Traces `ray` through `scene` for (at most) `opts.interactions` interactions.
///
/// When the ray stops early:
/// - if it escaped the scene, with `opts.fill`, its path is padded with the
///   point one unit further along its final direction, up to its original
///   length plus `opts.interactions`. Without `opts.fill`, that point is
///   added only once, showing where the ray went.
/// - if it was absorbed, with `opts.fill`, its path is padded with the
///   absorption point, up to the same length. Without `opts.fill`, nothing is
///   added.
///
/// A ray that was absorbed before this call is not advanced.
///
/// Returns the state the ray ended up in, which is never [`TraceState::Advancing`].
pub fn trace_ray<C: Component + ?Sized>(scene: &C, ray: &mut Ray, opts: &TraceOptions) -> TraceState {
    let n = opts.interactions;
    let target_len = ray.positions().len() + n;

    if opts.fill {
        ray.reserve(n);
    }

    let mut path = RayPath::new(scene, ray, opts.atol);
    let steps = path.by_ref().take(n).count();

    let state = match path.state() {
        TraceState::Advancing => TraceState::Done,
        s => s,
    };

    match state {
        TraceState::NoHit => {
            let end = ray.at(1.0);

            if opts.fill {
                pad(ray, end, target_len);
            } else {
                ray.push_position(end);
            }
        }
        TraceState::Absorbed if opts.fill => {
            let end = *ray.position();
            pad(ray, end, target_len);
        }
        _ => (),
    }

    log::debug!("ray stopped after {steps} interaction(s): {state:?}");

    state
}

#[inline]
fn pad(ray: &mut Ray, p: Vec2, len: usize) {
    for _ in ray.positions().len()..len {
        ray.push_position(p);
    }
}

/// Traces each ray in `rays` independently, with [`trace_ray`], one after the other.
pub fn trace<C: Component + ?Sized>(
    scene: &C,
    rays: &mut [Ray],
    opts: &TraceOptions,
) -> Vec<TraceState> {
    rays.iter_mut()
        .map(|ray| trace_ray(scene, ray, opts))
        .collect()
}

/// Like [`trace`], but distributes the rays over rayon's thread pool.
///
/// Each ray only touches its own state and reads `scene`, so the result is
/// identical to that of [`trace`].
pub fn trace_par<C: Component + Sync + ?Sized>(
    scene: &C,
    rays: &mut [Ray],
    opts: &TraceOptions,
) -> Vec<TraceState> {
    rays.par_iter_mut()
        .map(|ray| trace_ray(scene, ray, opts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_components::Wall;

    fn mirror(x: Float) -> Wall {
        Wall { x, absorbs: false }
    }

    fn screen(x: Float) -> Wall {
        Wall { x, absorbs: true }
    }

    #[test]
    fn test_bounces_for_n_interactions() {
        let scene = [mirror(-1.0), mirror(1.0)];
        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);

        let state = trace_ray(&scene, &mut ray, &TraceOptions::new(4, true));

        assert_eq!(state, TraceState::Done);
        assert_eq!(
            ray.positions(),
            &[
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(-1.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(-1.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_no_hit_fill() {
        let scene = [mirror(1.0)];
        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);

        let state = trace_ray(&scene, &mut ray, &TraceOptions::new(5, true));

        assert_eq!(state, TraceState::NoHit);
        assert_eq!(ray.positions().len(), 6);
        assert_eq!(ray.positions()[1], Vec2::new(1.0, 0.0));
        for p in &ray.positions()[2..] {
            assert_eq!(*p, Vec2::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_no_hit_without_fill() {
        let scene = [mirror(1.0)];
        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);

        let state = trace_ray(&scene, &mut ray, &TraceOptions::new(5, false));

        assert_eq!(state, TraceState::NoHit);
        assert_eq!(
            ray.positions(),
            &[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)]
        );
    }

    #[test]
    fn test_empty_scene() {
        let scene: [Wall; 0] = [];
        let mut ray = Ray::new([1.0, 2.0], [0.0, 1.0]);

        let state = trace_ray(&scene, &mut ray, &TraceOptions::new(3, true));

        assert_eq!(state, TraceState::NoHit);
        assert_eq!(
            ray.positions(),
            &[Vec2::new(1.0, 2.0), Vec2::new(1.0, 3.0), Vec2::new(1.0, 3.0), Vec2::new(1.0, 3.0)]
        );
    }

    #[test]
    fn test_absorbed_fill() {
        let scene = [mirror(-1.0), screen(2.0)];
        let mut ray = Ray::new([0.0, 0.0], [-1.0, 0.0]);

        let state = trace_ray(&scene, &mut ray, &TraceOptions::new(6, true));

        assert_eq!(state, TraceState::Absorbed);
        assert!(!ray.continue_tracing());
        assert_eq!(ray.positions().len(), 7);
        assert_eq!(ray.positions()[1], Vec2::new(-1.0, 0.0));
        for p in &ray.positions()[2..] {
            assert_eq!(*p, Vec2::new(2.0, 0.0));
        }
    }

    #[test]
    fn test_absorbed_without_fill() {
        let scene = [screen(2.0)];
        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);

        let state = trace_ray(&scene, &mut ray, &TraceOptions::new(6, false));

        assert_eq!(state, TraceState::Absorbed);
        assert_eq!(ray.positions(), &[Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)]);
    }

    #[test]
    fn test_absorbed_on_last_interaction() {
        let scene = [screen(2.0)];
        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);

        let state = trace_ray(&scene, &mut ray, &TraceOptions::new(1, true));

        assert_eq!(state, TraceState::Absorbed);
        assert_eq!(ray.positions().len(), 2);
    }

    #[test]
    fn test_stopped_ray_is_not_advanced() {
        let scene = [mirror(3.0)];
        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);
        ray.stop();

        assert_eq!(
            trace_ray(&scene, &mut ray, &TraceOptions::new(3, false)),
            TraceState::Absorbed
        );
        assert_eq!(ray.positions().len(), 1);

        trace_ray(&scene, &mut ray, &TraceOptions::new(3, true));
        assert_eq!(ray.positions(), &[Vec2::zeros(); 4]);
    }

    #[test]
    fn test_zero_interactions() {
        let scene = [mirror(3.0)];
        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);

        let state = trace_ray(&scene, &mut ray, &TraceOptions::new(0, true));

        assert_eq!(state, TraceState::Done);
        assert_eq!(ray.positions().len(), 1);
    }

    #[test]
    fn test_ray_path_iterator() {
        let scene = vec![mirror(-2.0), mirror(2.0), screen(10.0)];
        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);

        let mut path = RayPath::new(&scene, &mut ray, DEFAULT_ATOL);
        let points: Vec<_> = path.by_ref().take(3).collect();

        assert_eq!(
            points,
            [Vec2::new(2.0, 0.0), Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)]
        );
        assert_eq!(path.state(), TraceState::Advancing);
    }

    #[test]
    fn test_direction_is_renormalized() {
        let scene = [mirror(-1.0), mirror(1.0)];
        let mut ray = Ray::new_unchecked_dir([0.0, 0.0], [1.0 + 1e-5, 0.0]);

        trace_ray(&scene, &mut ray, &TraceOptions::new(3, true));

        assert!((ray.direction().norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scene = [mirror(-1.0), mirror(1.5), screen(-3.0)];
        let make_rays = || -> Vec<Ray> {
            (0..16)
                .map(|i| Ray::new([0.0, 0.0], unit_vec(i as Float * 0.37)))
                .collect()
        };

        let opts = TraceOptions::new(7, true);

        let mut seq = make_rays();
        let mut par = make_rays();

        let seq_states = trace(&scene, &mut seq, &opts);
        let par_states = trace_par(&scene, &mut par, &opts);

        assert_eq!(seq, par);
        assert_eq!(seq_states, par_states);
        assert!(seq.iter().all(|r| r.positions().len() == 8));
    }
}
