use super::*;

/// A light ray, together with the path it has travelled so far.
///
/// The path is an append-only list of positions, whose first element is the
/// launch point, and whose last element is where the ray currently is.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pos: Vec<Vec2>,
    v: Vec2,
    continue_tracing: bool,
}

impl Ray {
    /// Creates a ray at `init`, travelling along `v`, normalized.
    ///
    /// # Panics
    ///
    /// If `v` is the zero vector.
    #[inline]
    #[must_use]
    pub fn new(init: impl Into<Vec2>, v: impl Into<Vec2>) -> Self {
        Self::try_new(init, v).expect("direction must be non-zero")
    }

    /// Returns `None` if `v` is the zero vector (or not finite).
    #[inline]
    #[must_use]
    pub fn try_new(init: impl Into<Vec2>, v: impl Into<Vec2>) -> Option<Self> {
        let v = v.into();
        let norm = v.norm();

        (norm > 0.0 && norm.is_finite()).then(|| Self::new_unchecked_dir(init, v / norm))
    }

    /// Does not normalize `v`.
    ///
    /// Tracing assumes directions close to unit length, and only corrects small drifts.
    #[inline]
    #[must_use]
    pub fn new_unchecked_dir(init: impl Into<Vec2>, v: impl Into<Vec2>) -> Self {
        Self {
            pos: vec![init.into()],
            v: v.into(),
            continue_tracing: true,
        }
    }

    /// The current position of the ray, i. e. the last point in its path.
    #[inline]
    #[must_use]
    pub fn position(&self) -> &Vec2 {
        // `pos` is never empty
        &self.pos[self.pos.len() - 1]
    }

    /// The point the ray was launched from.
    #[inline]
    #[must_use]
    pub fn launch_point(&self) -> &Vec2 {
        &self.pos[0]
    }

    /// Every position recorded so far, launch point first.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vec2] {
        &self.pos
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        self.v
    }

    #[inline]
    pub fn set_direction(&mut self, v: Vec2) {
        self.v = v;
    }

    #[inline]
    pub fn direction_mut(&mut self) -> &mut Vec2 {
        &mut self.v
    }

    /// `false` once the ray has been absorbed.
    #[inline]
    #[must_use]
    pub fn continue_tracing(&self) -> bool {
        self.continue_tracing
    }

    /// Marks the ray as absorbed. Tracing will not advance it any further.
    #[inline]
    pub fn stop(&mut self) {
        self.continue_tracing = false;
    }

    /// Appends `p` to the path. It becomes the current position.
    #[inline]
    pub fn push_position(&mut self, p: Vec2) {
        self.pos.push(p);
    }

    /// Returns the current position translated by `self.direction() * t`.
    #[inline]
    #[must_use]
    pub fn at(&self, t: Float) -> Vec2 {
        self.position() + self.v * t
    }

    #[inline]
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.pos.reserve(additional);
    }

    /// Forgets the traced path, putting the ray back at its launch point
    /// with a new direction, ready to be traced again.
    #[inline]
    pub fn reset(&mut self, new_v: Vec2) {
        self.pos.truncate(1);
        self.v = new_v;
        self.continue_tracing = true;
    }

    /// Like [`Self::reset`], but also moves the launch point.
    #[inline]
    pub fn reset_with_start(&mut self, new_v: Vec2, new_start: Vec2) {
        self.reset(new_v);
        self.pos[0] = new_start;
    }
}
