use std::f64::consts::TAU;

use super::*;

/// Number of points used to draw an arc.
pub const ARC_DUMP_POINTS: usize = 100;

/// Relative threshold under which the discriminant is treated as zero.
const TANGENCY_EPS: Float = Float::EPSILON * 64.0;

/// The part of the circle of center `centre` and radius `radius` going
/// counter-clockwise from the angle `start` to the angle `end`.
///
/// Angles are in radians, measured from the x axis. `start` may be
/// negative, so that arcs crossing the positive x axis are expressed as,
/// for example, `-π/2..π/2`. Ranges spanning `2π` or more are full circles.
///
/// The normal at any point of the arc points away from its centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircularArc {
    centre: Vec2,
    radius: Float,
    start: Float,
    end: Float,
    radius_sq: Float,
    sin_start: Float,
    cos_start: Float,
    /// The end point, relative to the centre, in the frame where `start` is at angle `0`
    end_p: Vec2,
    full: bool,
}

impl CircularArc {
    /// # Panics
    ///
    /// If the parameters are invalid, see [`Self::try_new`].
    #[inline]
    #[must_use]
    pub fn new(centre: impl Into<Vec2>, radius: Float, start: Float, end: Float) -> Self {
        Self::try_new(centre, radius, start, end).expect("invalid arc")
    }

    /// A full circle.
    ///
    /// # Panics
    ///
    /// If `radius` isn't positive.
    #[inline]
    #[must_use]
    pub fn circle(centre: impl Into<Vec2>, radius: Float) -> Self {
        Self::new(centre, radius, 0.0, TAU)
    }

    /// Requires a positive `radius`, and `start < end`.
    pub fn try_new(
        centre: impl Into<Vec2>,
        radius: Float,
        start: Float,
        end: Float,
    ) -> ConstructionResult<Self> {
        let centre = centre.into();

        ensure_finite(&[centre.x, centre.y, radius, start, end])?;

        if radius <= 0.0 {
            return Err(ConstructionError::NonPositiveRadius(radius));
        }

        if start >= end {
            return Err(ConstructionError::EmptyRange { start, end });
        }

        let (sin_start, cos_start) = start.sin_cos();
        let span = end - start;

        Ok(Self {
            centre,
            radius,
            start,
            end,
            radius_sq: radius * radius,
            sin_start,
            cos_start,
            end_p: unit_vec(span) * radius,
            full: span >= TAU,
        })
    }

    #[inline]
    #[must_use]
    pub fn centre(&self) -> &Vec2 {
        &self.centre
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> Float {
        self.radius
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> Float {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> Float {
        self.end
    }

    #[inline]
    #[must_use]
    pub fn is_full_circle(&self) -> bool {
        self.full
    }

    #[inline]
    pub fn with_range(&self, start: Float, end: Float) -> ConstructionResult<Self> {
        Self::try_new(self.centre, self.radius, start, end)
    }

    #[inline]
    pub fn with_centre(&self, centre: impl Into<Vec2>) -> ConstructionResult<Self> {
        Self::try_new(centre, self.radius, self.start, self.end)
    }

    #[inline]
    pub fn with_radius(&self, radius: Float) -> ConstructionResult<Self> {
        Self::try_new(self.centre, radius, self.start, self.end)
    }

    /// Whether the point `p` of the circle, given relative to the centre,
    /// lies within the arc's angular range.
    #[must_use]
    pub fn in_range(&self, p: &Vec2) -> bool {
        if self.full {
            return true;
        }

        let p = rotate_sc(p, self.sin_start, self.cos_start);
        let end_p = &self.end_p;

        if end_p.y >= 0.0 {
            // the arc spans at most a half turn
            p.y >= 0.0 && end_p.x <= p.x
        } else {
            p.y >= 0.0 || p.x <= end_p.x
        }
    }

    /// Returns the smallest `t` (not within `atol` of `0`) such that `r + t * v`
    /// lies on the arc, or [`Float::INFINITY`] if there is none.
    #[must_use]
    pub fn solve(&self, r: &Vec2, v: &Vec2, atol: Float) -> Float {
        // substituting `X` for `r + t * v` in the circle equation:
        // `|X - centre|^2 = radius^2` results in a quadratic equation in `t`.

        let d = r - self.centre;

        let a = v.norm_squared();
        let b = d.dot(v);
        let c = d.norm_squared() - self.radius_sq;

        let delta = b.mul_add(b, -a * c);

        if delta < 0.0 || a == 0.0 {
            return Float::INFINITY;
        }

        // a grazing ray: both roots are the tangency point
        let root = if delta <= TANGENCY_EPS * self.radius_sq * a {
            0.0
        } else {
            delta.sqrt()
        };

        [(-b - root) / a, (-b + root) / a]
            .into_iter()
            .find(|&t| t > 0.0 && !is_close(t, 0.0, atol) && self.in_range(&(d + v * t)))
            .unwrap_or(Float::INFINITY)
    }

    /// Outward unit normal at `p`, a point of the arc.
    #[inline]
    #[must_use]
    pub fn normal_at(&self, p: &Vec2) -> Vec2 {
        (p - self.centre) / self.radius
    }

    /// `n` points of the arc, evenly spaced from the angle `start` to the angle `end`, both included.
    #[must_use]
    pub fn sample_points(&self, n: usize) -> Vec<Vec2> {
        let step = match n {
            0 | 1 => 0.0,
            n => (self.end - self.start) / (n - 1) as Float,
        };

        (0..n)
            .map(|i| self.centre + unit_vec(self.start + step * i as Float) * self.radius)
            .collect()
    }
}

impl Dump for CircularArc {
    /// [`ARC_DUMP_POINTS`] sampled points, x coordinates then y coordinates.
    fn dump(&self, w: &mut dyn std::io::Write) -> std::io::Result<()> {
        write_rows(w, self.sample_points(ARC_DUMP_POINTS))
    }
}

impl JsonType for CircularArc {
    fn json_type() -> String {
        "arc".into()
    }
}

impl JsonSer for CircularArc {
    /// Serialize an arc into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "centre": [self.centre.x, self.centre.y],
            "radius": self.radius,
            "start": self.start,
            "end": self.end,
        })
    }
}

impl JsonDes for CircularArc {
    /// Deserialize a new arc from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "centre": [1., 2.],
    ///     "radius": 3., // (must be positive)
    ///     "start": -1.5, // (radians)
    ///     "end": 1.5, // (radians, must be greater than "start")
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn std::error::Error>> {
        let centre = vector_field(json, "centre")?;
        let radius = float_field(json, "radius")?;
        let start = float_field(json, "start")?;
        let end = float_field(json, "end")?;

        Ok(Self::try_new(centre, radius, start, end)?)
    }
}

impl Random for CircularArc {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let centre = rand_vect(rng, SCENE_HALF_WIDTH);
            let radius = rng.gen_range(0.5..SCENE_HALF_WIDTH / 2.0);
            let start = rng.gen_range(-TAU / 2.0..TAU / 2.0);
            let span = rng.gen_range(0.0..=TAU);

            if let Ok(arc) = Self::try_new(centre, radius, start, start + span) {
                break arc;
            }
        }
    }
}
