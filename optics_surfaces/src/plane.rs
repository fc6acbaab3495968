use super::*;

/// A straight line segment between two points.
///
/// Its normal is the segment's direction rotated by a quarter turn
/// counter-clockwise, i. e. it points to the left when going from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneSegment {
    start: Vec2,
    end: Vec2,
    /// `end - start`, normalized
    d: Vec2,
    n: Vec2,
}

impl PlaneSegment {
    /// # Panics
    ///
    /// If `start` and `end` are equal, or not finite. See [`Self::try_new`].
    #[inline]
    #[must_use]
    pub fn new(start: impl Into<Vec2>, end: impl Into<Vec2>) -> Self {
        Self::try_new(start, end).expect("invalid segment")
    }

    pub fn try_new(start: impl Into<Vec2>, end: impl Into<Vec2>) -> ConstructionResult<Self> {
        let (start, end) = (start.into(), end.into());

        ensure_finite(&[start.x, start.y, end.x, end.y])?;

        let d = (end - start)
            .try_normalize(0.0)
            .ok_or(ConstructionError::DegenerateSegment)?;

        Ok(Self {
            start,
            end,
            d,
            n: perp(&d),
        })
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> &Vec2 {
        &self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> &Vec2 {
        &self.end
    }

    /// The unit vector pointing from `start` to `end`.
    #[inline]
    #[must_use]
    pub fn direction(&self) -> &Vec2 {
        &self.d
    }

    #[inline]
    #[must_use]
    pub fn normal(&self) -> &Vec2 {
        &self.n
    }

    #[inline]
    pub fn with_start(&self, start: impl Into<Vec2>) -> ConstructionResult<Self> {
        Self::try_new(start, self.end)
    }

    #[inline]
    pub fn with_end(&self, end: impl Into<Vec2>) -> ConstructionResult<Self> {
        Self::try_new(self.start, end)
    }

    /// Intersects the ray `r + t * v` with this segment, seen as
    /// `start + s * (end - start)`, `s` in `[0, 1]`.
    ///
    /// Returns `(t, s)`, where `t` is [`Float::INFINITY`] if the ray is
    /// parallel to the segment, misses it, or is within `atol` of it already.
    /// `s` is `NaN` in the parallel case.
    #[must_use]
    pub fn solve(&self, r: &Vec2, v: &Vec2, atol: Float) -> (Float, Float) {
        let e = self.end - self.start;
        let denom = cross(v, &e);

        if is_close(denom, 0.0, atol) {
            return (Float::INFINITY, Float::NAN);
        }

        let w = self.start - r;
        let t = cross(&w, &e) / denom;
        let s = cross(&w, v) / denom;

        if t > 0.0 && !is_close(t, 0.0, atol) && (0.0..=1.0).contains(&s) {
            (t, s)
        } else {
            (Float::INFINITY, s)
        }
    }
}

impl Dump for PlaneSegment {
    /// `start.x end.x` on one line, `start.y end.y` on the next.
    fn dump(&self, w: &mut dyn std::io::Write) -> std::io::Result<()> {
        write_rows(w, [self.start, self.end])
    }
}

impl JsonType for PlaneSegment {
    fn json_type() -> String {
        "plane".into()
    }
}

impl JsonSer for PlaneSegment {
    /// Serialize a segment into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "start": [self.start.x, self.start.y],
            "end": [self.end.x, self.end.y],
        })
    }
}

impl JsonDes for PlaneSegment {
    /// Deserialize a new segment from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "start": [1., 2.],
    ///     "end": [3., 4.], // (must differ from "start")
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn std::error::Error>> {
        let start = vector_field(json, "start")?;
        let end = vector_field(json, "end")?;

        Ok(Self::try_new(start, end)?)
    }
}

impl Random for PlaneSegment {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let start = rand_vect(rng, SCENE_HALF_WIDTH);
            let end = start + rand_vect(rng, SCENE_HALF_WIDTH / 2.0);

            if let Ok(segment) = Self::try_new(start, end) {
                break segment;
            }
        }
    }
}
