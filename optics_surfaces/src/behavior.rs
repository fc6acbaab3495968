use super::*;

/// The refractive indices on either side of an interface.
///
/// `n1` is the index on the side the surface's normal points to, `n2` the
/// index on the other side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Indices {
    n1: Float,
    n2: Float,
}

impl Indices {
    /// Both indices must be positive and finite.
    pub fn try_new(n1: Float, n2: Float) -> ConstructionResult<Self> {
        if n1 > 0.0 && n2 > 0.0 && n1.is_finite() && n2.is_finite() {
            Ok(Self { n1, n2 })
        } else {
            Err(ConstructionError::InvalidIndices { n1, n2 })
        }
    }

    #[inline]
    #[must_use]
    pub fn n1(&self) -> Float {
        self.n1
    }

    #[inline]
    #[must_use]
    pub fn n2(&self) -> Float {
        self.n2
    }
}

/// What a surface does to a ray that hits it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    /// Specular reflection.
    Mirror,
    /// An interface between two media, obeying Snell's law, with total
    /// internal reflection past the critical angle.
    Refractive(Indices),
    /// Absorbs the ray.
    Screen,
}

impl Behavior {
    pub fn refractive(n1: Float, n2: Float) -> ConstructionResult<Self> {
        Indices::try_new(n1, n2).map(Self::Refractive)
    }

    /// Changes the direction of `ray`, which was just moved onto a surface
    /// whose unit normal at the hit point is `n`, or stops it.
    #[inline]
    pub fn apply(&self, ray: &mut Ray, n: &Vec2) {
        match self {
            Self::Mirror => {
                let v = reflect(&ray.direction(), n);
                ray.set_direction(v);
            }
            Self::Refractive(indices) => {
                let v = refract(&ray.direction(), n, indices.n1, indices.n2);
                ray.set_direction(v);
            }
            Self::Screen => ray.stop(),
        }
    }
}

/// The reflection of `v` across the line orthogonal to the unit vector `n`.
#[inline]
#[must_use]
pub fn reflect(v: &Vec2, n: &Vec2) -> Vec2 {
    v - n * (2.0 * v.dot(n))
}

/// The direction of `v` (a unit vector) after crossing an interface with unit
/// normal `n`, with index `n1` on the side `n` points to, and `n2` on the other.
///
/// Falls back to [`reflect`] when no refracted direction exists (total internal reflection).
#[must_use]
pub fn refract(v: &Vec2, n: &Vec2, n1: Float, n2: Float) -> Vec2 {
    let v_n = v.dot(n);

    // going along the normal means coming from the `n2` side
    let (ni, nf) = if v_n > 0.0 { (n2, n1) } else { (n1, n2) };

    // tangential axis
    let d = Vec2::new(n.y, -n.x);
    let v_d = v.dot(&d);

    let gamma = -v_d * ni / nf;
    let disc = 1.0 - gamma * gamma;

    if disc < 0.0 {
        log::trace!("total internal reflection");
        return reflect(v, n);
    }

    let cos_t = disc.sqrt();
    let candidate = d * -gamma + n * cos_t;

    // the refracted ray keeps going to the same side of both axes
    if v_n * candidate.dot(n) < 0.0 || v_d * candidate.dot(&d) < 0.0 {
        candidate - n * (2.0 * cos_t)
    } else {
        candidate
    }
}

impl JsonType for Behavior {
    fn json_type() -> String {
        "behavior".into()
    }
}

impl JsonSer for Behavior {
    /// Serialize a behavior into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Mirror => serde_json::json!({ "type": "mirror" }),
            Self::Refractive(indices) => serde_json::json!({
                "type": "refractive",
                "n1": indices.n1,
                "n2": indices.n2,
            }),
            Self::Screen => serde_json::json!({ "type": "screen" }),
        }
    }
}

impl JsonDes for Behavior {
    /// Deserialize a behavior from a JSON object.
    ///
    /// The JSON object must follow one of the following formats:
    ///
    /// ```json
    /// { "type": "mirror" }
    /// { "type": "screen" }
    /// { "type": "refractive", "n1": 1.0, "n2": 1.5 } // (indices must be positive)
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn std::error::Error>> {
        let behavior_type = json
            .get("type")
            .ok_or("Missing behavior type")?
            .as_str()
            .ok_or("type must be a string")?;

        match behavior_type {
            "mirror" => Ok(Self::Mirror),
            "screen" => Ok(Self::Screen),
            "refractive" => {
                let n1 = float_field(json, "n1")?;
                let n2 = float_field(json, "n2")?;

                Ok(Self::refractive(n1, n2)?)
            }
            other => Err(format!("invalid behavior type: {other}").into()),
        }
    }
}

impl Random for Behavior {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        match rng.gen_range(0..10) {
            0..=4 => Self::Mirror,
            5..=7 => Self::Refractive(Indices {
                n1: rng.gen_range(1.0..2.5),
                n2: rng.gen_range(1.0..2.5),
            }),
            _ => Self::Screen,
        }
    }
}
