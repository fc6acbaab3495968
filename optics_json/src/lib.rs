use optics::*;
use std::{error::Error, ops::Deref, rc::Rc, sync::Arc};

pub use serde_json;

/// Reads a JSON array of exactly two numbers as a vector.
pub fn json_array_to_vector(json_array: &[serde_json::Value]) -> Option<Vec2> {
    let [x, y] = json_array else {
        return None;
    };

    Some(Vec2::new(x.as_f64()?, y.as_f64()?))
}

/// Reads the `[x, y]` array found at `key` in `json`.
pub fn vector_field(json: &serde_json::Value, key: &str) -> Result<Vec2, Box<dyn Error>> {
    let array = json
        .get(key)
        .ok_or_else(|| format!("missing field: {key}"))?
        .as_array()
        .ok_or_else(|| format!("{key} must be an array"))?;

    json_array_to_vector(array).ok_or_else(|| format!("{key} must be an array of two numbers").into())
}

/// Reads the number found at `key` in `json`.
pub fn float_field(json: &serde_json::Value, key: &str) -> Result<Float, Box<dyn Error>> {
    json.get(key)
        .ok_or_else(|| format!("missing field: {key}"))?
        .as_f64()
        .ok_or_else(|| format!("{key} must be a number").into())
}

pub fn map_json_array<C: FromIterator<T>, T>(
    json: &serde_json::Value,
    map: impl FnMut(&serde_json::Value) -> Result<T, Box<dyn Error>>,
) -> Result<C, Box<dyn Error>> {
    json.as_array()
        .ok_or("json value must be an array")?
        .iter()
        .map(map)
        .collect()
}

pub trait JsonType {
    /// Returns a string, unique to the type, found in the "type" field of the json
    /// representation of a value of this type.
    fn json_type() -> String;
}

pub trait JsonSer {
    /// Serialize `self` into a JSON value.
    fn to_json(&self) -> serde_json::Value;
}

impl<T: JsonSer> JsonSer for [T] {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(Vec::from_iter(self.iter().map(T::to_json)))
    }
}

impl<const N: usize, T: JsonSer> JsonSer for [T; N] {
    fn to_json(&self) -> serde_json::Value {
        self.as_slice().to_json()
    }
}

impl<T: JsonSer> JsonSer for Vec<T> {
    fn to_json(&self) -> serde_json::Value {
        self.as_slice().to_json()
    }
}

// It's clear that all these impls use the `Deref` trait, but writing a blanket impl over all
// types implementing `Deref` makes the trait unusable downstream

impl<T: JsonSer + ?Sized> JsonSer for Box<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer + ?Sized> JsonSer for Arc<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer + ?Sized> JsonSer for Rc<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<'a, T: JsonSer + ?Sized> JsonSer for &'a T {
    fn to_json(&self) -> serde_json::Value {
        (*self).to_json()
    }
}

pub trait JsonDes {
    /// Deserialize from a JSON value.
    ///
    /// Returns an error if `json`'s format or values are invalid.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;
}

impl<T: JsonDes> JsonDes for Vec<T> {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        map_json_array(json, T::from_json)
    }
}

impl<T: JsonDes> JsonDes for Box<T> {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        T::from_json(json).map(Box::new)
    }
}

impl JsonSer for Ray {
    /// Serialize a ray into a JSON object.
    ///
    /// Only the launch point and the current direction are kept, the format
    /// of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        let (origin, direction) = (self.launch_point(), self.direction());

        serde_json::json!({
            "origin": [origin.x, origin.y],
            "direction": [direction.x, direction.y],
        })
    }
}

impl JsonDes for Ray {
    /// Deserialize a new ray from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "origin": [1., 2.],
    ///     "direction": [3., 4.], // (normalized, must be non-zero)
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let origin = vector_field(json, "origin")?;
        let direction = vector_field(json, "direction")?;

        Ok(Ray::try_new(origin, direction).ok_or("unable to normalize ray direction")?)
    }
}

impl JsonSer for TraceOptions {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "interactions": self.interactions,
            "fill": self.fill,
            "atol": self.atol,
        })
    }
}

impl JsonDes for TraceOptions {
    /// Deserialize trace options from a JSON object.
    ///
    /// Every field is optional, and defaults to the value in [`TraceOptions::default`]:
    ///
    /// ```json
    /// {
    ///     "interactions": 100,
    ///     "fill": true,
    ///     "atol": 1e-8, // (must be positive)
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let mut opts = TraceOptions::default();

        if !json.is_object() {
            return Err("trace options must be an object".into());
        }

        if let Some(n) = json.get("interactions") {
            let n = n.as_u64().ok_or("interactions must be a non-negative integer")?;
            opts.interactions = usize::try_from(n)?;
        }

        if let Some(fill) = json.get("fill") {
            opts.fill = fill.as_bool().ok_or("fill must be a boolean")?;
        }

        if let Some(atol) = json.get("atol") {
            let atol = atol.as_f64().ok_or("atol must be a number")?;

            if !(atol > 0.0 && atol.is_finite()) {
                return Err("atol must be positive".into());
            }

            opts.atol = atol;
        }

        Ok(opts)
    }
}

pub fn serialize_simulation(
    surfaces: &(impl JsonSer + ?Sized),
    rays: impl IntoIterator<Item = Ray>,
    opts: &TraceOptions,
) -> serde_json::Value {
    serde_json::json!({
        "surfaces": surfaces.to_json(),
        "rays": Vec::from_iter(rays.into_iter().map(|ray| ray.to_json())),
        "trace": opts.to_json(),
    })
}

/// Reads a simulation back from the format written by [`serialize_simulation`].
///
/// The `"trace"` field may be omitted, in which case default options are returned.
pub fn deserialize_simulation<S: JsonDes>(
    json: &serde_json::Value,
) -> Result<(S, Vec<Ray>, TraceOptions), Box<dyn Error>> {
    let surfaces = S::from_json(json.get("surfaces").ok_or("surfaces field expected")?)?;

    let rays: Vec<Ray> = map_json_array(
        json.get("rays").ok_or("rays field expected")?,
        Ray::from_json,
    )?;

    let opts = match json.get("trace") {
        Some(trace) => TraceOptions::from_json(trace)?,
        None => TraceOptions::default(),
    };

    log::debug!("deserialized simulation with {} ray(s), {opts:?}", rays.len());

    Ok((surfaces, rays, opts))
}
