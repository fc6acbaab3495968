use std::{io, iter};

use super::*;

/// The surfaces rays are traced through.
///
/// The order of the surfaces only matters for breaking ties between
/// surfaces hit at exactly the same time: the first one added wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    surfaces: Vec<Surface>,
}

impl Scene {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_surface(&mut self, surface: impl Into<Surface>) {
        self.surfaces.push(surface.into());
    }

    #[inline]
    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Traces every ray in `rays` through this scene, see [`optics::trace_ray`].
    pub fn trace(&self, rays: &mut [Ray], opts: &TraceOptions) -> Vec<TraceState> {
        optics::trace(self, rays, opts)
    }

    /// Like [`Self::trace`], but traces rays in parallel.
    pub fn trace_par(&self, rays: &mut [Ray], opts: &TraceOptions) -> Vec<TraceState> {
        optics::trace_par(self, rays, opts)
    }
}

impl From<Vec<Surface>> for Scene {
    fn from(surfaces: Vec<Surface>) -> Self {
        Self { surfaces }
    }
}

impl FromIterator<Surface> for Scene {
    fn from_iter<I: IntoIterator<Item = Surface>>(iter: I) -> Self {
        Self {
            surfaces: iter.into_iter().collect(),
        }
    }
}

impl Component for Scene {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        self.surfaces.test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        self.surfaces.hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        self.surfaces.interact(ray, atol)
    }
}

impl Dump for Scene {
    fn dump(&self, w: &mut dyn io::Write) -> io::Result<()> {
        self.surfaces.dump(w)
    }
}

impl JsonSer for Scene {
    /// An array of surfaces, see [`Surface::from_json`].
    fn to_json(&self) -> serde_json::Value {
        self.surfaces.to_json()
    }
}

impl JsonDes for Scene {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn std::error::Error>> {
        Vec::<Surface>::from_json(json).map(Self::from)
    }
}

impl Random for Scene {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        const MIN_NUM_SURFACES: usize = 1;
        const MAX_NUM_SURFACES: usize = 12;
        let num_surfaces = rng.gen_range(MIN_NUM_SURFACES..=MAX_NUM_SURFACES);

        iter::repeat_with(|| Surface::random(rng))
            .take(num_surfaces)
            .collect()
    }
}
