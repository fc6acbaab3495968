use std::io;

use super::*;

/// The shape of a simple surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Plane(PlaneSegment),
    Arc(CircularArc),
}

impl Geometry {
    /// The time at which the ray `r + t * v` next meets this shape,
    /// [`Float::INFINITY`] if it doesn't.
    #[inline]
    #[must_use]
    pub fn solve(&self, r: &Vec2, v: &Vec2, atol: Float) -> Float {
        match self {
            Self::Plane(plane) => plane.solve(r, v, atol).0,
            Self::Arc(arc) => arc.solve(r, v, atol),
        }
    }

    /// The unit normal at `p`, a point of this shape.
    #[inline]
    #[must_use]
    pub fn normal_at(&self, p: &Vec2) -> Vec2 {
        match self {
            Self::Plane(plane) => *plane.normal(),
            Self::Arc(arc) => arc.normal_at(p),
        }
    }
}

impl From<PlaneSegment> for Geometry {
    fn from(plane: PlaneSegment) -> Self {
        Self::Plane(plane)
    }
}

impl From<CircularArc> for Geometry {
    fn from(arc: CircularArc) -> Self {
        Self::Arc(arc)
    }
}

impl Dump for Geometry {
    fn dump(&self, w: &mut dyn io::Write) -> io::Result<()> {
        match self {
            Self::Plane(plane) => plane.dump(w),
            Self::Arc(arc) => arc.dump(w),
        }
    }
}

impl Random for Geometry {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        if rng.gen_bool(0.5) {
            PlaneSegment::random(rng).into()
        } else {
            CircularArc::random(rng).into()
        }
    }
}

/// An optical surface: either a shape with a behavior, or a group of surfaces.
#[derive(Clone, Debug, PartialEq)]
pub enum Surface {
    Simple {
        geometry: Geometry,
        behavior: Behavior,
    },
    Composite(Composite),
}

impl Surface {
    #[inline]
    #[must_use]
    pub fn new(geometry: impl Into<Geometry>, behavior: Behavior) -> Self {
        Self::Simple {
            geometry: geometry.into(),
            behavior,
        }
    }

    #[inline]
    #[must_use]
    pub fn mirror(geometry: impl Into<Geometry>) -> Self {
        Self::new(geometry, Behavior::Mirror)
    }

    #[inline]
    #[must_use]
    pub fn screen(geometry: impl Into<Geometry>) -> Self {
        Self::new(geometry, Behavior::Screen)
    }

    /// See [`Indices`] for which side each index belongs to.
    #[inline]
    pub fn refractive(geometry: impl Into<Geometry>, n1: Float, n2: Float) -> ConstructionResult<Self> {
        Behavior::refractive(n1, n2).map(|behavior| Self::new(geometry, behavior))
    }

    /// Moves `ray` forward by `t`, then lets the behavior act on it.
    fn hit_at(geometry: &Geometry, behavior: &Behavior, ray: &mut Ray, t: Float) {
        let p = ray.at(t);
        ray.push_position(p);

        behavior.apply(ray, &geometry.normal_at(&p));
    }
}

impl From<Composite> for Surface {
    fn from(composite: Composite) -> Self {
        Self::Composite(composite)
    }
}

impl Component for Surface {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        match self {
            Self::Simple { geometry, .. } => geometry.solve(ray.position(), &ray.direction(), atol),
            Self::Composite(composite) => composite.test_hit(ray, atol),
        }
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        let _ = self.interact(ray, atol);
    }

    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        match self {
            Self::Simple { geometry, behavior } => {
                let t = geometry.solve(ray.position(), &ray.direction(), atol);

                t.is_finite().then(|| {
                    Self::hit_at(geometry, behavior, ray, t);
                    t
                })
            }
            Self::Composite(composite) => composite.interact(ray, atol),
        }
    }
}

impl Dump for Surface {
    fn dump(&self, w: &mut dyn io::Write) -> io::Result<()> {
        match self {
            Self::Simple { geometry, .. } => geometry.dump(w),
            Self::Composite(composite) => composite.dump(w),
        }
    }
}

impl JsonSer for Surface {
    /// Serialize a surface into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Simple { geometry, behavior } => {
                let (json_type, data) = match geometry {
                    Geometry::Plane(plane) => (PlaneSegment::json_type(), plane.to_json()),
                    Geometry::Arc(arc) => (CircularArc::json_type(), arc.to_json()),
                };

                serde_json::json!({
                    "type": json_type,
                    "data": data,
                    "behavior": behavior.to_json(),
                })
            }
            Self::Composite(composite) => serde_json::json!({
                "type": Composite::json_type(),
                "data": composite.to_json(),
            }),
        }
    }
}

impl JsonDes for Surface {
    /// Deserialize a new surface from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "type": "plane", // or "arc", or "composite"
    ///     "data": // <layout depends on the value at "type">
    ///     "behavior": // <a behavior, absent for composites>
    /// }
    /// ```
    ///
    /// See [`PlaneSegment::from_json`], [`CircularArc::from_json`],
    /// [`Composite::from_json`] and [`Behavior::from_json`].
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn std::error::Error>> {
        let surface_type = json
            .get("type")
            .ok_or("Missing surface type")?
            .as_str()
            .ok_or("type must be a string")?;

        let data = json.get("data").ok_or("Missing surface data")?;

        if surface_type == Composite::json_type() {
            return Composite::from_json(data).map(Self::Composite);
        }

        let geometry: Geometry = if surface_type == PlaneSegment::json_type() {
            PlaneSegment::from_json(data)?.into()
        } else if surface_type == CircularArc::json_type() {
            CircularArc::from_json(data)?.into()
        } else {
            return Err(format!("invalid surface type: {surface_type}").into());
        };

        let behavior = Behavior::from_json(json.get("behavior").ok_or("Missing surface behavior")?)?;

        Ok(Self::new(geometry, behavior))
    }
}

impl Random for Surface {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        // prisms are rarer than simple surfaces
        if rng.gen_ratio(1, 8) {
            return Composite::random(rng).into();
        }

        Self::new(Geometry::random(rng), Behavior::random(rng))
    }
}

/// An ordered group of surfaces, hit as a whole by the ray: the child that
/// would be reached first takes the hit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Composite {
    children: Vec<Surface>,
}

impl Composite {
    #[inline]
    #[must_use]
    pub fn new(children: Vec<Surface>) -> Self {
        Self { children }
    }

    #[inline]
    pub fn add(&mut self, child: impl Into<Surface>) {
        self.children.push(child.into());
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Surface] {
        &self.children
    }

    /// A triangular prism of index `n_inside`, in a medium of index `n_outside`.
    ///
    /// The facets are oriented so that their normals point outwards,
    /// whatever the winding of the vertices.
    pub fn prism(
        p1: impl Into<Vec2>,
        p2: impl Into<Vec2>,
        p3: impl Into<Vec2>,
        n_inside: Float,
        n_outside: Float,
    ) -> ConstructionResult<Self> {
        let (p1, p2, p3) = (p1.into(), p2.into(), p3.into());

        ensure_finite(&[p1.x, p1.y, p2.x, p2.y, p3.x, p3.y])?;

        let area = cross(&(p2 - p1), &(p3 - p1));

        if area == 0.0 {
            return Err(ConstructionError::DegenerateTriangle);
        }

        // segment normals point to the left, so counter-clockwise facets would face inwards
        let facets = if area > 0.0 {
            [(p2, p1), (p3, p2), (p1, p3)]
        } else {
            [(p1, p2), (p2, p3), (p3, p1)]
        };

        let behavior = Behavior::refractive(n_outside, n_inside)?;

        let children = facets
            .into_iter()
            .map(|(start, end)| PlaneSegment::try_new(start, end).map(|plane| Surface::new(plane, behavior)))
            .collect::<ConstructionResult<_>>()?;

        Ok(Self { children })
    }
}

impl Component for Composite {
    #[inline]
    fn test_hit(&self, ray: &Ray, atol: Float) -> Float {
        self.children.test_hit(ray, atol)
    }

    #[inline]
    fn hit(&self, ray: &mut Ray, atol: Float) {
        self.children.hit(ray, atol);
    }

    #[inline]
    fn interact(&self, ray: &mut Ray, atol: Float) -> Option<Float> {
        self.children.interact(ray, atol)
    }
}

impl Dump for Composite {
    /// The dumps of all children, in order.
    fn dump(&self, w: &mut dyn io::Write) -> io::Result<()> {
        self.children.dump(w)
    }
}

impl JsonType for Composite {
    fn json_type() -> String {
        "composite".into()
    }
}

impl JsonSer for Composite {
    /// An array of surfaces.
    fn to_json(&self) -> serde_json::Value {
        self.children.to_json()
    }
}

impl JsonDes for Composite {
    /// Deserialize a composite from an array of surfaces, see [`Surface::from_json`].
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn std::error::Error>> {
        map_json_array(json, Surface::from_json).map(Self::new)
    }
}

impl Random for Composite {
    /// A random prism.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let centre = rand_vect(rng, SCENE_HALF_WIDTH);
            let [p1, p2, p3] = [(); 3].map(|_| centre + rand_vect(rng, SCENE_HALF_WIDTH / 3.0));
            let n_inside = rng.gen_range(1.2..2.5);

            if let Ok(prism) = Self::prism(p1, p2, p3, n_inside, 1.0) {
                break prism;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mirror(half: Float) -> Composite {
        let corners = [[-half, -half], [half, -half], [half, half], [-half, half]];

        Composite::new(
            (0..4)
                .map(|i| Surface::mirror(PlaneSegment::new(corners[i], corners[(i + 1) % 4])))
                .collect(),
        )
    }

    #[test]
    fn test_simple_surface_hit() {
        let surface = Surface::mirror(PlaneSegment::new([1.0, -2.0], [1.0, 2.0]));
        let mut ray = Ray::new([0.0, 0.0], [1.0, 1.0]);

        let t = surface.test_hit(&ray, DEFAULT_ATOL);
        assert!((t - Float::sqrt(2.0)).abs() < 1e-15);

        surface.hit(&mut ray, DEFAULT_ATOL);

        assert!(is_close_vec(ray.position(), &Vec2::new(1.0, 1.0), 1e-15));
        assert!(is_close_vec(&ray.direction(), &Vec2::new(-1.0, 1.0).normalize(), 1e-15));
    }

    #[test]
    fn test_hit_without_intersection_does_nothing() {
        let surface = Surface::screen(PlaneSegment::new([1.0, -2.0], [1.0, 2.0]));
        let mut ray = Ray::new([0.0, 0.0], [-1.0, 0.0]);

        surface.hit(&mut ray, DEFAULT_ATOL);

        assert_eq!(ray.positions().len(), 1);
        assert!(ray.continue_tracing());
    }

    #[test]
    fn test_composite_delegates_to_earliest_child() {
        let mut composite = Composite::default();
        composite.add(Surface::mirror(PlaneSegment::new([3.0, -1.0], [3.0, 1.0])));
        composite.add(Surface::screen(PlaneSegment::new([2.0, -1.0], [2.0, 1.0])));

        let mut ray = Ray::new([0.0, 0.0], [1.0, 0.0]);

        assert_eq!(composite.interact(&mut ray, DEFAULT_ATOL), Some(2.0));
        assert!(!ray.continue_tracing());
        assert_eq!(*ray.position(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_nested_composites() {
        let inner = Composite::new(vec![Surface::screen(CircularArc::circle([0.0, 0.0], 1.0))]);
        let outer = Surface::Composite(Composite::new(vec![
            Surface::mirror(CircularArc::circle([0.0, 0.0], 3.0)),
            inner.into(),
        ]));

        let mut ray = Ray::new([-5.0, 0.0], [1.0, 0.0]);

        // outer mirror first, reflected back out
        assert_eq!(outer.interact(&mut ray, DEFAULT_ATOL), Some(2.0));
        assert!(is_close_vec(&ray.direction(), &Vec2::new(-1.0, 0.0), 1e-15));
        assert_eq!(outer.interact(&mut ray, DEFAULT_ATOL), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let square = square_mirror(1.0);
        let mut copy = square.clone();
        copy.add(Surface::screen(PlaneSegment::new([0.0, 0.0], [0.5, 0.0])));

        assert_eq!(square.children().len(), 4);
        assert_eq!(copy.children().len(), 5);
    }

    #[test]
    fn test_prism_normals_point_outwards() {
        let ccw = Composite::prism([0.0, 0.0], [2.0, 0.0], [1.0, 2.0], 1.5, 1.0).unwrap();
        let cw = Composite::prism([0.0, 0.0], [1.0, 2.0], [2.0, 0.0], 1.5, 1.0).unwrap();
        let centroid = Vec2::new(1.0, 2.0 / 3.0);

        for prism in [ccw, cw] {
            assert_eq!(prism.children().len(), 3);

            for facet in prism.children() {
                let Surface::Simple {
                    geometry: Geometry::Plane(plane),
                    behavior: Behavior::Refractive(indices),
                } = facet
                else {
                    panic!("prism facets must be refractive segments: {facet:?}");
                };

                let midpoint = (plane.start() + plane.end()) / 2.0;
                assert!(plane.normal().dot(&(midpoint - centroid)) > 0.0);
                assert_eq!((indices.n1(), indices.n2()), (1.0, 1.5));
            }
        }
    }

    #[test]
    fn test_degenerate_prism() {
        assert_eq!(
            Composite::prism([0.0, 0.0], [1.0, 1.0], [2.0, 2.0], 1.5, 1.0),
            Err(ConstructionError::DegenerateTriangle)
        );
        assert!(Composite::prism([0.0, 0.0], [1.0, 0.0], [0.0, 1.0], 0.0, 1.0).is_err());
    }

    #[test]
    fn test_prism_deviates_ray_through_it() {
        let prism = Composite::prism([-1.0, -1.0], [1.0, -1.0], [0.0, 1.0], 1.5, 1.0).unwrap();
        let mut ray = Ray::new([-3.0, -0.5], [1.0, 0.0]);

        let state = trace_ray(&prism, &mut ray, &TraceOptions::new(2, false));

        assert_eq!(state, TraceState::Done);
        assert_eq!(ray.positions().len(), 3);
        // bent downwards, towards the prism's base, on both facets
        assert!(ray.direction().y < -0.1);
        assert!(ray.position().x > 0.0);
    }

    #[test]
    fn test_composite_dump_concatenates_children() {
        let composite = Composite::new(vec![
            Surface::mirror(PlaneSegment::new([0.0, 0.0], [1.0, 0.0])),
            Surface::screen(PlaneSegment::new([1.0, 0.0], [1.0, 1.0])),
        ]);
        let mut buf = Vec::new();
        Surface::from(composite).dump(&mut buf).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "0\t1\n0\t0\n1\t1\n0\t1\n");
    }

    #[test]
    fn test_json_round_trip() {
        let surfaces = vec![
            Surface::mirror(PlaneSegment::new([0.0, 0.0], [1.0, 0.5])),
            Surface::refractive(CircularArc::new([1.0, 1.0], 2.0, -0.5, 0.5), 1.0, 1.33).unwrap(),
            Composite::prism([0.0, 0.0], [2.0, 0.0], [1.0, 2.0], 1.5, 1.0).unwrap().into(),
        ];

        let back = Vec::<Surface>::from_json(&surfaces.to_json()).unwrap();

        assert_eq!(back, surfaces);
    }

    #[test]
    fn test_simple_surfaces_from_json() {
        let plane = Surface::from_json(&serde_json::json!({
            "type": "plane",
            "data": { "start": [0.0, 0.0], "end": [1.0, 0.0] },
            "behavior": { "type": "mirror" },
        }))
        .unwrap();

        let arc = Surface::from_json(&serde_json::json!({
            "type": "arc",
            "data": { "centre": [1.0, 1.0], "radius": 2.0, "start": -0.5, "end": 0.5 },
            "behavior": { "type": "refractive", "n1": 1.0, "n2": 1.5 },
        }))
        .unwrap();

        assert_eq!(plane, Surface::mirror(PlaneSegment::new([0.0, 0.0], [1.0, 0.0])));
        assert_eq!(
            arc,
            Surface::refractive(CircularArc::new([1.0, 1.0], 2.0, -0.5, 0.5), 1.0, 1.5).unwrap(),
        );
    }

    #[test]
    fn test_json_errors() {
        let plane_data = serde_json::json!({ "start": [0.0, 0.0], "end": [1.0, 0.0] });

        assert!(Surface::from_json(&serde_json::json!({
            "type": "plane",
            "data": plane_data,
        }))
        .is_err());
        assert!(Surface::from_json(&serde_json::json!({
            "type": "ellipse",
            "data": plane_data,
            "behavior": { "type": "mirror" },
        }))
        .is_err());
        assert!(Surface::from_json(&serde_json::json!({
            "type": "composite",
            "data": { "type": "mirror" },
        }))
        .is_err());
    }
}
