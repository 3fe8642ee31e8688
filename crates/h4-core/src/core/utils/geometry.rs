use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Separations below this distance (Å) are treated as coincident atoms.
pub const COINCIDENCE_TOLERANCE: f64 = 1e-8;

/// Displacement from one point to another together with its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// `to - from`.
    pub vector: Vector3<f64>,
    pub distance: f64,
}

impl Separation {
    /// Returns `None` when the two points are closer than [`COINCIDENCE_TOLERANCE`].
    #[inline]
    pub fn between(from: &Point3<f64>, to: &Point3<f64>) -> Option<Self> {
        let vector = to - from;
        let distance = vector.norm();
        (distance >= COINCIDENCE_TOLERANCE).then_some(Self { vector, distance })
    }

    #[inline]
    pub fn unit(&self) -> Vector3<f64> {
        self.vector / self.distance
    }
}

/// Cosine of the angle at a vertex and its gradient with respect to the three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleCosine {
    pub cosine: f64,
    pub d_first: Vector3<f64>,
    pub d_second: Vector3<f64>,
    pub d_vertex: Vector3<f64>,
}

impl AngleCosine {
    /// Builds the angle `first - vertex - second` from the two vertex-centred separations.
    #[inline]
    pub fn at_vertex(to_first: &Separation, to_second: &Separation) -> Self {
        let (u, w) = (&to_first.vector, &to_second.vector);
        let (ru, rw) = (to_first.distance, to_second.distance);
        let cosine = (u.dot(w) / (ru * rw)).clamp(-1.0, 1.0);
        let d_first = w / (ru * rw) - u * (cosine / (ru * ru));
        let d_second = u / (ru * rw) - w * (cosine / (rw * rw));
        Self {
            cosine,
            d_first,
            d_second,
            d_vertex: -(d_first + d_second),
        }
    }
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Axis-aligned bounding box of a set of points, or `None` for an empty set.
pub fn bounding_box<'a, I>(points: I) -> Option<(Point3<f64>, Point3<f64>)>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let mut iter = points.into_iter();
    let first = *iter.next()?;
    Some(iter.fold((first, first), |(min, max), p| {
        (min.inf(p), max.sup(p))
    }))
}
