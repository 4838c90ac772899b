use glam::Vec3;

/// Axis-aligned bounding box in world space
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box that any expansion replaces
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Box with NaN corners, for geometry that holds a non-finite position
    pub fn invalid() -> Self {
        Self::from_point(Vec3::NAN)
    }

    /// Zero-extent box at a single point
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut bounds, point| {
            bounds.expand_by_point(point);
            bounds
        })
    }

    /// True while no point has been accumulated
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand_by_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three extents
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_new() {
        let min = Vec3::new(0.0, 0.0, 0.0);
        let max = Vec3::new(1.0, 1.0, 1.0);
        let bounds = BoundingBox::new(min, max);
        assert_eq!(bounds.min, min);
        assert_eq!(bounds.max, max);
    }

    #[test]
    fn test_bounding_box_center() {
        let bounds = BoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_bounding_box_center_negative() {
        let bounds = BoundingBox::new(Vec3::new(-2.0, -4.0, -6.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(bounds.center(), Vec3::ZERO);
    }

    #[test]
    fn test_bounding_box_size_and_max_dimension() {
        let bounds = BoundingBox::new(Vec3::new(-3.0, -1.0, -2.0), Vec3::new(1.0, 3.0, 4.0));
        assert_eq!(bounds.size(), Vec3::new(4.0, 4.0, 6.0));
        assert_eq!(bounds.max_dimension(), 6.0);
        assert_eq!(bounds.center(), Vec3::new(-1.0, 1.0, 1.0));
    }

    #[test]
    fn test_empty_box_is_replaced_by_first_point() {
        let mut bounds = BoundingBox::empty();
        assert!(bounds.is_empty());

        bounds.expand_by_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(!bounds.is_empty());
        assert_eq!(bounds.min, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_points() {
        let bounds = BoundingBox::from_points([
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::ZERO,
        ]);
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_point_is_degenerate() {
        let bounds = BoundingBox::from_point(Vec3::new(4.0, 5.0, 6.0));
        assert!(!bounds.is_empty());
        assert_eq!(bounds.size(), Vec3::ZERO);
        assert_eq!(bounds.center(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_bounding_box_union_non_overlapping() {
        let a = BoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        let union = a.union(&b);
        assert_eq!(union.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(union.max, Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_bounding_box_union_contained() {
        let a = BoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 5.0, 5.0));
        let b = BoundingBox::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0));
        let union = a.union(&b);
        assert_eq!(union.min, a.min);
        assert_eq!(union.max, a.max);
    }

    #[test]
    fn test_invalid_box_is_not_finite() {
        let bounds = BoundingBox::invalid();
        assert!(!bounds.is_finite());
        assert!(!bounds.max_dimension().is_finite());
    }

    #[test]
    fn test_is_finite() {
        assert!(BoundingBox::new(Vec3::ZERO, Vec3::ONE).is_finite());
        assert!(!BoundingBox::empty().is_finite());
        assert!(!BoundingBox::new(Vec3::ZERO, Vec3::new(f32::NAN, 1.0, 1.0)).is_finite());
    }
}
