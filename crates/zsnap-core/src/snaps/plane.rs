//! 平面捕捉
//!
//! 所有点输入的最后一级：指针射线与平面的交点。平面与视线平行时
//! 改用正对相机的平面。

use std::fmt;
use std::rc::Rc;

use crate::math::{Plane, Point3};
use crate::snap::{Snap, SnapData, SnapEnv, SnapResult};
use crate::view::{ensure_plane, VisualContext};

/// 捕捉平面的来源
#[derive(Clone)]
pub enum PlaneSource {
    /// 视图的工作平面
    Workplane,
    Fixed(Plane),
    /// 由指针处的工作平面点计算
    Dynamic(Rc<dyn Fn(&Point3) -> Plane>),
}

impl fmt::Debug for PlaneSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaneSource::Workplane => f.write_str("Workplane"),
            PlaneSource::Fixed(plane) => f.debug_tuple("Fixed").field(plane).finish(),
            PlaneSource::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaneSnap {
    source: PlaneSource,
    reference: Option<Point3>,
}

impl PlaneSnap {
    pub fn new(source: PlaneSource, reference: Option<Point3>) -> Self {
        Self { source, reference }
    }

    pub fn workplane(reference: Option<Point3>) -> Self {
        Self::new(PlaneSource::Workplane, reference)
    }

    pub fn fixed(plane: Plane, reference: Option<Point3>) -> Self {
        Self::new(PlaneSource::Fixed(plane), reference)
    }

    pub fn dynamic(plane: impl Fn(&Point3) -> Plane + 'static, reference: Option<Point3>) -> Self {
        Self::new(PlaneSource::Dynamic(Rc::new(plane)), reference)
    }

    fn snap_at_plane(&self, plane: &Plane, data: &SnapData<'_>) -> Option<SnapResult> {
        let plane = ensure_plane(data.view, plane);
        let ray = data.view.ray_at(data.mx, data.my);
        let point = plane.intersect(&ray, true)?;
        let result = SnapResult::new(data.view.id(), point);
        Some(match self.reference {
            Some(reference) => result.with_distance(nalgebra::distance(&reference, &point)),
            None => result,
        })
    }
}

impl Snap for PlaneSnap {
    fn snap(&mut self, data: &SnapData<'_>, _env: &mut SnapEnv<'_>) -> Option<SnapResult> {
        let plane = match &self.source {
            PlaneSource::Workplane => return self.snap_at_plane(&data.view.workplane(), data),
            PlaneSource::Fixed(plane) => *plane,
            PlaneSource::Dynamic(plane_at) => plane_at(&data.view.screen_to_world(data.mx, data.my)),
        };
        self.snap_at_plane(&plane, data)
            .map(|result| result.with_plane(plane))
    }

    fn remove_dynamic_object(&mut self, _visual: &mut dyn VisualContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::OrthoView;
    use crate::math::Vector3;
    use crate::test_support::Fixture;

    #[test]
    fn test_workplane_snap() {
        let view = OrthoView::new().with_workplane(Plane::xy().translated_to(Point3::new(0.0, 0.0, 2.0)));
        let mut fixture = Fixture::with_view(view);
        let mut snap = PlaneSnap::workplane(Some(Point3::new(0.0, 0.0, 2.0)));
        let result = fixture.snap(&mut snap, 3.0, 4.0).unwrap();
        assert!((result.point - Point3::new(3.0, 4.0, 2.0)).norm() < 1e-9);
        assert!((result.distance.unwrap() - 5.0).abs() < 1e-9);
        assert!(result.plane.is_none());
        assert!(result.shapes.is_empty());
    }

    #[test]
    fn test_fixed_plane_tagged() {
        let mut fixture = Fixture::new();
        let plane = Plane::xy().translated_to(Point3::new(0.0, 0.0, -3.0));
        let mut snap = PlaneSnap::fixed(plane, None);
        let result = fixture.snap(&mut snap, 1.0, 2.0).unwrap();
        assert!((result.point - Point3::new(1.0, 2.0, -3.0)).norm() < 1e-9);
        assert_eq!(result.plane, Some(plane));
        assert!(result.distance.is_none());
    }

    #[test]
    fn test_edge_on_plane_faces_camera() {
        let mut fixture = Fixture::new();
        let mut snap = PlaneSnap::fixed(Plane::zx(), None);
        let result = fixture.snap(&mut snap, 2.0, 5.0).unwrap();
        // 替代平面过原点、法向沿视线
        assert!((result.point - Point3::new(2.0, 5.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_dynamic_plane() {
        let mut fixture = Fixture::new();
        let mut snap = PlaneSnap::dynamic(
            |point| Plane::new(Point3::new(0.0, 0.0, point.x), Vector3::z(), Vector3::x()).unwrap_or_else(|_| Plane::xy()),
            None,
        );
        let result = fixture.snap(&mut snap, 4.0, 1.0).unwrap();
        assert!((result.point - Point3::new(4.0, 1.0, 4.0)).norm() < 1e-9);
        assert_eq!(result.plane.map(|p| p.origin()), Some(Point3::new(0.0, 0.0, 4.0)));
    }
}
