//! 限定在曲线上的捕捉

use crate::geometry::Curve;
use crate::snap::{Snap, SnapData, SnapEnv, SnapResult};
use crate::view::VisualContext;

#[derive(Debug, Clone)]
pub struct PointOnCurveSnap {
    curve: Curve,
}

impl PointOnCurveSnap {
    /// `curve` 为世界坐标下的曲线
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }
}

impl Snap for PointOnCurveSnap {
    fn snap(&mut self, data: &SnapData<'_>, _env: &mut SnapEnv<'_>) -> Option<SnapResult> {
        let ray = data.view.ray_at(data.mx, data.my);
        let nearest = self.curve.nearest_to_ray(&ray);
        nearest
            .coords
            .iter()
            .all(|v| v.is_finite())
            .then(|| SnapResult::new(data.view.id(), nearest))
    }

    fn remove_dynamic_object(&mut self, _visual: &mut dyn VisualContext) {}
}
