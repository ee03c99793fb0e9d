//! 特征点：边的端点与中点

use crate::math::Point3;
use crate::shape::DetectedShape;
use crate::snap::{SnapCache, SnapKind, SnapMask, SnapResult, SnapType};
use crate::view::ViewId;

pub struct FeaturePointStrategy;

impl FeaturePointStrategy {
    /// 形状的特征点（世界坐标），按形状缓存
    pub fn feature_points(
        view: ViewId,
        shape: &DetectedShape,
        mask: SnapMask,
        cache: &mut SnapCache,
    ) -> Vec<SnapResult> {
        cache
            .features_or_insert_with(shape.id, || Self::edge_feature_points(view, shape, mask))
            .to_vec()
    }

    fn edge_feature_points(view: ViewId, shape: &DetectedShape, mask: SnapMask) -> Vec<SnapResult> {
        let Some(curve) = shape.curve() else {
            return Vec::new();
        };
        let point = |local: Point3, kind: SnapKind| {
            SnapResult::new(view, shape.transform.transform_point(&local))
                .with_kind(kind)
                .with_shapes(vec![shape.clone()])
        };

        let mut points = Vec::with_capacity(3);
        if mask.is_enabled(SnapType::Endpoint) {
            points.push(point(curve.start_point(), SnapKind::Endpoint));
            points.push(point(curve.end_point(), SnapKind::Endpoint));
        }
        if mask.is_enabled(SnapType::Midpoint) {
            points.push(point(curve.mid_point(), SnapKind::Midpoint));
        }
        points
    }
}
