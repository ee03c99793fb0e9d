//! 对象捕捉
//!
//! 对最近的形状收集候选点：
//! - 特征点（端点、中点）
//! - 参考点到曲线的垂足
//! - 与其他检测到的边的交点
//!
//! 按屏幕距离升序排列，取第一个；在捕捉半径内则采用，否则记为悬停提示。
//! 悬停在圆上时会显示圆心（隐藏捕捉点），之后即使没有检测到形状也能捕捉。

use crate::geometry::Curve;
use crate::math::Point3;
use crate::shape::DetectedShape;
use crate::snap::{
    DynamicObjects, InvisibleHint, Snap, SnapCache, SnapData, SnapEnv, SnapKind, SnapMask,
    SnapResult, SnapType,
};
use crate::snaps::feature::FeaturePointStrategy;
use crate::view::{MeshId, PointStyle, View, ViewId, VisualContext};

pub struct ObjectSnap {
    reference: Option<Point3>,
    dynamic: DynamicObjects,
    /// 最近但超出半径的候选点
    last_detected: Option<SnapResult>,
    hint_vertex: Option<MeshId>,
}

impl ObjectSnap {
    pub fn new(reference: Option<Point3>) -> Self {
        Self {
            reference,
            dynamic: DynamicObjects::default(),
            last_detected: None,
            hint_vertex: None,
        }
    }

    fn snap_on_shape(&mut self, data: &SnapData<'_>, env: &mut SnapEnv<'_>) -> Option<SnapResult> {
        let top = data.shapes.first()?;
        let view = data.view.id();
        let mask = env.config.enabled_types;

        let mut candidates = FeaturePointStrategy::feature_points(view, top, mask, env.cache);
        candidates.extend(self.find_perpendicular(view, top, mask));
        candidates.extend(Self::intersections(view, top, data.shapes, mask, env.cache));

        let mut ranked: Vec<(f64, SnapResult)> = candidates
            .into_iter()
            .map(|snap| (data.view.screen_distance(data.mx, data.my, &snap.point), snap))
            .collect();
        // 稳定排序：距离相同时保留收集顺序
        ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let (distance, best) = ranked.into_iter().next()?;
        if env.config.is_within(distance) {
            self.dynamic.highlight(env.visual, &best.shapes);
            Some(best)
        } else {
            self.last_detected = Some(best);
            None
        }
    }

    fn snap_invisible(&mut self, data: &SnapData<'_>, env: &mut SnapEnv<'_>) -> Option<SnapResult> {
        let mut nearest: Option<(f64, &SnapResult)> = None;
        for snap in env.cache.invisible_snaps() {
            let distance = data.view.screen_distance(data.mx, data.my, &snap.point);
            if nearest.map_or(true, |(min, _)| distance < min) {
                nearest = Some((distance, snap));
            }
        }
        let (distance, snap) = nearest?;
        if !env.config.is_within(distance) {
            return None;
        }
        let snap = snap.clone();
        self.dynamic.highlight(env.visual, &snap.shapes);
        Some(snap)
    }

    /// 悬停在圆或圆弧上时显示圆心
    fn show_invisible_snaps(&mut self, view: &dyn View, shape: &DetectedShape, env: &mut SnapEnv<'_>) {
        if !env.config.enabled_types.is_enabled(SnapType::Center) || env.cache.has_invisible(shape.id) {
            return;
        }
        let Some(center) = shape.curve().and_then(Curve::center) else {
            return;
        };
        let center = shape.transform.transform_point(&center);
        let display = env.visual.display_point(&center, PointStyle::Hint);
        env.cache.insert_invisible(
            shape.id,
            InvisibleHint {
                snaps: vec![SnapResult::new(view.id(), center)
                    .with_kind(SnapKind::Center)
                    .with_shapes(vec![shape.clone()])],
                displays: vec![display],
            },
        );
    }

    fn find_perpendicular(&self, view: ViewId, shape: &DetectedShape, mask: SnapMask) -> Option<SnapResult> {
        if !mask.is_enabled(SnapType::Perpendicular) {
            return None;
        }
        let reference = self.reference?;
        let curve = shape.curve()?;
        let local = shape.transform.inverse_transform_point(&reference);
        let foot = curve.project(&local).into_iter().next()?;
        Some(
            SnapResult::new(view, shape.transform.transform_point(&foot))
                .with_kind(SnapKind::Perpendicular)
                .with_shapes(vec![shape.clone()]),
        )
    }

    fn intersections(
        view: ViewId,
        current: &DetectedShape,
        shapes: &[DetectedShape],
        mask: SnapMask,
        cache: &mut SnapCache,
    ) -> Vec<SnapResult> {
        let mut result = Vec::new();
        if !mask.is_enabled(SnapType::Intersection) || current.curve().is_none() {
            return result;
        }
        for other in shapes {
            if other.id == current.id || other.curve().is_none() {
                continue;
            }
            let found = cache.intersections_or_insert_with(current.id, other.id, || {
                Self::find_intersections(view, current, other)
            });
            result.extend_from_slice(found);
        }
        result
    }

    fn find_intersections(view: ViewId, a: &DetectedShape, b: &DetectedShape) -> Vec<SnapResult> {
        let (Some(e1), Some(e2)) = (a.world_curve(), b.world_curve()) else {
            return Vec::new();
        };
        e1.intersect(&e2)
            .into_iter()
            .map(|intersection| {
                SnapResult::new(view, intersection.point)
                    .with_kind(SnapKind::Intersection)
                    .with_shapes(vec![a.clone(), b.clone()])
            })
            .collect()
    }

    fn remove_hint(&mut self, visual: &mut dyn VisualContext) {
        if let Some(id) = self.hint_vertex.take() {
            visual.remove_mesh(id);
        }
    }
}

impl Snap for ObjectSnap {
    fn snap(&mut self, data: &SnapData<'_>, env: &mut SnapEnv<'_>) -> Option<SnapResult> {
        self.last_detected = None;
        if !env.config.enable_snap {
            return None;
        }
        let snap = match data.shapes.first() {
            Some(top) => {
                self.show_invisible_snaps(data.view, top, env);
                self.snap_on_shape(data, env)
            }
            None => self.snap_invisible(data, env),
        }?;
        tracing::trace!(label = ?snap.label(), point = ?snap.point, "object snap");
        Some(match self.reference {
            Some(reference) => {
                let distance = nalgebra::distance(&reference, &snap.point);
                snap.with_distance(distance)
            }
            None => snap,
        })
    }

    fn handle_snaped(&mut self, snaped: Option<&SnapResult>, env: &mut SnapEnv<'_>) {
        if !snaped.is_some_and(|snap| snap.shapes.is_empty()) {
            return;
        }
        if let Some(last) = self.last_detected.take() {
            self.remove_hint(env.visual);
            self.dynamic.highlight(env.visual, &last.shapes);
            self.hint_vertex = Some(env.visual.display_point(&last.point, PointStyle::Hint));
        }
    }

    fn remove_dynamic_object(&mut self, visual: &mut dyn VisualContext) {
        self.dynamic.clear(visual);
        self.remove_hint(visual);
    }

    fn clear(&mut self, visual: &mut dyn VisualContext) {
        self.remove_dynamic_object(visual);
        self.last_detected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CircleCurve, LineCurve};
    use crate::math::Vector3;
    use crate::shape::ShapeId;
    use crate::test_support::Fixture;

    fn line(id: u64, a: (f64, f64), b: (f64, f64)) -> DetectedShape {
        DetectedShape::edge(
            ShapeId(id),
            Curve::Line(LineCurve::new(Point3::new(a.0, a.1, 0.0), Point3::new(b.0, b.1, 0.0))),
        )
    }

    #[test]
    fn test_midpoint_snap() {
        let mut fixture = Fixture::new();
        fixture.view.add_shape(line(1, (0.0, 0.0), (10.0, 0.0)));
        let mut snap = ObjectSnap::new(None);
        let result = fixture.snap(&mut snap, 5.0, 1.0).unwrap();
        assert!((result.point - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-9);
        assert_eq!(result.label(), Some("mid"));
        assert!(fixture.visual.is_highlighted(ShapeId(1)));

        snap.remove_dynamic_object(&mut fixture.visual);
        assert_eq!(fixture.visual.highlighted_count(), 0);
    }

    #[test]
    fn test_intersection_snap_is_cached() {
        let mut fixture = Fixture::new();
        fixture.view.add_shape(line(1, (0.0, 0.0), (10.0, 0.0)));
        fixture.view.add_shape(line(2, (5.0, -5.0), (5.0, 7.0)));
        let mut snap = ObjectSnap::new(None);

        let first = fixture.snap(&mut snap, 5.0, 0.3).unwrap();
        assert!((first.point - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-9);
        assert_eq!(first.kind, Some(SnapKind::Intersection));
        assert_eq!(first.shapes.len(), 2);
        assert_eq!(fixture.cache.intersection_count(), 1);

        snap.remove_dynamic_object(&mut fixture.visual);
        let second = fixture.snap(&mut snap, 5.0, 0.3).unwrap();
        assert_eq!(first, second);
        assert_eq!(fixture.cache.intersection_count(), 1);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let mut fixture = Fixture::new();
        fixture.view.add_shape(line(1, (0.0, 0.0), (4.0, 0.0)));
        fixture.view.add_shape(line(2, (0.0, 0.0), (0.0, 4.0)));
        let mut snap = ObjectSnap::new(None);
        let a = fixture.snap(&mut snap, 1.0, 1.0);
        snap.remove_dynamic_object(&mut fixture.visual);
        let b = fixture.snap(&mut snap, 1.0, 1.0);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_snap_radius_boundary() {
        let mut fixture = Fixture::with_detect_radius(10.0);
        fixture.view.add_shape(line(1, (0.0, 0.0), (10.0, 0.0)));
        let mut snap = ObjectSnap::new(None);

        // 正好在半径上
        let at_radius = fixture.snap(&mut snap, 5.0, 5.0).unwrap();
        assert!((at_radius.point - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-9);

        snap.remove_dynamic_object(&mut fixture.visual);
        // 超出一个像素
        assert!(fixture.snap(&mut snap, 5.0, 6.0).is_none());
    }

    #[test]
    fn test_hint_shown_for_shapeless_result() {
        let mut fixture = Fixture::with_detect_radius(10.0);
        fixture.view.add_shape(line(1, (0.0, 0.0), (10.0, 0.0)));
        let mut snap = ObjectSnap::new(None);
        assert!(fixture.snap(&mut snap, 5.0, 8.0).is_none());

        let plane_point = SnapResult::new(fixture.view.id(), Point3::new(5.0, 8.0, 0.0));
        fixture.with_env(|env| snap.handle_snaped(Some(&plane_point), env));
        assert_eq!(fixture.visual.points(PointStyle::Hint), vec![Point3::new(5.0, 0.0, 0.0)]);
        assert!(fixture.visual.is_highlighted(ShapeId(1)));

        snap.remove_dynamic_object(&mut fixture.visual);
        assert!(fixture.visual.points(PointStyle::Hint).is_empty());
    }

    #[test]
    fn test_no_hint_without_candidate() {
        let mut fixture = Fixture::with_detect_radius(10.0);
        fixture.view.add_shape(line(1, (0.0, 0.0), (10.0, 0.0)));
        let mut snap = ObjectSnap::new(None);
        assert!(fixture.snap(&mut snap, 5.0, 8.0).is_none());
        fixture.with_env(|env| snap.handle_snaped(None, env));
        assert!(fixture.visual.points(PointStyle::Hint).is_empty());
    }

    #[test]
    fn test_circle_center_hint() {
        let mut fixture = Fixture::new();
        let circle = CircleCurve::new(Point3::origin(), Vector3::z(), 10.0).unwrap();
        fixture.view.add_shape(DetectedShape::edge(ShapeId(5), Curve::Circle(circle)));
        let mut snap = ObjectSnap::new(None);

        let on_circle = fixture.snap(&mut snap, 10.0, 0.5).unwrap();
        assert_eq!(on_circle.kind, Some(SnapKind::Endpoint));
        assert_eq!(fixture.visual.points(PointStyle::Hint), vec![Point3::origin()]);

        snap.remove_dynamic_object(&mut fixture.visual);
        let center = fixture.snap(&mut snap, 0.5, 0.0).unwrap();
        assert_eq!(center.kind, Some(SnapKind::Center));
        assert!((center.point - Point3::origin()).norm() < 1e-9);

        fixture.cache.clear(&mut fixture.visual);
        assert!(fixture.visual.points(PointStyle::Hint).is_empty());
    }

    #[test]
    fn test_perpendicular_snap() {
        let mut fixture = Fixture::new();
        fixture.view.add_shape(line(1, (0.0, 0.0), (10.0, 0.0)));
        let mut snap = ObjectSnap::new(Some(Point3::new(3.0, 8.0, 0.0)));
        let result = fixture.snap(&mut snap, 3.2, 0.5).unwrap();
        assert_eq!(result.kind, Some(SnapKind::Perpendicular));
        assert!((result.point - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-9);
        assert!((result.distance.unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_snap() {
        let mut fixture = Fixture::new();
        fixture.config.enable_snap = false;
        fixture.view.add_shape(line(1, (0.0, 0.0), (10.0, 0.0)));
        let mut snap = ObjectSnap::new(None);
        assert!(fixture.snap(&mut snap, 5.0, 0.0).is_none());
    }
}
