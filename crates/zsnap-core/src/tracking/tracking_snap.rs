//! 追踪捕捉
//!
//! 汇总参考点的轴向追踪与固定点的对象追踪，每次事件按以下顺序求点：
//! 1. 最近的边与追踪轴的交点
//! 2. 只有一条追踪轴时，取轴上离指针射线最近的点
//! 3. 两条以上时取最近两条轴的交点，不相交则退回第 2 步

use crate::math::{Point2, Point3, Precision, VectorExt};
use crate::shape::ShapeKind;
use crate::snap::{Snap, SnapData, SnapEnv, SnapKind, SnapResult};
use crate::tracking::axis::Axis;
use crate::tracking::axis_tracking::AxisTracking;
use crate::tracking::object_tracking::ObjectTracking;
use crate::view::{LineType, MeshId, View, VisualContext};

/// 计算屏幕投影方向时使用的远点距离
const FAR_DISTANCE: f64 = 100_000.0;

struct TrackingData {
    axis: Axis,
    /// 指针到轴的屏幕距离
    distance: f64,
    point: Point3,
}

pub struct TrackingSnap {
    reference: Option<Point3>,
    axis_tracking: AxisTracking,
    object_tracking: ObjectTracking,
    temp_lines: Vec<MeshId>,
}

impl TrackingSnap {
    pub fn new(reference: Option<Point3>) -> Self {
        Self {
            reference,
            axis_tracking: AxisTracking::new(),
            object_tracking: ObjectTracking::new(),
            temp_lines: Vec::new(),
        }
    }

    pub fn object_tracking(&self) -> &ObjectTracking {
        &self.object_tracking
    }

    fn detect_tracking(&mut self, data: &SnapData<'_>, env: &SnapEnv<'_>) -> Vec<TrackingData> {
        let mut result = Vec::new();
        if let Some(reference) = self.reference {
            let axes = self.axis_tracking.axes(
                data.view,
                reference,
                env.config.tracking_z,
                env.config.tracking_angle,
            );
            result.extend(Self::snaped_from_axes(axes, data, env));
        }
        let rays = self.object_tracking.tracking_rays(data.view, env.config.tracking_z);
        result.extend(Self::snaped_from_axes(&rays, data, env));
        result
    }

    fn snaped_from_axes(axes: &[Axis], data: &SnapData<'_>, env: &SnapEnv<'_>) -> Vec<TrackingData> {
        let mut result = Vec::new();
        for axis in axes {
            let distance = Self::ray_distance_at_screen(data.view, data.mx, data.my, axis);
            if !env.config.is_within(distance) {
                continue;
            }
            let ray = data.view.ray_at(data.mx, data.my);
            let point = axis.ray().nearest_to(&ray);
            if (point - axis.location()).dot(&axis.direction()) < -Precision::DISTANCE {
                continue;
            }
            result.push(TrackingData {
                axis: axis.clone(),
                distance,
                point,
            });
        }
        result
    }

    /// 指针到轴的屏幕投影的垂直距离
    fn ray_distance_at_screen(view: &dyn View, x: f64, y: f64, axis: &Axis) -> f64 {
        let start = view.world_to_screen(&axis.location());
        let vector = Point2::new(x, y) - start;
        if vector.norm() < Precision::FLOAT {
            return 0.0;
        }
        let end = view.world_to_screen(&axis.ray().point_at(FAR_DISTANCE));
        let Some(dir) = (end - start).unit() else {
            return vector.norm();
        };
        let dot = vector.dot(&dir);
        (vector.norm_squared() - dot * dot).max(0.0).sqrt()
    }

    fn shape_intersect_tracking(
        &mut self,
        data: &SnapData<'_>,
        env: &mut SnapEnv<'_>,
        trackings: &[TrackingData],
    ) -> Option<SnapResult> {
        let top = data.shapes.first()?;
        if !matches!(top.kind, ShapeKind::Edge(_)) {
            return None;
        }
        let curve = top.world_curve()?;
        let mut points: Vec<(f64, Point3, Point3)> = trackings
            .iter()
            .flat_map(|tracking| {
                curve
                    .intersect_ray(tracking.axis.ray())
                    .into_iter()
                    .map(move |point| (point, tracking.axis.location()))
            })
            .map(|(point, location)| (data.view.screen_distance(data.mx, data.my, &point), point, location))
            .collect();
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let (_, point, location) = points.into_iter().next()?;

        let id = Self::show_temp_line(env.visual, &location, &point)?;
        self.temp_lines.push(id);
        Some(
            SnapResult::new(data.view.id(), point)
                .with_kind(SnapKind::Intersection)
                .with_shapes(vec![top.clone()]),
        )
    }

    fn tracking_intersect_tracking(
        &mut self,
        data: &SnapData<'_>,
        env: &mut SnapEnv<'_>,
        trackings: &[TrackingData],
    ) -> Option<SnapResult> {
        let [first, second, ..] = trackings else {
            return None;
        };
        let point = first.axis.ray().intersect(second.axis.ray())?;
        Some(self.snaped_and_show_tracking(data, env, point, &trackings[..2]))
    }

    fn snaped_and_show_tracking(
        &mut self,
        data: &SnapData<'_>,
        env: &mut SnapEnv<'_>,
        point: Point3,
        trackings: &[TrackingData],
    ) -> SnapResult {
        for tracking in trackings {
            if let Some(id) = Self::show_temp_line(env.visual, &tracking.axis.location(), &point) {
                self.temp_lines.push(id);
            }
        }
        let mut result = SnapResult::new(data.view.id(), point);
        if let Some(first) = trackings.first() {
            result = result.with_ref_point(first.axis.location());
        }
        match trackings {
            [single] => result
                .with_distance(nalgebra::distance(&point, &single.axis.location()))
                .with_kind(SnapKind::Axis(single.axis.name().to_string())),
            [_, _] => result.with_kind(SnapKind::Intersection),
            _ => result,
        }
    }

    /// 从 `start` 经过 `end` 延伸到远处的虚线；两点重合时不显示
    fn show_temp_line(visual: &mut dyn VisualContext, start: &Point3, end: &Point3) -> Option<MeshId> {
        let vector = end - start;
        let normal = vector.unit()?;
        let distance = (vector.norm() * 1e10).min(1e20);
        Some(visual.display_line(start, &(start + normal * distance), LineType::Dash))
    }

    fn remove_temp_lines(&mut self, visual: &mut dyn VisualContext) {
        for id in self.temp_lines.drain(..) {
            visual.remove_mesh(id);
        }
    }
}

impl Snap for TrackingSnap {
    fn snap(&mut self, data: &SnapData<'_>, env: &mut SnapEnv<'_>) -> Option<SnapResult> {
        if !env.config.enable_tracking {
            return None;
        }
        let mut trackings = self.detect_tracking(data, env);
        if trackings.is_empty() {
            return None;
        }
        trackings.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));

        if let Some(snaped) = self.shape_intersect_tracking(data, env, &trackings) {
            return Some(snaped);
        }
        if trackings.len() > 1 {
            if let Some(snaped) = self.tracking_intersect_tracking(data, env, &trackings) {
                return Some(snaped);
            }
        }
        let closest = trackings.swap_remove(0);
        let point = closest.point;
        Some(self.snaped_and_show_tracking(data, env, point, &[closest]))
    }

    fn handle_snaped(&mut self, snaped: Option<&SnapResult>, env: &mut SnapEnv<'_>) {
        if env.config.enable_tracking {
            self.object_tracking.handle_snaped(snaped, env.now);
        }
    }

    fn poll(&mut self, env: &mut SnapEnv<'_>) -> bool {
        self.object_tracking.poll(env.visual, env.now, env.config.dwell())
    }

    fn pointer_out(&mut self) {
        self.object_tracking.pointer_out();
    }

    fn config_changed(&mut self, env: &mut SnapEnv<'_>) {
        self.remove_temp_lines(env.visual);
        self.object_tracking.reset(env.visual);
        self.axis_tracking.clear();
    }

    fn remove_dynamic_object(&mut self, visual: &mut dyn VisualContext) {
        self.remove_temp_lines(visual);
    }

    fn clear(&mut self, visual: &mut dyn VisualContext) {
        self.remove_temp_lines(visual);
        self.axis_tracking.clear();
        self.object_tracking.clear(visual);
    }
}
