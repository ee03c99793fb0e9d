//! 参考点的轴向/极轴追踪

use std::collections::HashMap;

use crate::math::{Plane, Point3, Ray, Vector3Ext, EPSILON};
use crate::tracking::axis::Axis;
use crate::view::{View, ViewId};

struct CachedAxes {
    reference: Point3,
    axes: Vec<Axis>,
}

/// 参考点上的追踪轴，按视图缓存
#[derive(Default)]
pub struct AxisTracking {
    cache: HashMap<ViewId, CachedAxes>,
}

impl AxisTracking {
    pub fn new() -> Self {
        Self::default()
    }

    /// 视图工作平面上过 `reference` 的追踪轴
    ///
    /// `angle` 为极轴步长（度）；为空时只取平面坐标轴。
    pub fn axes(&mut self, view: &dyn View, reference: Point3, tracking_z: bool, angle: Option<f64>) -> &[Axis] {
        let cached = self.cache.entry(view.id()).or_insert_with(|| CachedAxes {
            reference,
            axes: Self::init_axes(&view.workplane(), reference, tracking_z, angle),
        });
        if cached.reference != reference {
            cached.reference = reference;
            cached.axes = Self::init_axes(&view.workplane(), reference, tracking_z, angle);
        }
        &cached.axes
    }

    fn init_axes(plane: &Plane, reference: Point3, tracking_z: bool, angle: Option<f64>) -> Vec<Axis> {
        let Some(step) = angle.filter(|a| *a > EPSILON) else {
            return Axis::axes_at_plane(reference, plane, tracking_z);
        };
        let mut result = Vec::new();
        let mut test_angle: f64 = 0.0;
        while test_angle < 360.0 {
            if let Some(direction) = plane.xvec().rotated(&plane.normal(), test_angle.to_radians()) {
                result.push(Axis::from_ray(
                    Ray::new_unchecked(reference, direction),
                    format!("{test_angle}°"),
                ));
            }
            test_angle += step;
        }
        if tracking_z {
            result.push(Axis::from_ray(Ray::new_unchecked(reference, plane.normal()), "Z"));
            result.push(Axis::from_ray(Ray::new_unchecked(reference, -plane.normal()), "Z"));
        }
        result
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
