//! 沿固定射线的捕捉

use crate::error::GeometryError;
use crate::math::{Plane, Point3, Ray, Vector3, VectorExt, EPSILON};
use crate::snap::{Snap, SnapData, SnapEnv, SnapResult};
use crate::view::{LineType, MeshId, VisualContext};

/// 辅助线长度
const GUIDE_LENGTH: f64 = 1e15;

/// 取射线所在直线上离指针射线最近的点
///
/// 过射线作一个尽量正对相机的平面，与指针射线求交后投影回射线。
/// 结果的 `distance` 为带符号的距离，起点后方为负。
pub struct AxisSnap {
    point: Point3,
    direction: Vector3,
    temp_line: Option<MeshId>,
}

impl AxisSnap {
    pub fn new(point: Point3, direction: Vector3) -> Result<Self, GeometryError> {
        let direction = direction.unit().ok_or(GeometryError::ZeroDirection)?;
        Ok(Self {
            point,
            direction,
            temp_line: None,
        })
    }

    pub fn from_ray(ray: &Ray) -> Self {
        Self {
            point: ray.location(),
            direction: ray.direction(),
            temp_line: None,
        }
    }

    pub fn point(&self) -> Point3 {
        self.point
    }

    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    /// 包含射线、法向最接近视线的平面
    fn facing_plane(&self, view_direction: &Vector3, up: &Vector3) -> Option<Plane> {
        let reject = |v: &Vector3| v - self.direction * v.dot(&self.direction);
        let normal = reject(view_direction)
            .try_normalize(EPSILON)
            .or_else(|| reject(up).try_normalize(EPSILON))?;
        Plane::new(self.point, normal, self.direction).ok()
    }

    fn show_temp_line(&mut self, visual: &mut dyn VisualContext, dot: f64) {
        let sign = if dot.abs() < EPSILON { 1.0 } else { dot.signum() };
        let end = self.point + self.direction * (GUIDE_LENGTH * sign);
        self.temp_line = Some(visual.display_line(&self.point, &end, LineType::Dash));
    }
}

impl Snap for AxisSnap {
    fn snap(&mut self, data: &SnapData<'_>, env: &mut SnapEnv<'_>) -> Option<SnapResult> {
        let plane = self.facing_plane(&data.view.direction(), &data.view.up())?;
        let ray = data.view.ray_at(data.mx, data.my);
        let intersect = plane.intersect(&ray, false)?;
        let dot = (intersect - self.point).dot(&self.direction);
        let point = self.point + self.direction * dot;
        self.show_temp_line(env.visual, dot);
        Some(SnapResult::new(data.view.id(), point).with_distance(dot))
    }

    fn remove_dynamic_object(&mut self, visual: &mut dyn VisualContext) {
        if let Some(id) = self.temp_line.take() {
            visual.remove_mesh(id);
        }
    }
}
