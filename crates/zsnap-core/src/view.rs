//! 视图与可视化接口
//!
//! 引擎对宿主的全部依赖都在这里：
//! - `View`: 屏幕/世界坐标换算、相机方向、拾取
//! - `VisualContext`: 临时标记、辅助线、预览与高亮

use crate::geometry::Curve;
use crate::math::{Plane, Point2, Point3, Precision, Ray, Vector3};
use crate::shape::{DetectedShape, ShapeType};

/// 视图标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// 临时网格标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

/// 点标记样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointStyle {
    /// 当前捕捉点
    Temporary,
    /// 悬停提示点（未进入捕捉半径）
    Hint,
    /// 已固定的追踪点
    Tracking,
}

/// 线型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineType {
    Solid,
    Dash,
}

/// 调用方提供的预览几何
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewShape {
    Point(Point3),
    Line { start: Point3, end: Point3 },
    Curve(Curve),
}

/// 视图
pub trait View {
    fn id(&self) -> ViewId;

    /// 屏幕坐标对应的拾取射线
    fn ray_at(&self, x: f64, y: f64) -> Ray;

    fn world_to_screen(&self, point: &Point3) -> Point2;

    /// 屏幕坐标在工作平面上的世界坐标
    fn screen_to_world(&self, x: f64, y: f64) -> Point3;

    /// 相机上方向
    fn up(&self) -> Vector3;

    /// 相机视线方向
    fn direction(&self) -> Vector3;

    fn workplane(&self) -> Plane;

    /// 二维约束模式：捕捉结果需要重新投影到工作平面
    fn is_2d(&self) -> bool {
        false
    }

    /// 拾取屏幕坐标附近的形状，按距离由近到远
    fn detect_shapes(&self, shape_type: ShapeType, x: f64, y: f64) -> Vec<DetectedShape>;

    /// 世界点投影到屏幕后与 (x, y) 的像素距离
    fn screen_distance(&self, x: f64, y: f64, point: &Point3) -> f64 {
        let screen = self.world_to_screen(point);
        (screen.x - x).hypot(screen.y - y)
    }
}

/// 可视化上下文
pub trait VisualContext {
    fn display_point(&mut self, point: &Point3, style: PointStyle) -> MeshId;

    fn display_line(&mut self, start: &Point3, end: &Point3, line_type: LineType) -> MeshId;

    fn display_preview(&mut self, shape: &PreviewShape, opacity: f32) -> MeshId;

    fn remove_mesh(&mut self, id: MeshId);

    fn highlight(&mut self, shape: &DetectedShape);

    fn unhighlight(&mut self, shape: &DetectedShape);

    /// 请求重绘
    fn update(&mut self) {}
}

/// 确保平面在视图中可见
///
/// 平面与视线平行（侧视）时无法与拾取射线求交，此时改用过同一原点、
/// 正对相机的平面。
pub fn ensure_plane(view: &dyn View, plane: &Plane) -> Plane {
    let direction = view.direction();
    if direction.dot(&plane.normal()).abs() > Precision::ANGLE {
        return *plane;
    }
    Plane::new(plane.origin(), direction, direction.cross(&view.up())).unwrap_or(*plane)
}
