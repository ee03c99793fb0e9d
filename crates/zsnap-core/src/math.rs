//! 数学基础类型
//!
//! 基于 nalgebra 的点/向量别名，以及捕捉计算所需的：
//! - 容差常量 (`Precision`)
//! - 返回 `Option` 的向量运算扩展 (`VectorExt`, `Vector3Ext`)
//! - 平面 (`Plane`) 与射线 (`Ray`)
//! - 线段/线段最近点

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

pub type Point2 = nalgebra::Point2<f64>;
pub type Point3 = nalgebra::Point3<f64>;
pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Isometry3 = nalgebra::Isometry3<f64>;

/// 热路径以外的通用比较容差
pub const EPSILON: f64 = 1e-6;

/// 几何计算容差
pub struct Precision;

impl Precision {
    pub const DISTANCE: f64 = 1e-7;
    pub const ANGLE: f64 = 1e-3;
    pub const FLOAT: f64 = 1e-7;
}

pub fn almost_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// 2D/3D 向量的扩展运算
///
/// 所有可能退化的运算都返回 `Option`，零向量不会被除。
pub trait VectorExt: Sized {
    /// 单位化；长度小于 `Precision::FLOAT` 时返回 `None`
    fn unit(&self) -> Option<Self>;

    /// 与另一向量的夹角（弧度）；任一向量为零时返回 `None`
    fn angle_to(&self, other: &Self) -> Option<f64>;

    fn is_equal_to(&self, other: &Self, tolerance: f64) -> bool;

    fn is_parallel_to(&self, other: &Self) -> bool;

    fn is_opposite_to(&self, other: &Self) -> bool;
}

impl VectorExt for Vector3 {
    fn unit(&self) -> Option<Self> {
        let length = self.norm();
        if length < Precision::FLOAT {
            None
        } else {
            Some(self / length)
        }
    }

    fn angle_to(&self, other: &Self) -> Option<f64> {
        let zero = Vector3::zeros();
        if self.is_equal_to(&zero, EPSILON) || other.is_equal_to(&zero, EPSILON) {
            return None;
        }
        // tan(x) = |a||b|sin(x) / |a||b|cos(x)
        Some(self.cross(other).norm().atan2(self.dot(other)))
    }

    fn is_equal_to(&self, other: &Self, tolerance: f64) -> bool {
        almost_equal(self.x, other.x, tolerance)
            && almost_equal(self.y, other.y, tolerance)
            && almost_equal(self.z, other.z, tolerance)
    }

    fn is_parallel_to(&self, other: &Self) -> bool {
        match self.angle_to(other) {
            Some(angle) => angle.abs() < EPSILON || (std::f64::consts::PI - angle).abs() < EPSILON,
            None => false,
        }
    }

    fn is_opposite_to(&self, other: &Self) -> bool {
        match self.angle_to(other) {
            Some(angle) => (std::f64::consts::PI - angle).abs() < EPSILON,
            None => false,
        }
    }
}

impl VectorExt for Vector2 {
    fn unit(&self) -> Option<Self> {
        let length = self.norm();
        if length < Precision::FLOAT {
            None
        } else {
            Some(self / length)
        }
    }

    /// 有符号夹角，范围 [-π, π]
    fn angle_to(&self, other: &Self) -> Option<f64> {
        let zero = Vector2::zeros();
        if self.is_equal_to(&zero, EPSILON) || other.is_equal_to(&zero, EPSILON) {
            return None;
        }
        let cross = self.x * other.y - self.y * other.x;
        Some(cross.atan2(self.dot(other)))
    }

    fn is_equal_to(&self, other: &Self, tolerance: f64) -> bool {
        almost_equal(self.x, other.x, tolerance) && almost_equal(self.y, other.y, tolerance)
    }

    fn is_parallel_to(&self, other: &Self) -> bool {
        match self.angle_to(other) {
            Some(angle) => {
                let angle = angle.abs();
                angle < EPSILON || std::f64::consts::PI - angle < EPSILON
            }
            None => false,
        }
    }

    fn is_opposite_to(&self, other: &Self) -> bool {
        match self.angle_to(other) {
            Some(angle) => std::f64::consts::PI - angle.abs() < EPSILON,
            None => false,
        }
    }
}

/// 仅适用于 3D 向量的运算
pub trait Vector3Ext {
    /// 在以 `normal` 为法向的平面上，从自身转到 `other` 的角度，范围 [0, 2π)
    fn angle_on_plane_to(&self, other: &Vector3, normal: &Vector3) -> Option<f64>;

    /// 绕 `axis` 旋转 `angle` 弧度（Rodrigues 公式）
    fn rotated(&self, axis: &Vector3, angle: f64) -> Option<Vector3>;
}

impl Vector3Ext for Vector3 {
    fn angle_on_plane_to(&self, other: &Vector3, normal: &Vector3) -> Option<f64> {
        let angle = self.angle_to(other)?;
        if normal.is_equal_to(&Vector3::zeros(), EPSILON) {
            return None;
        }
        match self.cross(other).unit() {
            Some(vec) if vec.is_opposite_to(normal) => Some(std::f64::consts::TAU - angle),
            _ => Some(angle),
        }
    }

    fn rotated(&self, axis: &Vector3, angle: f64) -> Option<Vector3> {
        let n = axis.unit()?;
        let cos = angle.cos();
        Some(self * cos + n * ((1.0 - cos) * n.dot(self)) + n.cross(self) * angle.sin())
    }
}

/// 平面
///
/// `normal`、`xvec`、`yvec` 均为单位向量且两两正交，`yvec = normal × xvec`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    origin: Point3,
    normal: Vector3,
    xvec: Vector3,
    yvec: Vector3,
}

impl Plane {
    /// 创建平面
    ///
    /// 法向或 X 方向为零、或二者平行时返回错误。`xvec` 不必与法向正交，
    /// 会被投影到平面内。
    pub fn new(origin: Point3, normal: Vector3, xvec: Vector3) -> Result<Self, GeometryError> {
        let n = normal.unit().ok_or(GeometryError::ZeroNormal)?;
        let x = xvec.unit().ok_or(GeometryError::ZeroXVector)?;
        if n.is_parallel_to(&x) {
            return Err(GeometryError::ParallelAxes);
        }
        let yvec = n.cross(&x).unit().ok_or(GeometryError::ParallelAxes)?;
        Ok(Self {
            origin,
            normal: n,
            xvec: yvec.cross(&n),
            yvec,
        })
    }

    pub fn xy() -> Self {
        Self::from_frame(Point3::origin(), Vector3::z(), Vector3::x())
    }

    pub fn yz() -> Self {
        Self::from_frame(Point3::origin(), Vector3::x(), Vector3::y())
    }

    pub fn zx() -> Self {
        Self::from_frame(Point3::origin(), Vector3::y(), Vector3::z())
    }

    /// 由已知正交的单位向量构造
    fn from_frame(origin: Point3, normal: Vector3, xvec: Vector3) -> Self {
        Self {
            origin,
            normal,
            xvec,
            yvec: normal.cross(&xvec),
        }
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    pub fn xvec(&self) -> Vector3 {
        self.xvec
    }

    pub fn yvec(&self) -> Vector3 {
        self.yvec
    }

    pub fn translated_to(&self, origin: Point3) -> Self {
        Self { origin, ..*self }
    }

    pub fn transformed(&self, transform: &Isometry3) -> Self {
        Self::from_frame(
            transform.transform_point(&self.origin),
            transform.transform_vector(&self.normal),
            transform.transform_vector(&self.xvec),
        )
    }

    /// 点在平面上的正投影
    pub fn project(&self, point: &Point3) -> Point3 {
        let vector = point - self.origin;
        let dot = vector.dot(&self.normal);
        self.origin + (vector - self.normal * dot)
    }

    /// 平面局部坐标 (x, y)
    pub fn to_local(&self, point: &Point3) -> Point2 {
        let vector = point - self.origin;
        Point2::new(vector.dot(&self.xvec), vector.dot(&self.yvec))
    }

    pub fn point_at(&self, x: f64, y: f64) -> Point3 {
        self.origin + self.xvec * x + self.yvec * y
    }

    /// 射线与平面的交点
    ///
    /// `contains_extension` 为 `false` 时，射线反方向上的交点不计。
    pub fn intersect(&self, ray: &Ray, contains_extension: bool) -> Option<Point3> {
        let vec = self.origin - ray.location();
        if vec.is_equal_to(&Vector3::zeros(), EPSILON) {
            return Some(self.origin);
        }
        let len = vec.dot(&self.normal);
        let dot = ray.direction().dot(&self.normal);
        if almost_equal(dot, 0.0, EPSILON) {
            return almost_equal(len, 0.0, EPSILON).then(|| ray.location());
        }
        let t = len / dot;
        if !contains_extension && t < 0.0 {
            return None;
        }
        Some(ray.point_at(t))
    }

    /// 两点投影到平面后的距离
    pub fn project_distance(&self, p1: &Point3, p2: &Point3) -> f64 {
        nalgebra::distance(&self.project(p1), &self.project(p2))
    }
}

/// 射线，方向为单位向量
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    location: Point3,
    direction: Vector3,
}

impl Ray {
    pub fn new(location: Point3, direction: Vector3) -> Result<Self, GeometryError> {
        let direction = direction.unit().ok_or(GeometryError::ZeroDirection)?;
        Ok(Self {
            location,
            direction,
        })
    }

    /// 由已知的单位方向构造，不做检查
    pub(crate) fn new_unchecked(location: Point3, direction: Vector3) -> Self {
        Self {
            location,
            direction,
        }
    }

    pub fn location(&self) -> Point3 {
        self.location
    }

    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    pub fn point_at(&self, t: f64) -> Point3 {
        self.location + self.direction * t
    }

    /// 同方向、起点移到 `location` 的射线
    pub fn translated_to(&self, location: Point3) -> Self {
        Self { location, ..*self }
    }

    /// 反向射线
    pub fn reversed(&self) -> Self {
        Self {
            direction: -self.direction,
            ..*self
        }
    }

    /// 两射线（所在直线）的交点；平行或异面时返回 `None`
    pub fn intersect(&self, right: &Ray) -> Option<Point3> {
        if self.direction.is_parallel_to(&right.direction) {
            return None;
        }
        let result = self.nearest_to(right);
        let vec = result - right.location;
        if vec.norm() < EPSILON || vec.is_parallel_to(&right.direction) {
            Some(result)
        } else {
            None
        }
    }

    pub fn distance_to(&self, right: &Ray) -> f64 {
        let nearest1 = self.nearest_to(right);
        let nearest2 = right.nearest_to_point(&nearest1);
        nalgebra::distance(&nearest1, &nearest2)
    }

    /// 自身直线上距 `right` 最近的点
    ///
    /// 构造一个包含 `right` 与公垂线的平面，再与自身求交。
    pub fn nearest_to(&self, right: &Ray) -> Point3 {
        let Some(n) = right.direction.cross(&self.direction).unit() else {
            return self.nearest_to_point(&right.location);
        };
        n.cross(&right.direction)
            .unit()
            .and_then(|normal| Plane::new(right.location, normal, n).ok())
            .and_then(|plane| plane.intersect(self, true))
            .unwrap_or_else(|| self.nearest_to_point(&right.location))
    }

    pub fn nearest_to_point(&self, point: &Point3) -> Point3 {
        let dot = (point - self.location).dot(&self.direction);
        self.point_at(dot)
    }
}

/// 线段/线段最近点结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDistance {
    pub distance: f64,
    pub point_on_first: Point3,
    pub point_on_second: Point3,
    /// 最近点在第一条线段上的参数，范围 [0, 1]
    pub first_parameter: f64,
    /// 最近点在第二条线段上的参数，范围 [0, 1]
    pub second_parameter: f64,
}

/// 计算两条线段之间的最近点
///
/// 参数被夹紧在线段范围内；退化为点的线段同样适用。
pub fn line_segment_distance(
    first_start: &Point3,
    first_end: &Point3,
    second_start: &Point3,
    second_end: &Point3,
) -> SegmentDistance {
    let d1 = first_end - first_start;
    let d2 = second_end - second_start;
    let r = first_start - second_start;
    let a = d1.dot(&d1);
    let b = d1.dot(&d2);
    let c = d2.dot(&d2);
    let d = d1.dot(&r);
    let e = d2.dot(&r);
    let det = a * c - b * b;

    let (mut s_num, mut s_den, mut t_num, mut t_den);
    if det < Precision::FLOAT {
        if c < Precision::FLOAT {
            // 第二条线段退化为点：直接投影到第一条线段
            t_num = 0.0;
            t_den = 1.0;
            if a < Precision::FLOAT {
                s_num = 0.0;
                s_den = 1.0;
            } else {
                s_num = (-d).clamp(0.0, a);
                s_den = a;
            }
        } else {
            s_num = 0.0;
            s_den = 1.0;
            t_num = e;
            t_den = c;
        }
    } else {
        s_num = b * e - c * d;
        t_num = a * e - b * d;
        s_den = det;
        t_den = det;
        if s_num < 0.0 {
            s_num = 0.0;
            t_num = e;
            t_den = c;
        } else if s_num > det {
            s_num = det;
            t_num = e + b;
            t_den = c;
        }
    }

    if t_num < 0.0 {
        t_num = 0.0;
        if -d < 0.0 {
            s_num = 0.0;
        } else if -d > a {
            s_num = s_den;
        } else {
            s_num = -d;
            s_den = a;
        }
    } else if t_num > t_den {
        t_num = t_den;
        let adjusted = -d + b;
        if adjusted < 0.0 {
            s_num = 0.0;
        } else if adjusted > a {
            s_num = s_den;
        } else {
            s_num = adjusted;
            s_den = a;
        }
    }

    let s = if s_num.abs() < Precision::FLOAT { 0.0 } else { s_num / s_den };
    let t = if t_num.abs() < Precision::FLOAT { 0.0 } else { t_num / t_den };
    let point_on_first = first_start + d1 * s;
    let point_on_second = second_start + d2 * t;
    SegmentDistance {
        distance: nalgebra::distance(&point_on_first, &point_on_second),
        point_on_first,
        point_on_second,
        first_parameter: s,
        second_parameter: t,
    }
}
