//! 曲线图元定义
//!
//! 捕捉引擎只依赖曲线的参数化接口：
//! - `value(t)` / `first_parameter()` / `last_parameter()`
//! - `project(point)` 正交投影
//! - `intersect(other)` 曲线/曲线交点
//!
//! 支持的曲线：
//! - 线段 (LineCurve)，参数为到起点的距离
//! - 圆/圆弧 (CircleCurve)，参数为平面内的角度（弧度）

use crate::error::GeometryError;
use crate::math::{
    line_segment_distance, Isometry3, Plane, Point3, Precision, Ray, Vector2, Vector3, VectorExt,
    EPSILON,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// 曲线交点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveIntersection {
    pub point: Point3,
    /// 交点在自身曲线上的参数
    pub parameter: f64,
}

/// 曲线类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    Line(LineCurve),
    Circle(CircleCurve),
}

impl Curve {
    /// 获取曲线的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Curve::Line(_) => "Line",
            Curve::Circle(c) if c.is_closed() => "Circle",
            Curve::Circle(_) => "Arc",
        }
    }

    pub fn value(&self, parameter: f64) -> Point3 {
        match self {
            Curve::Line(l) => l.value(parameter),
            Curve::Circle(c) => c.value(parameter),
        }
    }

    pub fn first_parameter(&self) -> f64 {
        match self {
            Curve::Line(_) => 0.0,
            Curve::Circle(c) => c.start_angle(),
        }
    }

    pub fn last_parameter(&self) -> f64 {
        match self {
            Curve::Line(l) => l.length(),
            Curve::Circle(c) => c.end_angle(),
        }
    }

    pub fn start_point(&self) -> Point3 {
        self.value(self.first_parameter())
    }

    pub fn end_point(&self) -> Point3 {
        self.value(self.last_parameter())
    }

    pub fn mid_point(&self) -> Point3 {
        self.value((self.first_parameter() + self.last_parameter()) * 0.5)
    }

    pub fn length(&self) -> f64 {
        match self {
            Curve::Line(l) => l.length(),
            Curve::Circle(c) => c.length(),
        }
    }

    /// 点在曲线上的正交投影（垂足），按到 `point` 的距离升序
    pub fn project(&self, point: &Point3) -> Vec<Point3> {
        match self {
            Curve::Line(l) => l.project(point).into_iter().collect(),
            Curve::Circle(c) => c.project(point),
        }
    }

    /// 曲线上距 `point` 最近点的参数
    pub fn parameter_of(&self, point: &Point3) -> f64 {
        match self {
            Curve::Line(l) => l.parameter_of(point).clamp(0.0, l.length()),
            Curve::Circle(c) => c.parameter_of(point),
        }
    }

    /// 曲线上距射线（所在直线）最近的点
    pub fn nearest_to_ray(&self, ray: &Ray) -> Point3 {
        match self {
            Curve::Line(l) => l.nearest_to_ray(ray),
            Curve::Circle(c) => c.nearest_to_ray(ray),
        }
    }

    /// 曲线/曲线交点，参数取自身曲线
    pub fn intersect(&self, other: &Curve) -> Vec<CurveIntersection> {
        let points = match (self, other) {
            (Curve::Line(a), Curve::Line(b)) => line_line_intersection(a, b).into_iter().collect(),
            (Curve::Line(line), Curve::Circle(circle)) | (Curve::Circle(circle), Curve::Line(line)) => {
                line_circle_intersection(line, circle)
            }
            (Curve::Circle(a), Curve::Circle(b)) => circle_circle_intersection(a, b),
        };
        points
            .into_iter()
            .map(|point| CurveIntersection {
                point,
                parameter: self.parameter_of(&point),
            })
            .collect()
    }

    /// 曲线与射线的交点；射线反方向上的交点不计
    pub fn intersect_ray(&self, ray: &Ray) -> Vec<Point3> {
        match self {
            Curve::Line(l) => l.intersect_ray(ray).into_iter().collect(),
            Curve::Circle(c) => circle_line_parameters(c, &ray.location(), &ray.direction())
                .into_iter()
                .filter(|t| *t >= -EPSILON)
                .map(|t| ray.point_at(t))
                .filter(|p| c.contains_point_angle(p))
                .collect(),
        }
    }

    /// 圆识别：圆或圆弧时返回其圆曲线
    pub fn as_circle(&self) -> Option<&CircleCurve> {
        match self {
            Curve::Circle(c) => Some(c),
            Curve::Line(_) => None,
        }
    }

    pub fn center(&self) -> Option<Point3> {
        self.as_circle().map(CircleCurve::center)
    }

    pub fn transformed(&self, transform: &Isometry3) -> Curve {
        match self {
            Curve::Line(l) => Curve::Line(LineCurve::new(
                transform.transform_point(&l.start),
                transform.transform_point(&l.end),
            )),
            Curve::Circle(c) => Curve::Circle(CircleCurve {
                plane: c.plane.transformed(transform),
                ..c.clone()
            }),
        }
    }
}

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCurve {
    pub start: Point3,
    pub end: Point3,
}

impl LineCurve {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 单位方向；退化为点时返回 `None`
    pub fn direction(&self) -> Option<Vector3> {
        (self.end - self.start).unit()
    }

    pub fn value(&self, parameter: f64) -> Point3 {
        match self.direction() {
            Some(direction) => self.start + direction * parameter,
            None => self.start,
        }
    }

    pub fn midpoint(&self) -> Point3 {
        nalgebra::center(&self.start, &self.end)
    }

    pub fn parameter_of(&self, point: &Point3) -> f64 {
        self.direction()
            .map(|direction| (point - self.start).dot(&direction))
            .unwrap_or(0.0)
    }

    /// 垂足；垂足必须在线段上
    pub fn project(&self, point: &Point3) -> Option<Point3> {
        self.direction()?;
        let t = self.parameter_of(point);
        (t >= -EPSILON && t <= self.length() + EPSILON).then(|| self.value(t))
    }

    /// 线段上距 `point` 最近的点
    pub fn nearest_point(&self, point: &Point3) -> Point3 {
        self.value(self.parameter_of(point).clamp(0.0, self.length()))
    }

    pub fn nearest_to_ray(&self, ray: &Ray) -> Point3 {
        let Some(direction) = self.direction() else {
            return self.start;
        };
        match line_line_parameters(&self.start, &direction, &ray.location(), &ray.direction()) {
            Some((t, _)) => self.value(t.clamp(0.0, self.length())),
            None => self.nearest_point(&ray.location()),
        }
    }

    pub fn intersect_ray(&self, ray: &Ray) -> Option<Point3> {
        let direction = self.direction()?;
        let (t, s) = line_line_parameters(&self.start, &direction, &ray.location(), &ray.direction())?;
        if t < -EPSILON || t > self.length() + EPSILON || s < -EPSILON {
            return None;
        }
        let point = self.value(t);
        (nalgebra::distance(&point, &ray.point_at(s)) < EPSILON).then_some(point)
    }
}

/// 圆或圆弧
///
/// 圆心为 `plane` 原点，参数角从 `plane.xvec()` 开始、绕法向逆时针度量。
/// `start_angle < end_angle <= start_angle + 2π`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleCurve {
    plane: Plane,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
}

impl CircleCurve {
    /// 完整的圆
    pub fn new(center: Point3, normal: Vector3, radius: f64) -> Result<Self, GeometryError> {
        let normal = normal.unit().ok_or(GeometryError::ZeroNormal)?;
        let xvec = if normal.is_parallel_to(&Vector3::z()) {
            Vector3::x()
        } else {
            Vector3::z().cross(&normal)
        };
        Self::arc(center, normal, xvec, radius, 0.0, TAU)
    }

    /// 圆弧；`end_angle` 会被归一化到 `(start_angle, start_angle + 2π]`
    pub fn arc(
        center: Point3,
        normal: Vector3,
        xvec: Vector3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self, GeometryError> {
        if !(radius > Precision::DISTANCE) {
            return Err(GeometryError::InvalidRadius);
        }
        let plane = Plane::new(center, normal, xvec)?;
        let mut sweep = end_angle - start_angle;
        if sweep <= 0.0 || sweep > TAU {
            sweep = sweep.rem_euclid(TAU);
            if sweep < Precision::ANGLE {
                sweep = TAU;
            }
        }
        Ok(Self {
            plane,
            radius,
            start_angle,
            end_angle: start_angle + sweep,
        })
    }

    pub fn center(&self) -> Point3 {
        self.plane.origin()
    }

    pub fn normal(&self) -> Vector3 {
        self.plane.normal()
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    pub fn is_closed(&self) -> bool {
        self.end_angle - self.start_angle >= TAU - Precision::ANGLE
    }

    pub fn value(&self, angle: f64) -> Point3 {
        self.plane
            .point_at(self.radius * angle.cos(), self.radius * angle.sin())
    }

    /// 计算弧长
    pub fn length(&self) -> f64 {
        self.radius * (self.end_angle - self.start_angle)
    }

    /// 点在圆平面内的极角，归一化到 `[start_angle, start_angle + 2π)`
    fn angle_of(&self, point: &Point3) -> Option<f64> {
        let local = self.plane.to_local(point).coords;
        if local.norm() < Precision::DISTANCE {
            return None;
        }
        let angle = local.y.atan2(local.x);
        Some(self.start_angle + (angle - self.start_angle).rem_euclid(TAU))
    }

    /// 检查角度是否在弧的范围内
    pub fn contains_angle(&self, angle: f64) -> bool {
        if self.is_closed() {
            return true;
        }
        let a = self.start_angle + (angle - self.start_angle).rem_euclid(TAU);
        a <= self.end_angle + Precision::ANGLE || a >= self.start_angle + TAU - Precision::ANGLE
    }

    fn contains_point_angle(&self, point: &Point3) -> bool {
        self.angle_of(point).is_some_and(|a| self.contains_angle(a))
    }

    pub fn parameter_of(&self, point: &Point3) -> f64 {
        let Some(angle) = self.angle_of(point) else {
            return self.start_angle;
        };
        if self.contains_angle(angle) {
            if angle > self.end_angle {
                // 起点附近的容差区
                return self.start_angle;
            }
            return angle;
        }
        let to_start = nalgebra::distance(&self.value(self.start_angle), point);
        let to_end = nalgebra::distance(&self.value(self.end_angle), point);
        if to_start <= to_end {
            self.start_angle
        } else {
            self.end_angle
        }
    }

    pub fn nearest_point(&self, point: &Point3) -> Point3 {
        self.value(self.parameter_of(point))
    }

    /// 垂足：圆上过投影方向的两点中落在弧内者
    pub fn project(&self, point: &Point3) -> Vec<Point3> {
        let Some(angle) = self.angle_of(point) else {
            return Vec::new();
        };
        let mut points: Vec<Point3> = [angle, angle + PI]
            .into_iter()
            .filter(|a| self.contains_angle(*a))
            .map(|a| self.value(a))
            .collect();
        points.sort_by(|a, b| {
            nalgebra::distance(a, point)
                .partial_cmp(&nalgebra::distance(b, point))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        points
    }

    pub fn nearest_to_ray(&self, ray: &Ray) -> Point3 {
        let on_plane = self
            .plane
            .intersect(ray, true)
            .unwrap_or_else(|| self.plane.project(&ray.location()));
        self.nearest_point(&on_plane)
    }
}

/// 两条无限直线的最近点参数 `(t1, t2)`；方向必须为单位向量，平行时返回 `None`
fn line_line_parameters(
    o1: &Point3,
    d1: &Vector3,
    o2: &Point3,
    d2: &Vector3,
) -> Option<(f64, f64)> {
    let w = o1 - o2;
    let b = d1.dot(d2);
    let denom = 1.0 - b * b;
    if denom < EPSILON {
        return None;
    }
    let d = d1.dot(&w);
    let e = d2.dot(&w);
    Some(((b * e - d) / denom, (e - b * d) / denom))
}

/// 线段-线段交点
fn line_line_intersection(a: &LineCurve, b: &LineCurve) -> Option<Point3> {
    let (da, db) = (a.direction()?, b.direction()?);
    // 平行（含共线重叠）不算交点
    if da.is_parallel_to(&db) {
        return None;
    }
    let result = line_segment_distance(&a.start, &a.end, &b.start, &b.end);
    (result.distance < EPSILON).then_some(result.point_on_first)
}

/// 无限直线与完整圆的交点参数；方向必须为单位向量
fn circle_line_parameters(circle: &CircleCurve, origin: &Point3, direction: &Vector3) -> Vec<f64> {
    let normal = circle.normal();
    let center = circle.center();
    let denom = direction.dot(&normal);
    let offset = (center - origin).dot(&normal);

    if denom.abs() > EPSILON {
        // 直线穿过圆所在平面
        let t = offset / denom;
        let point = origin + direction * t;
        if ((point - center).norm() - circle.radius()).abs() < EPSILON {
            return vec![t];
        }
        return Vec::new();
    }
    if offset.abs() >= EPSILON {
        return Vec::new();
    }

    // 共面：|f + t·d|² = r²
    let f = origin - center;
    let b = f.dot(direction);
    let c = f.dot(&f) - circle.radius() * circle.radius();
    let discriminant = b * b - c;
    if discriminant < -EPSILON {
        Vec::new()
    } else if discriminant.abs() < EPSILON {
        // 相切
        vec![-b]
    } else {
        let sqrt_disc = discriminant.sqrt();
        vec![-b - sqrt_disc, -b + sqrt_disc]
    }
}

/// 线段-圆（弧）交点
fn line_circle_intersection(line: &LineCurve, circle: &CircleCurve) -> Vec<Point3> {
    let Some(direction) = line.direction() else {
        return Vec::new();
    };
    let length = line.length();
    circle_line_parameters(circle, &line.start, &direction)
        .into_iter()
        .filter(|t| *t >= -EPSILON && *t <= length + EPSILON)
        .map(|t| line.value(t))
        .filter(|p| circle.contains_point_angle(p))
        .collect()
}

/// 圆（弧）-圆（弧）交点
fn circle_circle_intersection(c1: &CircleCurve, c2: &CircleCurve) -> Vec<Point3> {
    let n1 = c1.normal();
    let n2 = c2.normal();
    let points = if n1.is_parallel_to(&n2) {
        if (c2.center() - c1.center()).dot(&n1).abs() >= EPSILON {
            // 平行平面
            return Vec::new();
        }
        coplanar_circle_intersection(c1, c2)
    } else {
        skew_circle_intersection(c1, c2)
    };
    points
        .into_iter()
        .filter(|p| c1.contains_point_angle(p) && c2.contains_point_angle(p))
        .collect()
}

/// 共面圆：在 c1 的平面坐标系内求解
fn coplanar_circle_intersection(c1: &CircleCurve, c2: &CircleCurve) -> Vec<Point3> {
    let (r1, r2) = (c1.radius(), c2.radius());
    let other = c1.plane().to_local(&c2.center()).coords;
    let d = other.norm();

    // 不相交情况（含同心）
    if d > r1 + r2 + EPSILON || d < (r1 - r2).abs() - EPSILON || d < EPSILON {
        return Vec::new();
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let dir = other / d;
    let p = dir * a;
    let perp = Vector2::new(-dir.y, dir.x);

    let locals = if h < EPSILON {
        // 一个交点（相切）
        vec![p]
    } else {
        vec![p + perp * h, p - perp * h]
    };
    locals
        .into_iter()
        .map(|v| c1.plane().point_at(v.x, v.y))
        .collect()
}

/// 不共面的圆：c1 上的点 P(θ) 落在 c2 平面内时满足 `A·cosθ + B·sinθ + C = 0`，
/// 再检查是否落在 c2 上
fn skew_circle_intersection(c1: &CircleCurve, c2: &CircleCurve) -> Vec<Point3> {
    let n2 = c2.normal();
    let a = c1.radius() * c1.plane().xvec().dot(&n2);
    let b = c1.radius() * c1.plane().yvec().dot(&n2);
    let c = (c1.center() - c2.center()).dot(&n2);
    let r = a.hypot(b);
    if r < Precision::DISTANCE {
        return Vec::new();
    }
    let cos = -c / r;
    if cos.abs() > 1.0 + EPSILON {
        return Vec::new();
    }
    let phi = b.atan2(a);
    let delta = cos.clamp(-1.0, 1.0).acos();
    let angles = if delta < Precision::ANGLE {
        vec![phi]
    } else {
        vec![phi + delta, phi - delta]
    };
    angles
        .into_iter()
        .map(|angle| c1.value(angle))
        .filter(|p| ((p - c2.center()).norm() - c2.radius()).abs() < EPSILON)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn line(a: Point3, b: Point3) -> Curve {
        Curve::Line(LineCurve::new(a, b))
    }

    fn circle(center: Point3, radius: f64) -> Curve {
        Curve::Circle(CircleCurve::new(center, Vector3::z(), radius).unwrap())
    }

    fn contains(points: &[Point3], expected: Point3) -> bool {
        points.iter().any(|q| (q - expected).norm() < 1e-6)
    }

    #[test]
    fn test_line_parameters() {
        let l = line(p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0));
        assert_eq!(l.first_parameter(), 0.0);
        assert!((l.last_parameter() - 10.0).abs() < EPSILON);
        assert!((l.mid_point() - p(5.0, 0.0, 0.0)).norm() < EPSILON);
        assert!((l.end_point() - p(10.0, 0.0, 0.0)).norm() < EPSILON);
        assert_eq!(l.type_name(), "Line");
        assert!(l.center().is_none());
    }

    #[test]
    fn test_circle_parameters() {
        let c = circle(p(1.0, 1.0, 0.0), 2.0);
        assert_eq!(c.type_name(), "Circle");
        assert!((c.length() - 4.0 * PI).abs() < EPSILON);
        assert!((c.value(0.0) - p(3.0, 1.0, 0.0)).norm() < EPSILON);
        assert!((c.value(PI / 2.0) - p(1.0, 3.0, 0.0)).norm() < EPSILON);
        assert_eq!(c.center(), Some(p(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_invalid_circle() {
        assert_eq!(
            CircleCurve::new(Point3::origin(), Vector3::z(), 0.0),
            Err(GeometryError::InvalidRadius)
        );
        assert_eq!(
            CircleCurve::new(Point3::origin(), Vector3::zeros(), 1.0),
            Err(GeometryError::ZeroNormal)
        );
    }

    #[test]
    fn test_arc_sweep_normalized() {
        let arc = CircleCurve::arc(Point3::origin(), Vector3::z(), Vector3::x(), 1.0, PI, 0.5 * PI).unwrap();
        assert!((arc.end_angle() - 2.5 * PI).abs() < EPSILON);
        assert!(!arc.is_closed());
    }

    #[test]
    fn test_project_on_line() {
        let l = line(p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0));
        let feet = l.project(&p(3.0, 4.0, 5.0));
        assert_eq!(feet.len(), 1);
        assert!((feet[0] - p(3.0, 0.0, 0.0)).norm() < EPSILON);
        // 垂足在线段之外
        assert!(l.project(&p(-3.0, 4.0, 0.0)).is_empty());
    }

    #[test]
    fn test_project_on_circle() {
        let c = circle(Point3::origin(), 5.0);
        let feet = c.project(&p(0.0, 10.0, 3.0));
        assert_eq!(feet.len(), 2);
        assert!((feet[0] - p(0.0, 5.0, 0.0)).norm() < EPSILON);
        assert!((feet[1] - p(0.0, -5.0, 0.0)).norm() < EPSILON);
        assert!(c.project(&p(0.0, 0.0, 7.0)).is_empty());
    }

    #[test]
    fn test_line_line_intersection() {
        let a = line(p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0));
        let b = line(p(5.0, -5.0, 0.0), p(5.0, 5.0, 0.0));
        let result = a.intersect(&b);
        assert_eq!(result.len(), 1);
        assert!((result[0].point - p(5.0, 0.0, 0.0)).norm() < EPSILON);
        assert!((result[0].parameter - 5.0).abs() < EPSILON);

        // 异面
        let skew = line(p(5.0, -5.0, 1.0), p(5.0, 5.0, 1.0));
        assert!(a.intersect(&skew).is_empty());
        // 平行
        let parallel = line(p(0.0, 1.0, 0.0), p(10.0, 1.0, 0.0));
        assert!(a.intersect(&parallel).is_empty());
        // 延长线相交，线段不相交
        let short = line(p(20.0, -5.0, 0.0), p(20.0, 5.0, 0.0));
        assert!(a.intersect(&short).is_empty());
    }

    #[test]
    fn test_line_circle_intersection() {
        let c = circle(Point3::origin(), 5.0);
        let l = line(p(-10.0, 0.0, 0.0), p(10.0, 0.0, 0.0));
        let points: Vec<Point3> = l.intersect(&c).into_iter().map(|i| i.point).collect();
        assert_eq!(points.len(), 2);
        assert!(contains(&points, p(-5.0, 0.0, 0.0)));
        assert!(contains(&points, p(5.0, 0.0, 0.0)));

        // 穿过圆所在平面
        let pierce = line(p(3.0, 4.0, -1.0), p(3.0, 4.0, 1.0));
        let points: Vec<Point3> = c.intersect(&pierce).into_iter().map(|i| i.point).collect();
        assert_eq!(points.len(), 1);
        assert!(contains(&points, p(3.0, 4.0, 0.0)));

        // 相切
        let tangent = line(p(-10.0, 5.0, 0.0), p(10.0, 5.0, 0.0));
        assert_eq!(c.intersect(&tangent).len(), 1);
    }

    #[test]
    fn test_line_arc_intersection() {
        let arc = Curve::Circle(
            CircleCurve::arc(Point3::origin(), Vector3::z(), Vector3::x(), 5.0, 0.0, PI / 2.0).unwrap(),
        );
        let l = line(p(-10.0, -10.0, 0.0), p(10.0, 10.0, 0.0));
        let result = arc.intersect(&l);
        assert_eq!(result.len(), 1);
        let h = 5.0 / 2.0_f64.sqrt();
        assert!((result[0].point - p(h, h, 0.0)).norm() < 1e-6);
        assert!((result[0].parameter - PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_coplanar_circle_intersection() {
        let c1 = circle(Point3::origin(), 5.0);
        let c2 = circle(p(8.0, 0.0, 0.0), 5.0);
        let points: Vec<Point3> = c1.intersect(&c2).into_iter().map(|i| i.point).collect();
        assert_eq!(points.len(), 2);
        assert!(contains(&points, p(4.0, 3.0, 0.0)));
        assert!(contains(&points, p(4.0, -3.0, 0.0)));

        // 同心
        let inner = circle(Point3::origin(), 2.0);
        assert!(c1.intersect(&inner).is_empty());
        // 平行平面
        let above = circle(p(8.0, 0.0, 1.0), 5.0);
        assert!(c1.intersect(&above).is_empty());
    }

    #[test]
    fn test_skew_circle_intersection() {
        let c1 = circle(Point3::origin(), 5.0);
        let c2 = Curve::Circle(CircleCurve::new(p(5.0, 0.0, 3.0), Vector3::y(), 3.0).unwrap());
        let points: Vec<Point3> = c1.intersect(&c2).into_iter().map(|i| i.point).collect();
        assert_eq!(points.len(), 1);
        assert!(contains(&points, p(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_intersect_ray() {
        let c = circle(Point3::origin(), 5.0);
        let ray = Ray::new(p(-10.0, 0.0, 0.0), Vector3::x()).unwrap();
        assert_eq!(c.intersect_ray(&ray).len(), 2);
        let behind = Ray::new(p(10.0, 0.0, 0.0), Vector3::x()).unwrap();
        assert!(c.intersect_ray(&behind).is_empty());

        let l = line(p(0.0, -5.0, 0.0), p(0.0, 5.0, 0.0));
        let hits = l.intersect_ray(&ray);
        assert_eq!(hits.len(), 1);
        assert!((hits[0] - Point3::origin()).norm() < EPSILON);
        assert!(l.intersect_ray(&behind).is_empty());
    }

    #[test]
    fn test_nearest_to_ray() {
        let down = Ray::new(p(3.0, 7.0, 10.0), -Vector3::z()).unwrap();
        let l = line(p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0));
        assert!((l.nearest_to_ray(&down) - p(3.0, 0.0, 0.0)).norm() < EPSILON);

        let c = circle(Point3::origin(), 5.0);
        let above = Ray::new(p(0.0, 9.0, 10.0), -Vector3::z()).unwrap();
        assert!((c.nearest_to_ray(&above) - p(0.0, 5.0, 0.0)).norm() < EPSILON);
    }

    #[test]
    fn test_transformed() {
        let l = line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0));
        let moved = l.transformed(&Isometry3::translation(0.0, 0.0, 2.0));
        assert!((moved.start_point() - p(0.0, 0.0, 2.0)).norm() < EPSILON);

        let c = circle(Point3::origin(), 1.0);
        let moved = c.transformed(&Isometry3::translation(5.0, 0.0, 0.0));
        assert_eq!(moved.center(), Some(p(5.0, 0.0, 0.0)));
    }
}
