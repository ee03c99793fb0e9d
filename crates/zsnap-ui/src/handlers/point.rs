//! 点输入
//!
//! 支持的字面输入：
//! - `#x,y,z`: 绝对坐标
//! - `x,y` 或 `x,y,z`: 从参考点沿平面坐标轴偏移
//! - 单个数值: 从参考点朝当前捕捉点方向的距离

use zsnap_core::error::InputError;
use zsnap_core::geometry::Curve;
use zsnap_core::input_parser::{Dimension, InputParser, ABSOLUTE_PREFIX};
use zsnap_core::math::{Plane, Point3, Ray, VectorExt, EPSILON};
use zsnap_core::snap::{Snap, SnapConfig, SnapResult};
use zsnap_core::snaps::{AxisSnap, ObjectSnap, PlaneSnap, PointOnCurveSnap};
use zsnap_core::tracking::TrackingSnap;
use zsnap_core::view::View;

use crate::handler::{InputResolver, SnapEventHandler, SnapOutcome, SnapRequest};
use crate::host::SnapHost;

/// 点输入的参数
#[derive(Default)]
pub struct PointSnapData {
    pub request: SnapRequest,
    /// 相对输入、距离提示与垂足捕捉的参考点
    pub ref_point: Option<Point3>,
    /// 允许输入的数值个数
    pub dimension: Dimension,
    /// 相对坐标使用的平面，缺省为视图工作平面
    pub plane: Option<Plane>,
}

impl PointSnapData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(mut self, request: SnapRequest) -> Self {
        self.request = request;
        self
    }

    pub fn with_ref_point(mut self, point: Point3) -> Self {
        self.ref_point = Some(point);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.plane = Some(plane);
        self
    }
}

#[derive(Debug, Clone)]
pub struct PointResolver {
    ref_point: Option<Point3>,
    dimension: Dimension,
    plane: Option<Plane>,
}

impl PointResolver {
    pub fn new(ref_point: Option<Point3>, dimension: Dimension, plane: Option<Plane>) -> Self {
        Self {
            ref_point,
            dimension,
            plane,
        }
    }

    /// 参考点；未指定时使用追踪结果的参考点
    fn ref_point(&self, snaped: Option<&SnapResult>) -> Option<Point3> {
        self.ref_point.or_else(|| snaped.and_then(|snaped| snaped.ref_point))
    }
}

impl InputResolver for PointResolver {
    fn input_error(&self, text: &str, snaped: Option<&SnapResult>) -> Option<InputError> {
        let text = text.trim();
        let (is_absolute, body) = match text.strip_prefix(ABSOLUTE_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let count = body.split(',').count();
        if is_absolute && count != 3 {
            return Some(InputError::ThreeNumberCanBeInput);
        }
        if !self.dimension.accepts(count) {
            return Some(InputError::UnsupportedInputs);
        }
        if InputParser::parse(text).is_err() {
            return Some(InputError::InvalidNumber);
        }
        let reference = self.ref_point(snaped);
        if reference.is_none() && count != 3 {
            return Some(InputError::ThreeNumberCanBeInput);
        }
        if let (1, Some(reference)) = (count, reference) {
            let coincident = snaped.map_or(true, |snaped| {
                snaped.point.coords.is_equal_to(&reference.coords, EPSILON)
            });
            if coincident {
                return Some(InputError::CannotInputANumber);
            }
        }
        None
    }

    fn point_from_input(
        &self,
        view: &dyn View,
        text: &str,
        snaped: Option<&SnapResult>,
    ) -> Result<SnapResult, InputError> {
        let parsed = InputParser::parse(text).map_err(|_| InputError::InvalidNumber)?;
        let reference = self.ref_point(snaped).unwrap_or_else(Point3::origin);
        let point = match (parsed.is_absolute, parsed.values.as_slice()) {
            (true, [x, y, z]) => Point3::new(*x, *y, *z),
            (true, _) => return Err(InputError::ThreeNumberCanBeInput),
            (false, [distance]) => {
                let direction = snaped
                    .and_then(|snaped| (snaped.point - reference).unit())
                    .ok_or(InputError::CannotInputANumber)?;
                reference + direction * *distance
            }
            (false, values) => {
                let plane = self.plane.unwrap_or_else(|| view.workplane());
                let mut point = reference + plane.xvec() * values[0] + plane.yvec() * values[1];
                if let Some(z) = values.get(2) {
                    point += plane.normal() * *z;
                }
                point
            }
        };
        Ok(SnapResult::new(view.id(), point))
    }
}

/// 限定在平面上的点输入，捕捉结果投影到平面
#[derive(Debug, Clone)]
pub struct PointOnPlaneResolver {
    inner: PointResolver,
    plane: Plane,
}

impl PointOnPlaneResolver {
    pub fn new(plane: Plane, ref_point: Option<Point3>, dimension: Dimension) -> Self {
        Self {
            inner: PointResolver::new(ref_point, dimension, Some(plane)),
            plane,
        }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }
}

impl InputResolver for PointOnPlaneResolver {
    fn input_error(&self, text: &str, snaped: Option<&SnapResult>) -> Option<InputError> {
        self.inner.input_error(text, snaped)
    }

    fn point_from_input(
        &self,
        view: &dyn View,
        text: &str,
        snaped: Option<&SnapResult>,
    ) -> Result<SnapResult, InputError> {
        self.inner.point_from_input(view, text, snaped)
    }

    fn adjust(&mut self, snaped: SnapResult, _view: &dyn View) -> SnapResult {
        let point = self.plane.project(&snaped.point);
        snaped.with_point(point)
    }
}

/// 曲线上的点：输入为沿曲线的弧长
#[derive(Debug, Clone)]
pub struct PointOnCurveResolver {
    curve: Curve,
}

impl PointOnCurveResolver {
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }
}

impl InputResolver for PointOnCurveResolver {
    fn input_error(&self, text: &str, _snaped: Option<&SnapResult>) -> Option<InputError> {
        InputParser::parse_number(text).err().map(|_| InputError::InvalidNumber)
    }

    fn point_from_input(
        &self,
        view: &dyn View,
        text: &str,
        _snaped: Option<&SnapResult>,
    ) -> Result<SnapResult, InputError> {
        let length = InputParser::parse_number(text).map_err(|_| InputError::InvalidNumber)?;
        let total = self.curve.length();
        if total < EPSILON {
            return Err(InputError::InvalidNumber);
        }
        let first = self.curve.first_parameter();
        let last = self.curve.last_parameter();
        let parameter = first + (last - first) * (length / total);
        Ok(SnapResult::new(view.id(), self.curve.value(parameter)))
    }
}

/// 射线上的点：输入为射线参数
#[derive(Debug, Clone)]
pub struct PointOnAxisResolver {
    ray: Ray,
}

impl PointOnAxisResolver {
    pub fn new(ray: Ray) -> Self {
        Self { ray }
    }
}

impl InputResolver for PointOnAxisResolver {
    fn input_error(&self, text: &str, _snaped: Option<&SnapResult>) -> Option<InputError> {
        InputParser::parse_number(text).err().map(|_| InputError::InvalidNumber)
    }

    fn point_from_input(
        &self,
        view: &dyn View,
        text: &str,
        _snaped: Option<&SnapResult>,
    ) -> Result<SnapResult, InputError> {
        let parameter = InputParser::parse_number(text).map_err(|_| InputError::InvalidNumber)?;
        Ok(SnapResult::new(view.id(), self.ray.point_at(parameter)))
    }
}

impl<H: SnapHost> SnapEventHandler<H, PointResolver> {
    /// 点输入：对象捕捉、追踪、平面捕捉
    pub fn point(host: H, data: PointSnapData, config: SnapConfig) -> (Self, SnapOutcome) {
        let plane_snap = match data.plane {
            Some(plane) => PlaneSnap::fixed(plane, data.ref_point),
            None => PlaneSnap::workplane(data.ref_point),
        };
        let snaps: Vec<Box<dyn Snap>> = vec![
            Box::new(ObjectSnap::new(data.ref_point)),
            Box::new(TrackingSnap::new(data.ref_point)),
            Box::new(plane_snap),
        ];
        let resolver = PointResolver::new(data.ref_point, data.dimension, data.plane);
        Self::new(host, resolver, snaps, data.request, config)
    }
}

impl<H: SnapHost> SnapEventHandler<H, PointOnPlaneResolver> {
    pub fn point_on_plane(host: H, plane: Plane, data: PointSnapData, config: SnapConfig) -> (Self, SnapOutcome) {
        let snaps: Vec<Box<dyn Snap>> = vec![
            Box::new(ObjectSnap::new(None)),
            Box::new(PlaneSnap::fixed(plane, None)),
        ];
        let resolver = PointOnPlaneResolver::new(plane, data.ref_point, data.dimension);
        Self::new(host, resolver, snaps, data.request, config)
    }
}

impl<H: SnapHost> SnapEventHandler<H, PointOnCurveResolver> {
    /// `curve` 为世界坐标下的曲线
    pub fn point_on_curve(host: H, curve: Curve, request: SnapRequest, config: SnapConfig) -> (Self, SnapOutcome) {
        let snaps: Vec<Box<dyn Snap>> = vec![
            Box::new(ObjectSnap::new(None)),
            Box::new(PointOnCurveSnap::new(curve.clone())),
            Box::new(PlaneSnap::workplane(None)),
        ];
        Self::new(host, PointOnCurveResolver::new(curve), snaps, request, config)
    }
}

impl<H: SnapHost> SnapEventHandler<H, PointOnAxisResolver> {
    pub fn point_on_axis(host: H, ray: Ray, request: SnapRequest, config: SnapConfig) -> (Self, SnapOutcome) {
        let snaps: Vec<Box<dyn Snap>> = vec![Box::new(ObjectSnap::new(None)), Box::new(AxisSnap::from_ray(&ray))];
        Self::new(host, PointOnAxisResolver::new(ray), snaps, request, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zsnap_core::geometry::{CircleCurve, LineCurve};
    use zsnap_core::headless::OrthoView;
    use zsnap_core::math::Vector3;
    use zsnap_core::view::ViewId;

    fn hovered(point: Point3) -> SnapResult {
        SnapResult::new(ViewId(1), point)
    }

    #[test]
    fn test_point_input_errors() {
        let resolver = PointResolver::new(Some(Point3::origin()), Dimension::D1D2D3, None);
        let hover = hovered(Point3::new(1.0, 0.0, 0.0));
        assert_eq!(resolver.input_error("#1,2", Some(&hover)), Some(InputError::ThreeNumberCanBeInput));
        assert_eq!(resolver.input_error("1,2,3,4", Some(&hover)), Some(InputError::UnsupportedInputs));
        assert_eq!(resolver.input_error("1,x", Some(&hover)), Some(InputError::InvalidNumber));
        assert_eq!(resolver.input_error("5", None), Some(InputError::CannotInputANumber));
        assert_eq!(
            resolver.input_error("5", Some(&hovered(Point3::origin()))),
            Some(InputError::CannotInputANumber)
        );
        assert_eq!(resolver.input_error("5", Some(&hover)), None);
        assert_eq!(resolver.input_error("#1,2,3", None), None);

        let no_reference = PointResolver::new(None, Dimension::D1D2D3, None);
        assert_eq!(no_reference.input_error("1,2", None), Some(InputError::ThreeNumberCanBeInput));

        let planar = PointResolver::new(Some(Point3::origin()), Dimension::D1D2, None);
        assert_eq!(planar.input_error("1,2,3", Some(&hover)), Some(InputError::UnsupportedInputs));
    }

    #[test]
    fn test_point_from_input() {
        let view = OrthoView::new();
        let resolver = PointResolver::new(Some(Point3::new(1.0, 1.0, 1.0)), Dimension::D1D2D3, None);
        let hover = hovered(Point3::new(1.0, 5.0, 1.0));

        let absolute = resolver.point_from_input(&view, "#10,0,0", Some(&hover)).unwrap();
        assert_eq!(absolute.point, Point3::new(10.0, 0.0, 0.0));

        let relative = resolver.point_from_input(&view, "2,3", Some(&hover)).unwrap();
        assert_eq!(relative.point, Point3::new(3.0, 4.0, 1.0));

        let relative3 = resolver.point_from_input(&view, "2,3,4", Some(&hover)).unwrap();
        assert_eq!(relative3.point, Point3::new(3.0, 4.0, 5.0));

        let distance = resolver.point_from_input(&view, "2", Some(&hover)).unwrap();
        assert!((distance.point - Point3::new(1.0, 3.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_reference_from_tracking_result() {
        let view = OrthoView::new();
        let resolver = PointResolver::new(None, Dimension::D1D2D3, None);
        let hover = hovered(Point3::new(4.0, 0.0, 0.0)).with_ref_point(Point3::new(1.0, 0.0, 0.0));
        assert_eq!(resolver.input_error("1", Some(&hover)), None);
        let result = resolver.point_from_input(&view, "1", Some(&hover)).unwrap();
        assert!((result.point - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_relative_uses_plane() {
        let view = OrthoView::new();
        let resolver = PointResolver::new(Some(Point3::origin()), Dimension::D1D2D3, Some(Plane::yz()));
        let result = resolver.point_from_input(&view, "1,2", None).unwrap();
        assert!((result.point - Point3::new(0.0, 1.0, 2.0)).norm() < 1e-9);
    }

    #[test]
    fn test_point_on_curve_input() {
        let view = OrthoView::new();
        let circle = CircleCurve::new(Point3::origin(), Vector3::z(), 2.0).unwrap();
        let resolver = PointOnCurveResolver::new(Curve::Circle(circle));
        assert_eq!(resolver.input_error("abc", None), Some(InputError::InvalidNumber));
        let quarter = std::f64::consts::PI;
        let result = resolver.point_from_input(&view, &quarter.to_string(), None).unwrap();
        assert!((result.point - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-9);

        let line = PointOnCurveResolver::new(Curve::Line(LineCurve::new(
            Point3::origin(),
            Point3::new(10.0, 0.0, 0.0),
        )));
        let result = line.point_from_input(&view, "4", None).unwrap();
        assert!((result.point - Point3::new(4.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_point_on_axis_input() {
        let view = OrthoView::new();
        let ray = Ray::new(Point3::new(1.0, 0.0, 0.0), Vector3::y()).unwrap();
        let resolver = PointOnAxisResolver::new(ray);
        let result = resolver.point_from_input(&view, "-3", None).unwrap();
        assert_eq!(result.point, Point3::new(1.0, -3.0, 0.0));
        assert_eq!(resolver.input_error("1,2", None), Some(InputError::InvalidNumber));
    }

    #[test]
    fn test_point_on_plane_projects() {
        let mut resolver =
            PointOnPlaneResolver::new(Plane::xy().translated_to(Point3::new(0.0, 0.0, 3.0)), None, Dimension::D1D2D3);
        let view = OrthoView::new();
        let adjusted = resolver.adjust(hovered(Point3::new(1.0, 2.0, 9.0)), &view);
        assert_eq!(adjusted.point, Point3::new(1.0, 2.0, 3.0));
    }
}
