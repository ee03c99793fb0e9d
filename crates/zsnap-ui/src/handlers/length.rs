//! 长度输入

use std::rc::Rc;

use zsnap_core::error::{GeometryError, InputError};
use zsnap_core::input_parser::InputParser;
use zsnap_core::math::{Plane, Point3, Precision, Ray, Vector3, VectorExt, EPSILON};
use zsnap_core::snap::{Snap, SnapConfig, SnapResult};
use zsnap_core::snaps::{AxisSnap, ObjectSnap, PlaneSnap, PlaneSource};
use zsnap_core::tracking::TrackingSnap;
use zsnap_core::view::View;

use crate::handler::{InputResolver, SnapEventHandler, SnapOutcome, SnapRequest};
use crate::host::SnapHost;

/// 沿轴的长度
///
/// 指针在起点后方时，输入的长度取反。
#[derive(Debug, Clone)]
pub struct LengthAtAxisResolver {
    ray: Ray,
}

impl LengthAtAxisResolver {
    pub fn new(point: Point3, direction: Vector3) -> Result<Self, GeometryError> {
        Ok(Self {
            ray: Ray::new(point, direction)?,
        })
    }

    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    fn is_reversed(&self, snaped: Option<&SnapResult>) -> bool {
        snaped.is_some_and(|snaped| {
            (snaped.point - self.ray.location()).dot(&self.ray.direction()) < -Precision::DISTANCE
        })
    }
}

impl InputResolver for LengthAtAxisResolver {
    fn input_error(&self, text: &str, _snaped: Option<&SnapResult>) -> Option<InputError> {
        InputParser::parse_number(text).err().map(|_| InputError::InvalidNumber)
    }

    fn point_from_input(
        &self,
        view: &dyn View,
        text: &str,
        snaped: Option<&SnapResult>,
    ) -> Result<SnapResult, InputError> {
        let value = InputParser::parse_number(text).map_err(|_| InputError::InvalidNumber)?;
        let distance = if self.is_reversed(snaped) { -value } else { value };
        Ok(SnapResult::new(view.id(), self.ray.point_at(distance)).with_distance(distance))
    }
}

/// 平面内的长度
///
/// 平面随捕捉点变化，由 `plane_at` 计算。输入一个数值时为朝捕捉点方向的
/// 距离，两个数值时为平面内的偏移。
pub struct LengthAtPlaneResolver {
    point: Point3,
    plane_at: Rc<dyn Fn(&Point3) -> Plane>,
    workplane: Option<Plane>,
}

impl LengthAtPlaneResolver {
    pub fn new(point: Point3, plane_at: impl Fn(&Point3) -> Plane + 'static) -> Self {
        Self {
            point,
            plane_at: Rc::new(plane_at),
            workplane: None,
        }
    }

    pub fn point(&self) -> Point3 {
        self.point
    }

    /// 最近一次捕捉点所在的平面
    pub fn workplane(&self) -> Option<&Plane> {
        self.workplane.as_ref()
    }
}

impl InputResolver for LengthAtPlaneResolver {
    fn input_error(&self, text: &str, snaped: Option<&SnapResult>) -> Option<InputError> {
        let parsed = match InputParser::parse(text) {
            Ok(parsed) if !parsed.is_absolute && (parsed.len() == 1 || parsed.len() == 2) => parsed,
            _ => return Some(InputError::InvalidNumber),
        };
        let coincident = snaped.map_or(true, |snaped| {
            snaped.point.coords.is_equal_to(&self.point.coords, EPSILON)
        });
        (parsed.len() == 1 && coincident).then_some(InputError::CannotInputANumber)
    }

    fn point_from_input(
        &self,
        view: &dyn View,
        text: &str,
        snaped: Option<&SnapResult>,
    ) -> Result<SnapResult, InputError> {
        let parsed = InputParser::parse(text).map_err(|_| InputError::InvalidNumber)?;
        let plane = self.workplane.unwrap_or_else(|| view.workplane());
        let point = match parsed.values.as_slice() {
            [distance] => {
                let direction = snaped
                    .and_then(|snaped| (snaped.point - self.point).unit())
                    .ok_or(InputError::CannotInputANumber)?;
                self.point + direction * *distance
            }
            [x, y] => self.point + plane.xvec() * *x + plane.yvec() * *y,
            _ => return Err(InputError::InvalidNumber),
        };
        Ok(SnapResult::new(view.id(), point).with_plane(plane))
    }

    fn adjust(&mut self, snaped: SnapResult, _view: &dyn View) -> SnapResult {
        let plane = (self.plane_at)(&snaped.point);
        self.workplane = Some(plane);
        snaped.with_plane(plane)
    }
}

impl<H: SnapHost> SnapEventHandler<H, LengthAtAxisResolver> {
    pub fn length_at_axis(
        host: H,
        resolver: LengthAtAxisResolver,
        request: SnapRequest,
        config: SnapConfig,
    ) -> (Self, SnapOutcome) {
        let location = resolver.ray().location();
        let snaps: Vec<Box<dyn Snap>> = vec![
            Box::new(ObjectSnap::new(Some(location))),
            Box::new(AxisSnap::from_ray(resolver.ray())),
        ];
        Self::new(host, resolver, snaps, request, config)
    }
}

impl<H: SnapHost> SnapEventHandler<H, LengthAtPlaneResolver> {
    pub fn length_at_plane(
        host: H,
        resolver: LengthAtPlaneResolver,
        request: SnapRequest,
        config: SnapConfig,
    ) -> (Self, SnapOutcome) {
        let point = resolver.point();
        let plane_snap = PlaneSnap::new(PlaneSource::Dynamic(resolver.plane_at.clone()), Some(point));
        let snaps: Vec<Box<dyn Snap>> = vec![
            Box::new(ObjectSnap::new(Some(point))),
            Box::new(TrackingSnap::new(Some(point))),
            Box::new(plane_snap),
        ];
        Self::new(host, resolver, snaps, request, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadlessHost, Key, PointerEvent};
    use zsnap_core::headless::OrthoView;
    use zsnap_core::view::ViewId;

    #[test]
    fn test_axis_input_sign() {
        let view = OrthoView::new();
        let resolver = LengthAtAxisResolver::new(Point3::new(1.0, 0.0, 0.0), Vector3::x()).unwrap();
        let ahead = SnapResult::new(ViewId(1), Point3::new(4.0, 0.0, 0.0));
        let result = resolver.point_from_input(&view, "2", Some(&ahead)).unwrap();
        assert_eq!(result.point, Point3::new(3.0, 0.0, 0.0));
        assert_eq!(result.distance, Some(2.0));

        let behind = SnapResult::new(ViewId(1), Point3::new(-4.0, 0.0, 0.0));
        let result = resolver.point_from_input(&view, "2", Some(&behind)).unwrap();
        assert_eq!(result.point, Point3::new(-1.0, 0.0, 0.0));

        assert_eq!(resolver.input_error("1,2", None), Some(InputError::InvalidNumber));
        assert!(LengthAtAxisResolver::new(Point3::origin(), Vector3::zeros()).is_err());
    }

    #[test]
    fn test_plane_input_errors() {
        let resolver = LengthAtPlaneResolver::new(Point3::origin(), |_| Plane::xy());
        let hover = SnapResult::new(ViewId(1), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(resolver.input_error("1,2,3", Some(&hover)), Some(InputError::InvalidNumber));
        assert_eq!(resolver.input_error("#1,2", Some(&hover)), Some(InputError::InvalidNumber));
        assert_eq!(resolver.input_error("x", Some(&hover)), Some(InputError::InvalidNumber));
        assert_eq!(resolver.input_error("3", None), Some(InputError::CannotInputANumber));
        assert_eq!(resolver.input_error("3", Some(&hover)), None);
        assert_eq!(resolver.input_error("1,2", None), None);
    }

    #[test]
    fn test_length_at_plane_handler() {
        let view = OrthoView::new();
        let raised = Plane::xy().translated_to(Point3::new(0.0, 0.0, 1.0));
        let resolver = LengthAtPlaneResolver::new(Point3::new(0.0, 0.0, 1.0), move |_| raised);
        let (mut handler, mut outcome) = SnapEventHandler::length_at_plane(
            HeadlessHost::new(),
            resolver,
            SnapRequest::new(),
            SnapConfig::default(),
        );
        handler.on_pointer_move(&view, &PointerEvent::mouse(30.0, 40.0));
        let snaped = handler.snaped().unwrap();
        assert!((snaped.point - Point3::new(30.0, 40.0, 1.0)).norm() < 1e-9);
        assert_eq!(snaped.plane, Some(raised));
        assert_eq!(handler.resolver().workplane(), Some(&raised));

        handler.on_key_down(Key::Char('1'));
        handler.submit_input(&view, "10").unwrap();
        let result = outcome.try_recv().unwrap().unwrap().unwrap();
        assert!((result.point - Point3::new(6.0, 8.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_length_at_plane_offsets() {
        let view = OrthoView::new();
        let resolver = LengthAtPlaneResolver::new(Point3::new(1.0, 1.0, 0.0), |_| Plane::yz());
        let (mut handler, mut outcome) = SnapEventHandler::length_at_plane(
            HeadlessHost::new(),
            resolver,
            SnapRequest::new(),
            SnapConfig::default(),
        );
        // 没有捕捉点时使用视图工作平面
        handler.on_key_down(Key::Char('2'));
        handler.submit_input(&view, "2,3").unwrap();
        let result = outcome.try_recv().unwrap().unwrap().unwrap();
        assert_eq!(result.point, Point3::new(3.0, 4.0, 0.0));
    }
}
