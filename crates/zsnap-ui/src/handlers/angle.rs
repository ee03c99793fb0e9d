//! 角度输入

use zsnap_core::error::{GeometryError, InputError};
use zsnap_core::input_parser::InputParser;
use zsnap_core::math::{Plane, Point3, Vector3, Vector3Ext};
use zsnap_core::plane_angle::PlaneAngle;
use zsnap_core::snap::{Snap, SnapConfig, SnapResult};
use zsnap_core::snaps::{ObjectSnap, PlaneSnap};
use zsnap_core::tracking::TrackingSnap;
use zsnap_core::view::View;

use crate::handler::{InputResolver, SnapEventHandler, SnapOutcome, SnapRequest};
use crate::host::SnapHost;

/// 绕中心的角度，从 `p1 - center` 方向起算（度）
#[derive(Debug, Clone)]
pub struct AngleResolver {
    center: Point3,
    plane: Plane,
    plane_angle: PlaneAngle,
    radius: f64,
}

impl AngleResolver {
    pub fn new(center: Point3, p1: Point3, normal: Vector3) -> Result<Self, GeometryError> {
        let xvec = p1 - center;
        let plane = Plane::new(center, normal, xvec)?;
        Ok(Self {
            center,
            plane,
            plane_angle: PlaneAngle::new(plane),
            radius: xvec.norm(),
        })
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }
}

impl InputResolver for AngleResolver {
    fn input_error(&self, text: &str, _snaped: Option<&SnapResult>) -> Option<InputError> {
        InputParser::parse_number(text).err().map(|_| InputError::InvalidNumber)
    }

    fn point_from_input(
        &self,
        view: &dyn View,
        text: &str,
        _snaped: Option<&SnapResult>,
    ) -> Result<SnapResult, InputError> {
        let degrees = InputParser::parse_number(text).map_err(|_| InputError::InvalidNumber)?;
        let vector = self
            .plane
            .xvec()
            .rotated(&self.plane.normal(), degrees.to_radians())
            .ok_or(InputError::InvalidNumber)?;
        let point = self.center + vector * self.radius;
        Ok(SnapResult::new(view.id(), point).with_plane(self.plane))
    }

    fn format_prompt(&mut self, snaped: &SnapResult) -> Option<String> {
        self.plane_angle.move_point(&snaped.point);
        Some(format!("{:.2}°", self.plane_angle.angle()))
    }
}

impl<H: SnapHost> SnapEventHandler<H, AngleResolver> {
    /// 角度输入；`ref_point` 用于垂足捕捉
    pub fn angle(
        host: H,
        resolver: AngleResolver,
        ref_point: Option<Point3>,
        request: SnapRequest,
        config: SnapConfig,
    ) -> (Self, SnapOutcome) {
        let center = resolver.center();
        let snaps: Vec<Box<dyn Snap>> = vec![
            Box::new(ObjectSnap::new(ref_point)),
            Box::new(TrackingSnap::new(Some(center))),
            Box::new(PlaneSnap::fixed(*resolver.plane(), Some(center))),
        ];
        Self::new(host, resolver, snaps, request, config)
    }
}
