//! 平面内的连续角度跟踪
//!
//! 点绕平面原点移动时，累计带符号的角度（度）。顺时针越过正 X 轴后
//! 角度变为负值，可以继续到 -360°，用于角度输入时的实时提示。

use crate::math::{Plane, Point3, Precision, Vector3Ext};

#[derive(Debug, Clone)]
pub struct PlaneAngle {
    plane: Plane,
    last_x: f64,
    last_y: f64,
    is_negative_rotation: bool,
    current_angle: f64,
}

impl PlaneAngle {
    pub fn new(plane: Plane) -> Self {
        Self {
            plane,
            last_x: 1.0,
            last_y: 0.0,
            is_negative_rotation: false,
            current_angle: 0.0,
        }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// 当前角度（度）
    pub fn angle(&self) -> f64 {
        self.current_angle
    }

    pub fn move_point(&mut self, point: &Point3) {
        let vector = point - self.plane.origin();
        let x = vector.dot(&self.plane.xvec());
        let y = vector.dot(&self.plane.yvec());
        if self.is_crossing_positive_x_axis(x, y) {
            self.is_negative_rotation = !self.is_negative_rotation;
        }
        // 点与原点重合时保持上一个角度
        if let Some(radians) = self.plane.xvec().angle_on_plane_to(&vector, &self.plane.normal()) {
            let degrees = radians.to_degrees();
            self.current_angle = if self.is_negative_rotation {
                degrees - 360.0
            } else {
                degrees
            };
        }
        if x.abs() > Precision::DISTANCE {
            self.last_x = x;
        }
        if y.abs() > Precision::DISTANCE {
            self.last_y = y;
        }
    }

    fn is_crossing_positive_x_axis(&self, x: f64, y: f64) -> bool {
        let upward = self.last_y < -Precision::DISTANCE && y > Precision::DISTANCE;
        let downward = self.last_y > -Precision::DISTANCE && y < -Precision::DISTANCE;
        let crossing = (upward && self.current_angle < Precision::ANGLE)
            || (downward && self.current_angle > -Precision::ANGLE);
        crossing && self.last_x > 0.0 && x > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    fn point_at(degrees: f64) -> Point3 {
        let radians = degrees.to_radians();
        Point3::new(10.0 * radians.cos(), 10.0 * radians.sin(), 0.0)
    }

    #[test]
    fn test_counter_clockwise_increasing() {
        let mut angle = PlaneAngle::new(Plane::xy());
        let mut last = angle.angle();
        for step in 1..360 {
            angle.move_point(&point_at(step as f64));
            assert!(angle.angle() > last, "step {step}: {} <= {last}", angle.angle());
            last = angle.angle();
        }
        assert!((last - 359.0).abs() < 1e-6);
    }

    #[test]
    fn test_clockwise_decreasing() {
        let mut angle = PlaneAngle::new(Plane::xy());
        let mut last = angle.angle();
        for step in 1..360 {
            angle.move_point(&point_at(-(step as f64)));
            assert!(angle.angle() < last, "step {step}: {} >= {last}", angle.angle());
            last = angle.angle();
        }
        assert!((last + 359.0).abs() < 1e-6);
    }

    #[test]
    fn test_back_and_forth_across_x_axis() {
        let mut angle = PlaneAngle::new(Plane::xy());
        angle.move_point(&point_at(-30.0));
        assert!((angle.angle() + 30.0).abs() < 1e-6);
        angle.move_point(&point_at(30.0));
        assert!((angle.angle() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_at_origin_keeps_angle() {
        let plane = Plane::new(Point3::new(1.0, 1.0, 0.0), Vector3::z(), Vector3::x()).unwrap();
        let mut angle = PlaneAngle::new(plane);
        angle.move_point(&Point3::new(1.0, 2.0, 0.0));
        assert!((angle.angle() - 90.0).abs() < 1e-6);
        angle.move_point(&Point3::new(1.0, 1.0, 0.0));
        assert!((angle.angle() - 90.0).abs() < 1e-6);
    }
}
