//! 追踪轴

use crate::error::GeometryError;
use crate::math::{Plane, Point3, Ray, Vector3};

/// 带名称的追踪射线
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    ray: Ray,
    name: String,
}

impl Axis {
    pub fn new(location: Point3, direction: Vector3, name: impl Into<String>) -> Result<Self, GeometryError> {
        Ok(Self::from_ray(Ray::new(location, direction)?, name))
    }

    pub fn from_ray(ray: Ray, name: impl Into<String>) -> Self {
        Self { ray, name: name.into() }
    }

    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    pub fn location(&self) -> Point3 {
        self.ray.location()
    }

    pub fn direction(&self) -> Vector3 {
        self.ray.direction()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// 沿平面坐标轴正反方向的 4 条轴；`contains_z` 时再加法向正反 2 条
    pub fn axes_at_plane(location: Point3, plane: &Plane, contains_z: bool) -> Vec<Axis> {
        let mut directions = vec![
            (plane.xvec(), "X"),
            (-plane.xvec(), "X"),
            (plane.yvec(), "Y"),
            (-plane.yvec(), "Y"),
        ];
        if contains_z {
            directions.push((plane.normal(), "Z"));
            directions.push((-plane.normal(), "Z"));
        }
        directions
            .into_iter()
            .map(|(direction, name)| Axis::from_ray(Ray::new_unchecked(location, direction), name))
            .collect()
    }
}
