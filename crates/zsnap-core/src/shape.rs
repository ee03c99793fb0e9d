//! 检测到的形状
//!
//! 由宿主的拾取功能返回，引擎只读取，不修改。

use crate::geometry::Curve;
use crate::math::{Isometry3, Point3};

/// 形状唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

/// 形状所属的可视对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// 拾取时要求的形状类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Vertex,
    Edge,
    Face,
}

/// 形状数据（局部坐标）
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Vertex(Point3),
    Edge(Curve),
    /// 面只参与高亮，不提供特征点
    Face,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedShape {
    pub id: ShapeId,
    pub owner: Option<ObjectId>,
    pub kind: ShapeKind,
    /// 局部到世界坐标的变换
    pub transform: Isometry3,
    /// 拓扑索引（子形状在所属对象中的位置）
    pub indexes: Vec<usize>,
}

impl DetectedShape {
    pub fn new(id: ShapeId, kind: ShapeKind) -> Self {
        Self {
            id,
            owner: None,
            kind,
            transform: Isometry3::identity(),
            indexes: Vec::new(),
        }
    }

    pub fn edge(id: ShapeId, curve: Curve) -> Self {
        Self::new(id, ShapeKind::Edge(curve))
    }

    pub fn with_owner(mut self, owner: ObjectId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_transform(mut self, transform: Isometry3) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<usize>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn shape_type(&self) -> ShapeType {
        match self.kind {
            ShapeKind::Vertex(_) => ShapeType::Vertex,
            ShapeKind::Edge(_) => ShapeType::Edge,
            ShapeKind::Face => ShapeType::Face,
        }
    }

    /// 局部坐标下的曲线；非边时返回 `None`
    pub fn curve(&self) -> Option<&Curve> {
        match &self.kind {
            ShapeKind::Edge(curve) => Some(curve),
            _ => None,
        }
    }

    /// 世界坐标下的曲线
    pub fn world_curve(&self) -> Option<Curve> {
        self.curve().map(|curve| curve.transformed(&self.transform))
    }

    /// 世界坐标下的顶点
    pub fn world_vertex(&self) -> Option<Point3> {
        match &self.kind {
            ShapeKind::Vertex(point) => Some(self.transform.transform_point(point)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LineCurve;

    #[test]
    fn test_world_curve() {
        let shape = DetectedShape::edge(
            ShapeId(1),
            Curve::Line(LineCurve::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0))),
        )
        .with_transform(Isometry3::translation(0.0, 5.0, 0.0));
        let curve = shape.world_curve().unwrap();
        assert!((curve.start_point() - Point3::new(0.0, 5.0, 0.0)).norm() < 1e-9);
        assert_eq!(shape.shape_type(), ShapeType::Edge);
        assert!(shape.world_vertex().is_none());
    }
}
