//! 无界面的视图与可视化实现
//!
//! `OrthoView` 是沿 -Z 俯视的正交视图，屏幕坐标与世界 XY 同向，按
//! `scale`（像素/单位）缩放。`HeadlessVisual` 只在内存中记录显示内容。
//! 二者用于测试和演示程序。

use std::collections::{BTreeMap, BTreeSet};

use crate::math::{Plane, Point2, Point3, Ray, Vector3};
use crate::shape::{DetectedShape, ShapeId, ShapeType};
use crate::view::{LineType, MeshId, PointStyle, PreviewShape, View, ViewId, VisualContext};

/// 拾取射线的起点高度
const CAMERA_HEIGHT: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct OrthoView {
    id: ViewId,
    /// 屏幕原点对应的世界坐标
    origin: Point2,
    scale: f64,
    workplane: Plane,
    is_2d: bool,
    /// 拾取半径（像素）
    detect_radius: f64,
    shapes: Vec<DetectedShape>,
}

impl OrthoView {
    pub fn new() -> Self {
        Self {
            id: ViewId(1),
            origin: Point2::origin(),
            scale: 1.0,
            workplane: Plane::xy(),
            is_2d: false,
            detect_radius: 5.0,
            shapes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: ViewId) -> Self {
        self.id = id;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: Point2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_workplane(mut self, workplane: Plane) -> Self {
        self.workplane = workplane;
        self
    }

    pub fn with_2d(mut self, is_2d: bool) -> Self {
        self.is_2d = is_2d;
        self
    }

    pub fn with_detect_radius(mut self, radius: f64) -> Self {
        self.detect_radius = radius;
        self
    }

    pub fn add_shape(&mut self, shape: DetectedShape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[DetectedShape] {
        &self.shapes
    }

    /// 形状到屏幕坐标 (x, y) 的像素距离；面不参与拾取
    fn shape_distance(&self, shape: &DetectedShape, x: f64, y: f64) -> Option<f64> {
        if let Some(point) = shape.world_vertex() {
            return Some(self.screen_distance(x, y, &point));
        }
        let curve = shape.world_curve()?;
        let nearest = curve.nearest_to_ray(&self.ray_at(x, y));
        Some(self.screen_distance(x, y, &nearest))
    }
}

impl Default for OrthoView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for OrthoView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn ray_at(&self, x: f64, y: f64) -> Ray {
        let world = self.screen_to_world(x, y);
        Ray::new_unchecked(Point3::new(world.x, world.y, CAMERA_HEIGHT), self.direction())
    }

    fn world_to_screen(&self, point: &Point3) -> Point2 {
        Point2::new(
            (point.x - self.origin.x) * self.scale,
            (point.y - self.origin.y) * self.scale,
        )
    }

    fn screen_to_world(&self, x: f64, y: f64) -> Point3 {
        let world = Point3::new(
            self.origin.x + x / self.scale,
            self.origin.y + y / self.scale,
            0.0,
        );
        let ray = Ray::new_unchecked(Point3::new(world.x, world.y, CAMERA_HEIGHT), self.direction());
        self.workplane.intersect(&ray, true).unwrap_or(world)
    }

    fn up(&self) -> Vector3 {
        Vector3::y()
    }

    fn direction(&self) -> Vector3 {
        -Vector3::z()
    }

    fn workplane(&self) -> Plane {
        self.workplane
    }

    fn is_2d(&self) -> bool {
        self.is_2d
    }

    fn detect_shapes(&self, shape_type: ShapeType, x: f64, y: f64) -> Vec<DetectedShape> {
        let mut found: Vec<(f64, &DetectedShape)> = self
            .shapes
            .iter()
            .filter(|shape| shape.shape_type() == shape_type)
            .filter_map(|shape| {
                self.shape_distance(shape, x, y)
                    .filter(|d| *d <= self.detect_radius)
                    .map(|d| (d, shape))
            })
            .collect();
        found.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        found.into_iter().map(|(_, shape)| shape.clone()).collect()
    }
}

/// 记录下来的显示内容
#[derive(Debug, Clone, PartialEq)]
pub enum VisualMesh {
    Point { point: Point3, style: PointStyle },
    Line { start: Point3, end: Point3, line_type: LineType },
    Preview { shape: PreviewShape, opacity: f32 },
}

#[derive(Debug, Default)]
pub struct HeadlessVisual {
    next_id: u64,
    meshes: BTreeMap<MeshId, VisualMesh>,
    highlighted: BTreeSet<ShapeId>,
    update_count: usize,
}

impl HeadlessVisual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &VisualMesh> {
        self.meshes.values()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn points(&self, style: PointStyle) -> Vec<Point3> {
        self.meshes
            .values()
            .filter_map(|mesh| match mesh {
                VisualMesh::Point { point, style: s } if *s == style => Some(*point),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self, line_type: LineType) -> Vec<(Point3, Point3)> {
        self.meshes
            .values()
            .filter_map(|mesh| match mesh {
                VisualMesh::Line { start, end, line_type: t } if *t == line_type => Some((*start, *end)),
                _ => None,
            })
            .collect()
    }

    pub fn is_highlighted(&self, id: ShapeId) -> bool {
        self.highlighted.contains(&id)
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }

    pub fn update_count(&self) -> usize {
        self.update_count
    }

    fn insert(&mut self, mesh: VisualMesh) -> MeshId {
        self.next_id += 1;
        let id = MeshId(self.next_id);
        self.meshes.insert(id, mesh);
        id
    }
}

impl VisualContext for HeadlessVisual {
    fn display_point(&mut self, point: &Point3, style: PointStyle) -> MeshId {
        self.insert(VisualMesh::Point { point: *point, style })
    }

    fn display_line(&mut self, start: &Point3, end: &Point3, line_type: LineType) -> MeshId {
        self.insert(VisualMesh::Line {
            start: *start,
            end: *end,
            line_type,
        })
    }

    fn display_preview(&mut self, shape: &PreviewShape, opacity: f32) -> MeshId {
        self.insert(VisualMesh::Preview {
            shape: shape.clone(),
            opacity,
        })
    }

    fn remove_mesh(&mut self, id: MeshId) {
        self.meshes.remove(&id);
    }

    fn highlight(&mut self, shape: &DetectedShape) {
        self.highlighted.insert(shape.id);
    }

    fn unhighlight(&mut self, shape: &DetectedShape) {
        self.highlighted.remove(&shape.id);
    }

    fn update(&mut self) {
        self.update_count += 1;
    }
}
