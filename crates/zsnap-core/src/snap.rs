//! 捕捉系统
//!
//! 每次指针事件时，各捕捉策略 (`Snap`) 按优先级依次给出候选点，
//! 第一个有效的候选点即为捕捉结果。
//!
//! 支持的对象捕捉类型：
//! - 端点 (Endpoint)
//! - 中点 (Midpoint)
//! - 圆心 (Center)
//! - 交点 (Intersection)
//! - 垂足 (Perpendicular)

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::math::{Plane, Point3, EPSILON};
use crate::shape::{DetectedShape, ShapeId};
use crate::view::{MeshId, View, ViewId, VisualContext};

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapType {
    /// 端点捕捉
    Endpoint,
    /// 中点捕捉
    Midpoint,
    /// 圆心捕捉
    Center,
    /// 交点捕捉
    Intersection,
    /// 垂足捕捉
    Perpendicular,
}

impl SnapType {
    /// 获取捕捉类型的名称
    pub fn name(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "端点",
            SnapType::Midpoint => "中点",
            SnapType::Center => "圆心",
            SnapType::Intersection => "交点",
            SnapType::Perpendicular => "垂足",
        }
    }

    /// 获取捕捉类型的快捷键
    pub fn shortcut(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "END",
            SnapType::Midpoint => "MID",
            SnapType::Center => "CEN",
            SnapType::Intersection => "INT",
            SnapType::Perpendicular => "PER",
        }
    }

    fn bit(&self) -> u16 {
        match self {
            SnapType::Endpoint => SnapMask::ENDPOINT,
            SnapType::Midpoint => SnapMask::MIDPOINT,
            SnapType::Center => SnapMask::CENTER,
            SnapType::Intersection => SnapMask::INTERSECTION,
            SnapType::Perpendicular => SnapMask::PERPENDICULAR,
        }
    }
}

/// 捕捉掩码（位域，用于快速启用/禁用捕捉类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapMask {
    bits: u16,
}

impl SnapMask {
    pub const ENDPOINT: u16 = 1 << 0;
    pub const MIDPOINT: u16 = 1 << 1;
    pub const CENTER: u16 = 1 << 2;
    pub const INTERSECTION: u16 = 1 << 3;
    pub const PERPENDICULAR: u16 = 1 << 4;

    pub const NONE: SnapMask = SnapMask { bits: 0 };
    pub const ALL: SnapMask = SnapMask { bits: 0x1F };

    pub fn new(bits: u16) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn is_enabled(&self, snap_type: SnapType) -> bool {
        self.bits & snap_type.bit() != 0
    }

    pub fn set(&mut self, snap_type: SnapType, enabled: bool) {
        if enabled {
            self.bits |= snap_type.bit();
        } else {
            self.bits &= !snap_type.bit();
        }
    }

    pub fn toggle(&mut self, snap_type: SnapType) {
        let enabled = self.is_enabled(snap_type);
        self.set(snap_type, !enabled);
    }
}

impl Default for SnapMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// 捕捉配置
///
/// 每次交互开始时取一份快照；交互中途修改需调用处理器的 `update_config`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// 捕捉半径（屏幕像素）
    pub snap_distance: f64,
    /// 启用的捕捉类型
    pub enabled_types: SnapMask,
    /// 是否启用对象捕捉
    pub enable_snap: bool,
    /// 是否启用追踪
    pub enable_tracking: bool,
    /// 追踪时是否包含平面法向（Z 轴）
    pub tracking_z: bool,
    /// 极轴追踪角度步长（度）；为空时只沿平面坐标轴追踪
    pub tracking_angle: Option<f64>,
    /// 悬停多久后固定追踪点（毫秒）
    pub dwell_ms: u64,
    /// 是否显示捕捉标记
    pub show_markers: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snap_distance: 5.0, // 5像素
            enabled_types: SnapMask::default(),
            enable_snap: true,
            enable_tracking: true,
            tracking_z: false,
            tracking_angle: None,
            dwell_ms: 600,
            show_markers: true,
        }
    }
}

impl SnapConfig {
    /// 从 JSON 读取配置，缺失的字段取默认值
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    /// 屏幕距离是否在捕捉半径内（含边界）
    pub fn is_within(&self, screen_distance: f64) -> bool {
        screen_distance <= self.snap_distance
    }

    /// 两份配置的差异是否需要重置缓存与追踪
    pub fn affects_snapping(&self, other: &SnapConfig) -> bool {
        self.enabled_types != other.enabled_types
            || self.enable_snap != other.enable_snap
            || self.enable_tracking != other.enable_tracking
            || self.tracking_z != other.tracking_z
            || self.tracking_angle != other.tracking_angle
    }
}

/// 候选点来源
#[derive(Debug, Clone, PartialEq)]
pub enum SnapKind {
    Endpoint,
    Midpoint,
    Center,
    Perpendicular,
    Intersection,
    /// 追踪轴，携带轴名
    Axis(String),
    /// 调用方提供的特征点，携带提示文字
    Feature(String),
}

impl SnapKind {
    /// 提示文字使用的标签
    pub fn label(&self) -> &str {
        match self {
            SnapKind::Endpoint => "end",
            SnapKind::Midpoint => "mid",
            SnapKind::Center => "center",
            SnapKind::Perpendicular => "perpendicular",
            SnapKind::Intersection => "intersection",
            SnapKind::Axis(name) | SnapKind::Feature(name) => name,
        }
    }

    pub fn snap_type(&self) -> Option<SnapType> {
        match self {
            SnapKind::Endpoint => Some(SnapType::Endpoint),
            SnapKind::Midpoint => Some(SnapType::Midpoint),
            SnapKind::Center => Some(SnapType::Center),
            SnapKind::Perpendicular => Some(SnapType::Perpendicular),
            SnapKind::Intersection => Some(SnapType::Intersection),
            SnapKind::Axis(_) | SnapKind::Feature(_) => None,
        }
    }
}

/// 捕捉结果（候选点）
///
/// 创建后不再修改；需要调整时用 `with_*` 构造新值。
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub view: ViewId,
    pub point: Point3,
    /// 产生该点的形状
    pub shapes: Vec<DetectedShape>,
    pub kind: Option<SnapKind>,
    /// 追踪结果的参考点
    pub ref_point: Option<Point3>,
    /// 到参考点的距离，仅用于提示
    pub distance: Option<f64>,
    /// 结果所在平面
    pub plane: Option<Plane>,
}

impl SnapResult {
    pub fn new(view: ViewId, point: Point3) -> Self {
        Self {
            view,
            point,
            shapes: Vec::new(),
            kind: None,
            ref_point: None,
            distance: None,
            plane: None,
        }
    }

    pub fn with_point(self, point: Point3) -> Self {
        Self { point, ..self }
    }

    pub fn with_kind(self, kind: SnapKind) -> Self {
        Self {
            kind: Some(kind),
            ..self
        }
    }

    pub fn with_shapes(self, shapes: Vec<DetectedShape>) -> Self {
        Self { shapes, ..self }
    }

    pub fn with_ref_point(self, ref_point: Point3) -> Self {
        Self {
            ref_point: Some(ref_point),
            ..self
        }
    }

    pub fn with_distance(self, distance: f64) -> Self {
        Self {
            distance: Some(distance),
            ..self
        }
    }

    pub fn with_plane(self, plane: Plane) -> Self {
        Self {
            plane: Some(plane),
            ..self
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.kind.as_ref().map(SnapKind::label)
    }

    pub fn shape_ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes.iter().map(|shape| shape.id)
    }

    /// 是否指向同一个目标：位置相同且来源形状相同
    pub fn is_same_target(&self, other: &SnapResult) -> bool {
        nalgebra::distance(&self.point, &other.point) < EPSILON
            && self.shape_ids().eq(other.shape_ids())
    }
}

/// 单次检测的输入
pub struct SnapData<'a> {
    pub view: &'a dyn View,
    /// 指针的屏幕坐标
    pub mx: f64,
    pub my: f64,
    /// 指针附近的形状，由近到远
    pub shapes: &'a [DetectedShape],
}

/// 捕捉策略的运行环境
///
/// 可视化上下文、缓存与配置都属于处理器，在调用期间借给策略。
pub struct SnapEnv<'a> {
    pub visual: &'a mut dyn VisualContext,
    pub cache: &'a mut SnapCache,
    pub config: &'a SnapConfig,
    pub now: Instant,
}

/// 捕捉策略
pub trait Snap {
    /// 计算候选点；没有候选点时返回 `None`
    fn snap(&mut self, data: &SnapData<'_>, env: &mut SnapEnv<'_>) -> Option<SnapResult>;

    /// 本次事件最终采用的捕捉结果
    fn handle_snaped(&mut self, _snaped: Option<&SnapResult>, _env: &mut SnapEnv<'_>) {}

    /// 检查计时器；可视内容有变化时返回 `true`
    fn poll(&mut self, _env: &mut SnapEnv<'_>) -> bool {
        false
    }

    /// 指针离开视图
    fn pointer_out(&mut self) {}

    /// 配置在交互中途被修改
    fn config_changed(&mut self, _env: &mut SnapEnv<'_>) {}

    /// 移除上一次事件留下的临时显示
    fn remove_dynamic_object(&mut self, visual: &mut dyn VisualContext);

    /// 交互结束，释放全部资源
    fn clear(&mut self, visual: &mut dyn VisualContext) {
        self.remove_dynamic_object(visual);
    }
}

/// 悬停时显示的隐藏捕捉点（如圆心）
#[derive(Debug, Clone)]
pub struct InvisibleHint {
    pub snaps: Vec<SnapResult>,
    pub displays: Vec<MeshId>,
}

/// 单次交互内的捕捉缓存
///
/// 由处理器持有，交互结束或配置变化时清空。
#[derive(Debug, Default)]
pub struct SnapCache {
    features: HashMap<ShapeId, Vec<SnapResult>>,
    intersections: HashMap<(ShapeId, ShapeId), Vec<SnapResult>>,
    invisible: BTreeMap<ShapeId, InvisibleHint>,
}

impl SnapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 形状的特征点，不存在时用 `compute` 计算并缓存
    pub fn features_or_insert_with(
        &mut self,
        id: ShapeId,
        compute: impl FnOnce() -> Vec<SnapResult>,
    ) -> &[SnapResult] {
        self.features.entry(id).or_insert_with(compute)
    }

    /// 两形状的交点；键与顺序无关
    pub fn intersections_or_insert_with(
        &mut self,
        a: ShapeId,
        b: ShapeId,
        compute: impl FnOnce() -> Vec<SnapResult>,
    ) -> &[SnapResult] {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.intersections.entry(key).or_insert_with(compute)
    }

    pub fn has_invisible(&self, id: ShapeId) -> bool {
        self.invisible.contains_key(&id)
    }

    pub fn insert_invisible(&mut self, id: ShapeId, hint: InvisibleHint) {
        self.invisible.insert(id, hint);
    }

    pub fn invisible_snaps(&self) -> impl Iterator<Item = &SnapResult> {
        self.invisible.values().flat_map(|hint| hint.snaps.iter())
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    /// 丢弃与捕捉类型相关的计算结果
    pub fn invalidate(&mut self) {
        tracing::debug!(
            features = self.features.len(),
            intersections = self.intersections.len(),
            "snap cache invalidated"
        );
        self.features.clear();
        self.intersections.clear();
    }

    /// 清空缓存并移除隐藏捕捉点的显示
    pub fn clear(&mut self, visual: &mut dyn VisualContext) {
        for hint in self.invisible.values() {
            for id in &hint.displays {
                visual.remove_mesh(*id);
            }
        }
        self.invisible.clear();
        self.features.clear();
        self.intersections.clear();
    }
}

/// 策略创建的临时网格与高亮
#[derive(Debug, Default)]
pub struct DynamicObjects {
    meshes: Vec<MeshId>,
    highlighted: Vec<DetectedShape>,
}

impl DynamicObjects {
    pub fn add_mesh(&mut self, id: MeshId) {
        self.meshes.push(id);
    }

    pub fn highlight(&mut self, visual: &mut dyn VisualContext, shapes: &[DetectedShape]) {
        for shape in shapes {
            visual.highlight(shape);
        }
        self.highlighted.extend_from_slice(shapes);
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.highlighted.is_empty()
    }

    pub fn clear(&mut self, visual: &mut dyn VisualContext) {
        for id in self.meshes.drain(..) {
            visual.remove_mesh(id);
        }
        for shape in self.highlighted.drain(..) {
            visual.unhighlight(&shape);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Curve, LineCurve};
    use crate::headless::HeadlessVisual;
    use crate::view::PointStyle;

    #[test]
    fn test_snap_mask() {
        let mut mask = SnapMask::default();
        assert!(mask.is_enabled(SnapType::Endpoint));
        assert!(mask.is_enabled(SnapType::Midpoint));
        assert!(mask.is_enabled(SnapType::Perpendicular));

        mask.set(SnapType::Center, false);
        assert!(!mask.is_enabled(SnapType::Center));

        mask.toggle(SnapType::Endpoint);
        assert!(!mask.is_enabled(SnapType::Endpoint));
        assert_eq!(SnapMask::NONE.bits(), 0);
    }

    #[test]
    fn test_config_defaults_and_json() {
        let config = SnapConfig::default();
        assert_eq!(config.snap_distance, 5.0);
        assert_eq!(config.dwell(), Duration::from_millis(600));
        assert!(config.is_within(5.0));
        assert!(!config.is_within(6.0));

        let partial = SnapConfig::from_json(r#"{ "snap_distance": 8.0, "tracking_z": true }"#).unwrap();
        assert_eq!(partial.snap_distance, 8.0);
        assert!(partial.tracking_z);
        assert_eq!(partial.dwell_ms, 600);

        let json = config.to_json().unwrap();
        assert_eq!(SnapConfig::from_json(&json).unwrap(), config);
        assert!(SnapConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_config_affects_snapping() {
        let a = SnapConfig::default();
        let mut b = a.clone();
        b.show_markers = false;
        assert!(!a.affects_snapping(&b));
        b.enabled_types.toggle(SnapType::Midpoint);
        assert!(a.affects_snapping(&b));
    }

    #[test]
    fn test_snap_kind_labels() {
        assert_eq!(SnapKind::Midpoint.label(), "mid");
        assert_eq!(SnapKind::Endpoint.label(), "end");
        assert_eq!(SnapKind::Axis("X".into()).label(), "X");
        assert_eq!(SnapKind::Intersection.snap_type(), Some(SnapType::Intersection));
        assert_eq!(SnapType::Midpoint.name(), "中点");
    }

    #[test]
    fn test_same_target() {
        let shape = DetectedShape::edge(
            ShapeId(3),
            Curve::Line(LineCurve::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0))),
        );
        let a = SnapResult::new(ViewId(1), Point3::origin()).with_shapes(vec![shape.clone()]);
        let b = SnapResult::new(ViewId(1), Point3::new(0.0, 0.0, 1e-9))
            .with_shapes(vec![shape])
            .with_kind(SnapKind::Endpoint);
        let c = SnapResult::new(ViewId(1), Point3::origin());
        assert!(a.is_same_target(&b));
        assert!(!a.is_same_target(&c));
    }

    #[test]
    fn test_cache_intersection_key_order() {
        let mut cache = SnapCache::new();
        let mut calls = 0;
        cache.intersections_or_insert_with(ShapeId(2), ShapeId(1), || {
            calls += 1;
            vec![SnapResult::new(ViewId(1), Point3::origin())]
        });
        let cached = cache
            .intersections_or_insert_with(ShapeId(1), ShapeId(2), || {
                calls += 1;
                Vec::new()
            })
            .len();
        assert_eq!(cached, 1);
        assert_eq!(calls, 1);
        cache.invalidate();
        assert_eq!(cache.intersection_count(), 0);
    }

    #[test]
    fn test_cache_clear_removes_hint_meshes() {
        let mut visual = HeadlessVisual::new();
        let mut cache = SnapCache::new();
        let id = visual.display_point(&Point3::origin(), PointStyle::Hint);
        cache.insert_invisible(
            ShapeId(1),
            InvisibleHint {
                snaps: vec![SnapResult::new(ViewId(1), Point3::origin()).with_kind(SnapKind::Center)],
                displays: vec![id],
            },
        );
        assert_eq!(cache.invisible_snaps().count(), 1);
        cache.clear(&mut visual);
        assert_eq!(visual.mesh_count(), 0);
        assert!(!cache.has_invisible(ShapeId(1)));
    }

    #[test]
    fn test_dynamic_objects_clear() {
        let mut visual = HeadlessVisual::new();
        let mut dynamic = DynamicObjects::default();
        let shape = DetectedShape::edge(
            ShapeId(9),
            Curve::Line(LineCurve::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0))),
        );
        dynamic.highlight(&mut visual, std::slice::from_ref(&shape));
        dynamic.add_mesh(visual.display_point(&Point3::origin(), PointStyle::Temporary));
        assert!(visual.is_highlighted(ShapeId(9)));
        dynamic.clear(&mut visual);
        assert!(dynamic.is_empty());
        assert_eq!(visual.mesh_count(), 0);
        assert_eq!(visual.highlighted_count(), 0);
    }
}
