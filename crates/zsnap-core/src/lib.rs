//! ZSNAP 核心捕捉引擎
//!
//! 在绘图交互中为指针位置求出唯一的“最佳”候选点。
//!
//! # 架构设计
//!
//! 候选点来自三类策略，按优先级依次尝试：
//! - `ObjectSnap`: 附近形状的端点、中点、圆心、交点、垂足
//! - `TrackingSnap`: 参考点与固定点发出的追踪轴及其交点
//! - `PlaneSnap`: 指针射线与工作平面的交点
//!
//! 引擎对宿主的依赖只有 `View`（坐标换算与拾取）和 `VisualContext`
//! （临时标记与高亮）两个 trait。
//!
//! # 示例
//!
//! ```rust
//! use zsnap_core::prelude::*;
//!
//! let mut view = OrthoView::new();
//! view.add_shape(DetectedShape::edge(
//!     ShapeId(1),
//!     Curve::Line(LineCurve::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0))),
//! ));
//!
//! let mut visual = HeadlessVisual::new();
//! let mut cache = SnapCache::new();
//! let config = SnapConfig::default();
//! let shapes = view.detect_shapes(ShapeType::Edge, 5.0, 1.0);
//! let data = SnapData { view: &view, mx: 5.0, my: 1.0, shapes: &shapes };
//! let mut env = SnapEnv {
//!     visual: &mut visual,
//!     cache: &mut cache,
//!     config: &config,
//!     now: std::time::Instant::now(),
//! };
//!
//! let result = ObjectSnap::new(None).snap(&data, &mut env).unwrap();
//! assert_eq!(result.label(), Some("mid"));
//! ```

pub mod error;
pub mod geometry;
pub mod headless;
pub mod input_parser;
pub mod math;
pub mod plane_angle;
pub mod shape;
pub mod snap;
pub mod snaps;
pub mod tracking;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::error::{GeometryError, InputError};
    pub use crate::geometry::{CircleCurve, Curve, CurveIntersection, LineCurve};
    pub use crate::headless::{HeadlessVisual, OrthoView};
    pub use crate::input_parser::{Dimension, InputParser, ParseError, ParsedInput};
    pub use crate::math::{Isometry3, Plane, Point2, Point3, Ray, Vector2, Vector3, VectorExt};
    pub use crate::plane_angle::PlaneAngle;
    pub use crate::shape::{DetectedShape, ObjectId, ShapeId, ShapeKind, ShapeType};
    pub use crate::snap::{Snap, SnapCache, SnapConfig, SnapData, SnapEnv, SnapKind, SnapMask, SnapResult, SnapType};
    pub use crate::snaps::{AxisSnap, ObjectSnap, PlaneSnap, PlaneSource, PointOnCurveSnap};
    pub use crate::tracking::TrackingSnap;
    pub use crate::view::{LineType, MeshId, PointStyle, PreviewShape, View, ViewId, VisualContext};
}
