//! 对象追踪
//!
//! 在同一捕捉点上停留超过 `dwell` 后固定该点，之后从它发出追踪轴；
//! 再次停留在已固定的点上则取消固定。

use std::time::{Duration, Instant};

use crate::math::{Point3, VectorExt, EPSILON};
use crate::snap::SnapResult;
use crate::tracking::axis::Axis;
use crate::view::{ensure_plane, MeshId, PointStyle, View, VisualContext};

struct TrackingPoint {
    snap: SnapResult,
    marker: MeshId,
}

#[derive(Default)]
pub struct ObjectTracking {
    /// 当前停留的捕捉点；计时到期后保留，直到目标变化
    snapping: Option<SnapResult>,
    /// 计时开始时间
    timer: Option<Instant>,
    points: Vec<TrackingPoint>,
    is_cleared: bool,
}

impl ObjectTracking {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已固定的点
    pub fn points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.points.iter().map(|p| p.snap.point)
    }

    pub fn is_timing(&self) -> bool {
        self.timer.is_some()
    }

    /// 所有固定点上的追踪轴；有标签的点用标签命名
    pub fn tracking_rays(&self, view: &dyn View, tracking_z: bool) -> Vec<Axis> {
        let plane = ensure_plane(view, &view.workplane());
        self.points
            .iter()
            .flat_map(|tracking| {
                let label = tracking.snap.label().map(str::to_owned);
                Axis::axes_at_plane(tracking.snap.point, &plane, tracking_z)
                    .into_iter()
                    .map(move |axis| match &label {
                        Some(label) => axis.with_name(label.clone()),
                        None => axis,
                    })
            })
            .collect()
    }

    /// 本次事件采用的捕捉结果；目标变化时重新计时
    ///
    /// 同一目标上持续停留只计时一次。
    pub fn handle_snaped(&mut self, snaped: Option<&SnapResult>, now: Instant) {
        if let (Some(snap), Some(snapping)) = (snaped, &self.snapping) {
            if snap.is_same_target(snapping) {
                return;
            }
        }
        self.snapping = snaped.cloned();
        self.timer = snaped.map(|_| now);
    }

    /// 计时到期时切换固定状态；有变化时返回 `true`
    pub fn poll(&mut self, visual: &mut dyn VisualContext, now: Instant, dwell: Duration) -> bool {
        let expired = self
            .timer
            .is_some_and(|since| now.saturating_duration_since(since) >= dwell);
        if !expired {
            return false;
        }
        self.timer = None;
        match self.snapping.clone() {
            Some(snap) => self.switch_tracking_point(visual, snap),
            None => false,
        }
    }

    fn switch_tracking_point(&mut self, visual: &mut dyn VisualContext, snap: SnapResult) -> bool {
        if self.is_cleared || snap.shapes.is_empty() {
            return false;
        }
        let existing = self
            .points
            .iter()
            .position(|p| p.snap.point.coords.is_equal_to(&snap.point.coords, EPSILON));
        match existing {
            Some(index) => {
                let removed = self.points.remove(index);
                visual.remove_mesh(removed.marker);
                tracing::debug!(point = ?removed.snap.point, "tracking point unpinned");
            }
            None => {
                let marker = visual.display_point(&snap.point, PointStyle::Tracking);
                tracing::debug!(point = ?snap.point, "tracking point pinned");
                self.points.push(TrackingPoint { snap, marker });
            }
        }
        visual.update();
        true
    }

    pub fn pointer_out(&mut self) {
        self.snapping = None;
        self.timer = None;
    }

    /// 移除全部固定点，之后仍可继续固定
    pub fn reset(&mut self, visual: &mut dyn VisualContext) {
        self.pointer_out();
        for point in self.points.drain(..) {
            visual.remove_mesh(point.marker);
        }
    }

    /// 交互结束
    pub fn clear(&mut self, visual: &mut dyn VisualContext) {
        self.reset(visual);
        self.is_cleared = true;
    }
}
