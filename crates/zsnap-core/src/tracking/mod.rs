//! 追踪
//!
//! - `AxisTracking`: 参考点上沿平面坐标轴或按角度步长的追踪轴
//! - `ObjectTracking`: 停留固定的特征点上的追踪轴
//! - `TrackingSnap`: 汇总二者并求交

pub mod axis;
pub mod axis_tracking;
pub mod object_tracking;
pub mod tracking_snap;

pub use axis::Axis;
pub use axis_tracking::AxisTracking;
pub use object_tracking::ObjectTracking;
pub use tracking_snap::TrackingSnap;
