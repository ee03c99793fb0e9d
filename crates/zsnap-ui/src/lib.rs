//! ZSNAP 交互层
//!
//! `SnapEventHandler` 把指针与键盘事件驱动成一次取点交互：
//! 移动时依次尝试各捕捉策略并显示提示，点击或字面输入后通过
//! oneshot 通道交付结果。具体的输入语义（点、长度、角度）由
//! `InputResolver` 的实现决定。

pub mod handler;
pub mod handlers;
pub mod host;

pub use handler::{
    FeaturePoint, InputResolver, SnapCancelled, SnapEventHandler, SnapOutcome, SnapRequest, SnapState,
};
pub use handlers::{
    AngleResolver, LengthAtAxisResolver, LengthAtPlaneResolver, PointOnAxisResolver, PointOnCurveResolver,
    PointOnPlaneResolver, PointResolver, PointSnapData,
};
pub use host::{HeadlessHost, Key, MouseButton, PointerEvent, PointerType, SnapHost};
