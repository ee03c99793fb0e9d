//! 各类输入的处理器构造与字面输入解析

pub mod angle;
pub mod length;
pub mod point;

pub use angle::AngleResolver;
pub use length::{LengthAtAxisResolver, LengthAtPlaneResolver};
pub use point::{
    PointOnAxisResolver, PointOnCurveResolver, PointOnPlaneResolver, PointResolver, PointSnapData,
};
