//! 捕捉策略

pub mod axis;
pub mod feature;
pub mod object;
pub mod on_curve;
pub mod plane;

pub use axis::AxisSnap;
pub use feature::FeaturePointStrategy;
pub use object::ObjectSnap;
pub use on_curve::PointOnCurveSnap;
pub use plane::{PlaneSnap, PlaneSource};
