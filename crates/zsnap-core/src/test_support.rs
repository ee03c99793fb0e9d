//! 测试用的视图、可视化与缓存组合

use std::time::Instant;

use crate::headless::{HeadlessVisual, OrthoView};
use crate::shape::{DetectedShape, ShapeType};
use crate::snap::{Snap, SnapCache, SnapConfig, SnapData, SnapEnv, SnapResult};

pub(crate) struct Fixture {
    pub view: OrthoView,
    pub visual: HeadlessVisual,
    pub cache: SnapCache,
    pub config: SnapConfig,
    pub now: Instant,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_view(OrthoView::new())
    }

    pub fn with_detect_radius(radius: f64) -> Self {
        Self::with_view(OrthoView::new().with_detect_radius(radius))
    }

    pub fn with_view(view: OrthoView) -> Self {
        Self {
            view,
            visual: HeadlessVisual::new(),
            cache: SnapCache::new(),
            config: SnapConfig::default(),
            now: Instant::now(),
        }
    }

    pub fn detect(&self, x: f64, y: f64) -> Vec<DetectedShape> {
        use crate::view::View;
        self.view.detect_shapes(ShapeType::Edge, x, y)
    }

    /// 在 (x, y) 处运行一次捕捉
    pub fn snap(&mut self, snap: &mut dyn Snap, x: f64, y: f64) -> Option<SnapResult> {
        let shapes = self.detect(x, y);
        let data = SnapData {
            view: &self.view,
            mx: x,
            my: y,
            shapes: &shapes,
        };
        let mut env = SnapEnv {
            visual: &mut self.visual,
            cache: &mut self.cache,
            config: &self.config,
            now: self.now,
        };
        snap.snap(&data, &mut env)
    }

    pub fn with_env<R>(&mut self, f: impl FnOnce(&mut SnapEnv<'_>) -> R) -> R {
        let mut env = SnapEnv {
            visual: &mut self.visual,
            cache: &mut self.cache,
            config: &self.config,
            now: self.now,
        };
        f(&mut env)
    }
}
