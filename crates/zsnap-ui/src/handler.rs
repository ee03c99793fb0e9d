//! 捕捉事件处理器 - 单次拾取交互的状态机
//!
//! ```text
//! Idle --指针移动--> Snapping --按下/抬起(有候选点) 或 Enter--> Completed
//!                    Snapping --Escape 或外部取消--> Cancelled
//!                    Snapping --数字/#/- --> Inputing --有效文本--> Completed
//! ```
//!
//! 进入终止状态时只清理一次：清除提示与字面输入、移除临时显示、
//! 清理每个捕捉策略。结果通过 oneshot 通道交付，最多一次。

use std::time::Instant;

use thiserror::Error;
use tokio::sync::oneshot;

use zsnap_core::error::InputError;
use zsnap_core::input_parser::InputParser;
use zsnap_core::math::Point3;
use zsnap_core::shape::{DetectedShape, ShapeType};
use zsnap_core::snap::{Snap, SnapCache, SnapConfig, SnapData, SnapEnv, SnapKind, SnapResult};
use zsnap_core::view::{MeshId, PointStyle, PreviewShape, View};

use crate::host::{Key, PointerEvent, PointerType, SnapHost};

/// 交互被取消
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Snap operation cancelled")]
pub struct SnapCancelled;

/// 交互结果；完成时携带最终捕捉点（Enter 提交时可能为空）
pub type SnapOutcome = oneshot::Receiver<Result<Option<SnapResult>, SnapCancelled>>;

/// 处理器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapState {
    Idle,
    Snapping,
    Inputing,
    Cancelled,
    Completed,
}

impl SnapState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SnapState::Cancelled | SnapState::Completed)
    }
}

/// 调用方提供的特征点，优先于所有捕捉策略
pub struct FeaturePoint {
    pub point: Point3,
    pub prompt: String,
    /// 为 `false` 时不参与捕捉
    pub when: Option<Box<dyn Fn() -> bool>>,
}

impl FeaturePoint {
    pub fn new(point: Point3, prompt: impl Into<String>) -> Self {
        Self {
            point,
            prompt: prompt.into(),
            when: None,
        }
    }

    pub fn with_when(mut self, when: impl Fn() -> bool + 'static) -> Self {
        self.when = Some(Box::new(when));
        self
    }

    fn is_visible(&self) -> bool {
        self.when.as_ref().map_or(true, |when| when())
    }
}

/// 调用方对本次拾取的附加要求
pub struct SnapRequest {
    pub feature_points: Vec<FeaturePoint>,
    /// 拒绝的候选点交给下一个策略
    pub validator: Option<Box<dyn Fn(&Point3) -> bool>>,
    /// 自定义提示，优先于距离与标签
    pub prompt: Option<Box<dyn Fn(&SnapResult) -> Option<String>>>,
    /// 预览几何，参数为当前捕捉点
    pub preview: Option<Box<dyn Fn(Option<&Point3>) -> Vec<PreviewShape>>>,
    /// 拾取时的形状过滤
    pub filter: Option<Box<dyn Fn(&DetectedShape) -> bool>>,
    pub show_temp_point: bool,
    pub preview_opacity: f32,
}

impl Default for SnapRequest {
    fn default() -> Self {
        Self {
            feature_points: Vec::new(),
            validator: None,
            prompt: None,
            preview: None,
            filter: None,
            show_temp_point: true,
            preview_opacity: 1.0,
        }
    }
}

impl SnapRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature_point(mut self, point: FeaturePoint) -> Self {
        self.feature_points.push(point);
        self
    }

    pub fn with_validator(mut self, validator: impl Fn(&Point3) -> bool + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn with_prompt(mut self, prompt: impl Fn(&SnapResult) -> Option<String> + 'static) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    pub fn with_preview(mut self, preview: impl Fn(Option<&Point3>) -> Vec<PreviewShape> + 'static) -> Self {
        self.preview = Some(Box::new(preview));
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&DetectedShape) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn with_temp_point(mut self, show: bool) -> Self {
        self.show_temp_point = show;
        self
    }

    pub fn with_preview_opacity(mut self, opacity: f32) -> Self {
        self.preview_opacity = opacity;
        self
    }

    fn accepts(&self, point: &Point3) -> bool {
        self.validator.as_ref().map_or(true, |validator| validator(point))
    }

    fn accepts_shape(&self, shape: &DetectedShape) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(shape))
    }
}

/// 字面输入的解释方式
pub trait InputResolver {
    /// 校验输入文本；有效时返回 `None`
    fn input_error(&self, text: &str, snaped: Option<&SnapResult>) -> Option<InputError>;

    /// 由已校验的文本计算点
    fn point_from_input(
        &self,
        view: &dyn View,
        text: &str,
        snaped: Option<&SnapResult>,
    ) -> Result<SnapResult, InputError>;

    /// 捕捉点的提示文字
    fn format_prompt(&mut self, _snaped: &SnapResult) -> Option<String> {
        None
    }

    /// 对策略给出的捕捉点做最后调整
    fn adjust(&mut self, snaped: SnapResult, _view: &dyn View) -> SnapResult {
        snaped
    }
}

/// 捕捉事件处理器
pub struct SnapEventHandler<H: SnapHost, R: InputResolver> {
    host: H,
    resolver: R,
    snaps: Vec<Box<dyn Snap>>,
    request: SnapRequest,
    config: SnapConfig,
    cache: SnapCache,
    state: SnapState,
    snaped: Option<SnapResult>,
    temp_point: Option<MeshId>,
    temp_shapes: Vec<MeshId>,
    /// 正在进行的字面输入及其初始按键
    pending_input: Option<String>,
    sender: Option<oneshot::Sender<Result<Option<SnapResult>, SnapCancelled>>>,
    is_cleaned: bool,
}

impl<H: SnapHost, R: InputResolver> SnapEventHandler<H, R> {
    /// 创建处理器
    ///
    /// `snaps` 按优先级排列；`config` 为本次交互的配置快照。
    pub fn new(
        host: H,
        resolver: R,
        snaps: Vec<Box<dyn Snap>>,
        request: SnapRequest,
        config: SnapConfig,
    ) -> (Self, SnapOutcome) {
        let (sender, receiver) = oneshot::channel();
        let mut handler = Self {
            host,
            resolver,
            snaps,
            request,
            config,
            cache: SnapCache::new(),
            state: SnapState::Idle,
            snaped: None,
            temp_point: None,
            temp_shapes: Vec::new(),
            pending_input: None,
            sender: Some(sender),
            is_cleaned: false,
        };
        handler.show_temp_shape(None);
        (handler, receiver)
    }

    pub fn state(&self) -> SnapState {
        self.state
    }

    /// 当前捕捉点
    pub fn snaped(&self) -> Option<&SnapResult> {
        self.snaped.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn cache(&self) -> &SnapCache {
        &self.cache
    }

    pub fn is_inputing(&self) -> bool {
        self.pending_input.is_some()
    }

    // ========== 事件处理 ==========

    pub fn on_pointer_move(&mut self, view: &dyn View, event: &PointerEvent) {
        self.on_pointer_move_at(view, event, Instant::now());
    }

    /// 指针移动；`now` 用于停留计时
    pub fn on_pointer_move_at(&mut self, view: &dyn View, event: &PointerEvent, now: Instant) {
        if self.state.is_terminal() {
            return;
        }
        if self.pending_input.is_none() {
            self.set_state(SnapState::Snapping);
        }
        self.remove_temp_visuals();
        self.update_snap_point(view, event, now);
        self.update_visual_feedback();
    }

    pub fn on_pointer_down(&mut self, _view: &dyn View, event: &PointerEvent) {
        if self.state.is_terminal() || !event.is_mouse_primary() {
            return;
        }
        if self.snaped.is_some() {
            self.handle_success();
        } else {
            self.host.show_toast("toast.snap.notFoundValidPoint");
        }
    }

    pub fn on_pointer_up(&mut self, _view: &dyn View, event: &PointerEvent) {
        if self.state.is_terminal() {
            return;
        }
        if event.pointer_type != PointerType::Mouse && event.is_primary && self.snaped.is_some() {
            self.handle_success();
        }
    }

    pub fn on_pointer_out(&mut self) {
        self.snaped = None;
        for snap in &mut self.snaps {
            snap.pointer_out();
        }
    }

    pub fn on_key_down(&mut self, key: Key) {
        if self.state.is_terminal() {
            return;
        }
        match key {
            Key::Escape => {
                self.snaped = None;
                self.handle_cancel();
            }
            Key::Enter => {
                self.snaped = None;
                self.handle_success();
            }
            // 输入框打开后由它接收字符
            Key::Char(_) if self.state == SnapState::Inputing => {}
            Key::Char(c) if InputParser::is_input_start(c) => {
                let initial = c.to_string();
                self.host.show_input(&initial);
                self.pending_input = Some(initial);
                self.set_state(SnapState::Inputing);
            }
            Key::Char(_) => {}
        }
    }

    /// 提交字面输入
    ///
    /// 校验失败时保持 `Inputing`，错误同时交给宿主显示。
    pub fn submit_input(&mut self, view: &dyn View, text: &str) -> Result<(), InputError> {
        if self.state.is_terminal() || self.pending_input.is_none() {
            return Err(InputError::NotInputing);
        }
        let result = match self.resolver.input_error(text, self.snaped.as_ref()) {
            Some(error) => Err(error),
            None => self.resolver.point_from_input(view, text, self.snaped.as_ref()),
        };
        match result {
            Ok(point) => {
                self.snaped = Some(point);
                self.handle_success();
                Ok(())
            }
            Err(error) => {
                tracing::debug!(text, error = error.key(), "literal input rejected");
                self.host.show_input_error(error.key());
                Err(error)
            }
        }
    }

    /// 检查停留计时器；有变化时返回 `true`
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        let mut env = SnapEnv {
            visual: &mut self.host,
            cache: &mut self.cache,
            config: &self.config,
            now,
        };
        let mut changed = false;
        for snap in &mut self.snaps {
            changed |= snap.poll(&mut env);
        }
        changed
    }

    /// 交互中途修改配置
    ///
    /// 捕捉类型或开关有变化时丢弃缓存并重置追踪。
    pub fn update_config(&mut self, config: SnapConfig) {
        let affects = self.config.affects_snapping(&config);
        self.config = config;
        if !affects || self.state.is_terminal() {
            return;
        }
        tracing::debug!("snap config changed");
        self.cache.invalidate();
        let mut env = SnapEnv {
            visual: &mut self.host,
            cache: &mut self.cache,
            config: &self.config,
            now: Instant::now(),
        };
        for snap in &mut self.snaps {
            snap.config_changed(&mut env);
        }
    }

    /// 外部取消
    pub fn cancel(&mut self) {
        self.handle_cancel();
    }

    /// 外部完成，以当前捕捉点交付
    pub fn complete(&mut self) {
        self.handle_success();
    }

    /// 释放资源但不交付结果；接收端会看到通道关闭
    pub fn dispose(&mut self) {
        self.snaped = None;
        self.sender = None;
        if !self.state.is_terminal() {
            self.set_state(SnapState::Completed);
        }
        self.cleanup_resources();
    }

    // ========== 状态转换 ==========

    fn set_state(&mut self, state: SnapState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "snap state changed");
            self.state = state;
        }
    }

    fn handle_success(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.set_state(SnapState::Completed);
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Ok(self.snaped.clone()));
        }
        self.cleanup_resources();
    }

    fn handle_cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.set_state(SnapState::Cancelled);
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Err(SnapCancelled));
        }
        self.cleanup_resources();
    }

    fn cleanup_resources(&mut self) {
        if self.is_cleaned {
            return;
        }
        self.is_cleaned = true;
        self.host.clear_float_tip();
        self.clear_input();
        self.remove_temp_visuals();
        for snap in &mut self.snaps {
            snap.clear(&mut self.host);
        }
        self.cache.clear(&mut self.host);
    }

    fn clear_input(&mut self) {
        if self.pending_input.take().is_some() {
            self.host.clear_input();
        }
    }

    // ========== 捕捉 ==========

    fn update_snap_point(&mut self, view: &dyn View, event: &PointerEvent, now: Instant) {
        self.set_snaped(view, event, now);
        match self.snaped.clone().and_then(|snaped| self.format_snap_prompt(&snaped)) {
            Some(prompt) => self.host.show_float_tip(&prompt),
            None => self.host.clear_float_tip(),
        }
    }

    fn set_snaped(&mut self, view: &dyn View, event: &PointerEvent, now: Instant) {
        self.find_snap_point(view, event, now);
        if let Some(snaped) = self.snaped.take() {
            let snaped = self.resolver.adjust(snaped, view);
            let snaped = if view.is_2d() {
                let point = view.workplane().project(&snaped.point);
                snaped.with_point(point)
            } else {
                snaped
            };
            self.snaped = Some(snaped);
        }

        let mut env = SnapEnv {
            visual: &mut self.host,
            cache: &mut self.cache,
            config: &self.config,
            now,
        };
        for snap in &mut self.snaps {
            snap.handle_snaped(self.snaped.as_ref(), &mut env);
        }
    }

    fn find_snap_point(&mut self, view: &dyn View, event: &PointerEvent, now: Instant) {
        self.snaped = self.nearest_feature_point(view, event);
        if self.snaped.is_some() {
            return;
        }

        let shapes: Vec<DetectedShape> = view
            .detect_shapes(ShapeType::Edge, event.x, event.y)
            .into_iter()
            .filter(|shape| self.request.accepts_shape(shape))
            .collect();
        let data = SnapData {
            view,
            mx: event.x,
            my: event.y,
            shapes: &shapes,
        };
        let mut env = SnapEnv {
            visual: &mut self.host,
            cache: &mut self.cache,
            config: &self.config,
            now,
        };
        for snap in &mut self.snaps {
            if let Some(snaped) = snap.snap(&data, &mut env) {
                if self.request.accepts(&snaped.point) {
                    tracing::trace!(point = ?snaped.point, label = ?snaped.label(), "snaped");
                    self.snaped = Some(snaped);
                    return;
                }
            }
        }
    }

    fn nearest_feature_point(&self, view: &dyn View, event: &PointerEvent) -> Option<SnapResult> {
        let mut nearest: Option<(f64, &FeaturePoint)> = None;
        for feature in self.request.feature_points.iter().filter(|f| f.is_visible()) {
            let distance = view.screen_distance(event.x, event.y, &feature.point);
            if nearest.map_or(true, |(min, _)| distance < min) {
                nearest = Some((distance, feature));
            }
        }
        let (distance, feature) = nearest?;
        self.config.is_within(distance).then(|| {
            SnapResult::new(view.id(), feature.point).with_kind(SnapKind::Feature(feature.prompt.clone()))
        })
    }

    /// 提示文字：`标签 -> 自定义提示或距离`
    fn format_snap_prompt(&mut self, snaped: &SnapResult) -> Option<String> {
        let prompt = self
            .request
            .prompt
            .as_ref()
            .and_then(|prompt| prompt(snaped))
            .or_else(|| self.resolver.format_prompt(snaped))
            .or_else(|| {
                let distance = snaped
                    .distance
                    .or_else(|| snaped.ref_point.map(|r| (snaped.point - r).norm()))?;
                (distance != 0.0).then(|| format!("{distance:.2}"))
            });
        let parts: Vec<&str> = snaped.label().into_iter().chain(prompt.as_deref()).collect();
        (!parts.is_empty()).then(|| parts.join(" -> "))
    }

    // ========== 显示 ==========

    fn update_visual_feedback(&mut self) {
        let point = self.snaped.as_ref().map(|snaped| snaped.point);
        self.show_temp_shape(point);
        self.host.update();
    }

    fn show_temp_shape(&mut self, point: Option<Point3>) {
        if let Some(point) = point {
            if self.request.show_temp_point && self.config.show_markers {
                self.temp_point = Some(self.host.display_point(&point, PointStyle::Temporary));
            }
        }
        if let Some(preview) = &self.request.preview {
            for shape in preview(point.as_ref()) {
                let id = self.host.display_preview(&shape, self.request.preview_opacity);
                self.temp_shapes.push(id);
            }
        }
    }

    fn remove_temp_visuals(&mut self) {
        if let Some(id) = self.temp_point.take() {
            self.host.remove_mesh(id);
        }
        for id in self.temp_shapes.drain(..) {
            self.host.remove_mesh(id);
        }
        self.host.update();
        for snap in &mut self.snaps {
            snap.remove_dynamic_object(&mut self.host);
        }
    }
}
