//! 宿主接口与输入事件
//!
//! 处理器通过 `SnapHost` 完成全部界面副作用：临时网格与高亮
//! （继承自 `VisualContext`）、浮动提示、字面输入框和 toast。

use zsnap_core::headless::HeadlessVisual;
use zsnap_core::math::Point3;
use zsnap_core::shape::DetectedShape;
use zsnap_core::view::{LineType, MeshId, PointStyle, PreviewShape, VisualContext};

/// 宿主
pub trait SnapHost: VisualContext {
    /// 在指针旁显示提示
    fn show_float_tip(&mut self, msg: &str);

    fn clear_float_tip(&mut self);

    /// 显示 toast；`key` 为 i18n 键
    fn show_toast(&mut self, key: &str);

    /// 打开字面输入框，`initial` 为触发输入的按键
    fn show_input(&mut self, initial: &str);

    fn clear_input(&mut self);

    /// 输入校验失败；`key` 为 i18n 键
    fn show_input_error(&mut self, _key: &str) {}
}

/// 指针类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    Mouse,
    Pen,
    Touch,
}

/// 鼠标按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// 指针事件（屏幕坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub pointer_type: PointerType,
    pub button: MouseButton,
    pub is_primary: bool,
}

impl PointerEvent {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pointer_type: PointerType::Mouse,
            button: MouseButton::Left,
            is_primary: true,
        }
    }

    pub fn touch(x: f64, y: f64) -> Self {
        Self {
            pointer_type: PointerType::Touch,
            ..Self::mouse(x, y)
        }
    }

    pub fn with_button(self, button: MouseButton) -> Self {
        Self { button, ..self }
    }

    /// 鼠标左键
    pub fn is_mouse_primary(&self) -> bool {
        self.pointer_type == PointerType::Mouse && self.button == MouseButton::Left
    }
}

/// 按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Char(char),
}

/// 内存中的宿主，用于测试与演示
#[derive(Debug, Default)]
pub struct HeadlessHost {
    pub visual: HeadlessVisual,
    pub float_tip: Option<String>,
    /// 打开的输入框及其初始文本
    pub input: Option<String>,
    pub toasts: Vec<String>,
    pub input_errors: Vec<String>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisualContext for HeadlessHost {
    fn display_point(&mut self, point: &Point3, style: PointStyle) -> MeshId {
        self.visual.display_point(point, style)
    }

    fn display_line(&mut self, start: &Point3, end: &Point3, line_type: LineType) -> MeshId {
        self.visual.display_line(start, end, line_type)
    }

    fn display_preview(&mut self, shape: &PreviewShape, opacity: f32) -> MeshId {
        self.visual.display_preview(shape, opacity)
    }

    fn remove_mesh(&mut self, id: MeshId) {
        self.visual.remove_mesh(id);
    }

    fn highlight(&mut self, shape: &DetectedShape) {
        self.visual.highlight(shape);
    }

    fn unhighlight(&mut self, shape: &DetectedShape) {
        self.visual.unhighlight(shape);
    }

    fn update(&mut self) {
        self.visual.update();
    }
}

impl SnapHost for HeadlessHost {
    fn show_float_tip(&mut self, msg: &str) {
        self.float_tip = Some(msg.to_string());
    }

    fn clear_float_tip(&mut self) {
        self.float_tip = None;
    }

    fn show_toast(&mut self, key: &str) {
        self.toasts.push(key.to_string());
    }

    fn show_input(&mut self, initial: &str) {
        self.input = Some(initial.to_string());
    }

    fn clear_input(&mut self) {
        self.input = None;
    }

    fn show_input_error(&mut self, key: &str) {
        self.input_errors.push(key.to_string());
    }
}
