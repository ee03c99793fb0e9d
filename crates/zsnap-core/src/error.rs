//! 错误定义

use thiserror::Error;

/// 几何构造错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Plane normal must not be zero")]
    ZeroNormal,

    #[error("Plane x axis must not be zero")]
    ZeroXVector,

    #[error("Plane normal and x axis must not be parallel")]
    ParallelAxes,

    #[error("Ray direction must not be zero")]
    ZeroDirection,

    #[error("Radius must be positive")]
    InvalidRadius,
}

/// 文本输入校验错误
///
/// `Display` 输出的是国际化键，由宿主翻译后显示。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("error.input.invalidNumber")]
    InvalidNumber,

    #[error("error.input.threeNumberCanBeInput")]
    ThreeNumberCanBeInput,

    #[error("error.input.unsupportedInputs")]
    UnsupportedInputs,

    #[error("error.input.cannotInputANumber")]
    CannotInputANumber,

    /// 当前没有等待中的文本输入
    #[error("No literal input is pending")]
    NotInputing,
}

impl InputError {
    /// 国际化键
    pub fn key(&self) -> &'static str {
        match self {
            InputError::InvalidNumber => "error.input.invalidNumber",
            InputError::ThreeNumberCanBeInput => "error.input.threeNumberCanBeInput",
            InputError::UnsupportedInputs => "error.input.unsupportedInputs",
            InputError::CannotInputANumber => "error.input.cannotInputANumber",
            InputError::NotInputing => "error.input.notInputing",
        }
    }
}
