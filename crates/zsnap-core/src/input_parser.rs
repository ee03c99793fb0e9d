//! 文本输入解析器
//!
//! 支持的输入格式：
//! - 绝对坐标: `#10,0,0`
//! - 相对偏移: `10,5` 或 `10,5,2`（沿参考平面的坐标轴）
//! - 单个数值: `100`（距离、角度或参数，由具体输入处理器解释）

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 绝对坐标前缀
pub const ABSOLUTE_PREFIX: char = '#';

/// 解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty input")]
    Empty,

    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

/// 允许输入的数值个数（位域）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    bits: u8,
}

impl Dimension {
    pub const NONE: Dimension = Dimension { bits: 0 };
    pub const D1: Dimension = Dimension { bits: 1 };
    pub const D2: Dimension = Dimension { bits: 2 };
    pub const D3: Dimension = Dimension { bits: 4 };
    pub const D1D2: Dimension = Dimension { bits: 1 | 2 };
    pub const D1D2D3: Dimension = Dimension { bits: 1 | 2 | 4 };

    /// 数值个数对应的维度；超出 1..=3 时为 `NONE`
    pub fn from_count(count: usize) -> Self {
        match count {
            1 => Self::D1,
            2 => Self::D2,
            3 => Self::D3,
            _ => Self::NONE,
        }
    }

    /// `other` 的每一位都在自身中；`NONE` 不被包含
    pub fn contains(&self, other: Dimension) -> bool {
        other.bits != 0 && self.bits & other.bits == other.bits
    }

    /// 是否允许输入 `count` 个数值
    pub fn accepts(&self, count: usize) -> bool {
        self.contains(Self::from_count(count))
    }
}

impl std::ops::BitOr for Dimension {
    type Output = Dimension;

    fn bitor(self, rhs: Self) -> Self::Output {
        Dimension {
            bits: self.bits | rhs.bits,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::D1D2D3
    }
}

/// 解析后的输入
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInput {
    /// 以 `#` 开头的绝对坐标
    pub is_absolute: bool,
    pub values: Vec<f64>,
}

impl ParsedInput {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 输入解析器
pub struct InputParser;

impl InputParser {
    /// 解析逗号分隔的数值列表
    ///
    /// # 参数
    /// - `input`: 输入字符串，可带 `#` 前缀
    ///
    /// # 返回
    /// 解析后的数值列表，任一项不是有限数值时返回错误
    pub fn parse(input: &str) -> Result<ParsedInput, ParseError> {
        let input = input.trim();
        let (is_absolute, body) = match input.strip_prefix(ABSOLUTE_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        if body.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let values = body
            .split(',')
            .map(Self::parse_number)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParsedInput {
            is_absolute,
            values,
        })
    }

    /// 解析单个有限数值
    pub fn parse_number(input: &str) -> Result<f64, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::Empty);
        }
        input
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseError::InvalidNumber(input.to_string()))
    }

    /// 是否是开始文本输入的按键
    pub fn is_input_start(c: char) -> bool {
        c.is_ascii_digit() || c == ABSOLUTE_PREFIX || c == '-'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_coordinate() {
        let result = InputParser::parse("#10,0,0").unwrap();
        assert!(result.is_absolute);
        assert_eq!(result.values, vec![10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parse_relative_coordinate() {
        let result = InputParser::parse(" 100, -50.5 ").unwrap();
        assert!(!result.is_absolute);
        assert_eq!(result.values, vec![100.0, -50.5]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_parse_length() {
        let result = InputParser::parse("100").unwrap();
        assert_eq!(result.values, vec![100.0]);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(InputParser::parse(""), Err(ParseError::Empty));
        assert_eq!(InputParser::parse("#"), Err(ParseError::Empty));
        assert_eq!(
            InputParser::parse("1,abc"),
            Err(ParseError::InvalidNumber("abc".to_string()))
        );
        assert!(InputParser::parse("1,,2").is_err());
        assert!(InputParser::parse_number("inf").is_err());
        assert!(InputParser::parse_number("NaN").is_err());
    }

    #[test]
    fn test_dimension() {
        assert!(Dimension::D1D2D3.accepts(1));
        assert!(Dimension::D1D2D3.accepts(3));
        assert!(!Dimension::D1D2D3.accepts(4));
        assert!(!Dimension::D1D2.accepts(3));
        assert!(Dimension::D1D2.accepts(2));
        assert_eq!(Dimension::D1 | Dimension::D2, Dimension::D1D2);
        assert!(!Dimension::NONE.accepts(1));
        assert_eq!(Dimension::from_count(0), Dimension::NONE);
    }

    #[test]
    fn test_dimension_contains_all_bits() {
        assert!(Dimension::D1D2D3.contains(Dimension::D1D2));
        assert!(Dimension::D1D2.contains(Dimension::D2));
        assert!(!Dimension::D1.contains(Dimension::D1D2));
        assert!(!Dimension::D1D2.contains(Dimension::D1D2D3));
        assert!(!Dimension::D1D2D3.contains(Dimension::NONE));
        assert!(!Dimension::NONE.contains(Dimension::NONE));
    }

    #[test]
    fn test_input_start_keys() {
        assert!(InputParser::is_input_start('5'));
        assert!(InputParser::is_input_start('#'));
        assert!(InputParser::is_input_start('-'));
        assert!(!InputParser::is_input_start('a'));
    }
}
