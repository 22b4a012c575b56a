//! # 操作链模块
//!
//! 将命令行开关转换为固定顺序的操作链。
//!
//! ## 功能
//! - `Operation` 标签变体：旋转 / 增益 / 归一化
//! - 链顺序恒为 [Rotate?, Amplify?, Normalize?]，与命令行顺序无关
//! - 每个操作贡献一个用于输出命名的标签字符串
//! - 分贝到线性增益的转换
//!
//! ## 依赖关系
//! - 被 `pipeline.rs`, `main.rs` 使用
//! - 使用 `cli.rs` 的 `Rotation`

use crate::cli::Rotation;

/// 单个转换操作
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// 旋转指定角度（+90 = left, -90 = right）
    Rotate { degrees: i32 },
    /// 按分贝增量放大音频
    Amplify { decibels: f64 },
    /// 将音频增益直接设置为给定乘数（覆盖之前的增益，不叠加）
    Normalize { gain: f64 },
}

impl Operation {
    /// 输出命名用标签
    pub fn tag(&self) -> String {
        match self {
            Operation::Rotate { degrees } => {
                if *degrees > 0 {
                    "ROTATED_LEFT".to_string()
                } else {
                    "ROTATED_RIGHT".to_string()
                }
            }
            Operation::Amplify { decibels } => {
                format!("INCREASED_{}DB", fmt_value(*decibels))
            }
            Operation::Normalize { gain } => {
                format!("NORMALIZED_{}", fmt_value(*gain))
            }
        }
    }
}

/// 由激活的开关构建固定顺序操作链
pub fn build_chain(
    rotate: Option<Rotation>,
    db: Option<f64>,
    volume: Option<f64>,
) -> Vec<Operation> {
    let mut chain = Vec::new();

    if let Some(direction) = rotate {
        chain.push(Operation::Rotate {
            degrees: direction.degrees(),
        });
    }

    if let Some(decibels) = db {
        chain.push(Operation::Amplify { decibels });
    }

    if let Some(gain) = volume {
        chain.push(Operation::Normalize { gain });
    }

    chain
}

/// 按链顺序用下划线连接标签，作为输出文件名后缀
pub fn chain_suffix(chain: &[Operation]) -> String {
    chain
        .iter()
        .map(|op| op.tag())
        .collect::<Vec<_>>()
        .join("_")
}

/// 分贝转线性增益：gain = 10^(db / 20)
pub fn db_to_gain(decibels: f64) -> f64 {
    10f64.powf(decibels / 20.0)
}

/// 浮点数渲染：整数值保留一位小数（6.0 而非 6），与输出命名约定一致
pub fn fmt_value(value: f64) -> String {
    if value == value.trunc() {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
