//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数并校验前置条件。
//!
//! ## 参数
//! - `-d/--db`: 音量增益（分贝）
//! - `-r/--rotate`: 视频旋转方向（left/right）
//! - `-v/--volume`: 音频归一化乘数
//! - `-i/--input` / `-f/--file-list`: 互斥的两种输入模式
//! - `-o/--output`: 输出目录
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 校验失败返回 `error.rs` 的参数错误变体

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::error::{Result, VidbatchError};

/// 旋转方向
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Rotation {
    /// Rotate 90 degrees counter-clockwise
    Left,
    /// Rotate 90 degrees clockwise
    Right,
}

impl Rotation {
    /// 映射为带符号角度：left -> +90, right -> -90
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Left => 90,
            Rotation::Right => -90,
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rotation::Left => write!(f, "left"),
            Rotation::Right => write!(f, "right"),
        }
    }
}

/// vidbatch - 批量视频旋转与音频增益工具
#[derive(Parser, Debug)]
#[command(name = "vidbatch")]
#[command(version)]
#[command(about = "Batch video rotation and audio gain toolkit", long_about = None)]
pub struct Cli {
    /// Volume increase in decibels
    #[arg(short = 'd', long = "db", value_name = "DECIBELS")]
    pub db: Option<f64>,

    /// Rotate the video by 90 degrees left or right
    #[arg(short, long, value_enum)]
    pub rotate: Option<Rotation>,

    /// Volume multiplier for audio normalization (1.0 = no change)
    #[arg(short, long, value_name = "MULTIPLIER")]
    pub volume: Option<f64>,

    /// Input video file path
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// File containing a list of video paths, one per line
    #[arg(short, long = "file-list", value_name = "FILE")]
    pub file_list: Option<PathBuf>,

    /// Output directory for the modified videos
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// 校验参数前置条件，失败则整个运行在任何 I/O 之前中止
    pub fn validate(&self) -> Result<()> {
        if self.db.is_none() && self.rotate.is_none() && self.volume.is_none() {
            return Err(VidbatchError::NoOperation);
        }

        if self.input.is_some() && self.file_list.is_some() {
            return Err(VidbatchError::BothInputModes);
        }

        if self.input.is_none() && self.file_list.is_none() {
            return Err(VidbatchError::NoInputMode);
        }

        Ok(())
    }
}
