//! # 工具模块
//!
//! ## 依赖关系
//! - 被 `main.rs`, `pipeline.rs` 使用

pub mod output;
pub mod progress;
