//! # 文件日志模块
//!
//! 追加式行日志：`时间戳 - 级别 - 消息`，写入固定相对路径。
//!
//! 日志器显式构造并以引用传入各组件，生命周期随 `main` 作用域结束，
//! 不存在进程级隐式状态。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `pipeline.rs` 使用
//! - 使用 `chrono` 生成时间戳

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::error::{Result, VidbatchError};

/// 默认日志文件路径（相对工作目录）
pub const LOG_FILE: &str = "vidbatch.log";

/// 追加式文件日志器
#[derive(Debug)]
pub struct Logger {
    file: File,
}

impl Logger {
    /// 打开（或创建）日志文件，追加模式
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| VidbatchError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;

        Ok(Self { file })
    }

    pub fn info(&self, msg: &str) {
        self.write_line("INFO", msg);
    }

    pub fn warn(&self, msg: &str) {
        self.write_line("WARNING", msg);
    }

    pub fn error(&self, msg: &str) {
        self.write_line("ERROR", msg);
    }

    /// 日志写入失败不影响批处理本身
    fn write_line(&self, level: &str, msg: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(&self.file, "{} - {} - {}", timestamp, level, msg).ok();
    }
}
