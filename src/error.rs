//! # 统一错误处理模块
//!
//! 定义 vidbatch 的所有错误类型，使用 `thiserror` 派生。
//!
//! 错误分为三类（`ErrorKind`）：
//! - `Configuration` — 参数错误，整个运行在任何 I/O 之前中止
//! - `Filesystem` — 文件系统错误，只中止当前任务，批处理继续
//! - `Transformation` — 后端转换错误，只中止当前任务，批处理继续
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 错误分类，决定传播策略（见 `main.rs` 的退出码约定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Filesystem,
    Transformation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration error"),
            ErrorKind::Filesystem => write!(f, "filesystem error"),
            ErrorKind::Transformation => write!(f, "transformation error"),
        }
    }
}

/// vidbatch 统一错误类型
#[derive(Error, Debug)]
pub enum VidbatchError {
    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("No operation selected: specify at least one of --db, --rotate, --volume")]
    NoOperation,

    #[error("Both input modes set: --input and --file-list are mutually exclusive")]
    BothInputModes,

    #[error("No input mode set: specify --input or --file-list")]
    NoInputMode,

    // ─────────────────────────────────────────────────────────────
    // 文件系统错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to create temporary copy of: {path}")]
    TempCopyError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 转换错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Unsupported rotation angle: {0} degrees (only +90/-90)")]
    UnsupportedRotation(i32),
}

impl VidbatchError {
    /// 返回错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            VidbatchError::NoOperation
            | VidbatchError::BothInputModes
            | VidbatchError::NoInputMode => ErrorKind::Configuration,

            VidbatchError::FileReadError { .. }
            | VidbatchError::FileWriteError { .. }
            | VidbatchError::FileNotFound { .. }
            | VidbatchError::TempCopyError { .. } => ErrorKind::Filesystem,

            VidbatchError::CommandNotFound { .. }
            | VidbatchError::CommandFailed { .. }
            | VidbatchError::UnsupportedRotation(_) => ErrorKind::Transformation,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, VidbatchError>;
