//! # 输出路径工具
//!
//! 输出路径构造、冲突消解与超长文件名保护。
//!
//! ## 功能
//! - 由输入路径与操作后缀构造输出路径，可重定向到输出目录
//! - 数字后缀探测，保证绝不覆盖已存在的文件
//! - 文件名超长时用唯一命名的临时副本替换输入，析构时自动清理
//!
//! ## 依赖关系
//! - 被 `pipeline.rs` 使用
//! - 使用 `tempfile` 生成防冲突的临时副本

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, VidbatchError};

/// 基础文件名长度上限：链追加多个长标签后仍需低于文件系统 255 字节限制
pub const MAX_BASENAME_LEN: usize = 254;

/// 构造输出路径：`<stem>_<suffix><ext>`，与输入同目录，
/// 给定输出目录时重定向到该目录
pub fn build_output_path(input: &Path, suffix: &str, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    let ext = input
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let filename = format!("{}_{}{}", stem, suffix, ext);

    match output_dir {
        Some(dir) => dir.join(filename),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(filename),
    }
}

/// 返回 `path`, `path_1`, `path_2`, ... 序列中第一个不存在的路径。
/// 只读取调用时刻的文件系统状态；流水线单线程，无需并发防护
pub fn resolve_conflict(desired: &Path) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }

    let stem = desired
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    let ext = desired
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let parent = desired.parent().unwrap_or_else(|| Path::new(""));

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{}_{}{}", stem, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// 当前迭代的有效输入。若触发超长名保护，持有的临时副本在析构时删除，
/// 无论任务成功或失败
#[derive(Debug)]
pub struct EffectiveInput {
    path: PathBuf,
    temp: Option<NamedTempFile>,
}

impl EffectiveInput {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 是否替换为临时副本
    pub fn is_guarded(&self) -> bool {
        self.temp.is_some()
    }
}

/// 超长文件名保护：基础名超过 254 字节时，在同目录创建唯一命名的
/// 临时副本并将其作为后续流水线的有效输入；否则原样返回
pub fn guard_oversized(input: &Path) -> Result<EffectiveInput> {
    let basename_len = input
        .file_name()
        .map(|n| n.as_encoded_bytes().len())
        .unwrap_or(0);

    if basename_len <= MAX_BASENAME_LEN {
        return Ok(EffectiveInput {
            path: input.to_path_buf(),
            temp: None,
        });
    }

    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let suffix = input
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let temp = tempfile::Builder::new()
        .prefix("vidbatch-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| VidbatchError::TempCopyError {
            path: input.display().to_string(),
            source: e,
        })?;

    fs::copy(input, temp.path()).map_err(|e| VidbatchError::TempCopyError {
        path: input.display().to_string(),
        source: e,
    })?;

    Ok(EffectiveInput {
        path: temp.path().to_path_buf(),
        temp: Some(temp),
    })
}
