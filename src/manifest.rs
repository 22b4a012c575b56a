//! # 批处理清单模块
//!
//! 驱动批处理的输入路径有序列表，可选地由一个持久化文件支撑。
//!
//! ## 功能
//! - 单文件模式：清单即 [path]，无支撑文件
//! - 文件模式：加载时裁剪、过滤到已知视频扩展名，并立即回写支撑文件
//! - 任务完成后从清单（及支撑文件）中精确移除一行，使重跑跳过已完成条目
//!
//! ## 依赖关系
//! - 被 `main.rs`, `pipeline.rs` 使用
//! - 使用 `error.rs` 的文件系统错误变体

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VidbatchError};

/// 识别为视频的扩展名（不区分大小写）
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "flv", "avi", "mov", "wmv", "mpeg", "mpg", "m4v",
];

/// 输入清单
#[derive(Debug)]
pub struct Manifest {
    /// 待处理路径，按清单顺序
    entries: Vec<String>,
    /// 支撑文件（仅文件模式）
    backing: Option<PathBuf>,
}

impl Manifest {
    /// 单文件模式：一条条目，不过滤扩展名，无支撑文件
    pub fn single(path: &Path) -> Self {
        Self {
            entries: vec![path.display().to_string()],
            backing: None,
        }
    }

    /// 文件模式：读取、裁剪、过滤到已知视频扩展名，并在任何转换开始前
    /// 将过滤后的列表回写支撑文件（中断后重跑只会看到有效条目）
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| VidbatchError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let entries: Vec<String> = content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty() && has_video_extension(line))
            .collect();

        let manifest = Self {
            entries,
            backing: Some(path.to_path_buf()),
        };
        manifest.rewrite_backing()?;

        Ok(manifest)
    }

    /// 当前条目
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 任务到达 Done 后调用：移除恰好一条与（裁剪后的）`original` 相等的条目，
    /// 保持其余条目的内容与顺序，并回写支撑文件
    pub fn remove_completed(&mut self, original: &str) -> Result<()> {
        let target = original.trim();
        if let Some(pos) = self.entries.iter().position(|e| e == target) {
            self.entries.remove(pos);
        }
        self.rewrite_backing()
    }

    /// 将内存中的条目以换行连接回写支撑文件（单文件模式为空操作）
    fn rewrite_backing(&self) -> Result<()> {
        let Some(backing) = &self.backing else {
            return Ok(());
        };

        let mut content = self.entries.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        fs::write(backing, content).map_err(|e| VidbatchError::FileWriteError {
            path: backing.display().to_string(),
            source: e,
        })
    }
}

/// 检查路径是否带有已知视频扩展名
fn has_video_extension(line: &str) -> bool {
    Path::new(line)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
