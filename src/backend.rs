//! # 转换后端模块
//!
//! 实际的解码/转换/编码工作委托给外部能力，核心流水线只依赖
//! `TransformBackend` 约定。
//!
//! ## 约定
//! - `open`: 按路径打开媒体文件，返回剪辑句柄（作用域结束即释放）
//! - `rotate`: 按带符号角度旋转（仅 ±90）
//! - `set_gain`: 将音频增益设置为绝对乘数（覆盖，不叠加）
//! - `write`: 用配置的视频/音频编解码器对将结果编码到目标路径
//!
//! ## 依赖关系
//! - 被 `pipeline.rs` 使用
//! - `FfmpegBackend` 调用外部 `ffmpeg` 命令

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, VidbatchError};

/// 转换后端约定。剪辑句柄随作用域释放（Drop），成功或失败路径一致
pub trait TransformBackend {
    type Clip;

    fn open(&self, path: &Path) -> Result<Self::Clip>;
    fn rotate(&self, clip: &mut Self::Clip, degrees: i32) -> Result<()>;
    fn set_gain(&self, clip: &mut Self::Clip, gain: f64) -> Result<()>;
    fn write(&self, clip: &Self::Clip, output: &Path) -> Result<()>;
}

/// 基于外部 `ffmpeg` 命令的后端。滤镜先累积在剪辑句柄上，
/// `write` 时一次编码完成整条链
pub struct FfmpegBackend {
    video_codec: String,
    audio_codec: String,
}

/// ffmpeg 后端的剪辑句柄
#[derive(Debug)]
pub struct FfmpegClip {
    source: PathBuf,
    /// 待应用的 transpose 滤镜
    transpose: Option<&'static str>,
    /// 待应用的绝对增益
    gain: Option<f64>,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }

    /// 组装一次编码的完整参数列表
    fn encode_args(&self, clip: &FfmpegClip, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-nostdin".into(),
            "-i".into(),
            clip.source.clone().into(),
        ];

        if let Some(transpose) = clip.transpose {
            args.push("-vf".into());
            args.push(transpose.into());
        }

        if let Some(gain) = clip.gain {
            args.push("-af".into());
            args.push(format!("volume={}", gain).into());
        }

        args.push("-c:v".into());
        args.push(self.video_codec.as_str().into());
        args.push("-c:a".into());
        args.push(self.audio_codec.as_str().into());

        // 冲突消解已保证路径空闲，-n 兜底确保 ffmpeg 绝不覆盖
        args.push("-n".into());
        args.push(output.to_path_buf().into());

        args
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformBackend for FfmpegBackend {
    type Clip = FfmpegClip;

    fn open(&self, path: &Path) -> Result<FfmpegClip> {
        if !path.is_file() {
            return Err(VidbatchError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        Ok(FfmpegClip {
            source: path.to_path_buf(),
            transpose: None,
            gain: None,
        })
    }

    fn rotate(&self, clip: &mut FfmpegClip, degrees: i32) -> Result<()> {
        // transpose=2: 逆时针 90° (+90), transpose=1: 顺时针 90° (-90)
        clip.transpose = Some(match degrees {
            90 => "transpose=2",
            -90 => "transpose=1",
            other => return Err(VidbatchError::UnsupportedRotation(other)),
        });
        Ok(())
    }

    fn set_gain(&self, clip: &mut FfmpegClip, gain: f64) -> Result<()> {
        clip.gain = Some(gain);
        Ok(())
    }

    fn write(&self, clip: &FfmpegClip, output: &Path) -> Result<()> {
        let args = self.encode_args(clip, output);

        let result = Command::new("ffmpeg").args(&args).output();

        let command_output = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VidbatchError::CommandNotFound {
                    command: "ffmpeg".to_string(),
                });
            }
            Err(e) => {
                return Err(VidbatchError::CommandFailed {
                    command: "ffmpeg".to_string(),
                    stderr: e.to_string(),
                });
            }
        };

        if !command_output.status.success() {
            // 编码失败不得留下残缺输出
            fs::remove_file(output).ok();
            return Err(VidbatchError::CommandFailed {
                command: "ffmpeg".to_string(),
                stderr: String::from_utf8_lossy(&command_output.stderr).to_string(),
            });
        }

        Ok(())
    }
}
