//! # 流水线执行器
//!
//! 严格顺序地将操作链应用到清单中的每个输入。
//!
//! ## 单个任务的状态机
//! `Loaded -> 各操作步骤 -> Written -> Done`，任一步骤出错进入 `Failed`：
//! 跳过剩余步骤，不写输出，清单条目保留以便重跑。
//! 到达 `Done` 后从清单中持久移除该条目。
//!
//! ## 功能
//! - 超长名保护、输出路径构造与冲突消解的编排
//! - 每个失败同时写入文件日志并回显到终端
//! - 进度条与批处理结束的汇总表格
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `backend.rs`, `manifest.rs`, `ops.rs`, `paths.rs`, `logging.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`
//! - 使用 `tabled` 生成汇总表格

use std::path::{Path, PathBuf};

use tabled::{Table, Tabled};

use crate::backend::TransformBackend;
use crate::error::Result;
use crate::logging::Logger;
use crate::manifest::Manifest;
use crate::ops::{self, Operation};
use crate::paths;
use crate::utils::{output, progress};

/// 单个任务的终态
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Done,
    Failed(String),
}

/// 每个输入在其迭代期间的记录，批处理结束后仅用于汇总表格
#[derive(Debug)]
pub struct PathRecord {
    pub original: String,
    pub output: Option<PathBuf>,
    pub status: JobStatus,
}

/// 批处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: usize,
    pub failed: usize,
    /// 失败详情 (输入路径, 错误信息)
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    fn merge(&mut self, record: &PathRecord) {
        match &record.status {
            JobStatus::Done => self.success += 1,
            JobStatus::Failed(reason) => {
                self.failed += 1;
                self.failures.push((record.original.clone(), reason.clone()));
            }
            JobStatus::Pending => {}
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// 汇总表格行
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Output")]
    output: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// 流水线执行器
pub struct PipelineExecutor<'a, B: TransformBackend> {
    backend: &'a B,
    logger: &'a Logger,
    output_dir: Option<&'a Path>,
}

impl<'a, B: TransformBackend> PipelineExecutor<'a, B> {
    pub fn new(backend: &'a B, logger: &'a Logger, output_dir: Option<&'a Path>) -> Self {
        Self {
            backend,
            logger,
            output_dir,
        }
    }

    /// 顺序处理清单中的所有输入，返回统计结果
    pub fn run(&self, manifest: &mut Manifest, chain: &[Operation]) -> BatchResult {
        let entries = manifest.entries().to_vec();
        let suffix = ops::chain_suffix(chain);

        let pb = progress::create_progress_bar(entries.len() as u64, "Processing");
        let mut batch = BatchResult::default();
        let mut records = Vec::new();

        for input in entries {
            let mut record = PathRecord {
                original: input.clone(),
                output: None,
                status: JobStatus::Pending,
            };

            match self.process(Path::new(&input), chain) {
                Ok(output_path) => {
                    self.logger.info(&format!(
                        "Video {} saved as {}",
                        suffix.to_lowercase(),
                        output_path.display()
                    ));
                    pb.suspend(|| {
                        output::print_saved(&input, &output_path.display().to_string())
                    });

                    record.status = JobStatus::Done;
                    record.output = Some(output_path);

                    // Done 之后才移除清单条目；移除失败不改变任务结果
                    if let Err(e) = manifest.remove_completed(&input) {
                        self.logger.warn(&format!("Manifest not updated: {}", e));
                        pb.suspend(|| {
                            output::print_warning(&format!("Manifest not updated: {}", e))
                        });
                    }
                }
                Err(e) => {
                    self.logger
                        .error(&format!("{} for {}: {}", e.kind(), input, e));
                    pb.suspend(|| output::print_error(&format!("{}: {}", input, e)));

                    record.status = JobStatus::Failed(e.to_string());
                }
            }

            batch.merge(&record);
            records.push(record);
            pb.inc(1);
        }

        pb.finish_and_clear();
        self.print_summary(&records);

        batch
    }

    /// 单个输入的完整流水线。任一 `?` 即短路到 Failed：不写输出。
    /// 剪辑句柄与临时副本都随作用域释放，成功或失败路径一致
    fn process(&self, input: &Path, chain: &[Operation]) -> Result<PathBuf> {
        let effective = paths::guard_oversized(input)?;

        let suffix = ops::chain_suffix(chain);
        let desired = paths::build_output_path(effective.path(), &suffix, self.output_dir);
        let output_path = paths::resolve_conflict(&desired);

        let mut clip = self.backend.open(effective.path())?;

        for op in chain {
            match op {
                Operation::Rotate { degrees } => self.backend.rotate(&mut clip, *degrees)?,
                Operation::Amplify { decibels } => self
                    .backend
                    .set_gain(&mut clip, ops::db_to_gain(*decibels))?,
                Operation::Normalize { gain } => self.backend.set_gain(&mut clip, *gain)?,
            }
        }

        self.backend.write(&clip, &output_path)?;

        Ok(output_path)
    }

    fn print_summary(&self, records: &[PathRecord]) {
        if records.is_empty() {
            return;
        }

        let rows: Vec<SummaryRow> = records
            .iter()
            .map(|r| SummaryRow {
                input: r.original.clone(),
                output: r
                    .output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                status: match &r.status {
                    JobStatus::Done => "done".to_string(),
                    JobStatus::Failed(_) => "failed".to_string(),
                    JobStatus::Pending => "pending".to_string(),
                },
            })
            .collect();

        let table = Table::new(&rows);
        println!("{}", table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VidbatchError;
    use std::fs;
    use tempfile::tempdir;

    /// 测试后端：记录应用的操作，`write` 写一个占位文件。
    /// `fail_gain` 命中时该步骤报错，用于验证短路与原子性
    #[derive(Default)]
    struct MockBackend {
        fail_gain: Option<f64>,
    }

    struct MockClip {
        applied: Vec<String>,
    }

    impl TransformBackend for MockBackend {
        type Clip = MockClip;

        fn open(&self, path: &Path) -> Result<MockClip> {
            if !path.is_file() {
                return Err(VidbatchError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            Ok(MockClip {
                applied: Vec::new(),
            })
        }

        fn rotate(&self, clip: &mut MockClip, degrees: i32) -> Result<()> {
            clip.applied.push(format!("rotate:{}", degrees));
            Ok(())
        }

        fn set_gain(&self, clip: &mut MockClip, gain: f64) -> Result<()> {
            if let Some(rejected) = self.fail_gain {
                if (gain - rejected).abs() < 1e-9 {
                    return Err(VidbatchError::CommandFailed {
                        command: "mock".to_string(),
                        stderr: "gain rejected".to_string(),
                    });
                }
            }
            clip.applied.push(format!("gain:{}", gain));
            Ok(())
        }

        fn write(&self, _clip: &MockClip, output: &Path) -> Result<()> {
            fs::write(output, b"encoded").map_err(|e| VidbatchError::FileWriteError {
                path: output.display().to_string(),
                source: e,
            })
        }
    }

    fn test_logger(dir: &Path) -> Logger {
        Logger::open(&dir.join("test.log")).unwrap()
    }

    #[test]
    fn test_scenario_rotate_left_amplify_6db() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.mp4");
        fs::write(&input, b"video").unwrap();

        let backend = MockBackend::default();
        let logger = test_logger(dir.path());
        let executor = PipelineExecutor::new(&backend, &logger, None);

        let mut manifest = Manifest::single(&input);
        let chain = vec![
            Operation::Rotate { degrees: 90 },
            Operation::Amplify { decibels: 6.0 },
        ];

        let result = executor.run(&mut manifest, &chain);
        assert_eq!(result.success, 1);
        assert_eq!(result.failed, 0);
        assert!(dir
            .path()
            .join("a_ROTATED_LEFT_INCREASED_6.0DB.mp4")
            .exists());
    }

    #[test]
    fn test_conflicting_output_gets_numeric_suffix() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.mp4");
        fs::write(&input, b"video").unwrap();
        fs::write(dir.path().join("a_ROTATED_LEFT_INCREASED_6.0DB.mp4"), b"old").unwrap();

        let backend = MockBackend::default();
        let logger = test_logger(dir.path());
        let executor = PipelineExecutor::new(&backend, &logger, None);

        let mut manifest = Manifest::single(&input);
        let chain = vec![
            Operation::Rotate { degrees: 90 },
            Operation::Amplify { decibels: 6.0 },
        ];

        executor.run(&mut manifest, &chain);

        // 既有文件未被覆盖，新输出带 _1 后缀
        assert_eq!(
            fs::read(dir.path().join("a_ROTATED_LEFT_INCREASED_6.0DB.mp4")).unwrap(),
            b"old"
        );
        assert!(dir
            .path()
            .join("a_ROTATED_LEFT_INCREASED_6.0DB_1.mp4")
            .exists());
    }

    #[test]
    fn test_failed_normalize_leaves_no_output_and_keeps_manifest_entry() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.mp4");
        fs::write(&input, b"video").unwrap();

        let list = dir.path().join("list.txt");
        fs::write(&list, format!("{}\n", input.display())).unwrap();

        // 归一化步骤（gain = 0.5）被拒绝，之前的放大步骤成功
        let backend = MockBackend {
            fail_gain: Some(0.5),
        };
        let logger = test_logger(dir.path());
        let executor = PipelineExecutor::new(&backend, &logger, None);

        let mut manifest = Manifest::from_file(&list).unwrap();
        let chain = vec![
            Operation::Amplify { decibels: 6.0 },
            Operation::Normalize { gain: 0.5 },
        ];

        let result = executor.run(&mut manifest, &chain);
        assert_eq!(result.success, 0);
        assert_eq!(result.failed, 1);

        // 无输出文件，清单条目保留以便重跑
        assert!(!dir
            .path()
            .join("a_INCREASED_6.0DB_NORMALIZED_0.5.mp4")
            .exists());
        assert_eq!(
            fs::read_to_string(&list).unwrap(),
            format!("{}\n", input.display())
        );
    }

    #[test]
    fn test_manifest_shrinks_only_for_completed_jobs() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("b.mp4");
        fs::write(&good, b"video").unwrap();
        let missing1 = dir.path().join("missing1.mp4");
        let missing2 = dir.path().join("missing2.mp4");

        let list = dir.path().join("list.txt");
        fs::write(
            &list,
            format!("{}\n{}\n{}\n", missing1.display(), good.display(), missing2.display()),
        )
        .unwrap();

        let backend = MockBackend::default();
        let logger = test_logger(dir.path());
        let executor = PipelineExecutor::new(&backend, &logger, None);

        let mut manifest = Manifest::from_file(&list).unwrap();
        let chain = vec![Operation::Normalize { gain: 1.0 }];

        let result = executor.run(&mut manifest, &chain);
        assert_eq!(result.success, 1);
        assert_eq!(result.failed, 2);

        // 成功条目被移除，失败条目按原顺序保留
        assert_eq!(
            fs::read_to_string(&list).unwrap(),
            format!("{}\n{}\n", missing1.display(), missing2.display())
        );
    }

    #[test]
    fn test_oversized_temp_copy_removed_even_on_failure() {
        let dir = tempdir().unwrap();
        let name = format!("{}.mp4", "x".repeat(251));
        let input = dir.path().join(&name);
        fs::write(&input, b"video").unwrap();

        let backend = MockBackend {
            fail_gain: Some(0.5),
        };
        let logger = test_logger(dir.path());
        let executor = PipelineExecutor::new(&backend, &logger, None);

        let mut manifest = Manifest::single(&input);
        let chain = vec![Operation::Normalize { gain: 0.5 }];

        let result = executor.run(&mut manifest, &chain);
        assert_eq!(result.failed, 1);

        // 任务结束后不残留临时副本
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("vidbatch-"))
            .collect();
        assert!(leftovers.is_empty());
        assert!(input.exists());
    }

    #[test]
    fn test_normalize_overrides_preceding_amplify_gain() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.mp4");
        fs::write(&input, b"video").unwrap();

        let backend = MockBackend::default();
        let logger = test_logger(dir.path());
        let executor = PipelineExecutor::new(&backend, &logger, None);

        let chain = vec![
            Operation::Amplify { decibels: 6.0 },
            Operation::Normalize { gain: 0.5 },
        ];

        let mut clip = backend.open(&input).unwrap();
        for op in &chain {
            match op {
                Operation::Rotate { degrees } => backend.rotate(&mut clip, *degrees).unwrap(),
                Operation::Amplify { decibels } => backend
                    .set_gain(&mut clip, ops::db_to_gain(*decibels))
                    .unwrap(),
                Operation::Normalize { gain } => backend.set_gain(&mut clip, *gain).unwrap(),
            }
        }

        // 最后一次 set_gain 覆盖之前的值
        assert_eq!(clip.applied.last().unwrap(), "gain:0.5");

        // 完整跑一遍确保执行器路径一致
        let mut manifest = Manifest::single(&input);
        let result = executor.run(&mut manifest, &chain);
        assert_eq!(result.success, 1);
    }
}
