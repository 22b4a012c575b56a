//! # vidbatch - 批量视频旋转与音频增益工具
//!
//! 对单个视频或清单中的一批视频应用固定顺序的转换链
//! （旋转 90°、按分贝放大音频、归一化到指定增益乘数），
//! 输出写到不冲突的路径；实际编解码委托给外部 `ffmpeg`。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli.rs       (命令行参数定义与校验)
//!   ├── pipeline.rs  (批处理执行)
//!   │     ├── ops.rs      (操作链)
//!   │     ├── manifest.rs (输入清单)
//!   │     ├── paths.rs    (输出路径)
//!   │     └── backend.rs  (转换后端)
//!   ├── logging.rs   (文件日志)
//!   ├── utils/       (终端输出与进度条)
//!   └── error.rs     (错误处理)
//! ```
//!
//! ## 退出码约定
//! - 0: 正常完成（允许个别任务失败）
//! - 1: 启动期文件系统错误，或批处理跑完但没有任何任务成功
//! - 2: 参数错误

mod backend;
mod cli;
mod error;
mod logging;
mod manifest;
mod ops;
mod paths;
mod pipeline;
mod utils;

use std::path::Path;

use clap::Parser;

use backend::FfmpegBackend;
use cli::Cli;
use error::VidbatchError;
use logging::Logger;
use manifest::Manifest;
use pipeline::PipelineExecutor;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let logger = match Logger::open(Path::new(logging::LOG_FILE)) {
        Ok(logger) => logger,
        Err(e) => {
            utils::output::print_error(&format!("{}", e));
            return 1;
        }
    };

    // 参数错误：记录并在任何 I/O 之前中止
    if let Err(e) = cli.validate() {
        logger.error(&format!("{}", e));
        utils::output::print_error(&format!("{}", e));
        return 2;
    }

    let mut manifest = if let Some(input) = &cli.input {
        Manifest::single(input)
    } else {
        // validate 保证了 file_list 存在
        let list = cli.file_list.as_ref().unwrap();
        match Manifest::from_file(list) {
            Ok(manifest) => {
                utils::output::print_info(&format!(
                    "Loaded {} valid video entr{} from '{}'",
                    manifest.len(),
                    if manifest.len() == 1 { "y" } else { "ies" },
                    list.display()
                ));
                manifest
            }
            Err(e) => {
                logger.error(&format!("{}", e));
                utils::output::print_error(&format!("{}", e));
                return 1;
            }
        }
    };

    if manifest.is_empty() {
        utils::output::print_warning("No video entries to process");
        return 0;
    }

    if let Some(output_dir) = &cli.output {
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            let e = VidbatchError::FileWriteError {
                path: output_dir.display().to_string(),
                source: e,
            };
            logger.error(&format!("{}", e));
            utils::output::print_error(&format!("{}", e));
            return 1;
        }
    }

    let chain = ops::build_chain(cli.rotate, cli.db, cli.volume);

    utils::output::print_header(&format!(
        "Applying [{}] to {} file(s)",
        ops::chain_suffix(&chain),
        manifest.len()
    ));

    let backend = FfmpegBackend::new();
    let executor = PipelineExecutor::new(&backend, &logger, cli.output.as_deref());
    let result = executor.run(&mut manifest, &chain);

    utils::output::print_done(&format!(
        "Processed {} file(s): {} succeeded, {} failed",
        result.total(),
        result.success,
        result.failed
    ));

    if result.success == 0 && result.failed > 0 {
        1
    } else {
        0
    }
}
