use std::process::ExitCode;
use anyhow::Result;
use clap::Parser;

use folderdiff::cli::{self, Cli};
use folderdiff::operations::CompareOperation;

fn main() -> ExitCode {
    // 宽松解析：未知参数只警告不报错
    let (args, warnings) = cli::normalize_args(std::env::args());
    for warning in &warnings {
        println!("{}", warning);
    }

    let cli = Cli::parse_from(args);

    // 日志输出到标准错误，避免混入比较结果
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut paths = cli.paths.iter();
    let (origin_root, new_root) = match (paths.next(), paths.next()) {
        (Some(origin), Some(new)) => (origin.clone(), new.clone()),
        _ => {
            Cli::print_help();
            return Ok(ExitCode::from(2));
        }
    };
    for extra in paths {
        println!("Warning: ignoring additional argument: {}", extra.display());
    }

    if !origin_root.is_dir() || !new_root.is_dir() {
        println!();
        println!("Error: could not find one of the paths provided ");
        println!("  {} or {}", origin_root.display(), new_root.display());
        println!();
        Cli::print_help();
        return Ok(ExitCode::from(2));
    }

    let config = cli.to_config(origin_root, new_root);
    let stdout = std::io::stdout();
    CompareOperation::new(config)
        .with_progress(cli.progress)
        .run(stdout.lock())?;

    Ok(ExitCode::SUCCESS)
}
