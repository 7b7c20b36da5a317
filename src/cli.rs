use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use crate::config::{CompareConfig, ErrorPolicy, OutputFormat, ReportLevel};

const AFTER_HELP: &str = "\
DESCRIPTION:
  The following differences between the two folders are returned:
    Any files that are newer in ORIGIN_PATH than in NEW_PATH
    Any files that are in ORIGIN_PATH but not in NEW_PATH
  Every reported file is printed with its path relative to the root:
    CHA xxxx <- (CHANGED) file in ORIGIN_PATH is newer and different than in NEW_PATH
    MIS xxxx <- (MISSING) file or directory is missing in NEW_PATH
    OKN xxxx <- (NEWER) file in NEW_PATH is newer, only with --report=newer or all

EXAMPLES:
  folderdiff --exclude=\"/exclude_me\" /test/a /test/b
    Changes made in /test/a after /test/b are highlighted
    Changes made in /test/b after /test/a are ignored
    Any changes in /test/a/exclude_me are ignored";

#[derive(Parser, Debug)]
#[command(name = "folderdiff")]
#[command(about = "Recursively search for files that have been changed or added")]
#[command(version)]
#[command(after_long_help = AFTER_HELP)]
pub struct Cli {
    /// ORIGIN_PATH NEW_PATH
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Check for changes regardless of timestamp. Files are compared by content
    /// even if the file in NEW_PATH has the same or a newer timestamp
    #[arg(long)]
    pub ignore_times: bool,

    /// Exclude a part of the folder structure. Matched against the start of the
    /// relative path (starting with a /). May be given multiple times
    #[arg(long, value_name = "EXCLUDE_PATH")]
    pub exclude: Vec<String>,

    /// Which results to print
    #[arg(long, value_enum, default_value_t = ReportLevel::Issues)]
    pub report: ReportLevel,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// What to do when a file or directory cannot be read
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub on_error: ErrorPolicy,

    /// Worker threads; 1 walks sequentially, 0 uses one per CPU
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,

    /// Descend into symlinked directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,

    /// Verbose logging on stderr
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// 用两个根目录构造比较配置
    pub fn to_config(&self, origin_root: PathBuf, new_root: PathBuf) -> CompareConfig {
        CompareConfig {
            origin_root,
            new_root,
            excludes: self.exclude.clone(),
            ignore_times: self.ignore_times,
            follow_symlinks: self.follow_symlinks,
            report: self.report,
            on_error: self.on_error,
            format: self.format,
            jobs: self.jobs,
        }
    }

    /// 打印完整帮助到标准输出
    pub fn print_help() {
        let _ = Self::command().print_long_help();
        println!();
    }
}

/// 宽松地预处理命令行参数
///
/// 未知的 `--` 参数和格式错误的 `--exclude` 只产生警告并被丢弃，
/// 不带值的开关上多余的 `=...` 会被去掉。其余不以 `--` 开头的参数都是路径，
/// 统一放到 `--` 之后交给 clap，因此 `-o` 这样的目录名也能作为路径。
/// 返回交给 clap 的参数和警告列表。
pub fn normalize_args<I>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let command = Cli::command();
    let mut flags = vec!["help".to_string(), "version".to_string()];
    let mut options = Vec::new();
    for arg in command.get_arguments() {
        if let Some(long) = arg.get_long() {
            if arg.get_action().takes_values() {
                options.push(long.to_string());
            } else {
                flags.push(long.to_string());
            }
        }
    }

    let mut args = args.into_iter();
    let mut normalized: Vec<String> = args.next().into_iter().collect();
    let mut positionals = Vec::new();
    let mut warnings = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            positionals.extend(args.by_ref());
            break;
        }
        if !arg.starts_with("--") {
            positionals.push(arg);
            continue;
        }

        let name = arg[2..].split('=').next().unwrap_or_default();
        if name == "exclude" {
            let parts: Vec<&str> = arg.split('=').collect();
            if parts.len() == 2 && !parts[1].is_empty() {
                normalized.push(arg);
            } else {
                warnings.push("Warning: illegal exclude argument".to_string());
            }
        } else if flags.iter().any(|flag| flag == name) {
            normalized.push(format!("--{}", name));
        } else if options.iter().any(|option| option == name) {
            let has_value = arg.contains('=');
            normalized.push(arg);
            // `--jobs 4` 形式：下一个参数是值
            if !has_value {
                normalized.extend(args.next());
            }
        } else {
            warnings.push(format!("Warning: unknown parameter: {}", arg));
        }
    }

    if !positionals.is_empty() {
        normalized.push("--".to_string());
        normalized.extend(positionals);
    }

    (normalized, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("folderdiff")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_normalize_drops_unknown_and_bad_exclude() {
        let (normalized, warnings) = normalize_args(args(&[
            "--bogus",
            "--exclude",
            "--exclude=",
            "--exclude=a=b",
            "--exclude=/keep",
            "--ignore-times=yes",
            "a",
            "b",
        ]));

        assert_eq!(
            normalized,
            args(&["--exclude=/keep", "--ignore-times", "--", "a", "b"])
        );
        assert_eq!(
            warnings,
            vec![
                "Warning: unknown parameter: --bogus".to_string(),
                "Warning: illegal exclude argument".to_string(),
                "Warning: illegal exclude argument".to_string(),
                "Warning: illegal exclude argument".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_full_command_line() {
        let (normalized, warnings) = normalize_args(args(&[
            "--ignore-times",
            "--exclude=/tmp",
            "--exclude=/cache",
            "--report=newer",
            "--format=json",
            "--on-error=skip",
            "--jobs=4",
            "origin",
            "new",
            "extra",
        ]));
        assert!(warnings.is_empty());

        let cli = Cli::try_parse_from(normalized).unwrap();
        assert!(cli.ignore_times);
        assert_eq!(cli.exclude, vec!["/tmp".to_string(), "/cache".to_string()]);
        assert_eq!(cli.paths.len(), 3);

        let config = cli.to_config(cli.paths[0].clone(), cli.paths[1].clone());
        assert_eq!(config.report, ReportLevel::Newer);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.on_error, ErrorPolicy::Skip);
        assert_eq!(config.jobs, 4);
        assert!(config.is_parallel());
    }

    #[test]
    fn test_dash_prefixed_paths() {
        let (normalized, warnings) =
            normalize_args(args(&["-o", "--jobs", "2", "-n", "--report=all"]));
        assert!(warnings.is_empty());
        assert_eq!(
            normalized,
            args(&["--jobs", "2", "--report=all", "--", "-o", "-n"])
        );

        let cli = Cli::try_parse_from(normalized).unwrap();
        assert_eq!(cli.paths, vec![PathBuf::from("-o"), PathBuf::from("-n")]);
        assert_eq!(cli.jobs, 2);
        assert_eq!(cli.report, ReportLevel::All);
    }

    #[test]
    fn test_explicit_separator_keeps_flag_like_paths() {
        let (normalized, warnings) =
            normalize_args(args(&["--ignore-times", "--", "--not-a-flag", "b"]));
        assert!(warnings.is_empty());

        let cli = Cli::try_parse_from(normalized).unwrap();
        assert!(cli.ignore_times);
        assert_eq!(cli.paths, vec![PathBuf::from("--not-a-flag"), PathBuf::from("b")]);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(args(&["a", "b"])).unwrap();
        let config = cli.to_config(cli.paths[0].clone(), cli.paths[1].clone());
        assert!(!config.ignore_times);
        assert!(config.excludes.is_empty());
        assert_eq!(config.report, ReportLevel::Issues);
        assert_eq!(config.on_error, ErrorPolicy::Abort);
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
