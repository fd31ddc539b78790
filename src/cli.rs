use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use log::LevelFilter;

use guacamol_eval::eval::{
    EvalConfig, DEFAULT_BENCHMARK_VERSION, DEFAULT_NUM_MOLECULES, DEFAULT_REFERENCE_PATH,
};
use guacamol_eval::logging::{LogConfig, DEFAULT_RETENTION_DAYS};

#[derive(Parser, Debug)]
#[command(
    name = "guacamol-eval",
    about = "Evaluate generated molecules with the GuacaMol distribution-learning benchmark",
    version
)]
pub struct Cli {
    /// Generated molecules (CSV with `smiles`[, `valid`] columns, or headerless)
    #[arg(short, long, value_name = "FILE", env = "GUACAMOL_GENERATED")]
    pub generated: PathBuf,

    /// GuacaMol training molecules [default: <project root>/data/guacamol/guacamol_v1_train.csv]
    #[arg(short, long, value_name = "FILE", env = "GUACAMOL_REFERENCE")]
    pub reference: Option<PathBuf>,

    /// Number of generated molecules to evaluate
    #[arg(
        short = 'n',
        long,
        value_name = "N",
        default_value_t = DEFAULT_NUM_MOLECULES,
        env = "GUACAMOL_NUM_MOLECULES"
    )]
    pub num_molecules: usize,

    /// Number of reference molecules to compare against, at least --num-molecules [default: all]
    #[arg(long, value_name = "N", env = "GUACAMOL_NUM_REFERENCE")]
    pub num_reference: Option<usize>,

    /// Report file [default: GuacaMolEval.json next to the generated molecules]
    #[arg(short, long, value_name = "FILE", env = "GUACAMOL_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Evaluate every generated molecule, not only those flagged valid
    #[arg(long, env = "GUACAMOL_ALL_MOLECULES")]
    pub all_molecules: bool,

    /// Python interpreter with the `guacamol` package installed
    #[arg(long, value_name = "EXE", default_value = "python3", env = "GUACAMOL_PYTHON")]
    pub python: String,

    /// GuacaMol benchmark suite version
    #[arg(long, value_name = "VERSION", default_value = DEFAULT_BENCHMARK_VERSION)]
    pub benchmark_version: String,

    #[command(flatten)]
    pub log: LogOptions,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Logging")]
pub struct LogOptions {
    /// Log level (off, error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LevelFilter,

    /// Directory for daily log files [default: <project root>/logs]
    #[arg(long, value_name = "DIR", env = "GUACAMOL_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log to the console only
    #[arg(long, conflicts_with = "log_dir")]
    pub no_log_file: bool,

    /// Days to keep old log files
    #[arg(long, value_name = "DAYS", default_value_t = DEFAULT_RETENTION_DAYS)]
    pub log_retention: u32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

impl Cli {
    /// Resolve defaults that depend on the project root.
    pub fn eval_config(&self, root: &Path) -> EvalConfig {
        let reference = self
            .reference
            .clone()
            .unwrap_or_else(|| root.join(DEFAULT_REFERENCE_PATH));

        EvalConfig {
            num_molecules: self.num_molecules,
            num_reference: self.num_reference,
            output: self.output.clone(),
            valid_only: !self.all_molecules,
            benchmark_version: self.benchmark_version.clone(),
            ..EvalConfig::new(&self.generated, reference)
        }
    }

    pub fn log_config(&self, root: &Path) -> LogConfig {
        let log_dir = if self.log.no_log_file {
            None
        } else {
            Some(self.log.log_dir.clone().unwrap_or_else(|| root.join("logs")))
        };

        LogConfig {
            level: self.log.log_level,
            log_dir,
            retention_days: self.log.log_retention,
            ..LogConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("guacamol-eval").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = parse_args(&["-g", "runs/gen.csv"]);
        let config = cli.eval_config(Path::new("/proj"));

        assert_eq!(config.generated, PathBuf::from("runs/gen.csv"));
        assert_eq!(
            config.reference,
            PathBuf::from("/proj/data/guacamol/guacamol_v1_train.csv")
        );
        assert_eq!(config.num_molecules, 10_000);
        assert_eq!(config.num_reference, None);
        assert_eq!(config.output, None);
        assert!(config.valid_only);
        assert_eq!(config.benchmark_version, "v1");
        assert_eq!(cli.python, "python3");

        let log = cli.log_config(Path::new("/proj"));
        assert_eq!(log.level, LevelFilter::Info);
        assert_eq!(log.log_dir, Some(PathBuf::from("/proj/logs")));
    }

    #[test]
    fn explicit_flags() {
        let cli = parse_args(&[
            "--generated",
            "gen.csv",
            "-r",
            "ref.csv",
            "-n",
            "500",
            "--num-reference",
            "2000",
            "-o",
            "out/report.json",
            "--all-molecules",
            "--log-level",
            "debug",
            "--no-log-file",
        ]);
        let config = cli.eval_config(Path::new("/proj"));

        assert_eq!(config.reference, PathBuf::from("ref.csv"));
        assert_eq!(config.num_molecules, 500);
        assert_eq!(config.num_reference, Some(2000));
        assert_eq!(config.output, Some(PathBuf::from("out/report.json")));
        assert!(!config.valid_only);

        let log = cli.log_config(Path::new("/proj"));
        assert_eq!(log.level, LevelFilter::Debug);
        assert_eq!(log.log_dir, None);
    }

    #[test]
    fn generated_is_required() {
        let err = Cli::try_parse_from(["guacamol-eval", "-n", "10"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn negative_retention_is_rejected() {
        let parsed = Cli::try_parse_from(["guacamol-eval", "-g", "gen.csv", "--log-retention=-1"]);
        assert!(parsed.is_err());
    }
}
