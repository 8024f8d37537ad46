//! Configuration
//!
//! Every option can be set by flag or environment variable (`.env` supported
//! via dotenvy):
//!
//! | Flag | Environment variable | Default |
//! |------|----------------------|---------|
//! | `--work-dir` | `MESA_WORK_DIR` | `./mesa-board-data` |
//! | `--layout` | `MESA_LAYOUT` | built-in board (mesas 1-8) |
//! | `--export-dir` | `MESA_EXPORT_DIR` | `.` |
//! | `--log-level` | `MESA_LOG_LEVEL` | `info` |

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "mesa-board", about = "Painel de status de mesas", version)]
pub struct Cli {
    /// Work directory for the database and log files
    #[arg(long, env = "MESA_WORK_DIR", default_value = "./mesa-board-data")]
    pub work_dir: PathBuf,

    /// Board layout file (JSON array of {"id", "nome"}); omit for the default board
    #[arg(long, env = "MESA_LAYOUT")]
    pub layout: Option<PathBuf>,

    /// Directory where CSV exports are written
    #[arg(long, env = "MESA_EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "MESA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub layout: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            work_dir: cli.work_dir,
            layout: cli.layout,
            export_dir: cli.export_dir,
            log_level: cli.log_level,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.work_dir.join("board.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }
}
