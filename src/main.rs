use clap::Parser;
use colored::*;
use log::{error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

mod cmdfile;
mod compdb;
mod config;
mod error;
mod progress;
mod util;

use cmdfile::ParseParams;
use config::Config;
use error::Result;
use progress::Progress;

/// Generate compile_commands.json for kernel
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// build target
    #[arg(long)]
    target: Option<String>,
    /// android root dir in host PC
    #[arg(long = "android_root")]
    android_root: Option<PathBuf>,
    /// the android root dir in docker build env
    #[arg(long = "docker_android_root")]
    docker_android_root: Option<PathBuf>,
    /// where to write the database [default: ../compile_commands.json]
    #[arg(long)]
    output: Option<PathBuf>,
    /// TOML file supplying defaults for the options above
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let cli = Config {
            target: self.target,
            android_root: self.android_root,
            docker_android_root: self.docker_android_root,
            output: self.output,
        };
        match &self.config {
            Some(path) => Ok(cli.or(Config::read(path)?)),
            None => Ok(cli),
        }
    }
}

fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] [{}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();

    let config = match args.into_config() {
        Ok(c) => c,
        Err(e) => fail(e),
    };
    let (target, root) = match required(&config) {
        Ok(r) => r,
        Err(code) => std::process::exit(code),
    };
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(compdb::DEFAULT_OUTPUT));

    if let Err(e) = run(
        &target,
        &root,
        config.docker_android_root.as_deref(),
        &output,
        &progress::Bar,
    ) {
        fail(e);
    }
}

/// The target and build root, or the exit status for the first one
/// missing.
fn required(config: &Config) -> std::result::Result<(String, PathBuf), i32> {
    let target = match &config.target {
        Some(t) => t.clone(),
        None => {
            error!("no target");
            return Err(-2);
        }
    };
    let root = match &config.android_root {
        Some(r) => r.clone(),
        None => {
            error!("no android root dir");
            return Err(-3);
        }
    };
    Ok((target, root))
}

fn fail(e: error::Error) -> ! {
    error!("{:?}: {}", e, e);
    eprintln!("{} {}", "error".red(), e);
    std::process::exit(1);
}

/// Locate the cmd files of `target` under `root`, parse them and write the
/// database to `output`. Nothing is written when no cmd file exists.
fn run(
    target: &str,
    root: &Path,
    docker_root: Option<&Path>,
    output: &Path,
    progress: &dyn Progress,
) -> Result<()> {
    info!("Building *.o.cmd file list...");
    info!("Build root of target {} is '{}'", target, root.display());

    let output_dir = util::object_dir(target);
    let params = ParseParams::new(root, docker_root, &output_dir)?;
    let search_path = Path::new(&params.directory).join(&output_dir);
    info!("Searching *.o.cmd from path {}...", search_path.display());
    let cmd_files = util::find_cmd_files(&search_path)?;
    if cmd_files.is_empty() {
        info!("No *.o.cmd files found in {}", search_path.display());
        return Ok(());
    }

    info!("Parsing {} *.o.cmd files...", cmd_files.len());
    let db = util::build_compdb(&params, &cmd_files, progress)?;

    info!("Writing {} entries to {}...", db.len(), output.display());
    compdb::emit_file(output, &db)
}
