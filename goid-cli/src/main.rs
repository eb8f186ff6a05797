use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use goid_pm::{
    check_case_collisions, match_go_import, parse_meta_go_imports, GopathWorkspace, ImportMeta,
    Platform, SharedLibNamer,
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[cfg(windows)]
const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: char = ':';

#[derive(Parser)]
#[command(name = "goid")]
#[command(version)]
#[command(about = "Package identity tools for Go-style builds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the go-import records of an HTML document
    Meta {
        /// HTML file (default: stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Only print the record serving this import path
        #[arg(long, value_name = "IMPORT_PATH")]
        import_path: Option<String>,

        /// Output records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report import paths that collide on a case-insensitive filesystem
    Folddup {
        /// Import paths, in build order
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },

    /// Derive the file name of a shared library built from packages
    Libname {
        /// Command-line package patterns
        #[arg(value_name = "PATTERN")]
        patterns: Vec<String>,

        /// Import path the patterns resolved to (repeatable, in order)
        #[arg(long = "pkg", value_name = "IMPORT_PATH")]
        packages: Vec<String>,

        /// Target platform, e.g. linux-x64 (default: host)
        #[arg(long, value_name = "OS-ARCH")]
        target: Option<String>,

        /// Workspace root holding packages under src/
        #[arg(
            long = "workspace-root",
            value_name = "DIR",
            env = "GOPATH",
            value_delimiter = PATH_LIST_SEPARATOR
        )]
        workspace_roots: Vec<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Meta {
            input,
            import_path,
            json,
        } => {
            let bytes = read_input(input.as_ref())?;
            let imports = parse_meta_go_imports(&bytes).context("failed to parse go-import tags")?;
            log::info!("Found {} go-import record(s)", imports.len());

            let selected = match import_path {
                Some(path) => vec![match_go_import(&imports, &path)?.clone()],
                None => imports,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&selected)?);
            } else {
                for meta in &selected {
                    println!("{}", format_record(meta));
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Folddup { paths } => match check_case_collisions(&paths) {
            Ok(()) => Ok(ExitCode::SUCCESS),
            Err(err) => {
                eprintln!("goid folddup: {}", err);
                Ok(ExitCode::FAILURE)
            }
        },

        Commands::Libname {
            patterns,
            packages,
            target,
            workspace_roots,
        } => {
            let platform = target
                .as_deref()
                .map(Platform::from_target)
                .unwrap_or_else(Platform::detect);
            log::info!("Naming shared library for {}", platform.to_target_string());

            let cwd = std::env::current_dir().context("failed to read current directory")?;
            let workspace = GopathWorkspace::new(cwd, workspace_roots);
            let namer = SharedLibNamer::new(platform.shared_lib_style());

            match namer.name(&patterns, &packages, &workspace) {
                Ok(name) => {
                    println!("{}", name);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("goid libname {}: {}", patterns.join(" "), err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn read_input(input: Option<&PathBuf>) -> Result<Vec<u8>> {
    match input {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
            Ok(bytes)
        }
    }
}

/// Same layout as the content attribute the record came from
fn format_record(meta: &ImportMeta) -> String {
    format!("{} {} {}", meta.prefix, meta.vcs, meta.repo_root)
}
