//! scribe command-line tool
//!
//! Runs the reconciliation and linking engines over local files.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use scribe::{
    EntityCandidate, EntityLinker, InMemoryGenerationSink, InMemoryPageDirectory, JobFileSource,
    JobId, LinkContext, PageId, Pipeline, ScribeConfig, ScribeError, ScribeResult, WorldId,
};

enum Command {
    Merge {
        job: PathBuf,
        base_page: Option<PageId>,
    },
    Link {
        content: PathBuf,
        candidates: PathBuf,
        world: WorldId,
        cross_world: bool,
    },
    Unlink {
        content: PathBuf,
        page: PageId,
    },
}

struct Cli {
    config: Option<PathBuf>,
    command: Command,
}

fn print_help() {
    println!("scribe - suggestion reconciliation and wiki auto-linking");
    println!();
    println!("USAGE:");
    println!("    scribe [--config <FILE>] merge <JOB.json> [--base-page <ID>]");
    println!("    scribe [--config <FILE>] link <CONTENT.html> <CANDIDATES.json> --world <ID> [--cross-world]");
    println!("    scribe [--config <FILE>] unlink <CONTENT.html> --page <ID>");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>       JSON configuration file");
    println!("    -h, --help                Print help information");
    println!();
    println!("Set RUST_LOG=debug for engine statistics.");
}

fn parse_id(flag: &str, value: Option<&String>) -> Result<i64, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    value
        .parse()
        .map_err(|_| format!("invalid id for {flag}: {value}"))
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut config = None;
    let mut positional: Vec<&String> = Vec::new();
    let mut base_page = None;
    let mut world = None;
    let mut page = None;
    let mut cross_world = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args.get(i + 1).ok_or("--config requires a value")?;
                config = Some(PathBuf::from(path));
                i += 2;
            }
            "--base-page" => {
                base_page = Some(PageId::new(parse_id("--base-page", args.get(i + 1))?));
                i += 2;
            }
            "--world" => {
                world = Some(WorldId::new(parse_id("--world", args.get(i + 1))?));
                i += 2;
            }
            "--page" => {
                page = Some(PageId::new(parse_id("--page", args.get(i + 1))?));
                i += 2;
            }
            "--cross-world" => {
                cross_world = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            arg if arg.starts_with('-') => return Err(format!("unknown argument: {arg}")),
            _ => {
                positional.push(&args[i]);
                i += 1;
            }
        }
    }

    let (name, rest) = positional.split_first().ok_or("missing command")?;
    let command = match (name.as_str(), rest) {
        ("merge", [job]) => Command::Merge {
            job: PathBuf::from(job.as_str()),
            base_page,
        },
        ("link", [content, candidates]) => Command::Link {
            content: PathBuf::from(content.as_str()),
            candidates: PathBuf::from(candidates.as_str()),
            world: world.ok_or("link requires --world")?,
            cross_world,
        },
        ("unlink", [content]) => Command::Unlink {
            content: PathBuf::from(content.as_str()),
            page: page.ok_or("unlink requires --page")?,
        },
        ("merge" | "link" | "unlink", _) => {
            return Err(format!("wrong number of arguments for {name}"));
        }
        (other, _) => return Err(format!("unknown command: {other}")),
    };

    Ok(Cli { config, command })
}

fn read(path: &Path) -> ScribeResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ScribeError::internal(format!("read {}: {e}", path.display())))
}

fn load_config(path: Option<&Path>) -> ScribeResult<ScribeConfig> {
    match path {
        Some(path) => ScribeConfig::from_json(&read(path)?),
        None => Ok(ScribeConfig::default()),
    }
}

fn run(cli: Cli) -> ScribeResult<String> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Merge { job, base_page } => {
            let dir = job.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let job_id = job
                .file_stem()
                .and_then(|s| s.to_str())
                .map(JobId::from)
                .ok_or_else(|| ScribeError::internal(format!("invalid job path: {}", job.display())))?;

            let pipeline = Pipeline::new(
                config,
                Arc::new(JobFileSource::new(dir)),
                Arc::new(InMemoryPageDirectory::new()),
                Arc::new(InMemoryGenerationSink::new()),
            )?;
            let session = pipeline.open_session(&job_id)?;
            let request = pipeline.prepare(&session, base_page)?;
            request.to_json_pretty()
        }
        Command::Link {
            content,
            candidates,
            world,
            cross_world,
        } => {
            let html = read(&content)?;
            let pages: Vec<EntityCandidate> = serde_json::from_str(&read(&candidates)?)
                .map_err(|e| ScribeError::internal(format!("parse candidates: {e}")))?;
            let linker = EntityLinker::new(config.linker);
            Ok(linker.link(&html, &pages, &LinkContext::new(world).cross_world(cross_world)))
        }
        Command::Unlink { content, page } => {
            let html = read(&content)?;
            let (out, _) = scribe::link::unlink_page(&html, page, &config.linker.route_prefix);
            Ok(out)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        eprintln!("run `scribe --help` for usage");
        process::exit(2);
    });

    match run(cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
