use anyhow::{anyhow, Context, Result};
use kestrel_xr::body::{BodyAnimData, BodyPlayback};
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

fn main() {
    match run() {
        Ok(summary) => {
            if summary.invalid > 0 {
                process::exit(2);
            }
        }
        Err(err) => {
            eprintln!("body_anim_check error: {err:?}");
            process::exit(1);
        }
    }
}

#[derive(Default, Serialize)]
struct RunSummary {
    checked: usize,
    invalid: usize,
}

struct CliOptions {
    report_stats: bool,
    show_help: bool,
    seek_ms: Option<f64>,
    targets: Vec<String>,
}

fn run() -> Result<RunSummary> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_cli_args(&args)?;
    if options.show_help {
        print_usage();
        return Ok(RunSummary::default());
    }
    let targets = collect_targets(&options.targets)?;
    if targets.is_empty() {
        return Err(anyhow!("no body animation files found in provided paths"));
    }
    let mut summary = RunSummary::default();
    for path in targets {
        summary.checked += 1;
        let data = match BodyAnimData::load(&path) {
            Ok(data) => Arc::new(data),
            Err(err) => {
                summary.invalid += 1;
                println!("[ERROR] {} - {err:#}", path.display());
                if options.report_stats {
                    println!("{}", json!({ "path": path.display().to_string(), "error": format!("{err:#}") }));
                }
                continue;
            }
        };
        println!(
            "OK {} ({} rows, {:.1} ms, version {})",
            path.display(),
            data.row_count(),
            data.total_time_ms(),
            data.version()
        );
        let seek = options.seek_ms.and_then(|ms| seek_row(&data, ms).map(|row| (ms, row)));
        if let Some((ms, row)) = seek {
            let timestamp = data.row_timestamp(row).unwrap_or_default();
            println!("  seek {ms:.1} ms -> row {row} (timestamp {timestamp:.1} ms)");
        }
        if options.report_stats {
            let json_value = json!({
                "path": path.display().to_string(),
                "rows": data.row_count(),
                "total_time_ms": data.total_time_ms(),
                "version": data.version(),
                "seek_row": seek.map(|(_, row)| row),
            });
            println!("{json_value}");
        }
    }
    println!("Checked {} animations ({} invalid)", summary.checked, summary.invalid);
    if options.report_stats {
        println!("{}", json!({ "summary": summary }));
    }
    Ok(summary)
}

fn seek_row(data: &Arc<BodyAnimData>, time_ms: f64) -> Option<usize> {
    if data.is_empty() {
        return None;
    }
    let mut playback = BodyPlayback::new(Arc::clone(data));
    playback.start(0.0);
    playback.set_time(time_ms, 0.0);
    Some(playback.current_row())
}

fn print_usage() {
    eprintln!(
        "Body Animation Check

Usage:
  body_anim_check [--seek <ms>] [--report-stats] <path> [<path>...]

Each <path> may be a file or directory. Directories are walked recursively
and JSON files are validated against the body animation schema. --seek
resolves the playback row for the given time in every valid file.
"
    );
}

fn parse_cli_args(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions { report_stats: false, show_help: false, seek_ms: None, targets: Vec::new() };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--report-stats" => options.report_stats = true,
            "--help" | "-h" => options.show_help = true,
            "--seek" => {
                let value = iter.next().ok_or_else(|| anyhow!("--seek requires a value in milliseconds"))?;
                let ms = value.parse::<f64>().with_context(|| format!("invalid --seek value '{value}'"))?;
                options.seek_ms = Some(ms);
            }
            _ if arg.starts_with("--") => {
                return Err(anyhow!("unknown flag '{arg}'"));
            }
            _ => options.targets.push(arg.clone()),
        }
    }
    Ok(options)
}

fn collect_targets(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    for input in inputs {
        let path = PathBuf::from(input);
        if path.is_file() {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        } else if path.is_dir() {
            walk_dir(&path, &mut seen, &mut files)
                .with_context(|| format!("failed to enumerate directory '{}'", path.display()))?;
        } else {
            return Err(anyhow!("path '{}' does not exist", input));
        }
    }
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(&path, seen, files)?;
        } else if is_json(&path) && seen.insert(path.clone()) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
