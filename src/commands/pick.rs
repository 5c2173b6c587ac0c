use std::path::PathBuf;

use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;

use super::{init_logging, launcher, run_host_loop, LoopEnd};
use crate::config::Config;
use crate::host::HostContext;
use crate::picker::{FileFilter, PickMode, PickOutcome, PickTask};

pub struct PickArgs {
    pub mode: PickMode,
    pub start: Option<PathBuf>,
    pub filters: Vec<FileFilter>,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickStatus {
    Picked,
    Cancelled,
    Interrupted,
    DryRun,
}

/// Machine-readable result printed with `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickReport {
    pub status: PickStatus,
    pub paths: Vec<PathBuf>,
}

impl PickReport {
    fn from_outcome(outcome: Option<PickOutcome<Vec<PathBuf>>>) -> Self {
        match outcome {
            Some(PickOutcome::Picked(paths)) => Self {
                status: PickStatus::Picked,
                paths,
            },
            Some(PickOutcome::Cancelled) => Self::empty(PickStatus::Cancelled),
            None => Self::empty(PickStatus::Interrupted),
        }
    }

    fn empty(status: PickStatus) -> Self {
        Self {
            status,
            paths: Vec::new(),
        }
    }
}

/// Run one pick through the helper and print the answer.
pub fn execute(config: Config, args: PickArgs, dry_run: bool) -> Result<()> {
    let mut host = HostContext::new(config.clone(), launcher(dry_run));
    init_logging(&config, Some(host.console_slot()))?;
    host.install_exit_hooks()?;

    let Some(picker) = host.enable_picker() else {
        bail!("File picker could not be started");
    };

    if args.mode == PickMode::BrowseFiles {
        let dir = args
            .start
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"));
        if !picker.open_folder(&dir) {
            bail!("Not a directory: {}", dir.display());
        }
        host.shutdown();
        return Ok(());
    }

    let report = if args.mode == PickMode::OpenMultipleFiles {
        let task = picker.pick_many(args.start, args.filters)?;
        if dry_run {
            PickReport::empty(PickStatus::DryRun)
        } else {
            PickReport::from_outcome(wait(&host, &task))
        }
    } else {
        let task = picker.pick_one(args.start, args.mode, args.filters)?;
        if dry_run {
            PickReport::empty(PickStatus::DryRun)
        } else {
            let outcome = wait(&host, &task).map(|outcome| match outcome {
                PickOutcome::Picked(path) => PickOutcome::Picked(vec![path]),
                PickOutcome::Cancelled => PickOutcome::Cancelled,
            });
            PickReport::from_outcome(outcome)
        }
    };

    host.shutdown();
    print_report(&report, args.json)
}

fn wait<T>(host: &HostContext, task: &PickTask<T>) -> Option<PickOutcome<T>> {
    match run_host_loop(host, None, || task.is_ready()) {
        LoopEnd::Done => task.try_take(),
        LoopEnd::Exit(_) | LoopEnd::TimedOut => None,
    }
}

fn print_report(report: &PickReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    match report.status {
        PickStatus::Picked => {
            for path in &report.paths {
                println!("{}", path.display());
            }
        }
        PickStatus::Cancelled => eprintln!("{}", "Pick cancelled".yellow()),
        PickStatus::Interrupted => eprintln!("{}", "Pick interrupted".red()),
        PickStatus::DryRun => eprintln!("{}", "Dry run: no picker was opened".dimmed()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let report = PickReport::from_outcome(Some(PickOutcome::Picked(vec![
            PathBuf::from("/a.txt"),
            PathBuf::from("/b.txt"),
        ])));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "status": "picked", "paths": ["/a.txt", "/b.txt"] })
        );
    }

    #[test]
    fn test_report_without_outcome_is_interrupted() {
        let report = PickReport::from_outcome(None);
        assert_eq!(report.status, PickStatus::Interrupted);
        assert!(report.paths.is_empty());

        let cancelled = PickReport::from_outcome(Some(PickOutcome::Cancelled));
        assert_eq!(
            serde_json::to_value(&cancelled).unwrap(),
            serde_json::json!({ "status": "cancelled", "paths": [] })
        );
    }
}
