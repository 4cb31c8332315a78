// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;
mod snapshot;

use anyhow::{Context, Result, anyhow};
use config::Config;
use logging::{LogTarget, init_logging};
use roster_app::TableState;
use runtime::DemoRuntime;
use snapshot::{Snapshot, StartupQuery, parse_sort_key, parse_status};
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let headless = options.dump || options.check_only;
    let log_target = match (&options.log_file, headless) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Disabled,
    };
    init_logging(log_target)?;

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `roster --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let settings = config.table_settings().with_context(|| {
        format!(
            "invalid [table] or [delays] config in {}",
            options.config_path.display()
        )
    })?;

    let mut runtime = DemoRuntime::new(config.total_records()?);
    let mut state = TableState::new(runtime.records(), settings)?;
    options.query.apply(&mut state)?;
    info!(
        records = state.records().len(),
        matched = state.view().full_count(),
        "table ready"
    );

    if options.check_only {
        return Ok(());
    }

    if options.dump {
        println!("{}", Snapshot::capture(&state).to_json()?);
        return Ok(());
    }

    roster_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    dump: bool,
    check_only: bool,
    log_file: Option<PathBuf>,
    query: StartupQuery,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        dump: false,
        check_only: false,
        log_file: None,
        query: StartupQuery::default(),
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let path = flag_value(&mut iter, "--config", "a file path")?;
                options.config_path = PathBuf::from(path);
            }
            "--log-file" => {
                let path = flag_value(&mut iter, "--log-file", "a file path")?;
                options.log_file = Some(PathBuf::from(path));
            }
            "--search" => {
                let search = flag_value(&mut iter, "--search", "a name fragment")?;
                options.query.search = Some(search);
            }
            "--status" => {
                let raw = flag_value(&mut iter, "--status", "a status")?;
                options.query.status = Some(parse_status(&raw)?);
            }
            "--from" => {
                let date = flag_value(&mut iter, "--from", "a YYYY-MM-DD date")?;
                options.query.start_date = Some(date);
            }
            "--to" => {
                let date = flag_value(&mut iter, "--to", "a YYYY-MM-DD date")?;
                options.query.end_date = Some(date);
            }
            "--sort" => {
                let raw = flag_value(&mut iter, "--sort", "a column key")?;
                options.query.sort = Some(parse_sort_key(&raw)?);
            }
            "--desc" => {
                options.query.descending = true;
            }
            "--page" => {
                let raw = flag_value(&mut iter, "--page", "a page number")?;
                let page = raw
                    .parse::<usize>()
                    .with_context(|| format!("--page expects a whole number, got {raw:?}"))?;
                options.query.page = Some(page);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--dump" => {
                options.dump = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.query.descending && options.query.sort.is_none() {
        return Err(anyhow!("--desc requires --sort <key>"));
    }

    Ok(options)
}

fn flag_value<I, S>(iter: &mut I, flag: &str, what: &str) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn print_help() {
    println!("roster");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --search <text>          Start with a name search");
    println!("  --status <status>        Start filtered to active, invited, or blocked");
    println!("  --from <date>            Start date bound (YYYY-MM-DD)");
    println!("  --to <date>              End date bound (YYYY-MM-DD)");
    println!("  --sort <key> [--desc]    Sort by name, email, date, invitedBy, or status");
    println!("  --page <n>               Start on page n");
    println!("  --dump                   Print the current page as JSON and exit");
    println!("  --check                  Validate config and startup, then exit");
    println!("  --log-file <path>        Append logs to a file (RUST_LOG sets the level)");
    println!("  --help                   Show this help");
}
