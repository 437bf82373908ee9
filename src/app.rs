use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::filter::CategoryFilter;
use crate::output::{self, OutputFormat};
use crate::runner::{self, Runner, View, ViewRequest};
use crate::sheets;
use crate::utils;

fn print_banner() {
    eprintln!(
        "{} {}",
        "bpbd-board".bold(),
        format!("v{} - {}", env!("CARGO_PKG_VERSION"), output::AGENCY).dimmed()
    );
    eprintln!();
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn format_opt_value<'a>(v: &'a str, default: &'a str) -> &'a str {
    if v.trim().is_empty() {
        default
    } else {
        v
    }
}

/// 0 → warn, 1 → info, 2+ → debug. `RUST_LOG` wins when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    view: View,
    query: String,
    category: CategoryFilter,
    page: Option<usize>,
    collapsed: Vec<String>,
    options: runner::Options,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
}

impl RunConfig {
    fn request(&self) -> ViewRequest {
        let mut request = ViewRequest::new(self.view)
            .with_query(self.query.clone())
            .with_category(self.category.clone())
            .with_collapsed(self.collapsed.clone());
        if let Some(page) = self.page {
            request = request.with_page(page);
        }
        request
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let view = args
        .view
        .as_deref()
        .and_then(View::parse)
        .ok_or_else(|| "missing view".to_string())?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json, or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let defaults = runner::Options::default();
    let fixture = args
        .fixture
        .or(cfg.fixture)
        .map(|p| config::expand_tilde_string(&p));
    let options = runner::Options {
        spreadsheet_id: args
            .spreadsheet_id
            .or(cfg.spreadsheet_id)
            .unwrap_or(defaults.spreadsheet_id),
        api_key: args
            .api_key
            .or(cfg.api_key)
            .or_else(|| std::env::var("BPBD_SHEETS_API_KEY").ok()),
        api_base: cfg
            .api_base
            .unwrap_or_else(|| sheets::DEFAULT_API_BASE.to_string()),
        fixture,
        timeout_seconds: args.timeout.or(cfg.timeout).unwrap_or(defaults.timeout_seconds),
        revalidate_seconds: cfg
            .revalidate_seconds
            .unwrap_or(defaults.revalidate_seconds),
        evacuee_sources: cfg.evacuee_sources.unwrap_or(defaults.evacuee_sources),
        deceased_range: cfg.deceased_range.unwrap_or(defaults.deceased_range),
        helipad_range: cfg.helipad_range.unwrap_or(defaults.helipad_range),
        posko_range: cfg.posko_range.unwrap_or(defaults.posko_range),
        posko_total_range: cfg.posko_total_range.or(defaults.posko_total_range),
        last_update_range: cfg.last_update_range.or(defaults.last_update_range),
    };
    if options.timeout_seconds == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }

    Ok(RunConfig {
        view,
        query: args.query.unwrap_or_default().trim().to_string(),
        category: args
            .category
            .as_deref()
            .map(CategoryFilter::parse)
            .unwrap_or_default(),
        page: args.page,
        collapsed: args
            .collapse
            .as_deref()
            .map(utils::parse_name_list_csv)
            .unwrap_or_default(),
        options,
        output,
        output_format,
        no_color,
    })
}

fn build_spinner(view: View) -> Result<ProgressBar, String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress style: {e}"))?,
    );
    pb.set_message(format!("Memuat {}", view.title()));
    Ok(pb)
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let source = match run.options.fixture.as_deref() {
        Some(path) => format!("fixture {path}"),
        None => format!("sheet {}", run.options.spreadsheet_id),
    };
    format_kv_line("View", run.view.title());
    format_kv_line("Source", &source);
    format_kv_line("Query", format_opt_value(&run.query, "-"));
    if let CategoryFilter::Exact(value) = &run.category {
        format_kv_line("Category", value);
    }
    format_kv_line("Format", run.output_format.as_str());
    if let Some(path) = run.output.as_deref() {
        format_kv_line("Output", path);
    }
    eprintln!();

    let runner = Runner::new(run.options.clone())
        .await
        .map_err(|e| e.to_string())?;
    let request = run.request();

    let now = Instant::now();
    let pb = build_spinner(run.view)?;
    let result = runner.render_view(&request).await;
    pb.finish_and_clear();
    let view = result.map_err(|e| e.to_string())?;
    tracing::info!(
        shown = view.summary.shown,
        total = view.summary.total,
        elapsed_ms = now.elapsed().as_millis() as u64,
        "view rendered"
    );

    let rendered = output::render(&view, run.output_format);
    match run.output.as_deref() {
        Some(outfile_path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(outfile_path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output file: {e}"))?;
            eprintln!(":: {} :: {}", "Saved".green(), view.summary_text);
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to flush stdout: {e}"))?;
        }
    }
    Ok(())
}

fn init_config(args: &CliArgs) -> Result<(), String> {
    let path = match args.config.as_deref() {
        Some(p) => config::expand_tilde(p),
        None => config::default_config_path()
            .ok_or_else(|| "could not determine home directory for config".to_string())?,
    };
    if config::ensure_default_config_file(&path)? {
        format_kv_line("Config", &format!("written to {}", path.display()));
    } else {
        format_kv_line("Config", &format!("already exists at {}", path.display()));
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                let mut cmd = CliArgs::command();
                print!("{}", cmd.render_long_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    if args.init_config {
        return init_config(&args);
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
