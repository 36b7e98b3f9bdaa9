//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use footprint_artifacts::{ArtifactWriter, PipelineRecord};
use footprint_core::activity::{ActivityRange, collect_activity};
use footprint_core::pipeline::{ProgressReporter, run_github, run_leetcode};
use footprint_shared::{
    AppConfig, GitHubConfig, LeetCodeConfig, OutputDocument, init_config, load_config,
    validate_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

const GITHUB_STEM: &str = "github_profile";
const LEETCODE_STEM: &str = "leetcode_profile";
const ACTIVITY_STEM: &str = "activity";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// footprint: a developer's public activity as AI-ready documents.
#[derive(Parser)]
#[command(
    name = "footprint",
    version,
    about = "Aggregate GitHub and LeetCode activity into text documents and raw JSON archives.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch a GitHub profile, its repositories and recent commits.
    Github {
        /// GitHub account (defaults to the configured username).
        #[arg(short, long, env = "GITHUB_USERNAME")]
        username: Option<String>,

        /// Artifact root directory (defaults to `output.dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Fetch a LeetCode profile and recent accepted submissions.
    Leetcode {
        /// LeetCode account (defaults to the configured username).
        #[arg(short, long, env = "LEETCODE_USERNAME")]
        username: Option<String>,

        /// Artifact root directory (defaults to `output.dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run the GitHub pipeline, then the LeetCode pipeline.
    All {
        #[arg(long, env = "GITHUB_USERNAME")]
        github_user: Option<String>,

        #[arg(long, env = "LEETCODE_USERNAME")]
        leetcode_user: Option<String>,

        /// Artifact root directory (defaults to `output.dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Build the daily activity timeline across both sources.
    Activity {
        /// Window ending today: 30d, 90d or 1y.
        #[arg(short, long, default_value = "1y")]
        range: String,

        #[arg(long, env = "GITHUB_USERNAME")]
        github_user: Option<String>,

        #[arg(long, env = "LEETCODE_USERNAME")]
        leetcode_user: Option<String>,

        /// Artifact root directory (defaults to `output.dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "footprint=info",
        1 => "footprint=debug",
        _ => "footprint=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Github { username, out } => {
            let mut config = load_config()?;
            override_username(&mut config.github.username, username);
            validate_config(&config)?;
            cmd_github(&config, &writer_for(&config, out)).await
        }
        Command::Leetcode { username, out } => {
            let mut config = load_config()?;
            override_username(&mut config.leetcode.username, username);
            validate_config(&config)?;
            cmd_leetcode(&config, &writer_for(&config, out)).await
        }
        Command::All {
            github_user,
            leetcode_user,
            out,
        } => {
            let mut config = load_config()?;
            override_username(&mut config.github.username, github_user);
            override_username(&mut config.leetcode.username, leetcode_user);
            validate_config(&config)?;
            let writer = writer_for(&config, out);
            cmd_github(&config, &writer).await?;
            cmd_leetcode(&config, &writer).await
        }
        Command::Activity {
            range,
            github_user,
            leetcode_user,
            out,
        } => {
            let mut config = load_config()?;
            override_username(&mut config.github.username, github_user);
            override_username(&mut config.leetcode.username, leetcode_user);
            validate_config(&config)?;
            cmd_activity(&config, ActivityRange::parse(&range), &writer_for(&config, out)).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn override_username(slot: &mut String, value: Option<String>) {
    if let Some(name) = value.filter(|n| !n.trim().is_empty()) {
        *slot = name.trim().to_string();
    }
}

fn writer_for(config: &AppConfig, out: Option<PathBuf>) -> ArtifactWriter {
    let root = out.unwrap_or_else(|| PathBuf::from(&config.output.dir));
    ArtifactWriter::new(root, env!("CARGO_PKG_VERSION"))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_github(config: &AppConfig, writer: &ArtifactWriter) -> Result<()> {
    let github = GitHubConfig::from(config);
    info!(username = %github.username, "running GitHub pipeline");

    let run = {
        let reporter = CliProgress::new();
        run_github(&github, &reporter).await?
    };

    let record =
        writer.write_documents(GITHUB_STEM, &run.username, &run.archive(), &run.documents)?;

    print_summary("GitHub", writer, &record);
    println!(
        "  Repos:     {} (commits via {:?})",
        run.repositories.len(),
        run.history.strategy
    );
    print_preview(&run.documents);
    Ok(())
}

async fn cmd_leetcode(config: &AppConfig, writer: &ArtifactWriter) -> Result<()> {
    let leetcode = LeetCodeConfig::from(config);
    info!(username = %leetcode.username, "running LeetCode pipeline");

    let run = {
        let reporter = CliProgress::new();
        run_leetcode(&leetcode, &reporter).await?
    };

    let record =
        writer.write_documents(LEETCODE_STEM, &run.username, &run.archive(), &run.documents)?;

    print_summary("LeetCode", writer, &record);
    println!("  Submissions: {}", run.submissions.len());
    print_preview(&run.documents);
    Ok(())
}

async fn cmd_activity(
    config: &AppConfig,
    range: ActivityRange,
    writer: &ArtifactWriter,
) -> Result<()> {
    let github = GitHubConfig::from(config);
    let leetcode = LeetCodeConfig::from(config);
    let end = chrono::Utc::now().date_naive();

    info!(%range, %end, "building activity timeline");

    let timeline = {
        let reporter = CliProgress::new();
        collect_activity(&github, &leetcode, range, end, &reporter).await?
    };

    let record = writer.write_json(ACTIVITY_STEM, &github.username, &timeline)?;

    print_summary("Activity", writer, &record);
    println!("  Range:       {range} ({} days)", timeline.days.len());
    println!("  Active days: {}", timeline.active_days());
    println!("  Total:       {}", timeline.total());
    println!();
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_summary(label: &str, writer: &ArtifactWriter, record: &PipelineRecord) {
    println!();
    println!("  {label} artifacts written");
    println!("  Run:       {}", record.run_id);
    for artifact in &record.artifacts {
        println!("  Saved:     {}", writer.resolve(artifact).display());
    }
    println!("  Documents: {}", record.document_count);
}

fn print_preview(documents: &[OutputDocument]) {
    if let Some(first) = documents.first() {
        println!();
        println!("── Preview ({}) {}", first.metadata.source_type, "─".repeat(40));
        println!("{}", first.body);
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner. Cleared on drop.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn step(&self, detail: &str, current: usize, total: usize) {
        self.spinner.set_message(format!("[{current}/{total}] {detail}"));
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_subcommands() {
        let args = ["footprint", "-vv", "github", "--username", "octocat"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Github { username: Some(ref u), out: None } if u == "octocat"
        ));

        let args = ["footprint", "activity", "--range", "30d", "--log-format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::Activity { ref range, .. } if range == "30d"));
    }

    #[test]
    fn activity_accepts_username_overrides() {
        let args = [
            "footprint",
            "activity",
            "--github-user",
            "octocat",
            "--leetcode-user",
            "coder",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Activity {
            range,
            github_user,
            leetcode_user,
            out,
        } = cli.command
        else {
            panic!("expected the activity command");
        };
        assert_eq!(range, "1y");
        assert_eq!(github_user.as_deref(), Some("octocat"));
        assert_eq!(leetcode_user.as_deref(), Some("coder"));
        assert_eq!(out, None);
    }

    #[test]
    fn blank_override_keeps_configured_username() {
        let mut slot = "configured".to_string();
        override_username(&mut slot, Some("  ".into()));
        assert_eq!(slot, "configured");
        override_username(&mut slot, Some(" other ".into()));
        assert_eq!(slot, "other");
        override_username(&mut slot, None);
        assert_eq!(slot, "other");
    }
}
