use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use squatwatch::{
    BaseDomain, Capabilities, ConsoleNotifier, JsonFileStore, LogProgress, MemoryStore,
    MutationKind, Notifier, Pipeline, Progress, ScanConfig, SmtpNotifier, VariantGenerator,
};

#[derive(Parser)]
#[command(name = "squatwatch")]
#[command(version)]
#[command(about = "Watches domains for newly registered typosquatting variants")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log filter, e.g. "info" or "squatwatch=debug"
    #[arg(long, global = true, env = "SQUATWATCH_LOG", default_value = "info")]
    log: String,
}

#[derive(Subcommand)]
enum Command {
    /// Scan every watched domain in the store and alert on new discoveries
    Scan {
        /// JSON store holding the watch list and known discoveries
        #[arg(long, env = "SQUATWATCH_STORE", default_value = "squatwatch.json")]
        store: PathBuf,

        /// Report progress as log lines instead of a progress bar
        #[arg(long)]
        no_progress: bool,

        #[command(flatten)]
        mail: Mail,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Print the candidates generated for a domain, without any lookups
    Generate {
        /// Domain to generate variations for
        domain: String,

        /// Mutation family to run; repeat for several (all if not specified)
        #[arg(long = "kind", value_name = "KIND")]
        kinds: Vec<MutationKind>,

        /// Maximum number of variations to output (unlimited if not specified)
        #[arg(long)]
        max_variations: Option<usize>,
    },

    /// Generate and enrich candidates for a domain without remembering them
    Check {
        /// Domain to check
        domain: String,

        #[command(flatten)]
        tuning: Tuning,
    },
}

/// SMTP relay for alerts; alerts go to stdout when no server is set
#[derive(Args)]
struct Mail {
    /// SMTP relay, reached over TLS on port 465
    #[arg(long, env = "SQUATWATCH_SMTP_SERVER")]
    smtp_server: Option<String>,

    /// Login for the relay, also used as the sender address
    #[arg(long, env = "SQUATWATCH_SMTP_USERNAME")]
    smtp_username: Option<String>,

    #[arg(long, env = "SQUATWATCH_SMTP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    /// Deadline for one alert delivery, in milliseconds
    #[arg(long, default_value_t = 30000)]
    smtp_timeout_ms: u64,
}

impl Mail {
    fn notifier(&self) -> Result<Box<dyn Notifier>> {
        let Some(server) = self.smtp_server.as_deref() else {
            tracing::warn!("no SMTP server configured, alerts go to stdout");
            return Ok(Box::new(ConsoleNotifier));
        };

        let username = self
            .smtp_username
            .as_deref()
            .context("--smtp-username is required with --smtp-server")?;
        let password = self
            .smtp_password
            .as_deref()
            .context("--smtp-password is required with --smtp-server")?;

        let notifier = SmtpNotifier::new(
            server,
            username,
            password,
            Duration::from_millis(self.smtp_timeout_ms),
        )?;
        Ok(Box::new(notifier))
    }
}

#[derive(Args)]
struct Tuning {
    /// Candidates enriched concurrently
    #[arg(long, env = "SQUATWATCH_CONCURRENCY", default_value_t = 16)]
    concurrency: usize,

    /// Deadline for each DNS query, in milliseconds
    #[arg(long, env = "SQUATWATCH_DNS_TIMEOUT_MS", default_value_t = 1000)]
    dns_timeout_ms: u64,

    /// Deadline for each WHOIS query, in milliseconds
    #[arg(long, env = "SQUATWATCH_WHOIS_TIMEOUT_MS", default_value_t = 5000)]
    whois_timeout_ms: u64,

    /// Deadline for each banner grab, in milliseconds
    #[arg(long, default_value_t = 2000)]
    banner_timeout_ms: u64,

    /// Deadline for one candidate's whole enrichment, in milliseconds
    #[arg(long, default_value_t = 15000)]
    candidate_timeout_ms: u64,

    /// Maximum number of candidates per watched domain
    #[arg(long)]
    max_variations: Option<usize>,

    /// Skip DNS lookups (nothing will be discovered)
    #[arg(long)]
    no_dns: bool,

    /// Skip WHOIS lookups
    #[arg(long)]
    no_whois: bool,

    /// Grab the HTTP Server header of candidates with an address
    #[arg(long)]
    http_banner: bool,

    /// Grab the SMTP greeting of candidates with a mail exchanger
    #[arg(long)]
    smtp_banner: bool,
}

impl Tuning {
    fn to_config(&self) -> ScanConfig {
        ScanConfig {
            concurrency: self.concurrency,
            dns_timeout: Duration::from_millis(self.dns_timeout_ms),
            whois_timeout: Duration::from_millis(self.whois_timeout_ms),
            banner_timeout: Duration::from_millis(self.banner_timeout_ms),
            candidate_timeout: Duration::from_millis(self.candidate_timeout_ms),
            max_variants: self.max_variations,
            capabilities: Capabilities {
                dns: !self.no_dns,
                whois: !self.no_whois,
                http_banner: self.http_banner,
                smtp_banner: self.smtp_banner,
            },
        }
    }
}

/// Progress bar on stderr, one bar per watched domain
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }
}

impl Progress for BarProgress {
    fn scan_started(&self, watched: &str, candidates: usize) {
        self.bar.reset();
        self.bar.set_length(candidates as u64);
        self.bar.set_message(watched.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn candidate_done(&self, _candidate: &str) {
        self.bar.inc(1);
    }

    fn scan_finished(&self, watched: &str, _considered: usize, discovered: usize) {
        self.bar
            .finish_with_message(format!("{}: {} new", watched, discovered));
    }
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn scan(store: PathBuf, no_progress: bool, mail: &Mail, tuning: &Tuning) -> Result<()> {
    let notifier = mail.notifier()?;
    let store = JsonFileStore::open(&store)
        .await
        .with_context(|| format!("failed to open store {}", store.display()))?;

    let progress: Arc<dyn Progress> = if no_progress {
        Arc::new(LogProgress)
    } else {
        Arc::new(BarProgress::new())
    };

    let pipeline = Pipeline::new(tuning.to_config(), Arc::new(store))?.with_progress(progress);
    let summary = pipeline.run(notifier.as_ref()).await.context("scan failed")?;

    eprintln!(
        "Scanned {} domains ({} skipped), {} candidates, {} new discoveries, {} alerts sent",
        summary.scanned, summary.skipped, summary.considered, summary.discovered, summary.notified
    );
    Ok(())
}

fn generate(domain: &str, kinds: &[MutationKind], max_variations: Option<usize>) -> Result<()> {
    let base = BaseDomain::parse(domain)?;
    let generator = if kinds.is_empty() {
        VariantGenerator::new()
    } else {
        VariantGenerator::with_kinds(kinds)
    };

    let variants: Vec<_> = generator
        .variants(&base)
        .take(max_variations.unwrap_or(usize::MAX))
        .collect();

    for variant in &variants {
        println!("{}, {}", variant.kind, variant.candidate);
    }

    eprintln!("Generated {} variations", variants.len());
    Ok(())
}

async fn check(domain: &str, tuning: &Tuning) -> Result<()> {
    let base = BaseDomain::parse(domain)?;
    let pipeline = Pipeline::new(tuning.to_config(), Arc::new(MemoryStore::new()))?
        .with_progress(Arc::new(BarProgress::new()));

    let report = pipeline.scan_domain(&base).await?;
    for discovery in &report.discoveries {
        println!("{}, {}", discovery.domain, discovery.info);
    }

    eprintln!(
        "Checked {} candidates, {} with DNS presence",
        report.considered,
        report.discoveries.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let result = match &cli.command {
        Command::Scan {
            store,
            no_progress,
            mail,
            tuning,
        } => scan(store.clone(), *no_progress, mail, tuning).await,
        Command::Generate {
            domain,
            kinds,
            max_variations,
        } => generate(domain, kinds, *max_variations),
        Command::Check { domain, tuning } => check(domain, tuning).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
