// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * BAC Analyzer - Broken Access Control Detection
 * Standalone CLI
 *
 * Features:
 * - Expected authorization matrix validation
 * - Role-differential analysis without a matrix
 * - Offline analysis of recorded probe results
 * - Token acquisition from an OpenID Connect provider
 * - REST API mode
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bac_analyzer::api;
use bac_analyzer::collector;
use bac_analyzer::config::{self, AnalyzerConfig, ConfigValidator};
use bac_analyzer::credentials::TokenStore;
use bac_analyzer::http_client::HttpClient;
use bac_analyzer::observation::{ObservationSet, RecordedProbe};
use bac_analyzer::reporting::{console, JsonReportWriter};
use bac_analyzer::scan::{self, ScanInputs};

/// BAC Analyzer - detect broken access control across roles
#[derive(Parser)]
#[command(name = "bac-analyzer")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version)]
#[command(about = "Probe an API as several roles and flag broken access control", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - only errors are logged
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path (yaml, toml or json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every role against the endpoint catalog and report
    Scan(ScanArgs),

    /// Analyze recorded probe results without sending any request
    Analyze {
        /// Recorded results: list of {role, endpoint, status}, null status for failures
        #[arg(required = true)]
        observations: PathBuf,

        #[command(flatten)]
        inputs: InputArgs,

        /// Run differential analysis
        #[arg(long)]
        diff: bool,

        /// Report output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load and check inputs, then show what a scan would probe
    Validate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Include every role x endpoint pair in the plan
        #[arg(long)]
        diff: bool,
    },

    /// Run the REST API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write sample input files
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Role -> bearer token JSON file
    #[arg(long)]
    tokens: Option<PathBuf>,

    /// Endpoint catalog file
    #[arg(long)]
    endpoints: Option<PathBuf>,

    /// Expected authorization matrix file
    #[arg(long)]
    matrix: Option<PathBuf>,

    /// Privilege order, most privileged first (e.g. admin,manager,user)
    #[arg(long, value_delimiter = ',')]
    ranking: Vec<String>,

    /// Base URL joined onto relative endpoint URLs
    #[arg(long, env = "BAC_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Args)]
struct ScanArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Run differential analysis across roles
    #[arg(long)]
    diff: bool,

    /// Route probes through a proxy (e.g. 127.0.0.1:8080)
    #[arg(long, env = "BAC_PROXY")]
    proxy: Option<String>,

    /// Report output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum concurrent read-only probes
    #[arg(long)]
    concurrency: Option<usize>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,
}

impl InputArgs {
    fn apply(&self, config: &mut AnalyzerConfig) {
        if let Some(path) = &self.tokens {
            config.inputs.tokens = path.clone();
        }
        if let Some(path) = &self.endpoints {
            config.inputs.endpoints = path.clone();
        }
        if let Some(path) = &self.matrix {
            config.inputs.matrix = path.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
    }

    fn ranking(&self) -> Option<&[String]> {
        if self.ranking.is_empty() {
            None
        } else {
            Some(self.ranking.as_slice())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;

    let level = if cli.debug {
        "debug".to_string()
    } else if cli.verbose {
        "info".to_string()
    } else if cli.quiet {
        "error".to_string()
    } else {
        config.logging.level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("bac-analyzer")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli.command, config))
}

async fn async_main(command: Commands, config: AnalyzerConfig) -> Result<()> {
    match command {
        Commands::Scan(args) => run_scan(config, args).await,
        Commands::Analyze {
            observations,
            inputs,
            diff,
            output,
        } => run_analyze(config, observations, inputs, diff, output).await,
        Commands::Validate { inputs, diff } => validate_inputs(config, inputs, diff),
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            api::serve(config).await
        }
        Commands::Init { dir, force } => write_samples(&dir, force),
    }
}

async fn run_scan(mut config: AnalyzerConfig, args: ScanArgs) -> Result<()> {
    args.inputs.apply(&mut config);
    if args.diff {
        config.differential = true;
    }
    if let Some(proxy) = args.proxy {
        config.http.proxy = Some(proxy);
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(timeout) = args.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(concurrency) = args.concurrency {
        config.http.concurrency = concurrency;
    }
    if args.insecure {
        config.http.accept_invalid_certs = true;
    }
    ConfigValidator::validate_config(&config)?;

    let inputs = ScanInputs::load(&config, args.inputs.ranking()).await?;
    let client = HttpClient::new(&config.http)?;

    info!(
        roles = inputs.tokens.len(),
        endpoints = inputs.catalog.len(),
        expectations = inputs.matrix.len(),
        differential = config.differential,
        "Starting BAC scan"
    );

    let outcome =
        scan::run_scan(&client, &inputs, config.differential, config.http.concurrency).await?;

    print!(
        "{}",
        console::render(&outcome.report, &outcome.summary, config.differential)
    );

    JsonReportWriter::new()
        .write(&outcome.report, &config.output)
        .await?;
    println!("\nReport saved to {}", config.output.display());

    Ok(())
}

async fn run_analyze(
    mut config: AnalyzerConfig,
    observations: PathBuf,
    inputs: InputArgs,
    diff: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    inputs.apply(&mut config);
    if let Some(output) = output {
        config.output = output;
    }
    let differential = diff || config.differential;

    let catalog = config::load_endpoints(&config.inputs.endpoints, config.base_url.as_deref())?;
    let matrix_file = scan::load_matrix_or_empty(&config.inputs.matrix)?;
    let ranking =
        config::resolve_ranking(inputs.ranking(), &config.ranking, &matrix_file.ranking)?;

    let probes: Vec<RecordedProbe> = config::read_file(&observations)
        .with_context(|| format!("Failed to load observations from {:?}", observations))?;
    let set = ObservationSet::from_recorded(catalog, ranking, &probes)?;

    let mut matrix = matrix_file.matrix;
    let observed_roles = set.roles();
    config::prune_matrix(
        &mut matrix,
        observed_roles.iter().map(|r| r.name.as_str()),
        set.endpoints(),
    );

    info!(
        observations = set.len(),
        duplicates_ignored = set.duplicates_ignored(),
        "Analyzing recorded probes"
    );

    let outcome = scan::analyze(set, &matrix, differential);
    print!(
        "{}",
        console::render(&outcome.report, &outcome.summary, differential)
    );

    JsonReportWriter::new()
        .write(&outcome.report, &config.output)
        .await?;
    println!("\nReport saved to {}", config.output.display());

    Ok(())
}

fn validate_inputs(mut config: AnalyzerConfig, inputs: InputArgs, diff: bool) -> Result<()> {
    inputs.apply(&mut config);
    let differential = diff || config.differential;

    let catalog = config::load_endpoints(&config.inputs.endpoints, config.base_url.as_deref())?;
    let matrix_file = scan::load_matrix_or_empty(&config.inputs.matrix)?;
    let ranking =
        config::resolve_ranking(inputs.ranking(), &config.ranking, &matrix_file.ranking)?;

    let tokens: TokenStore = match &config.identity_provider {
        Some(provider) => {
            println!(
                "Tokens: password grant at {} for {} user(s)",
                provider.token_url,
                provider.users.len()
            );
            provider
                .users
                .iter()
                .map(|u| (u.role.clone(), "pending".to_string()))
                .collect()
        }
        None => TokenStore::from_file(&config.inputs.tokens)?,
    };

    let inputs = ScanInputs::new(catalog, tokens, matrix_file.matrix, ranking);

    println!("Endpoints ({}):", inputs.catalog.len());
    for endpoint in &inputs.catalog {
        println!("  {:<24} {:<7} {}", endpoint.name, endpoint.method, endpoint.url);
    }

    println!("Roles: {}", inputs.tokens.roles().collect::<Vec<_>>().join(", "));
    if inputs.ranking.is_empty() {
        warn!("No privilege ranking given, pairwise differential checks will not run");
        println!("Ranking: (none)");
    } else {
        println!("Ranking: {}", inputs.ranking.names().join(" > "));
    }
    println!("Expectations: {}", inputs.matrix.len());

    let plan = collector::plan(
        &inputs.catalog,
        &inputs.tokens,
        &inputs.ranking,
        &inputs.matrix,
        differential,
    );
    let mutating = plan.iter().filter(|t| t.endpoint.method.is_mutating()).count();
    println!(
        "Planned probes: {} ({} state-mutating, run last)",
        plan.len(),
        mutating
    );

    Ok(())
}

const SAMPLE_TOKENS: &str = r#"{
  "admin": "<admin bearer token>",
  "manager": "<manager bearer token>",
  "user": "<user bearer token>"
}
"#;

const SAMPLE_ENDPOINTS: &str = r#"endpoints:
  - name: get_users
    method: GET
    url: /api/users
  - name: get_profile_self
    method: GET
    url: /api/profile/self
  - name: get_profile_admin
    method: GET
    url: /api/profile/admin_user
  - name: delete_user
    method: DELETE
    url: /api/users/3
"#;

const SAMPLE_MATRIX: &str = r#"ranking: [admin, manager, user]

matrix:
  admin:
    get_users: allow
    get_profile_self: allow
    get_profile_admin: allow
    delete_user: allow
  manager:
    get_users: allow
    get_profile_admin: deny
    delete_user: deny
  user:
    get_users: deny
    get_profile_self: allow
    get_profile_admin: deny
    delete_user: deny
"#;

const SAMPLE_CONFIG: &str = r#"# BAC Analyzer configuration
base_url: http://localhost:50111
differential: true
output: report.json

http:
  timeout_secs: 10
  max_retries: 2
  concurrency: 4
  # proxy: 127.0.0.1:8080
  accept_invalid_certs: false

inputs:
  tokens: tokens.json
  endpoints: endpoints.yaml
  matrix: authorization_matrix.yaml

# Obtain tokens from Keycloak instead of tokens.json
# identity_provider:
#   token_url: http://localhost:49123/realms/bac-lab/protocol/openid-connect/token
#   client_id: bac-analyzer
#   users:
#     - { role: admin, username: admin_user, password: changeme }
#     - { role: manager, username: manager_user, password: changeme }
#     - { role: user, username: normal_user, password: changeme }

server:
  host: 127.0.0.1
  port: 5000
"#;

fn write_samples(dir: &Path, force: bool) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let files = [
        ("tokens.json", SAMPLE_TOKENS),
        ("endpoints.yaml", SAMPLE_ENDPOINTS),
        ("authorization_matrix.yaml", SAMPLE_MATRIX),
        ("bac-analyzer.yaml", SAMPLE_CONFIG),
    ];

    for (name, content) in files {
        let path = dir.join(name);
        if path.exists() && !force {
            println!("Skipping {} (exists, use --force to overwrite)", path.display());
            continue;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!(
        "\nFill in tokens.json, then run: bac-analyzer --config {} scan",
        dir.join("bac-analyzer.yaml").display()
    );

    Ok(())
}
