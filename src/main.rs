//! Ticket Gate CLI
//!
//! Door-staff command-line client: account login, one-shot ticket
//! verification, and a continuous scan loop fed by a handheld scanner
//! on standard input.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use ticket_gate::{
    api::ApiClient,
    auth::AuthSession,
    controller::{Detection, ScanController, StepOutcome},
    feedback::{AudioFeedback, Silent, TerminalBell, Tone},
    metrics::{MetricsRegistry, MetricsSnapshot},
    scanner::{FileConfig, LineScanner, MetricsConfig},
    verification::{Classification, VerificationEndpoint, VerificationRecord},
};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(name = "ticket-gate", version, about = "Scan and verify movie tickets at the door")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the booking platform base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Staff access token for commands that need one.
    #[arg(long, global = true, env = "TICKET_GATE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and print the access token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Confirm a registration with the emailed code.
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Request a new registration code.
    ResendOtp {
        #[arg(long)]
        email: String,
    },
    /// Show the profile of the token holder.
    Whoami,
    /// Verify a single ticket code.
    Verify { code: String },
    /// Scan codes from standard input until Ctrl-C or end of input.
    Scan,
}

fn load_config(cli: &Cli) -> CliResult<FileConfig> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
        config.api.validate()?;
    }
    Ok(config)
}

async fn authenticate(client: &ApiClient, token: Option<&str>) -> CliResult<AuthSession> {
    let token = token.ok_or("no access token; pass --token or set TICKET_GATE_TOKEN")?;
    let session = client.users().restore(token).await?;
    info!(role = session.role_label(), "Authenticated");
    Ok(session)
}

fn feedback_for(config: &FileConfig) -> Box<dyn AudioFeedback> {
    if config.feedback.enabled {
        Box::new(TerminalBell)
    } else {
        Box::new(Silent)
    }
}

fn render_record(record: &VerificationRecord, classification: Classification) {
    let mark = if classification.allows_entry() { "✓" } else { "✗" };
    println!("{mark} {classification}");
    if let Some(detail) = classification.detail(&record.ticket_code) {
        println!("  {detail}");
    }
    println!("  Ticket:   {}", record.ticket_code);
    println!(
        "  Booking:  {} ({:?}, payment {:?})",
        record.booking_id, record.status, record.payment_status
    );
    if let Some(movie) = &record.movie {
        println!("  Movie:    {}", movie.title);
    }
    if let Some(theater) = &record.theater {
        match &record.screen {
            Some(screen) => println!("  Theater:  {} / {}", theater.name, screen.name),
            None => println!("  Theater:  {}", theater.name),
        }
    }
    if let Some(showtime) = &record.showtime {
        println!("  Showtime: {}", showtime.start_time.format("%Y-%m-%d %H:%M"));
    }
    if !record.seats.is_empty() {
        println!("  Seats:    {} ({:.2})", record.seat_labels().join(", "), record.total_price());
    }
    if let Some(customer) = &record.user {
        println!("  Customer: {} <{}>", customer.name, customer.email);
    }
}

/// Publishes controller state to the Prometheus exporter, if one runs.
struct Exporter {
    registry: Option<MetricsRegistry>,
    #[cfg(feature = "metrics")]
    state: Option<Arc<tokio::sync::RwLock<ticket_gate::metrics::MetricsState>>>,
}

impl Exporter {
    #[cfg(feature = "metrics")]
    fn start(config: &MetricsConfig) -> CliResult<Self> {
        use ticket_gate::metrics::{MetricsServer, MetricsServerConfig};

        if config.port == 0 {
            return Ok(Self { registry: None, state: None });
        }
        let server = MetricsServer::new(
            MetricsServerConfig::with_port(config.port),
            MetricsRegistry::new()?,
        );
        let state = server.state();
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                warn!(error = %e, "Metrics server stopped");
            }
        });
        Ok(Self { registry: None, state: Some(state) })
    }

    #[cfg(not(feature = "metrics"))]
    fn start(config: &MetricsConfig) -> CliResult<Self> {
        if config.port != 0 {
            warn!(port = config.port, "Built without the `metrics` feature; exporter disabled");
        }
        Ok(Self { registry: Some(MetricsRegistry::new()?) })
    }

    async fn publish(&self, snapshot: &MetricsSnapshot) {
        if let Some(registry) = &self.registry {
            registry.update(snapshot);
        }
        #[cfg(feature = "metrics")]
        if let Some(state) = &self.state {
            state.read().await.update(snapshot);
        }
    }

    fn summary(&self) -> Option<String> {
        self.registry.as_ref().and_then(|registry| registry.encode().ok())
    }
}

async fn verify_once(
    client: &ApiClient,
    token: Option<&str>,
    code: &str,
    config: &FileConfig,
) -> CliResult {
    let code = code.trim();
    if code.is_empty() {
        return Err("ticket code is empty".into());
    }
    let session = authenticate(client, token).await?;
    let endpoint = client.ticket_endpoint(&session)?;
    let feedback = feedback_for(config);

    match endpoint.verify_ticket(code).await {
        Ok(record) => {
            let classification = Classification::of(&record);
            feedback.play_tone(classification.tone());
            render_record(&record, classification);
            Ok(())
        }
        Err(e) => {
            feedback.play_tone(Tone::Failure);
            Err(e.into())
        }
    }
}

async fn scan(client: &ApiClient, token: Option<&str>, config: FileConfig) -> CliResult {
    let session = authenticate(client, token).await?;
    let endpoint = Arc::new(client.ticket_endpoint(&session)?);
    let exporter = Exporter::start(&config.metrics)?;

    let (shutdown_tx, mut shutdown) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    let mut controller = ScanController::new(
        LineScanner::stdin(),
        endpoint,
        feedback_for(&config),
        config.scanner.clone(),
    );
    controller.start_camera().await?;
    println!("Ready. Scan tickets (Ctrl-C to stop).");

    let mut input_closed = false;
    loop {
        let outcome = tokio::select! {
            _ = shutdown.changed() => None,
            outcome = controller.step() => outcome,
        };
        let Some(outcome) = outcome else { break };

        match &outcome {
            StepOutcome::Detected { code, detection } => match detection {
                Detection::Accepted { dispatched: true } => println!("→ {code}: verifying..."),
                Detection::Accepted { dispatched: false } => {
                    println!("→ {code}: busy, scan again once the current ticket is done")
                }
                Detection::Suppressed => debug!(code = %code, "Duplicate ignored"),
                Detection::Empty => {}
            },
            StepOutcome::Verified(classification) => {
                if let Some(record) = controller.session().verification_result() {
                    render_record(record, *classification);
                }
            }
            StepOutcome::VerificationFailed(message) => println!("✗ {message}"),
            StepOutcome::CooldownTick { .. } | StepOutcome::CooldownExpired => {}
            StepOutcome::CameraFault(message) => {
                info!(reason = %message, "Scanner input ended");
                input_closed = true;
            }
        }

        exporter
            .publish(&MetricsSnapshot::from_session(controller.session(), controller.stats()))
            .await;

        if input_closed && !controller.session().is_verifying() {
            break;
        }
    }

    controller.teardown().await;
    let stats = controller.stats();
    info!(
        detections = stats.detections,
        valid = stats.valid,
        failures = stats.failures,
        "Scan session ended"
    );
    if let Some(summary) = exporter.summary() {
        debug!("{summary}");
    }
    Ok(())
}

async fn run(cli: Cli) -> CliResult {
    let config = load_config(&cli)?;
    let client = ApiClient::new(&config.api)?;
    let token = cli.token.as_deref();
    debug!(base_url = client.base_url(), "Using booking platform");

    match cli.command {
        Command::Login { email, password } => {
            let mut session = AuthSession::new();
            client.users().login(&mut session, &email, &password).await?;
            if let Some(user) = session.user() {
                eprintln!("Logged in as {} ({})", user.name, user.role.as_str());
            }
            if let Some(token) = session.token() {
                println!("{token}");
            }
        }
        Command::VerifyOtp { email, code } => {
            let response = client.users().verify_registration(&email, &code).await?;
            println!("{}", response.message);
        }
        Command::ResendOtp { email } => {
            let response = client.users().resend_otp(&email).await?;
            println!("{}", response.message);
        }
        Command::Whoami => {
            let session = authenticate(&client, token).await?;
            if let Some(user) = session.user() {
                println!("{} <{}>", user.name, user.email);
                println!("Role: {}", user.role.as_str());
                if !user.is_verified() {
                    println!("Account not verified");
                }
            }
        }
        Command::Verify { code } => verify_once(&client, token, &code, &config).await?,
        Command::Scan => scan(&client, token, config).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    debug!("Ticket Gate v{}", ticket_gate::VERSION);

    // Exit explicitly: a pending stdin read would otherwise hold the
    // runtime open after Ctrl-C.
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}
