use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_corner::banner::BannerAnalyzer;
use event_corner::cli;
use event_corner::config::{self, Config};
use event_corner::notification::smtp::SmtpTransport;
use event_corner::notification::EmailNotifier;
use event_corner::store::postgres::PgStore;
use event_corner::store::ApprovalStore;
use event_corner::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    // OTLP export only when a collector endpoint is configured.
    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "event-corner"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .context("failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "event_corner=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::Approval { command }) => handle_approval_command(&cfg, command).await,
        Some(cli::Commands::CheckEmail) => handle_check_email(&cfg).await,
        Some(cli::Commands::Banner { command }) => handle_banner_command(&cfg, command).await,
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn build_notifier(cfg: &Config) -> anyhow::Result<EmailNotifier> {
    let (user, pass) = cfg.mail_credentials().unwrap_or(("", ""));
    let transport = SmtpTransport::new(&cfg.smtp_host, user, pass)
        .with_context(|| format!("invalid SMTP host '{}'", cfg.smtp_host))?;
    let from_address = if user.is_empty() { "noreply@localhost" } else { user };
    Ok(EmailNotifier::new(Arc::new(transport), &cfg.mail_from_name, from_address))
}

fn build_state(cfg: &Config, db: PgStore) -> anyhow::Result<Arc<AppState>> {
    let notifier = build_notifier(cfg)?;
    Ok(Arc::new(AppState::new(
        Arc::new(db),
        notifier,
        &cfg.public_base_url,
        cfg.approval_ttl(),
        cfg.admin_key.clone(),
    )))
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let state = build_state(&cfg, db)?;

    // A broken relay is reported but does not stop the server.
    state.notifier.verify_connection().await;

    if cfg.admin_key.is_none() {
        tracing::warn!("ADMIN_KEY is not set; /api/approval/request and /api/approval/pending will answer 500");
    }

    let app = api::app(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors_layer(cfg.cors_origin.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Event Corner listening on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Allow the configured frontend origin plus localhost during development.
fn cors_layer(frontend_origin: Option<String>) -> CorsLayer {
    use axum::http::{HeaderName, Method};
    use tower_http::cors::AllowOrigin;

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            let origin_str = origin.to_str().unwrap_or("");
            frontend_origin.as_deref() == Some(origin_str)
                || origin_str.starts_with("http://localhost:")
                || origin_str.starts_with("http://127.0.0.1:")
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-admin-key"),
            HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
}

async fn handle_approval_command(cfg: &Config, cmd: cli::ApprovalCommands) -> anyhow::Result<()> {
    let db = PgStore::connect(&cfg.database_url).await?;
    match cmd {
        cli::ApprovalCommands::List => {
            let pending = db.list_pending().await?;

            if pending.is_empty() {
                println!("No pending approvals.");
                return Ok(());
            }

            println!("{:<8} {:<32} {:<30} EXPIRES", "ID", "TITLE", "CONTACT");
            for e in pending {
                let title = if e.title.chars().count() > 32 {
                    format!("{}...", e.title.chars().take(29).collect::<String>())
                } else {
                    e.title
                };
                let expires = e
                    .approval_token_expires_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<8} {:<32} {:<30} {}",
                    e.id,
                    title,
                    e.contact_email.as_deref().unwrap_or("-"),
                    expires
                );
            }
        }
        cli::ApprovalCommands::Request { event_id } => {
            let state = build_state(cfg, db)?;
            let issued = state.issuer.issue(event_id).await?;
            println!(
                "Approval request for event {} sent to {} (expires {}).",
                issued.event_id, issued.contact_email, issued.expires_at
            );
        }
        cli::ApprovalCommands::History { event_id } => {
            let entries = db.list_history(event_id).await?;

            if entries.is_empty() {
                println!("No recorded decisions for event {}.", event_id);
                return Ok(());
            }

            println!("{:<26} {:<10} {:<16} USER AGENT", "AT", "ACTION", "IP");
            for h in entries {
                println!(
                    "{:<26} {:<10} {:<16} {}",
                    h.created_at.to_rfc3339(),
                    h.action,
                    h.ip_address,
                    h.user_agent
                );
            }
        }
    }
    Ok(())
}

async fn handle_check_email(cfg: &Config) -> anyhow::Result<()> {
    let notifier = build_notifier(cfg)?;
    if notifier.verify_connection().await {
        println!("Email service is ready to send emails.");
        Ok(())
    } else {
        anyhow::bail!("email service connection failed; check GMAIL_USER and GMAIL_APP_PASSWORD")
    }
}

async fn handle_banner_command(cfg: &Config, cmd: cli::BannerCommands) -> anyhow::Result<()> {
    match cmd {
        cli::BannerCommands::Analyze { path } => {
            let analyzer = BannerAnalyzer::from_command_line(
                &cfg.banner_analyzer_cmd,
                Duration::from_secs(cfg.banner_timeout_secs),
            )
            .context("BANNER_ANALYZER_CMD is empty")?;
            let analysis = analyzer.analyze(&path).await?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
    }
    Ok(())
}
