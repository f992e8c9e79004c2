use anyhow::Context;
use crag::{
    api::routes::create_app,
    cli::{output::Output, Cli, Commands},
    utils::toml_config::{CragConfig, LogFormat, ProviderConfig},
    AppState,
};
use std::net::SocketAddr;
use std::process::ExitCode;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let result = match cli.command {
        None | Some(Commands::Serve) => serve(&cli.config, cli.verbose).await,
        Some(Commands::Ask {
            ref question,
            trace,
        }) => ask(&cli.config, question, trace, cli.verbose, &output).await,
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

fn load_config(path: &std::path::Path) -> anyhow::Result<CragConfig> {
    CragConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

async fn serve(config_path: &std::path::Path, verbose: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    init_tracing(level, config.server.log_format);

    info!(
        "Starting crag-server v{} with config {}",
        env!("CARGO_PKG_VERSION"),
        config_path.display()
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server host/port")?;

    let state = AppState::from_config(config).context("Failed to initialise collaborators")?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn ask(
    config_path: &std::path::Path,
    question: &str,
    trace: bool,
    verbose: bool,
    output: &Output,
) -> anyhow::Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Question must not be empty");
    }

    let config = load_config(config_path)?;
    init_tracing(if verbose { "debug" } else { "warn" }, LogFormat::Pretty);

    let state = AppState::from_config(config).context("Failed to initialise collaborators")?;
    let result = state.orchestrator.run(question).await?;

    output.answer(&result.answer);

    if trace {
        output.header("Stages");
        for (i, record) in result.path.iter().enumerate() {
            output.stage(i + 1, record);
        }
        if result.corrected {
            output.kv("rewritten question", &result.final_question);
        }
        if result.used_fallback {
            output.warning("Generator returned nothing, fallback answer used");
        }

        output.header("Passages");
        if result.documents.is_empty() {
            output.info("none");
        }
        for passage in &result.documents {
            output.passage(passage);
        }
        output.newline();
    }
    Ok(())
}

fn show_config(
    config_path: &std::path::Path,
    validate: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if validate {
        output.success(&format!("{} is valid", config_path.display()));
        return Ok(());
    }

    output.banner();

    output.header("Server");
    output.kv("address", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("log level", &config.server.log_level);

    output.header("Roles");
    for (role, model_name) in config.roles.iter() {
        let model_id = config.model_id(model_name).unwrap_or("?");
        let detail = match config
            .get_model(model_name)
            .and_then(|m| config.get_provider(&m.provider))
        {
            Some(ProviderConfig::OpenAI { api_base, .. }) => {
                format!("{} ({} via {})", model_name, model_id, api_base)
            }
            Some(ProviderConfig::Ollama { base_url, .. }) => {
                format!("{} ({} via ollama at {})", model_name, model_id, base_url)
            }
            None => model_name.to_string(),
        };
        output.kv(role, &detail);
    }

    output.header("Document store");
    output.kv("corpus", &config.store.corpus_dir.display().to_string());
    output.kv(
        "chunking",
        &format!(
            "{} chars, {} overlap",
            config.store.chunk_size, config.store.chunk_overlap
        ),
    );
    output.kv("top k", &config.store.top_k.to_string());

    output.header("Web search");
    output.kv("provider", &format!("{:?}", config.web_search.provider));
    output.kv("max results", &config.web_search.max_results.to_string());
    output.kv("merge results", &config.web_search.merge_results.to_string());

    output.header("Pipeline");
    output.kv(
        "call timeout",
        &format!("{}s", config.pipeline.call_timeout_secs),
    );
    output.kv(
        "grading concurrency",
        &config.pipeline.grading_concurrency.to_string(),
    );

    output.hint("Run `crag-server config --validate` to check references and secrets only.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
