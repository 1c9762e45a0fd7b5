mod api;
mod charts;
mod config;
mod controller;
mod error;
mod logging;
#[cfg(test)]
mod mock_backend;
mod models;
mod redirect;
mod session;
mod state;
mod tui;

use std::io::stdout;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tracing::{info, warn};

use api::ApiClient;
use config::AppConfig;
use controller::{DashboardController, InitOutcome};
use redirect::LoginRedirect;
use session::{FileTokenStore, TokenStore};
use state::DashboardState;
use tui::{run_app, ExitReason};

#[derive(Parser)]
#[command(
    name = "dashboard",
    version,
    about = "Painel de presença no terminal - métricas do dia, horas semanais e status de presença"
)]
struct Cli {
    /// Caminho do arquivo de configuração
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// URL base do backend (sobrescreve api.base_url)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Gerencia o token de sessão salvo
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Salva o token de acesso obtido no login
    Set { token: String },
    /// Remove o token salvo (logout)
    Clear,
    /// Mostra se há uma sessão salva
    Status,
}

fn main() -> Result<()> {
    // 1. Parse CLI args and load config
    let cli = Cli::parse();
    let config = AppConfig::load_from(cli.config.as_deref())?.with_base_url(cli.base_url);
    logging::init_logging(&config.logging)?;

    let file_store = FileTokenStore::new(config.auth.token_path());
    if let Some(Command::Session(cmd)) = cli.command {
        return run_session_command(cmd, &file_store);
    }
    let store: Arc<dyn TokenStore> = Arc::new(file_store);

    info!(base_url = %config.api.base_url, "starting dashboard");

    // 2. Wire the controller onto a background runtime
    let rt = tokio::runtime::Runtime::new()?;
    let (event_tx, event_rx) = std_mpsc::channel();
    let redirect = Arc::new(LoginRedirect::new(store.clone(), event_tx, rt.handle().clone()));
    let state = DashboardState::shared(config.layout);
    let api = ApiClient::new(&config.api)?;
    let controller = Arc::new(DashboardController::new(
        api,
        store,
        redirect,
        state.clone(),
        config.auth.clone(),
    ));

    let init = controller.clone();
    rt.spawn(async move {
        if let InitOutcome::Loaded(summary) = init.initialize().await {
            if !summary.is_complete() {
                warn!(?summary, "dashboard loaded with missing widgets");
            }
        }
    });

    // 3. Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // 4. Run event loop
    let result = run_app(&mut terminal, &state, &controller, rt.handle(), &event_rx);

    // 5. Restore terminal (always runs)
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    rt.shutdown_background();

    match result? {
        ExitReason::Quit => info!("dashboard closed"),
        ExitReason::RedirectedToLogin => {
            info!("redirected to login");
            if let Some(msg) = &state.blocking_read().message {
                println!("{}", msg.text);
            }
            println!("Faça login novamente e salve o token com: dashboard session set <TOKEN>");
        }
    }
    Ok(())
}

fn run_session_command(cmd: SessionCommand, store: &FileTokenStore) -> Result<()> {
    match cmd {
        SessionCommand::Set { token } => {
            store.set(&token)?;
            println!("Sessão salva em {:?}", store.path());
        }
        SessionCommand::Clear => {
            store.remove()?;
            println!("Sessão removida.");
        }
        SessionCommand::Status => match store.get() {
            Some(_) => println!("Sessão ativa ({:?})", store.path()),
            None => println!("Nenhuma sessão salva."),
        },
    }
    Ok(())
}
