//! Form relay binary.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use form_notify::DiscordBot;
use form_relay::config::LogFormat;
use form_relay::{DisabledSheet, FormRelay, RelayArgs, SheetApi};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = RelayArgs::parse();
    init_tracing(args.verbose, args.log_format);

    if args.discord_token.trim().is_empty() {
        bail!("DISCORD_BOT_TOKEN is empty");
    }

    let bot = Arc::new(
        DiscordBot::new(args.discord_token.trim()).context("Failed to build Discord client")?,
    );
    let user = bot
        .current_user()
        .await
        .context("Failed to authenticate with Discord")?;
    info!(user = %user.username, id = %user.id, "Bot connected");

    let sheet: Arc<dyn SheetApi> = match args.connect_sheets() {
        Ok(client) => {
            info!(spreadsheet_id = %client.spreadsheet_id(), "Google Sheets API configured");
            Arc::new(client)
        }
        Err(e) => {
            error!(error = %e, "Failed to configure Google Sheets API, spreadsheet access disabled");
            Arc::new(DisabledSheet)
        }
    };

    let mut relay = FormRelay::new(sheet, bot, args.settings());

    if args.once {
        relay.run_guarded().await;
        return Ok(());
    }

    tokio::select! {
        () = relay.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            info!("Shutting down");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_filter = if verbose {
        "form_relay=debug,form_sheets=debug,form_notify=debug,info"
    } else {
        "form_relay=info,form_sheets=info,form_notify=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
