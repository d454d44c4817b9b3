use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::{path::Path, sync::Arc};
use veilcount_common::{config::VERSION, crypto::Address, network::Network};
use veilcount_dapp::{
    app::CounterApp,
    config::{Config, LogConfig, MOCKED_ENV_VAR},
    devnet::{DevFheClient, DevLedger, DevReencryptor, DevSigner, DevWalletProvider},
    view,
};

// Demo account used when none is passed on the command line
const DEMO_ACCOUNT: [u8; 20] = [0x42; 20];

fn setup_logger(config: &LogConfig) -> Result<()> {
    let colors = fern::colors::ColoredLevelConfig::new()
        .info(fern::colors::Color::Green)
        .warn(fern::colors::Color::Yellow)
        .error(fern::colors::Color::Red)
        .debug(fern::colors::Color::BrightBlack);

    let mut dispatch = fern::Dispatch::new()
        .level(config.log_level.into())
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stdout());

    if let Some(path) = &config.log_file {
        dispatch = dispatch.chain(fern::log_file(path).context("opening log file")?);
    }

    dispatch.apply().context("applying logger configuration")?;
    Ok(())
}

async fn print_view(app: &CounterApp) {
    println!();
    for line in view::render(&app.state().await) {
        println!("{}", line);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::parse();
    setup_logger(&config.log)?;

    // The MOCKED flag forces the local deployment, same as the
    // build-time flag of the frontend tooling
    if std::env::var(MOCKED_ENV_VAR)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
    {
        config.network.network = Network::Devnet;
    }
    let network = config.network.network;
    info!("veilcount demo client v{} on {}", VERSION, network);

    if !network.is_devnet() {
        warn!(
            "No transport is bundled for {}, chain and encryption calls \
             run against the in-memory devnet backends",
            network
        );
    }

    let account: Address = match &config.account {
        Some(s) => s
            .parse()
            .map_err(|e| anyhow!("invalid account address: {}", e))?,
        None => Address::new(DEMO_ACCOUNT),
    };
    info!("Acting as account {}", account);

    // Wire the component with explicit collaborators
    let ledger = DevLedger::new();
    let signer = Arc::new(DevSigner::new(account, Arc::clone(&ledger)));
    let wallet = Arc::new(DevWalletProvider::connected(signer));
    let reencryptor = Arc::new(DevReencryptor::new(Arc::clone(&ledger)));
    let fhe_client = Arc::new(DevFheClient::new(Arc::clone(&ledger)));

    let app = CounterApp::new(account, wallet, Arc::clone(&ledger) as _, reencryptor)
        .with_fhe_client(fhe_client);

    // Mount: locate the contract, then read the current handle.
    // A missing manifest is logged and leaves the component gated.
    match &config.contract {
        Some(s) => {
            let address: Address = s
                .parse()
                .map_err(|e| anyhow!("invalid contract address: {}", e))?;
            app.set_contract_address(address).await;
            app.refresh_handle().await;
        }
        None => {
            app.mount(Path::new(&config.network.manifest_dir), network)
                .await;
        }
    }
    print_view(&app).await;

    // Decrypt the starting value (uninitialized shows as zero)
    app.decrypt().await;
    print_view(&app).await;

    // Choose, encrypt, and submit the increment
    app.choose_value(config.value).await;
    app.encrypt().await;
    print_view(&app).await;

    app.submit().await;

    // Fresh handle was fetched after confirmation; decrypt it again
    app.decrypt().await;
    print_view(&app).await;

    Ok(())
}
