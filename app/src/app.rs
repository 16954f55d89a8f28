use crate::banner::FileBannerStore;
use crate::claim::ClaimStatus;
use crate::config::DemoConfig;
use crate::error::Error;
use crate::metrics;
use crate::mock_data::{MockDataGenerator, CONTRACT_ADDRESS};
use crate::session::{ClaimFilter, DemoSession, SubmitClaimData};
use clap::{Parser, Subcommand};
use eyre::Result;
use futures::pin_mut;
use mock_wallet::{unix_millis, TransactionRequest};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::*;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Where dismissed-banner state lives unless `--data-dir` says otherwise.
pub const DEFAULT_DATA_DIR: &str = ".apx-demo";

const SIGN_IN_MESSAGE: &str = "Sign in to APX demo";
const MAINNET_CHAIN_ID: u64 = 1;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[inline]
pub fn run() -> Result<()> {
    App::parse().run()
}

#[derive(Parser)]
#[command(author, about = "APX demo simulation", long_about = None)]
pub struct App {
    /// Equivalent to APX_DEMO_MODE=true
    #[arg(long = "demo-mode")]
    pub demo_mode: bool,

    /// Makes generated claims and transactions reproducible. Unless
    /// --now-ms is given, the clock is pinned to the start of the current
    /// UTC day so ids stay stable across runs on the same day
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fixed "now" for generated data, in unix millis
    #[arg(long = "now-ms", env = "APX_NOW_MS")]
    pub now_ms: Option<i64>,

    #[arg(long = "data-dir", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    #[arg(long = "metrics-port")]
    pub metrics_port: Option<u16>,

    #[arg(long = "connect-delay-ms", env = "APX_CONNECT_DELAY_MS")]
    pub connect_delay_ms: Option<u64>,

    #[arg(long = "transaction-delay-ms", env = "APX_TRANSACTION_DELAY_MS")]
    pub transaction_delay_ms: Option<u64>,

    #[arg(long = "consensus-interval-ms", env = "APX_CONSENSUS_INTERVAL_MS")]
    pub consensus_interval_ms: Option<u64>,

    #[arg(long = "fetch-delay-ms", env = "APX_FETCH_DELAY_MS")]
    pub fetch_delay_ms: Option<u64>,

    #[arg(long = "full-log-context", env = "FULL_LOG_CONTEXT")]
    pub full_log_context: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Demo-mode status and the provider profile
    Status,
    Claims {
        #[arg(long)]
        status: Option<ClaimStatus>,
        #[arg(long)]
        limit: Option<usize>,
    },
    Claim {
        id: String,
    },
    Transactions {
        #[arg(long)]
        limit: Option<usize>,
    },
    Stats,
    /// Animates consensus on a verifying claim until it settles
    Simulate {
        #[arg(long = "claim-id")]
        claim_id: Option<String>,
    },
    /// Prints simulated realtime updates
    Feed {
        #[arg(long, default_value_t = 3)]
        updates: usize,
    },
    /// Connects, transacts, signs, switches network and disconnects
    Wallet,
    Submit {
        #[arg(long = "patient-id")]
        patient_id: String,
        #[arg(long = "diagnosis", value_delimiter = ',')]
        diagnosis_codes: Vec<String>,
        #[arg(long = "procedure", value_delimiter = ',')]
        procedure_codes: Vec<String>,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        description: String,
    },
    Banner {
        #[arg(long)]
        dismiss: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl App {
    pub fn run(self) -> Result<()> {
        self.init_tracing();
        let tokio_runtime = tokio_runtime()?;
        tokio_runtime.block_on(run_until_ctrl_c(self.execute()))?;
        Ok(())
    }

    fn init_tracing(&self) {
        let rust_log_level = Level::from_str(
            std::env::var("RUST_LOG")
                .unwrap_or("info".to_string())
                .as_str(),
        )
        .unwrap_or(Level::INFO);

        let filter = if self.full_log_context {
            EnvFilter::builder().parse_lossy(rust_log_level.as_str())
        } else {
            let filter_tag = format!(
                "apx_demo={rust_log_level},mock_wallet={rust_log_level},demo={rust_log_level}"
            );
            EnvFilter::builder().parse_lossy(filter_tag.as_str())
        };

        // stdout carries the JSON output
        let main_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true);

        let layers = if rust_log_level == Level::DEBUG || rust_log_level == Level::TRACE {
            vec![main_layer
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter)
                .boxed()]
        } else {
            vec![main_layer.with_filter(filter).boxed()]
        };

        tracing_subscriber::registry().with(layers).init();
    }

    fn demo_config(&self) -> DemoConfig {
        let defaults = DemoConfig::from_env();
        let millis = |value: Option<u64>, fallback: Duration| {
            value.map(Duration::from_millis).unwrap_or(fallback)
        };
        DemoConfig {
            enabled: self.demo_mode || defaults.enabled,
            auto_connect_delay: millis(self.connect_delay_ms, defaults.auto_connect_delay),
            transaction_delay: millis(self.transaction_delay_ms, defaults.transaction_delay),
            consensus_update_interval: millis(
                self.consensus_interval_ms,
                defaults.consensus_update_interval,
            ),
            fetch_delay: millis(self.fetch_delay_ms, defaults.fetch_delay),
            ..defaults
        }
    }

    /// Seeded runs get a pinned clock so claim ids and hashes repeat.
    fn generator(&self, wall_clock_ms: i64) -> MockDataGenerator {
        let pinned = self
            .now_ms
            .or_else(|| self.seed.map(|_| wall_clock_ms - wall_clock_ms.rem_euclid(DAY_MS)));
        let generator = match self.seed {
            Some(seed) => MockDataGenerator::seeded(seed),
            None => MockDataGenerator::from_entropy(),
        };
        match pinned {
            Some(now_ms) => generator.with_clock(now_ms),
            None => generator,
        }
    }

    async fn execute(self) -> Result<()> {
        let config = self.demo_config();
        if self.metrics_port.is_some() {
            metrics::start_server(self.metrics_port).await;
        }

        let generator = self.generator(unix_millis());
        let session = DemoSession::with_generator(config, generator);
        if !session.is_demo() {
            warn!("Demo mode is off; set APX_DEMO_MODE=true or pass --demo-mode");
        }

        match self.command {
            Command::Status => print_json(session.status())?,
            Command::Claims { status, limit } => {
                let mut claims = session.claims(ClaimFilter { status, limit });
                print_json(&claims.loaded().await)?;
            }
            Command::Claim { id } => {
                let mut claim = session.claim(Some(&id));
                match claim.loaded().await {
                    Some(claim) => print_json(&claim)?,
                    None => return Err(Error::ClaimNotFound(id).into()),
                }
            }
            Command::Transactions { limit } => {
                let mut transactions = session.transactions(limit);
                print_json(&transactions.loaded().await)?;
            }
            Command::Stats => {
                let mut stats = session.provider_stats();
                print_json(&stats.loaded().await)?;
            }
            Command::Simulate { claim_id } => simulate(&session, claim_id).await?,
            Command::Feed { updates } => feed(&session, updates).await?,
            Command::Wallet => wallet_walkthrough(&session).await?,
            Command::Submit {
                patient_id,
                diagnosis_codes,
                procedure_codes,
                amount,
                description,
            } => {
                let data = SubmitClaimData {
                    patient_id,
                    diagnosis_codes,
                    procedure_codes,
                    amount,
                    description,
                };
                let receipt = session.claim_submitter().submit_claim(&data).await?;
                print_json(&receipt)?;
            }
            Command::Banner { dismiss } => {
                let mut banner = session.banner(FileBannerStore::new(&self.data_dir))?;
                if dismiss {
                    banner.dismiss()?;
                }
                print_json(&json!({
                    "visible": banner.visible(),
                    "banner": banner.config(),
                }))?;
            }
        }

        Ok(())
    }
}

async fn simulate(session: &DemoSession, claim_id: Option<String>) -> Result<()> {
    let claim_id = match claim_id {
        Some(id) => id,
        None if !session.is_demo() => return Err(Error::NotInDemoMode.into()),
        None => session
            .first_verifying_claim()
            .map(|claim| claim.id)
            .ok_or_else(|| Error::ClaimNotFound(ClaimStatus::Verifying.to_string()))?,
    };

    let animation = session.animate_consensus(&claim_id)?;
    let mut updates = animation.subscribe();
    let initial = updates.borrow_and_update().clone();
    print_json(&initial)?;

    // the sender is dropped once the animation finishes
    while updates.changed().await.is_ok() {
        let claim = updates.borrow_and_update().clone();
        print_json(&claim)?;
        if claim.status() != ClaimStatus::Verifying {
            break;
        }
    }
    info!(claim = %claim_id, status = %animation.claim().status(), "Simulation complete");
    Ok(())
}

async fn feed(session: &DemoSession, count: usize) -> Result<()> {
    let feed = session.realtime_updates().ok_or(Error::NotInDemoMode)?;
    let mut updates = feed.subscribe();
    for _ in 0..count {
        if updates.changed().await.is_err() {
            break;
        }
        let latest = updates.borrow_and_update().first().cloned();
        if let Some(update) = latest {
            print_json(&update)?;
        }
    }
    feed.stop();
    Ok(())
}

async fn wallet_walkthrough(session: &DemoSession) -> Result<()> {
    if session.wallet().is_none() {
        return Err(Error::WalletUnavailable.into());
    }
    let mut wallet = session.bind_wallet();

    let state = wallet.connected().await;
    print_json(&json!({ "step": "connect", "state": state }))?;

    let request = TransactionRequest {
        value: Some("0.1".to_string()),
        ..TransactionRequest::to(CONTRACT_ADDRESS.as_str())
    };
    let hash = wallet.send_transaction(request).await?;
    print_json(&json!({ "step": "sendTransaction", "hash": hash }))?;

    let receipt = wallet.wait_for_transaction(&hash, 1).await?;
    print_json(&json!({ "step": "waitForTransaction", "receipt": receipt }))?;

    let result = wallet
        .call(TransactionRequest::to(CONTRACT_ADDRESS.as_str()))
        .await?;
    print_json(&json!({ "step": "call", "result": result }))?;

    let signature = wallet.sign_message(SIGN_IN_MESSAGE).await?;
    print_json(&json!({ "step": "signMessage", "signature": signature }))?;

    wallet.switch_network(MAINNET_CHAIN_ID).await?;
    print_json(&json!({ "step": "switchNetwork", "state": wallet.state() }))?;

    wallet.disconnect().await;
    print_json(&json!({ "step": "disconnect", "state": wallet.state() }))?;
    Ok(())
}

pub fn tokio_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

async fn run_until_ctrl_c<F, E>(fut: F) -> Result<(), E>
where
    F: Future<Output = Result<(), E>>,
    E: Send + Sync + 'static + From<std::io::Error>,
{
    let ctrl_c = tokio::signal::ctrl_c();

    let mut stream = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let sigterm = stream.recv();
    pin_mut!(sigterm, ctrl_c, fut);

    tokio::select! {
        _ = ctrl_c => {
            info!("Received ctrl-c");
        },
        _ = sigterm => {
            info!("Received SIGTERM");
        },
        res = fut => res?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_delay_overrides() {
        let app = App::try_parse_from([
            "apx-demo",
            "--demo-mode",
            "--seed",
            "7",
            "--consensus-interval-ms",
            "100",
            "claims",
            "--status",
            "verified",
            "--limit",
            "2",
        ])
        .unwrap();

        let config = app.demo_config();
        assert!(config.enabled);
        assert_eq!(config.consensus_update_interval, Duration::from_millis(100));
        assert_eq!(config.transaction_delay, Duration::from_millis(1500));
        assert!(matches!(
            app.command,
            Command::Claims {
                status: Some(ClaimStatus::Verified),
                limit: Some(2)
            }
        ));
    }

    #[test]
    fn test_same_seed_reproduces_ids_within_a_day() {
        let app = App::try_parse_from(["apx-demo", "--seed", "7", "claims"]).unwrap();
        let morning = 1_760_000_000_000 - 1_760_000_000_000 % DAY_MS + 1_000;
        let later = morning + 5 * 60 * 60 * 1000;

        let first = app.generator(morning).generate_mock_claims();
        let second = app.generator(later).generate_mock_claims();
        let ids = |claims: &[crate::claim::Claim]| {
            claims
                .iter()
                .map(|claim| (claim.id.clone(), claim.tx_hash.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));

        let pinned = App::try_parse_from(["apx-demo", "--now-ms", "42", "stats"]).unwrap();
        assert_eq!(pinned.generator(morning).now(), 42);
        let unseeded = App::try_parse_from(["apx-demo", "stats"]).unwrap();
        assert_ne!(unseeded.generator(morning).now(), morning - 1_000);
    }

    #[test]
    fn test_submit_splits_code_lists() {
        let app = App::try_parse_from([
            "apx-demo",
            "submit",
            "--patient-id",
            "PT1",
            "--diagnosis",
            "E11.9,I10",
            "--procedure",
            "99213",
            "--amount",
            "125.5",
        ])
        .unwrap();
        match app.command {
            Command::Submit {
                diagnosis_codes,
                procedure_codes,
                amount,
                ..
            } => {
                assert_eq!(diagnosis_codes, vec!["E11.9", "I10"]);
                assert_eq!(procedure_codes, vec!["99213"]);
                assert_eq!(amount, 125.5);
            }
            _ => panic!("expected submit"),
        }
    }
}
