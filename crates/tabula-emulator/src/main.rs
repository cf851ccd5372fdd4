//! Run a full detection-and-configuration pass against a simulated board.
//!
//! Usage:
//!
//! ```text
//! tabula-emulator [SCENARIO] [OVERRIDES.json]
//! ```
//!
//! `SCENARIO` selects which controller (if any) is fitted to the mock
//! board; `OVERRIDES.json` is an optional file of explicit configuration
//! overrides, e.g. `{"width": 800, "variant": 1}`. Log verbosity follows
//! `RUST_LOG` and defaults to `info`.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tabula_detect::{ExplicitOverrides, HardwareManager, TOUCHSCREEN_NODE};
use tabula_hal::mock::MockBoard;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Which controller the simulated board carries.
#[derive(Debug, Clone, Copy)]
enum Scenario {
    /// gsl1680 with the A082 chip id, powered by GPIO alone.
    SileadA082,
    /// gsl1680 with the B482 chip id, powered by GPIO alone.
    SileadB482,
    /// ektf2127, powered by GPIO alone.
    Ektf2127,
    /// zet6251 that only answers with the rail enabled.
    Zet6251Rail,
    /// No controller at all.
    Empty,
}

impl Scenario {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "silead-a082" => Ok(Self::SileadA082),
            "silead-b482" => Ok(Self::SileadB482),
            "ektf2127" => Ok(Self::Ektf2127),
            "zet6251-rail" => Ok(Self::Zet6251Rail),
            "empty" => Ok(Self::Empty),
            other => bail!(
                "unknown scenario '{other}' (expected one of: silead-a082, \
                 silead-b482, ektf2127, zet6251-rail, empty)"
            ),
        }
    }

    fn fit(self, board: &MockBoard) {
        match self {
            Self::SileadA082 => board.fit_silead(0xa082_0000, false),
            Self::SileadB482 => board.fit_silead(0xb482_0000, false),
            Self::Ektf2127 => board.fit_ektf2127(false),
            Self::Zet6251Rail => board.fit_zet6251(true),
            Self::Empty => {}
        }
    }
}

fn load_overrides(path: Option<&str>) -> Result<ExplicitOverrides> {
    let Some(path) = path else {
        return Ok(ExplicitOverrides::default());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("reading overrides from {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing overrides from {path}"))
}

async fn run(scenario: Scenario, overrides: ExplicitOverrides) -> Result<()> {
    let board = MockBoard::new();
    scenario.fit(&board);

    info!(?scenario, "starting configuration pass on simulated board");
    let mut manager = HardwareManager::new(board.bus(), board.power(), board.store(), overrides);

    match manager.configure_touchscreen().await {
        Ok(Some(applied)) => {
            let rendered = serde_json::to_string_pretty(&applied)?;
            println!("applied configuration:\n{rendered}");
        }
        Ok(None) => println!("no touchscreen controller found"),
        Err(err) if err.should_retry_later() => {
            warn!(%err, "pass should be retried once dependencies are up");
            return Err(err.into());
        }
        Err(err) => {
            error!(%err, "configuration pass failed");
            return Err(err.into());
        }
    }

    println!("\nfinal '{TOUCHSCREEN_NODE}' node:");
    if let Some(props) = board.node_properties(TOUCHSCREEN_NODE) {
        for (key, value) in &props {
            println!("  {key} = {value:?}");
        }
    } else {
        println!("  (node absent)");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let scenario = args.first().map_or("silead-a082", String::as_str);

    let outcome = match (Scenario::parse(scenario), load_overrides(args.get(1).map(String::as_str))) {
        (Ok(scenario), Ok(overrides)) => run(scenario, overrides).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
