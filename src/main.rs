//! # Cometa CLI
//!
//! Command-line interface for receipt printers.
//!
//! ## Usage
//!
//! ```bash
//! # Find printers
//! cometa discover --type Bluetooth
//! cometa discover --type LAN --lan-host 192.168.1.20
//!
//! # Printer health and firmware
//! cometa status --port BT:00:11:62:AA:BB:CC --emulation StarPRNT
//!
//! # Print a JSON job
//! cometa print --port TCP:192.168.1.20 --emulation StarLine job.json
//!
//! # Compile a job to a file without printing
//! cometa compile --emulation EscPos job.json --out job.bin
//! ```
//!
//! Results are printed as JSON on stdout. Set `RUST_LOG=debug` to see every
//! session step.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cometa::{
    CometaError, Emulation, EmulationSelector, SessionConfig,
    discovery::InterfaceFilter,
    dispatch::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS, Dispatcher, Request, Response, Services},
    job::{PrintJob, parse_job},
};

/// Cometa - Receipt printer job compiler and print client
#[derive(Parser, Debug)]
#[command(name = "cometa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    timing: Timing,
}

#[derive(Args, Debug)]
struct Timing {
    /// Port open timeout in milliseconds
    #[arg(long, global = true, default_value_t = 10_000)]
    open_timeout_ms: u64,

    /// Status query timeout after the write, in milliseconds
    #[arg(long, global = true, default_value_t = 30_000)]
    end_check_timeout_ms: u64,

    /// Pause between opening the port and the first status query when printing
    #[arg(long, global = true, default_value_t = 100)]
    print_settle_ms: u64,

    /// Pause between opening the port and the status query of `status`
    #[arg(long, global = true, default_value_t = 500)]
    status_settle_ms: u64,
}

impl Timing {
    fn config(&self) -> SessionConfig {
        SessionConfig {
            open_timeout: Duration::from_millis(self.open_timeout_ms),
            print_settle: Duration::from_millis(self.print_settle_ms),
            status_settle: Duration::from_millis(self.status_settle_ms),
            end_check_timeout: Duration::from_millis(self.end_check_timeout_ms),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List printers
    Discover {
        /// Bluetooth, LAN, USB or All
        #[arg(long = "type", default_value = "All")]
        interface: String,

        /// Hosts probed on port 9100 by the LAN scan
        #[arg(long = "lan-host", value_name = "HOST")]
        lan_hosts: Vec<String>,
    },

    /// Query printer status and firmware
    Status {
        #[arg(long)]
        port: String,

        #[arg(long, default_value = "StarLine")]
        emulation: String,
    },

    /// Compile and print a JSON job
    Print {
        #[arg(long)]
        port: String,

        #[arg(long, default_value = "StarLine")]
        emulation: String,

        /// JSON file holding an array of command objects ("-" for stdin)
        job: PathBuf,
    },

    /// Compile a JSON job to printer bytes without printing
    Compile {
        #[arg(long, default_value = "StarLine")]
        emulation: String,

        /// JSON file holding an array of command objects ("-" for stdin)
        job: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Open a persistent connection, report its status, then disconnect
    Connect {
        #[arg(long)]
        port: String,

        #[arg(long, default_value = "StarLine")]
        emulation: String,

        /// The printer has a barcode reader attached
        #[arg(long)]
        barcode_reader: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, CometaError> {
    let cli = Cli::parse();
    let config = cli.timing.config();

    let (requests, lan_hosts) = match cli.command {
        Commands::Compile {
            emulation,
            job,
            out,
        } => {
            let job = read_job(&job)?;
            let bytes = cometa::compile(&job, Emulation::parse(&emulation));
            match out {
                Some(path) => fs::write(&path, &bytes)?,
                None => io::stdout().write_all(&bytes)?,
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Discover {
            interface,
            lan_hosts,
        } => (
            vec![Request::Discover {
                filter: InterfaceFilter::parse(&interface),
            }],
            lan_hosts,
        ),
        Commands::Status { port, emulation } => (
            vec![Request::CheckStatus {
                port_name: port,
                emulation: EmulationSelector::parse(&emulation),
            }],
            Vec::new(),
        ),
        Commands::Print {
            port,
            emulation,
            job,
        } => (
            vec![Request::Print {
                port_name: port,
                emulation: EmulationSelector::parse(&emulation),
                job: read_job(&job)?,
            }],
            Vec::new(),
        ),
        Commands::Connect {
            port,
            emulation,
            barcode_reader,
        } => (
            vec![Request::Connect {
                port_name: port,
                emulation: EmulationSelector::parse(&emulation),
                has_barcode_reader: barcode_reader,
            }],
            Vec::new(),
        ),
    };

    let services = Services::system(config, lan_hosts);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let responses = runtime.block_on(dispatch(services, requests))?;

    let mut failed = false;
    for response in &responses {
        failed |= response.is_failure();
        println!("{}", serde_json::to_string_pretty(response)?);
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Run requests through the worker pool, returning responses in submission
/// order. A successful connect is followed by a disconnect.
async fn dispatch(services: Services, requests: Vec<Request>) -> Result<Vec<Response>, CometaError> {
    let connections = services.connections.clone();
    let (dispatcher, mut completions) = Dispatcher::start(services, DEFAULT_WORKERS, DEFAULT_QUEUE_CAPACITY);

    let mut ids = Vec::with_capacity(requests.len());
    for request in requests {
        ids.push(dispatcher.submit(request).await?);
    }

    let mut done = HashMap::new();
    while done.len() < ids.len() {
        let Some(completion) = completions.recv().await else {
            break;
        };
        done.insert(completion.id, completion.response);
    }

    if connections.is_connected() {
        if let Ok(status) = connections.status() {
            tracing::info!(?status, "connected printer status");
        }
        let id = dispatcher.submit(Request::Disconnect).await?;
        if let Some(completion) = completions.recv().await {
            tracing::debug!(%id, response = ?completion.response, "disconnected");
        }
    }
    dispatcher.shutdown().await;

    ids.iter()
        .map(|id| {
            done.remove(id)
                .ok_or_else(|| CometaError::Transport("worker pool stopped early".to_string()))
        })
        .collect()
}

fn read_job(path: &Path) -> Result<PrintJob, CometaError> {
    let json = if path.as_os_str() == "-" {
        io::read_to_string(io::stdin())?
    } else {
        fs::read_to_string(path)?
    };
    parse_job(&json)
}
