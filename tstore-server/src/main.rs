//! `tstore-server`: opens a [`DatabaseRegistry`] rooted at a data
//! directory and serves it over a best-effort line-oriented TCP listener
//! (spec §10's explicit scope note — a real RPC transport is out of
//! scope; this exists for manual smoke testing).

mod protocol;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{info, warn};

use tstore_api::{InProcessService, TStoreService};
use tstore_engine::{Config, DatabaseRegistry};
use tstore_storage::{FileRawMap, RawMap};

use protocol::Request;

/// TStore database server: opens a registry of databases and serves
/// requests as newline-delimited JSON.
#[derive(Parser, Debug)]
#[command(name = "tstore-server", about = "TStore database server")]
struct Args {
    /// Filesystem root under which every database's data lives.
    #[arg(long, default_value = "./data")]
    data_root: String,

    /// TCP port to listen on. Defaults to spec §6's default port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = Config::new(args.data_root.clone());
    if let Some(port) = args.port {
        config = config.with_port(port);
    }

    let raw_map: Arc<dyn RawMap> = Arc::new(FileRawMap::new(config.data_root.clone()));
    let registry = Arc::new(DatabaseRegistry::open("root", raw_map)?);
    let service: Arc<dyn TStoreService> = Arc::new(InProcessService::new(registry));

    let listener = TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!(port = config.port, data_root = %args.data_root, "tstore-server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, service).await {
                warn!(%peer, error = %err, "connection ended with an error");
            }
        });
    }
}

async fn handle_connection(stream: tokio::net::TcpStream, service: Arc<dyn TStoreService>) -> anyhow::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => protocol::dispatch(service.as_ref(), request).await,
            Err(err) => tstore_api::Response {
                status: tstore_api::StatusCode::InvalidQuery,
                message: Some(format!("malformed request: {err}")),
                result: None,
            },
        };
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        write_half.write_all(&encoded).await?;
    }
    Ok(())
}
