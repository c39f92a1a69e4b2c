//! CLI for cluster operations

use anyhow::Context;
use clap::{Parser, Subcommand};
use miniweed::common::{format_bytes, ClientConfig};
use miniweed::{AssignOptions, Client};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "miniweed")]
#[command(about = "Client for master/volume/filer blob-storage clusters")]
#[command(version)]
struct Cli {
    /// Master address (host:port); overrides the config file
    #[arg(long)]
    master: Option<String>,

    /// TOML config file (defaults to $MINIWEED_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign file ids
    Assign {
        #[arg(long, default_value = "1")]
        count: u32,

        #[arg(long, default_value = "")]
        collection: String,

        #[arg(long, default_value = "")]
        replication: String,

        #[arg(long, default_value = "")]
        datacenter: String,

        #[arg(long, default_value = "")]
        ttl: String,
    },

    /// Assign an id and upload a file
    Upload {
        /// File path
        file: PathBuf,

        #[arg(long, default_value = "")]
        collection: String,

        #[arg(long, default_value = "")]
        replication: String,

        /// MIME type (application/octet-stream if omitted)
        #[arg(long, default_value = "")]
        mime: String,
    },

    /// Download a file
    Download {
        fid: String,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value = "")]
        collection: String,
    },

    /// Delete a file
    Delete {
        fid: String,

        /// Number of keys assigned together with this fid
        #[arg(long, default_value = "1")]
        count: u32,

        #[arg(long, default_value = "")]
        collection: String,
    },

    /// Show the replica a volume resolves to
    Lookup {
        volume_id: u32,

        #[arg(long, default_value = "")]
        collection: String,

        /// Preferred datacenter (config value if omitted)
        #[arg(long)]
        datacenter: Option<String>,
    },

    /// Print public and internal URLs of a file
    Url {
        fid: String,

        #[arg(long, default_value = "")]
        collection: String,
    },

    /// Print cluster topology
    Status,

    /// Pre-allocate volumes
    Grow {
        #[arg(long)]
        count: u32,

        #[arg(long, default_value = "")]
        collection: String,

        #[arg(long, default_value = "")]
        replication: String,

        #[arg(long, default_value = "")]
        datacenter: String,
    },

    /// Vacuum volumes above a garbage ratio
    Gc {
        #[arg(long, default_value = "0.3")]
        threshold: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| std::env::var(miniweed::common::config::CONFIG_ENV).ok());
    let mut config = ClientConfig::load_from(config_path.as_deref())?;
    if let Some(master) = cli.master {
        config.master = master;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = Client::new(&config)?;
    let result = run(&client, &config, cli.command).await;
    client.shutdown().await;
    result
}

async fn run(client: &Client, config: &ClientConfig, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Assign {
            count,
            collection,
            replication,
            datacenter,
            ttl,
        } => {
            let options = AssignOptions::with_count(count)
                .collection(collection)
                .replication(replication)
                .data_center(datacenter)
                .ttl(ttl);
            let resp = client.master().assign_args(&options).await?;
            println!("fid:        {}", resp.fid);
            println!("count:      {}", resp.count);
            println!("url:        {}", resp.url);
            println!("public url: {}", resp.public_url);
        }

        Commands::Upload {
            file,
            collection,
            replication,
            mime,
        } => {
            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let options = AssignOptions::default()
                .collection(collection)
                .replication(replication);
            let (fid, size) = client
                .assign_upload_args(&filename, &mime, content, &options)
                .await?;
            println!("{} ({})", fid, format_bytes(size));
        }

        Commands::Download {
            fid,
            output,
            collection,
        } => {
            let body = client
                .download(&fid, &collection, &config.datacenter)
                .await?;
            tokio::fs::write(&output, &body)
                .await
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "{} -> {} ({})",
                fid,
                output.display(),
                format_bytes(body.len() as u64)
            );
        }

        Commands::Delete {
            fid,
            count,
            collection,
        } => {
            client.delete(&fid, count, &collection).await?;
            println!("deleted {}", fid);
        }

        Commands::Lookup {
            volume_id,
            collection,
            datacenter,
        } => {
            let datacenter = datacenter.unwrap_or_else(|| config.datacenter.clone());
            if !datacenter.is_empty() {
                client.master().refresh_now().await?;
            }
            let vol = client
                .master()
                .lookup(volume_id, &collection, &datacenter)
                .await?;
            let dc = client
                .master()
                .topology()
                .datacenter_of(vol.url())
                .unwrap_or_else(|| "?".to_string());
            println!("url:        {}", vol.url());
            println!("public url: {}", vol.public_url());
            println!("datacenter: {}", dc);
        }

        Commands::Url { fid, collection } => {
            let (public_url, url) = client.get_url(&fid, &collection).await?;
            println!("public: {}", public_url);
            println!("url:    {}", url);
        }

        Commands::Status => {
            let status = client.master().status().await?;
            println!("version: {}", status.version);
            println!(
                "free/max: {}/{}",
                status.topology.free, status.topology.max
            );
            for dc in &status.topology.data_centers {
                println!("datacenter {} ({}/{})", dc.id, dc.free, dc.max);
                for rack in &dc.racks {
                    println!("  rack {} ({}/{})", rack.id, rack.free, rack.max);
                    for node in &rack.data_nodes {
                        println!(
                            "    {} [{}] volumes={} ({}/{})",
                            node.url, node.public_url, node.volumes, node.free, node.max
                        );
                    }
                }
            }
        }

        Commands::Grow {
            count,
            collection,
            replication,
            datacenter,
        } => {
            client
                .master()
                .grow(count, &collection, &replication, &datacenter)
                .await?;
            println!("grow requested ({} volumes)", count);
        }

        Commands::Gc { threshold } => {
            client.master().gc(threshold).await?;
            println!("vacuum requested (threshold {})", threshold);
        }
    }

    Ok(())
}
