//! kubetopo - renders Kubernetes namespace topology as a D2 diagram
//!
//! Inspects the configured namespaces through a read-only snapshot of the
//! cluster API and writes a single diagram document describing ingresses,
//! services, workloads, and the configuration objects they reference.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use kubetopo::cli::logging::init_logging;
use kubetopo::emit::render_document;
use kubetopo::kube::{KubeSnapshotSource, create_client};
use kubetopo::topo::builder::TopologyBuilder;

/// kubetopo - renders Kubernetes namespace topology as a D2 diagram
#[derive(Parser, Debug)]
#[command(name = "kubetopo")]
#[command(about = "Renders Kubernetes namespace topology as a D2 diagram", long_about = None)]
struct Args {
    /// Namespace to inspect (repeatable)
    #[arg(long = "namespace", short = 'n', default_values_t = [String::from("default")])]
    namespaces: Vec<String>,

    /// Path to the kubeconfig file (default: in-cluster, then KUBECONFIG,
    /// then ~/.kube/config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Output file, or `-` for stdout
    #[arg(long, short = 'o', default_value = "output.d2")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    // Connection failure is the one startup condition that aborts before
    // any output is produced.
    let client = create_client(args.kubeconfig.as_deref())
        .await
        .context("cannot establish a session with the cluster")?;
    let source = KubeSnapshotSource::new(client);

    tracing::debug!("building topology for namespaces: {:?}", args.namespaces);
    let graph = TopologyBuilder::new(&source).build(&args.namespaces).await;
    let document = render_document(&graph);

    if args.output.to_str() == Some("-") {
        std::io::stdout()
            .write_all(document.as_bytes())
            .context("failed to write document to stdout")?;
    } else {
        std::fs::write(&args.output, &document)
            .with_context(|| format!("failed to write {}", args.output.display()))?;
        tracing::info!("topology written to {}", args.output.display());
    }

    Ok(())
}
