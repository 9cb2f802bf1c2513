use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use log::{info, LevelFilter};

use airport_network::analysis::{degree_sequence, Degree};
use airport_network::export::{export_to_graphvis, write_edge_list, write_node_attributes};
use airport_network::{AirportNetwork, DataPaths, Dataset};

#[derive(Parser, Debug)]
#[command(name = "airport_network", about = "Build the OpenFlights airport network")]
struct Cli {
    /// Directory holding airports.dat.txt and routes.dat.txt
    #[arg(long, env = "OPENFLIGHTS_DIR", default_value = airport_network::config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Build the weighted network instead of the unweighted one
    #[arg(long)]
    weighted: bool,

    /// Write the network as a Graphviz file
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Write the weighted edge list as CSV (implies --weighted)
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Write node attributes as JSON
    #[arg(long)]
    nodes: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let dataset = Dataset::load(&DataPaths::from_dir(&cli.data_dir))?;

    if cli.weighted || cli.edges.is_some() {
        let network = dataset.weighted_graph();
        report(&network);
        if let Some(path) = &cli.edges {
            write_edge_list(&network, BufWriter::new(File::create(path)?))?;
            info!("wrote edge list to {}", path.display());
        }
        write_outputs(&cli, &network)?;
    } else {
        let network = dataset.unweighted_graph();
        report(&network);
        write_outputs(&cli, &network)?;
    }

    Ok(())
}

fn report<E>(network: &AirportNetwork<E>) {
    info!("Number of nodes in graph: {}", network.node_count());
    info!("Number of edges in graph: {}", network.edge_count());

    let enriched = network.nodes().filter(|node| node.location.is_some()).count();
    info!(
        "Nodes without an airport record: {}",
        network.node_count() - enriched
    );
    if !network.ambiguous_joins().is_empty() {
        info!(
            "Identifiers with duplicate airport records: {}",
            network.ambiguous_joins().len()
        );
    }

    let max_out = degree_sequence(network, Degree::Out).into_iter().max().unwrap_or(0);
    info!("Largest out-degree: {}", max_out);
}

fn write_outputs<E>(cli: &Cli, network: &AirportNetwork<E>) -> Result<(), Box<dyn Error>>
where
    E: airport_network::export::EdgeLabel + std::fmt::Debug,
{
    if let Some(path) = &cli.dot {
        export_to_graphvis(network, path)?;
        info!("wrote graph to {}", path.display());
    }
    if let Some(path) = &cli.nodes {
        write_node_attributes(network, BufWriter::new(File::create(path)?))?;
        info!("wrote node attributes to {}", path.display());
    }
    Ok(())
}
