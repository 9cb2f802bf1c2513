use std::fmt::Debug;
use std::io::Write;
use std::path::Path;

use petgraph::dot::{Config, Dot};
use serde::Serialize;

use crate::error::Result;
use crate::network::{AirportNetwork, AirportNode, Weight, WeightedRouteNetwork};

/// Text shown on an edge in the Graphviz output.
pub trait EdgeLabel {
    fn edge_label(&self) -> String;
}

impl EdgeLabel for () {
    fn edge_label(&self) -> String {
        String::new()
    }
}

impl EdgeLabel for Weight {
    fn edge_label(&self) -> String {
        self.to_string()
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_label(node: &AirportNode) -> String {
    match &node.location {
        Some(location) => format!(
            "{}: {}, {}",
            node.id,
            location.city.as_deref().unwrap_or(""),
            location.country.as_deref().unwrap_or("")
        ),
        None => node.id.clone(),
    }
}

pub fn export_to_graphvis<E>(network: &AirportNetwork<E>, filename: &Path) -> Result<()>
where
    E: EdgeLabel + Debug,
{
    let viz = Dot::with_attr_getters(
        network.graph(),
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        &|_, edge| format!("label=\"{}\"", escape(&edge.weight().edge_label())),
        &|_, (_, node)| format!("label=\"{}\"", escape(&node_label(node))),
    );

    std::fs::write(filename, format!("{:?}", viz))?;
    Ok(())
}

#[derive(Serialize)]
struct EdgeRow<'a> {
    #[serde(rename = "Source_Node")]
    source: &'a str,
    #[serde(rename = "Target_Node")]
    target: &'a str,
    #[serde(rename = "Weight")]
    weight: Weight,
}

/// Writes the weighted edges as CSV with a `Source_Node,Target_Node,Weight` header.
pub fn write_edge_list<W: Write>(network: &WeightedRouteNetwork, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for (source, target, &weight) in network.edges() {
        writer.serialize(EdgeRow {
            source,
            target,
            weight,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct NodeRow<'a> {
    id: &'a str,
    city: Option<&'a str>,
    country: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl<'a> From<&'a AirportNode> for NodeRow<'a> {
    fn from(node: &'a AirportNode) -> Self {
        let location = node.location.as_ref();
        NodeRow {
            id: &node.id,
            city: location.and_then(|l| l.city.as_deref()),
            country: location.and_then(|l| l.country.as_deref()),
            latitude: location.and_then(|l| l.latitude),
            longitude: location.and_then(|l| l.longitude),
        }
    }
}

/// Writes every node with its attributes as a JSON array; missing attributes
/// are `null`.
pub fn write_node_attributes<E, W: Write>(network: &AirportNetwork<E>, writer: W) -> Result<()> {
    let rows: Vec<NodeRow> = network.nodes().map(NodeRow::from).collect();
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}
