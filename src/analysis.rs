//! Numbers derived from a built network: degree distributions, correlations
//! and the geographic subset used for map overlays.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::network::{AirportNetwork, AirportNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    In,
    Out,
    Total,
}

/// Degree of every node, in node order.
pub fn degree_sequence<E>(network: &AirportNetwork<E>, degree: Degree) -> Vec<usize> {
    let graph = network.graph();
    graph
        .node_indices()
        .map(|node| {
            let incoming = graph.edges_directed(node, Direction::Incoming).count();
            let outgoing = graph.edges_directed(node, Direction::Outgoing).count();
            match degree {
                Degree::In => incoming,
                Degree::Out => outgoing,
                Degree::Total => incoming + outgoing,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistogramOptions {
    /// Probability density instead of raw counts.
    pub normalize: bool,
    pub cumulative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub value: f64,
}

/// Equal-width histogram over the range of `values`. Non-finite values are
/// ignored. A single distinct value is centred in a unit-wide range.
pub fn histogram(values: &[f64], bins: usize, options: HistogramOptions) -> Vec<Bin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in &values {
        let slot = ((value - min) / width) as usize;
        counts[slot.min(bins - 1)] += 1;
    }

    let total = values.len() as f64;
    let mut running = 0.0;
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let mut value = count as f64;
            if options.cumulative {
                running += value;
                value = running;
            }
            if options.normalize {
                // cumulative densities end at 1
                value /= if options.cumulative { total } else { total * width };
            }
            Bin {
                start: min + width * i as f64,
                end: min + width * (i + 1) as f64,
                value,
            }
        })
        .collect()
}

fn complete_pairs(xs: &[Option<f64>], ys: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .filter_map(|pair| match pair {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .unzip()
}

fn pearson_complete(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(covariance / (var_x.sqrt() * var_y.sqrt()))
}

/// Pearson correlation over the pairs where both values are present.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let (xs, ys) = complete_pairs(xs, ys);
    pearson_complete(&xs, &ys)
}

/// Spearman rank correlation; tied values share their average rank.
pub fn spearman(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let (xs, ys) = complete_pairs(xs, ys);
    pearson_complete(&ranks(&xs), &ranks(&ys))
}

fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let average = (i + j) as f64 / 2.0 + 1.0;
        for &position in &order[i..=j] {
            ranks[position] = average;
        }
        i = j + 1;
    }
    ranks
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

/// Undirected copy of a network restricted to geolocated airports.
#[derive(Debug, Clone)]
pub struct GeoProjection {
    pub graph: UnGraph<String, ()>,
    pub positions: HashMap<String, Position>,
}

fn position_of(node: &AirportNode, countries: Option<&[&str]>) -> Option<Position> {
    let location = node.location.as_ref()?;
    if let Some(countries) = countries {
        let country = location.country.as_deref()?;
        if !countries.contains(&country) {
            return None;
        }
    }
    Some(Position {
        longitude: location.longitude?,
        latitude: location.latitude?,
    })
}

/// Keeps the nodes that have both coordinates (and, when `countries` is
/// given, a country from the list). Opposite directed edges merge into one
/// undirected edge. The source network is not modified.
pub fn geographic_projection<E>(
    network: &AirportNetwork<E>,
    countries: Option<&[&str]>,
) -> GeoProjection {
    let source = network.graph();
    let mut graph = UnGraph::new_undirected();
    let mut kept: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut positions = HashMap::new();

    for node in source.node_indices() {
        let airport = &source[node];
        if let Some(position) = position_of(airport, countries) {
            kept.insert(node, graph.add_node(airport.id.clone()));
            positions.insert(airport.id.clone(), position);
        }
    }

    for edge in source.edge_references() {
        if let (Some(&a), Some(&b)) = (kept.get(&edge.source()), kept.get(&edge.target())) {
            graph.update_edge(a, b, ());
        }
    }

    GeoProjection { graph, positions }
}
