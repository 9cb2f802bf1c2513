use std::collections::HashMap;

use log::{info, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::load_data::{AirportRecord, Dataset, RouteRecord};

/// Number of route records collapsed into one directed edge.
pub type Weight = u32;

pub type RouteNetwork = AirportNetwork<()>;
pub type WeightedRouteNetwork = AirportNetwork<Weight>;

/// Attributes copied from the airport table onto a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&AirportRecord> for Location {
    fn from(airport: &AirportRecord) -> Self {
        Location {
            city: airport.city.clone(),
            country: airport.country.clone(),
            latitude: airport.latitude,
            longitude: airport.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportNode {
    pub id: String,
    /// `None` when the identifier has no row in the airport table.
    pub location: Option<Location>,
}

/// An identifier that matched more than one airport row during enrichment.
/// The first row in table order was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousJoin {
    pub id: String,
    pub matches: usize,
}

/// Directed airport graph with lookup by airport identifier.
#[derive(Debug, Clone)]
pub struct AirportNetwork<E> {
    graph: DiGraph<AirportNode, E>,
    index: HashMap<String, NodeIndex>,
    ambiguous_joins: Vec<AmbiguousJoin>,
}

impl<E> AirportNetwork<E> {
    fn new() -> Self {
        AirportNetwork {
            graph: DiGraph::new(),
            index: HashMap::new(),
            ambiguous_joins: Vec::new(),
        }
    }

    /// Returns the node for `id`, creating it if needed.
    fn add_node(&mut self, id: &str) -> NodeIndex {
        let graph = &mut self.graph;
        *self.index.entry(id.to_string()).or_insert_with(|| {
            graph.add_node(AirportNode {
                id: id.to_string(),
                location: None,
            })
        })
    }

    pub fn graph(&self) -> &DiGraph<AirportNode, E> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&AirportNode> {
        self.index_of(id).map(|node| &self.graph[node])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &AirportNode> {
        self.graph.node_weights()
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        match (self.index_of(source), self.index_of(target)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Edges as `(source id, target id, edge weight)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &E)> {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].id.as_str(),
                self.graph[edge.target()].id.as_str(),
                edge.weight(),
            )
        })
    }

    pub fn ambiguous_joins(&self) -> &[AmbiguousJoin] {
        &self.ambiguous_joins
    }
}

impl WeightedRouteNetwork {
    pub fn edge_weight(&self, source: &str, target: &str) -> Option<Weight> {
        let a = self.index_of(source)?;
        let b = self.index_of(target)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }
}

/// Result of looking an identifier up in the airport table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Missing,
    Unique(&'a AirportRecord),
    /// Several rows share the identifier; `first` is the earliest in table order.
    Ambiguous {
        first: &'a AirportRecord,
        matches: usize,
    },
}

/// Identifier to row-position index over the airport table.
pub struct AirportIndex<'a> {
    table: &'a [AirportRecord],
    rows: HashMap<&'a str, Vec<usize>>,
}

impl<'a> AirportIndex<'a> {
    pub fn new(table: &'a [AirportRecord]) -> Self {
        let mut rows: HashMap<&str, Vec<usize>> = HashMap::new();
        for (position, airport) in table.iter().enumerate() {
            rows.entry(airport.id.as_str()).or_default().push(position);
        }
        AirportIndex { table, rows }
    }

    pub fn lookup(&self, id: &str) -> Lookup<'a> {
        match self.rows.get(id).map(Vec::as_slice) {
            None | Some([]) => Lookup::Missing,
            Some([only]) => Lookup::Unique(&self.table[*only]),
            Some(positions) => Lookup::Ambiguous {
                first: &self.table[positions[0]],
                matches: positions.len(),
            },
        }
    }
}

/// Attaches city, country and coordinates to every node. Node membership and
/// edges are left untouched.
pub fn enrich<E>(network: &mut AirportNetwork<E>, airports: &[AirportRecord]) {
    let index = AirportIndex::new(airports);
    let mut ambiguous = Vec::new();

    for node in network.graph.node_weights_mut() {
        node.location = match index.lookup(&node.id) {
            Lookup::Missing => None,
            Lookup::Unique(airport) => Some(Location::from(airport)),
            Lookup::Ambiguous { first, matches } => {
                warn!(
                    "airport id {} matches {} rows, using the first",
                    node.id, matches
                );
                ambiguous.push(AmbiguousJoin {
                    id: node.id.clone(),
                    matches,
                });
                Some(Location::from(first))
            }
        };
    }

    network.ambiguous_joins = ambiguous;
}

/// Builds the presence-only route graph.
///
/// Every airport in the table becomes a node, including airports without
/// routes. Route endpoints missing from the table are added as they appear.
/// Parallel routes collapse into a single edge.
pub fn build_unweighted_graph(airports: &[AirportRecord], routes: &[RouteRecord]) -> RouteNetwork {
    let mut network = RouteNetwork::new();

    for airport in airports {
        network.add_node(&airport.id);
    }

    for route in routes {
        let source = network.add_node(&route.source_id);
        let target = network.add_node(&route.destination_id);
        network.graph.update_edge(source, target, ());
    }

    enrich(&mut network, airports);

    info!(
        "unweighted network: {} nodes, {} edges",
        network.node_count(),
        network.edge_count()
    );
    network
}

/// Builds the route graph with edge weight = number of route records between
/// the same ordered pair.
///
/// Nodes come from route endpoints only: airports without any route are not
/// part of this graph, unlike [`build_unweighted_graph`].
pub fn build_weighted_graph(
    airports: &[AirportRecord],
    routes: &[RouteRecord],
) -> WeightedRouteNetwork {
    let mut network = WeightedRouteNetwork::new();

    for route in routes {
        let source = network.add_node(&route.source_id);
        let target = network.add_node(&route.destination_id);

        match network.graph.find_edge(source, target) {
            Some(edge) => network.graph[edge] += 1,
            None => {
                network.graph.add_edge(source, target, 1);
            }
        }
    }

    enrich(&mut network, airports);

    info!(
        "weighted network: {} nodes, {} edges from {} routes",
        network.node_count(),
        network.edge_count(),
        routes.len()
    );
    network
}

impl Dataset {
    pub fn unweighted_graph(&self) -> RouteNetwork {
        build_unweighted_graph(&self.airports, &self.routes)
    }

    pub fn weighted_graph(&self) -> WeightedRouteNetwork {
        build_weighted_graph(&self.airports, &self.routes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::load_data::read_airports;
    use std::path::Path;

    pub(crate) fn airport(id: &str, city: &str, country: &str, lat: f64, lon: f64) -> AirportRecord {
        AirportRecord {
            id: id.to_string(),
            name: format!("{city} Airport"),
            city: Some(city.to_string()),
            country: Some(country.to_string()),
            iata: String::new(),
            icao: String::new(),
            latitude: Some(lat),
            longitude: Some(lon),
            altitude: Some(0.0),
            timezone: Some(0.0),
            dst: "U".to_string(),
            tz_database_time: String::new(),
            airport_type: "airport".to_string(),
            source: "OurAirports".to_string(),
        }
    }

    pub(crate) fn route(source: &str, destination: &str) -> RouteRecord {
        RouteRecord {
            airline: "2B".to_string(),
            airline_id: "410".to_string(),
            source_airport: String::new(),
            source_id: source.to_string(),
            destination_airport: String::new(),
            destination_id: destination.to_string(),
            codeshare: String::new(),
            stops: "0".to_string(),
            equipment: "CR2".to_string(),
        }
    }

    pub(crate) fn sample_dataset() -> Dataset {
        Dataset {
            airports: vec![
                airport("1", "A", "X", 1.0, 2.0),
                airport("2", "B", "Y", 3.0, 4.0),
            ],
            routes: vec![route("1", "2"), route("1", "2"), route("2", "1")],
        }
    }

    fn sorted_ids<E>(network: &AirportNetwork<E>) -> Vec<&str> {
        let mut ids: Vec<&str> = network.nodes().map(|node| node.id.as_str()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_unweighted_graph() {
        let dataset = sample_dataset();
        let network = dataset.unweighted_graph();

        assert_eq!(sorted_ids(&network), vec!["1", "2"]);
        assert_eq!(network.edge_count(), 2);
        assert!(network.contains_edge("1", "2"));
        assert!(network.contains_edge("2", "1"));
    }

    #[test]
    fn test_weighted_graph() {
        let dataset = sample_dataset();
        let network = dataset.weighted_graph();

        assert_eq!(sorted_ids(&network), vec!["1", "2"]);
        assert_eq!(network.edge_count(), 2);
        assert_eq!(network.edge_weight("1", "2"), Some(2));
        assert_eq!(network.edge_weight("2", "1"), Some(1));
        assert!(network.edges().all(|(_, _, &weight)| weight >= 1));

        let node = network.node("1").unwrap();
        assert_eq!(
            node.location,
            Some(Location {
                city: Some("A".to_string()),
                country: Some("X".to_string()),
                latitude: Some(1.0),
                longitude: Some(2.0),
            })
        );
    }

    #[test]
    fn test_weights_sum_to_route_count() {
        let routes = vec![
            route("1", "2"),
            route("2", "3"),
            route("1", "2"),
            route("2", "3"),
            route("1", "2"),
            route("3", "3"),
        ];
        let network = build_weighted_graph(&[], &routes);

        assert_eq!(network.edge_weight("1", "2"), Some(3));
        assert_eq!(network.edge_weight("2", "3"), Some(2));
        assert_eq!(network.edge_weight("3", "3"), Some(1));
        assert_eq!(network.edge_weight("2", "1"), None);
        let total: Weight = network.edges().map(|(_, _, weight)| *weight).sum();
        assert_eq!(total as usize, routes.len());
    }

    #[test]
    fn test_isolated_airport_only_in_unweighted() {
        let mut dataset = sample_dataset();
        dataset.airports.push(airport("4", "D", "Z", 5.0, 6.0));

        let unweighted = dataset.unweighted_graph();
        let weighted = dataset.weighted_graph();

        assert!(unweighted.contains_node("4"));
        assert!(unweighted.node("4").unwrap().location.is_some());
        assert!(!weighted.contains_node("4"));
    }

    #[test]
    fn test_unknown_route_endpoint() {
        let mut dataset = sample_dataset();
        dataset.routes.push(route("1", "3"));

        let unweighted = dataset.unweighted_graph();
        let weighted = dataset.weighted_graph();

        for node in [unweighted.node("3"), weighted.node("3")] {
            let node = node.unwrap();
            assert_eq!(node.location, None);
        }
        assert!(unweighted.contains_edge("1", "3"));
        assert_eq!(weighted.edge_weight("1", "3"), Some(1));
    }

    #[test]
    fn test_duplicate_airport_ids_take_first_row() {
        let mut dataset = sample_dataset();
        dataset.airports.push(airport("1", "Other", "W", 9.0, 9.0));

        let network = dataset.weighted_graph();
        let location = network.node("1").unwrap().location.as_ref().unwrap();
        assert_eq!(location.city.as_deref(), Some("A"));
        assert_eq!(
            network.ambiguous_joins(),
            &[AmbiguousJoin {
                id: "1".to_string(),
                matches: 2,
            }]
        );

        // still one node per identifier
        let unweighted = dataset.unweighted_graph();
        assert_eq!(unweighted.node_count(), 2);
        assert_eq!(unweighted.ambiguous_joins().len(), 1);
    }

    #[test]
    fn test_missing_coordinates_are_kept_absent() {
        let mut record = airport("7", "G", "V", 0.0, 0.0);
        record.latitude = None;
        record.longitude = None;

        let network = build_weighted_graph(&[record], &[route("7", "8")]);
        let location = network.node("7").unwrap().location.as_ref().unwrap();
        assert_eq!(location.city.as_deref(), Some("G"));
        assert_eq!(location.latitude, None);
        assert_eq!(location.longitude, None);
    }

    #[test]
    fn test_empty_city_and_country_are_missing() {
        let input = "9,\"Strip\",\"\",\"\",\\N,\\N,1.0,2.0,0,0,\"U\",\"UTC\",\"airport\",\"User\"\n";
        let airports = read_airports(input.as_bytes(), Path::new("airports")).unwrap();

        let network = build_unweighted_graph(&airports, &[]);
        assert_eq!(
            network.node("9").unwrap().location,
            Some(Location {
                city: None,
                country: None,
                latitude: Some(1.0),
                longitude: Some(2.0),
            })
        );
    }

    #[test]
    fn test_rebuild_is_identical() {
        let dataset = sample_dataset();

        let first = dataset.weighted_graph();
        let second = dataset.weighted_graph();
        let edges = |network: &WeightedRouteNetwork| {
            let mut edges: Vec<(String, String, Weight)> = network
                .edges()
                .map(|(a, b, w)| (a.to_string(), b.to_string(), *w))
                .collect();
            edges.sort();
            edges
        };
        assert_eq!(edges(&first), edges(&second));
        for node in first.nodes() {
            assert_eq!(Some(node), second.node(&node.id));
        }
    }

    #[test]
    fn test_airport_index_lookup() {
        let table = vec![
            airport("1", "A", "X", 1.0, 2.0),
            airport("2", "B", "Y", 3.0, 4.0),
            airport("2", "C", "Y", 5.0, 6.0),
        ];
        let index = AirportIndex::new(&table);

        assert_eq!(index.lookup("1"), Lookup::Unique(&table[0]));
        assert_eq!(
            index.lookup("2"),
            Lookup::Ambiguous {
                first: &table[1],
                matches: 2,
            }
        );
        assert_eq!(index.lookup("3"), Lookup::Missing);
    }
}
