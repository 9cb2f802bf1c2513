//! Builds directed airport networks from the OpenFlights airport and route
//! tables and enriches every node with its city, country and coordinates.

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod load_data;
pub mod network;

pub use config::DataPaths;
pub use error::{NetworkError, Result};
pub use load_data::{load_airport_table, load_route_table, AirportRecord, Dataset, RouteRecord};
pub use network::{
    build_unweighted_graph, build_weighted_graph, AirportNetwork, AirportNode, Location,
    RouteNetwork, WeightedRouteNetwork,
};
