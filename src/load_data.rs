//! Loading of the OpenFlights airport and route tables.
//!
//! Both files are headerless CSV. Only the row arity is validated here; numeric
//! airport columns that do not parse (the dataset uses `\N`) are read as `None`.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::DataPaths;
use crate::error::{NetworkError, Result};

pub const AIRPORT_FIELDS: usize = 14;
pub const ROUTE_FIELDS: usize = 9;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AirportRecord {
    pub id: String,
    pub name: String,
    /// Empty fields are read as `None`.
    pub city: Option<String>,
    pub country: Option<String>,
    pub iata: String,
    pub icao: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub altitude: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub timezone: Option<f64>,
    pub dst: String,
    pub tz_database_time: String,
    pub airport_type: String,
    pub source: String,
}

/// One scheduled route. Only `source_id` and `destination_id` feed the graph.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteRecord {
    pub airline: String,
    pub airline_id: String,
    pub source_airport: String,
    pub source_id: String,
    pub destination_airport: String,
    pub destination_id: String,
    pub codeshare: String,
    pub stops: String,
    pub equipment: String,
}

/// Both input tables, fully materialized.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub airports: Vec<AirportRecord>,
    pub routes: Vec<RouteRecord>,
}

impl Dataset {
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let airports = load_airport_table(&paths.airports)?;
        let routes = load_route_table(&paths.routes)?;
        Ok(Dataset { airports, routes })
    }
}

pub fn load_airport_table(path: &Path) -> Result<Vec<AirportRecord>> {
    let airports = read_airports(open(path)?, path)?;
    debug!("loaded {} airports from {}", airports.len(), path.display());
    Ok(airports)
}

pub fn load_route_table(path: &Path) -> Result<Vec<RouteRecord>> {
    let routes = read_routes(open(path)?, path)?;
    debug!("loaded {} routes from {}", routes.len(), path.display());
    Ok(routes)
}

/// Parses airport rows from any reader. `origin` only labels errors.
pub fn read_airports<R: Read>(reader: R, origin: &Path) -> Result<Vec<AirportRecord>> {
    read_table(reader, origin, AIRPORT_FIELDS)
}

pub fn read_routes<R: Read>(reader: R, origin: &Path) -> Result<Vec<RouteRecord>> {
    read_table(reader, origin, ROUTE_FIELDS)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => NetworkError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => NetworkError::Io(err),
    })
}

fn read_table<R, T>(reader: R, origin: &Path, fields: usize) -> Result<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    let csv_error = |source: csv::Error| NetworkError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.len() < fields {
            return Err(NetworkError::MalformedInput {
                path: PathBuf::from(origin),
                line: record.position().map(|pos| pos.line()).unwrap_or(0),
                expected: fields,
                found: record.len(),
            });
        }

        // trailing columns beyond the schema are ignored
        let trimmed: StringRecord = record.iter().take(fields).collect();
        rows.push(trimmed.deserialize(None).map_err(csv_error)?);
    }

    Ok(rows)
}
