use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "./openflights";
pub const AIRPORTS_FILE: &str = "airports.dat.txt";
pub const ROUTES_FILE: &str = "routes.dat.txt";

/// Locations of the two OpenFlights tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub airports: PathBuf,
    pub routes: PathBuf,
}

impl DataPaths {
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        DataPaths {
            airports: dir.join(AIRPORTS_FILE),
            routes: dir.join(ROUTES_FILE),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths::from_dir(DEFAULT_DATA_DIR)
    }
}
