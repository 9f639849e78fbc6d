//! Loading of the persisted waypoint format.
//!
//! The map file contains one waypoint per line as whitespace separated fields `x y s dx dy`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::info;

use super::{MapLoadError, Waypoint, WaypointMap};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of fields on each line of the map file.
const NUM_FIELDS: usize = 5;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WaypointMap {
    /// Load the map from the file at the given path.
    pub fn load<P: AsRef<Path>>(path: P, max_s_m: f64) -> Result<Self, MapLoadError> {
        let file = File::open(path.as_ref()).map_err(MapLoadError::FileLoadError)?;

        let map = Self::from_reader(BufReader::new(file), max_s_m)?;

        info!(
            "Loaded {} waypoints from {:?} (max_s = {} m)",
            map.len(),
            path.as_ref(),
            map.max_s_m()
        );

        Ok(map)
    }

    /// Parse a map from a reader. Blank lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R, max_s_m: f64) -> Result<Self, MapLoadError> {
        let mut waypoints = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            // Lines are reported 1-indexed
            let line_num = i + 1;
            let line = line.map_err(MapLoadError::FileLoadError)?;

            if line.trim().is_empty() {
                continue;
            }

            waypoints.push(parse_line(&line, line_num)?);
        }

        Self::new(waypoints, max_s_m)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_line(line: &str, line_num: usize) -> Result<Waypoint, MapLoadError> {
    let fields = line
        .split_whitespace()
        .map(|f| {
            f.parse::<f64>().map_err(|e| MapLoadError::ParseError {
                line: line_num,
                reason: format!("\"{}\" is not a number ({})", f, e),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    if fields.len() != NUM_FIELDS {
        return Err(MapLoadError::ParseError {
            line: line_num,
            reason: format!("expected {} fields, found {}", NUM_FIELDS, fields.len()),
        });
    }

    if fields.iter().any(|f| !f.is_finite()) {
        return Err(MapLoadError::ParseError {
            line: line_num,
            reason: String::from("all fields must be finite"),
        });
    }

    Ok(Waypoint::new(
        fields[0], fields[1], fields[2], fields[3], fields[4],
    ))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
