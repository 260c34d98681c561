//! Field names shared with subscribers.
//!
//! These strings are the keys collaborators use to address shared state and
//! result attributes, so they must match exactly.

// ====== Client window parameters ======

pub const POSITION: &str = "Position";
pub const WIDTH: &str = "Width";
pub const TIME_LOWER_BOUND: &str = "TimeLowerBound";
pub const TIME_UPPER_BOUND: &str = "TimeUpperBound";
pub const FIELDS: &str = "Fields";

// ====== Query service state ======

pub const QUERYABLE: &str = "Queryable";
pub const RESULTS_ADDED: &str = "ResultsAdded";
pub const RESULTS_REMOVED: &str = "ResultsRemoved";
pub const RESULTS_CHANGED: &str = "ResultsChanged";

// ====== Directory state ======

pub const DESCRIPTION: &str = "Description";
pub const DIRECTORY: &str = "Directory";
pub const ADDED: &str = "Added";
pub const REMOVED: &str = "Removed";

// ====== Result attributes ======

pub const MAPNAME: &str = "mapname";
pub const NORTH: &str = "north";
pub const SOUTH: &str = "south";
pub const EAST: &str = "east";
pub const WEST: &str = "west";
pub const MIN_ELEVATION: &str = "minelev";
pub const MAX_ELEVATION: &str = "maxelev";
pub const POPULATION: &str = "pop";
pub const VELOCITY: &str = "velocity";
pub const TIME: &str = "time";
