//! # Simulator interface
//!
//! The simulator exchanges socket.io text events. Each frame is the prefix `42` followed by a
//! JSON array `[event_name, payload]`. The planner only handles the `telemetry` event, replying
//! with a `control` event carrying the next trajectory, or with a `manual` event when the
//! simulator sends a frame without data.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod telemetry;

pub use telemetry::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Prefix of a socket.io message event frame.
pub const EVENT_FRAME_PREFIX: &str = "42";

/// Name of the telemetry event.
pub const TELEMETRY_EVENT: &str = "telemetry";

/// Reply sent when the simulator sends a frame without data.
pub const MANUAL_FRAME: &str = "42[\"manual\",{}]";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An event decoded from a simulator frame.
#[derive(Debug)]
pub enum SimEvent {
    /// Vehicle telemetry requiring a new trajectory.
    Telemetry(Telemetry),

    /// An event frame with no data, the simulator is in manual mode.
    NoData,

    /// An event other than telemetry, the contained string is the event name.
    Other(String),

    /// A frame which is not a message event (e.g. a socket.io ping).
    Ignored,
}

/// Errors which can occur while decoding a frame.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Frame contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Frame is not an array with an event name as its first element")]
    MissingEvent,

    #[error("Telemetry is missing fields or contains invalid values: {0}")]
    InvalidTelemetry(serde_json::Error),

    #[error("Previous path has {x_len} x values but {y_len} y values")]
    PathLengthMismatch { x_len: usize, y_len: usize },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Decode a single frame received from the simulator.
pub fn parse_frame(frame: &str) -> Result<SimEvent, TelemetryError> {
    let frame = frame.trim();

    if frame.len() <= EVENT_FRAME_PREFIX.len() || !frame.starts_with(EVENT_FRAME_PREFIX) {
        return Ok(SimEvent::Ignored);
    }

    let data = match extract_data(&frame[EVENT_FRAME_PREFIX.len()..]) {
        Some(d) => d,
        None => return Ok(SimEvent::NoData),
    };

    let val: Value = serde_json::from_str(data).map_err(TelemetryError::InvalidJson)?;

    let event = match val.get(0).and_then(Value::as_str) {
        Some(e) => e,
        None => return Err(TelemetryError::MissingEvent),
    };

    if event != TELEMETRY_EVENT {
        trace!("Received non-telemetry event \"{}\"", event);
        return Ok(SimEvent::Other(event.to_string()));
    }

    let payload = val.get(1).cloned().unwrap_or(Value::Null);
    let telem: Telemetry =
        serde_json::from_value(payload).map_err(TelemetryError::InvalidTelemetry)?;

    Ok(SimEvent::Telemetry(telem))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the JSON array contained in the event, or `None` if there's no data.
///
/// Any occurrence of `null` marks the frame as carrying no data.
fn extract_data(s: &str) -> Option<&str> {
    if s.contains("null") {
        return None;
    }

    let start = s.find('[')?;
    let end = s.rfind(']')?;

    if end <= start {
        return None;
    }

    Some(&s[start..=end])
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const TELEM_FRAME: &str = r#"42["telemetry",{"x":909.48,"y":1128.67,"yaw":0,"speed":0,"s":124.834,"d":6.164833,"previous_path_x":[],"previous_path_y":[],"end_path_s":0,"end_path_d":0,"sensor_fusion":[[0,1,2,3,4,5,6]]}]"#;

    #[test]
    fn test_parse_telemetry() {
        let telem = match parse_frame(TELEM_FRAME).unwrap() {
            SimEvent::Telemetry(t) => t,
            e => panic!("Expected telemetry, got {:?}", e),
        };

        assert_eq!(telem.x, 909.48);
        assert_eq!(telem.y, 1128.67);
        assert_eq!(telem.s, 124.834);
        assert!(telem.previous_path_x.is_empty());
        assert!(telem.sensor_fusion.is_array());
    }

    #[test]
    fn test_no_data_and_ignored() {
        assert!(matches!(parse_frame("42[\"telemetry\",null]"), Ok(SimEvent::NoData)));
        assert!(matches!(parse_frame("42"), Ok(SimEvent::Ignored)));
        assert!(matches!(parse_frame("2"), Ok(SimEvent::Ignored)));
        assert!(matches!(parse_frame("42 no array"), Ok(SimEvent::NoData)));
    }

    #[test]
    fn test_other_event() {
        match parse_frame("42[\"reset\",{}]").unwrap() {
            SimEvent::Other(e) => assert_eq!(e, "reset"),
            e => panic!("Expected other event, got {:?}", e),
        }
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            parse_frame("42[\"telemetry\",{\"x\":1.0}]"),
            Err(TelemetryError::InvalidTelemetry(_))
        ));
        assert!(matches!(
            parse_frame("42[\"telemetry\",{\"x\":1.0]"),
            Err(TelemetryError::InvalidJson(_))
        ));
        assert!(matches!(parse_frame("42[1,{}]"), Err(TelemetryError::MissingEvent)));
    }
}
