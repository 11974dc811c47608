//! Output writers.
//!
//! - [`json`]: write-once article envelopes under `by_created/YYYY/MM/` and
//!   the per-run `.action_result.json` read by the stats report
//!
//! Nothing here ever updates or deletes an existing envelope.

pub mod json;
