/// The clean stage: localization, weapon reconciliation, upgrade chains and
/// the final columns
pub mod clean;
/// Code tables and unit conversions, stamped with the game build they match
pub mod constants;
/// The document graph of exported tables and reference resolution over it
pub mod data;
/// Driving the external table exporter
pub mod dump;
/// Error definitions
pub mod error;
/// The export stage: flattening unit descriptors into raw units
pub mod export;
/// Forward operating base cleanup
pub mod fobs;
/// Dump directory layout and output file names
pub mod game_data;
/// Game concept types (unit ids, stock indices, module and deck kinds).
pub mod game_types;
/// Localization hash lookup
pub mod localization;
/// The stages wired to their input and output files
#[cfg(feature = "json")]
pub mod pipeline;
/// Generic wrapper for values that may or may not match a known variant.
pub mod recognized;
/// The flat output table and its CSV form
pub mod table;
