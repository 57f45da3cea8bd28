//! # Case Rules
//!
//! The "Case File" crate - characters, evidence rules, triggers and accusation
//! rules for a single investigation. Everything here is static: it is loaded
//! once, validated, and never mutated during play. Game state lives in
//! `progression_engine`.

pub mod case_file;
pub mod characters;
pub mod evidence;
pub mod mechanics;
pub mod triggers;

pub use case_file::*;
pub use characters::*;
pub use evidence::*;
pub use mechanics::*;
pub use triggers::*;
