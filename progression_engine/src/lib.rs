//! # Progression Engine
//!
//! The rule-driven state machine behind the investigation. This crate reads the
//! static `case_rules` case file and owns everything that changes during play.
//!
//! ## Core Components
//!
//! - **trust**: per-character trust, emotion and block state
//! - **evidence**: keyword rule matching over character replies
//! - **triggers**: one-shot narrative rules gating trust and granting evidence
//! - **accusation**: the endgame phase machine
//! - **turn**: the pure, staged turn reducer tying the above together
//! - **game**: the async driver that calls the dialogue service and persists turns
//!
//! ## Design Philosophy
//!
//! - **Pure core**: every rule is a synchronous transformation over explicit state
//! - **Atomic turns**: a turn is computed on a draft and committed whole, or not at all
//! - **Data-driven**: characters, keywords and texts come from the case file

pub mod accusation;
pub mod dialogue;
pub mod error;
pub mod evidence;
pub mod game;
pub mod session;
pub mod storage;
pub mod triggers;
pub mod trust;
pub mod turn;

pub use accusation::*;
pub use dialogue::*;
pub use error::*;
pub use evidence::*;
pub use game::*;
pub use session::*;
pub use storage::*;
pub use triggers::*;
pub use trust::*;
pub use turn::*;
