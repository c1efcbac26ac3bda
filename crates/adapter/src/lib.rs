//! Adapter module - external control via a line-delimited JSON protocol
//!
//! This crate lets a presentation layer, an AI agent or a test harness
//! drive the engine out-of-process. The protocol is a **line-delimited
//! JSON** exchange over any `BufRead`/`Write` pair; the engine itself is
//! fully synchronous, so the transport (stdio pipe, socket, in-memory
//! buffer) is entirely the host's choice.
//!
//! # Message Types
//!
//! ## Client -> Engine
//!
//! - **start_level**: begin a run over a supplied level spec and seed
//! - **move**: swap two adjacent cells (special endpoints activate)
//! - **activate**: explicit special-tile activation
//! - **state**: request the current run snapshot
//!
//! ## Engine -> Client
//!
//! - **started**: run began; carries the initial snapshot
//! - **events**: per-step cascade events plus the settled snapshot
//! - **state**: snapshot answer
//! - **save**: progress record for a persistence sink (on start and on
//!   level completion)
//! - **error**: request rejected with a stable code; run state unchanged
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Engine: {"type":"start_level","seed":7,"level":{"id":1,"target_score":500,"moves":20,"rows":8,"cols":8,"kinds":["blue","orange","purple","green","red"]}}
//! Engine -> Client: {"type":"started","level_id":1,"snapshot":{...}}
//! Engine -> Client: {"type":"save","save":{"level_id":1,"score":0,"completed":false}}
//! Client -> Engine: {"type":"move","a":{"row":3,"col":2},"b":{"row":3,"col":3}}
//! Engine -> Client: {"type":"events","accepted":true,"terminal":"continue","steps":[...],"snapshot":{...}}
//! ```

pub mod protocol;
pub mod session;

pub use tile_match_core as core;
pub use tile_match_engine as engine;
pub use tile_match_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use session::{run_lines, Session};
