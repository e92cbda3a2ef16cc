//! Turns a free-text recipe request into an executable program for a robotic
//! kitchen appliance. A generative collaborator extracts a canonical recipe
//! and proposes a device plan; a local, deterministic validator repairs the
//! plan against the robot profile's limits; clarification sessions carry
//! unanswered questions across rounds until the plan resolves.

pub mod config;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod protocol;
pub mod session;
pub mod storage;
pub mod validation;
