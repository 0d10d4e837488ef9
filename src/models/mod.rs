//! Core data structures.

pub mod match_record;
pub mod replay;

pub use match_record::{MatchRecord, PlayerRow};
pub use replay::{
    PlayerEntry, ReplayDetail, ReplaySearchResponse, ReplaySummary, TeamDetail, TeamSide,
};
