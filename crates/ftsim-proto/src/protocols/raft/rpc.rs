//! # ftsim-proto::protocols::raft::rpc
//!
//! Defines the structs for Raft's Remote Procedure Calls (RPCs), which are
//! serialized as `Message` variants.
//!
//! `install_snapshot` is intentionally absent: log compaction is out of
//! scope (see SPEC_FULL.md §9); a future RPC variant would live here.

use super::state::LogEntry;
use ftsim_types::id::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RequestVote {
    pub term: u64,
    pub candidate_id: NodeId,
    pub last_log_index: u64,
    pub last_log_term: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RequestVoteReply {
    pub term: u64,
    pub vote_granted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppendEntries {
    pub term: u64,
    pub leader_id: NodeId,
    pub prev_log_index: u64,
    pub prev_log_term: u64,
    pub entries: Vec<LogEntry>,
    pub leader_commit: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppendEntriesReply {
    pub term: u64,
    pub success: bool,
    pub match_index: u64,
    pub conflict_index: Option<u64>,
}
