//! # ftsim-proto::protocols::raft::state
//!
//! Defines the core state machine for the Raft protocol: persistent and
//! volatile fields, the log, and the small helpers the replication and
//! election logic lean on (`quorum`, `last_log_index`, `term_at`, ...).

use ftsim_types::{id::NodeId, scenario::RaftConfig};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Follower,
    Candidate,
    Leader,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single entry in the replicated log. Immutable once appended to a
/// majority and committed; entries form a contiguous 1-based sequence.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub term: u64,
    pub index: u64,
    pub command: Vec<u8>,
}

/// The persistent and volatile state for a Raft node.
pub struct State {
    // --- Persistent state on all servers ---
    pub id: NodeId,
    pub peers: Vec<NodeId>,
    pub current_term: u64,
    pub voted_for: Option<NodeId>,
    pub log: Vec<LogEntry>,

    // --- Volatile state on all servers ---
    pub role: Role,
    pub commit_index: u64,
    pub last_applied: u64,

    // --- Volatile state on leaders ---
    pub next_index: BTreeMap<NodeId, u64>,
    pub match_index: BTreeMap<NodeId, u64>,

    // --- Volatile state on candidates ---
    pub votes_received: HashSet<NodeId>,

    // --- Timing parameters, threaded in from the scenario config ---
    pub config: RaftConfig,
}

impl State {
    pub fn new() -> Self {
        Self {
            id: 0,
            peers: Vec::new(),
            current_term: 0,
            voted_for: None,
            log: Vec::new(),
            role: Role::Follower,
            commit_index: 0,
            last_applied: 0,
            next_index: BTreeMap::new(),
            match_index: BTreeMap::new(),
            votes_received: HashSet::new(),
            config: RaftConfig::default(),
        }
    }

    /// A strict majority of the full cluster (self included).
    pub fn quorum(&self) -> usize {
        (self.peers.len() + 1) / 2 + 1
    }

    pub fn cluster_size(&self) -> usize {
        self.peers.len() + 1
    }

    pub fn last_log_index(&self) -> u64 {
        self.log.last().map_or(0, |e| e.index)
    }

    pub fn last_log_term(&self) -> u64 {
        self.log.last().map_or(0, |e| e.term)
    }

    /// Returns the term of the entry at `index`, or `0` for the sentinel
    /// "before the log" index `0`. Panics only if `index` refers to an
    /// entry that should exist but is missing — callers must bounds-check
    /// with `last_log_index()` first.
    pub fn term_at(&self, index: u64) -> u64 {
        if index == 0 {
            return 0;
        }
        self.log
            .iter()
            .find(|e| e.index == index)
            .map(|e| e.term)
            .unwrap_or(0)
    }

    /// Returns a clone of every entry with `index >= from` (1-based, may be
    /// `last_log_index() + 1`, in which case the slice is empty).
    pub fn entries_from(&self, from: u64) -> Vec<LogEntry> {
        self.log
            .iter()
            .filter(|e| e.index >= from)
            .cloned()
            .collect()
    }

    /// Truncates the log so that no entry with `index >= from` remains.
    /// A Leader never calls this on its own log (invariant 5); only
    /// followers truncate, and only in response to a conflicting entry
    /// from the current Leader.
    pub fn truncate_from(&mut self, from: u64) {
        self.log.retain(|e| e.index < from);
    }

    /// Appends a new entry to the end of the log, assigning it the next
    /// index. Used both by `propose` (Leader) and internally while merging
    /// a follower's log with incoming entries.
    pub fn append(&mut self, term: u64, command: Vec<u8>) -> u64 {
        let index = self.last_log_index() + 1;
        self.log.push(LogEntry {
            term,
            index,
            command,
        });
        index
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
