//! # ftsim-types::scenario
//!
//! Defines the Rust structs that map directly to the Scenario DSL (YAML/TOML).
//! This is the authoritative schema for defining simulation experiments.

use crate::{
    envelope::ProtoTag,
    id::{LinkId, NodeId},
    time::{deserialize_sim_time, SimTime},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The top-level structure for a scenario definition file.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub seed: Option<u64>,
    pub initial: InitialSpec,
    pub topology: super::topology::TopologySpec,
    pub directives: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_at: Option<SimTime>,
    /// A convenience over per-link `Action::LinkDrop`/`LinkDelay` directives:
    /// applies the same drop/delay/duplicate fault model to every link in
    /// the topology at world-build time, matching the top-level
    /// `message_drop_rate`/`message_delay_min`/`message_delay_max`/
    /// `duplicate_rate` knobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniform_link_faults: Option<UniformLinkFaults>,
}

/// A uniform fault model applied to every link in the topology at
/// world-build time. See `Scenario::uniform_link_faults`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct UniformLinkFaults {
    #[serde(default)]
    pub drop_rate: f64,
    #[serde(default)]
    pub delay_min_ms: u64,
    #[serde(default)]
    pub delay_max_ms: u64,
    #[serde(default)]
    pub duplicate_rate: f64,
}

impl UniformLinkFaults {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.drop_rate) {
            return Err(format!(
                "drop_rate must be in [0,1], got {}",
                self.drop_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.duplicate_rate) {
            return Err(format!(
                "duplicate_rate must be in [0,1], got {}",
                self.duplicate_rate
            ));
        }
        if self.delay_min_ms > self.delay_max_ms {
            return Err(format!(
                "delay_min_ms ({}) must be <= delay_max_ms ({})",
                self.delay_min_ms, self.delay_max_ms
            ));
        }
        Ok(())
    }
}

impl Scenario {
    /// Validates the scenario for logical consistency.
    pub fn validate(&self) -> Result<(), String> {
        let num_nodes = self.initial.nodes;
        self.initial.raft.validate()?;
        if let Some(faults) = &self.uniform_link_faults {
            faults.validate()?;
        }
        for (i, directive) in self.directives.iter().enumerate() {
            let action = directive.action();
            // Validate NodeIds are in range
            if let Some(node_id) = action.node_id() {
                if (node_id as usize) >= num_nodes {
                    return Err(format!(
                        "Directive {} contains invalid NodeId {}; max is {}",
                        i,
                        node_id,
                        num_nodes - 1
                    ));
                }
            }
            // Validate partition sets. A partition may cover every node in
            // the cluster (that is the whole point of `partition(groups)` —
            // splitting the cluster into mutually unreachable groups), it
            // just may not assign any node to more than one group.
            if let Action::Partition { sets } = action {
                let mut seen_nodes = HashSet::new();
                for set in sets {
                    if set.is_empty() {
                        return Err(format!("Directive {} contains an empty partition set", i));
                    }
                    for &node_id in set {
                        if (node_id as usize) >= num_nodes {
                            return Err(format!(
                                "Directive {} partition references invalid NodeId {}; max is {}",
                                i,
                                node_id,
                                num_nodes - 1
                            ));
                        }
                        if !seen_nodes.insert(node_id) {
                            return Err(format!(
                                "Directive {} has duplicate node {} in partition sets",
                                i, node_id
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Specifies the initial state of the simulation world.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct InitialSpec {
    pub nodes: usize,
    pub proto: ProtoTag,
    #[serde(default)]
    pub raft: RaftConfig,
}

/// Timing parameters for the Raft protocol, threaded from the scenario file
/// down to each node's `State` at `init` time. Defaults follow the values
/// Raft's own paper recommends for a LAN deployment.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct RaftConfig {
    pub election_timeout_min_ms: u64,
    pub election_timeout_max_ms: u64,
    pub heartbeat_interval_ms: u64,
}

impl Default for RaftConfig {
    fn default() -> Self {
        Self {
            election_timeout_min_ms: 150,
            election_timeout_max_ms: 300,
            heartbeat_interval_ms: 50,
        }
    }
}

impl RaftConfig {
    /// Validates the timing parameters for internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.election_timeout_min_ms >= self.election_timeout_max_ms {
            return Err(format!(
                "election_timeout_min_ms ({}) must be strictly less than election_timeout_max_ms ({})",
                self.election_timeout_min_ms, self.election_timeout_max_ms
            ));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err("heartbeat_interval_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// A directive that schedules an action to occur at a specific time.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub enum Directive {
    At(#[serde(deserialize_with = "deserialize_sim_time")] SimTime, Action),
    Every {
        #[serde(deserialize_with = "deserialize_sim_time")]
        period: SimTime,
        repeats: u64,
        action: Action,
    },
    After {
        #[serde(deserialize_with = "deserialize_sim_time")]
        offset: SimTime,
        action: Action,
    },
}

impl Directive {
    pub fn action(&self) -> &Action {
        match self {
            Directive::At(_, action) => action,
            Directive::Every { action, .. } => action,
            Directive::After { action, .. } => action,
        }
    }
}

/// An action that modifies the state of the simulation world, typically to inject a fault.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    Partition { sets: Vec<Vec<NodeId>> },
    HealPartition,
    Crash {
        node: NodeId,
        #[serde(deserialize_with = "deserialize_sim_time")]
        duration: SimTime
    },
    Restart { node: NodeId },
    LinkDelay { link: LinkId, dist: DelaySpec },
    LinkDrop { link: LinkId, p: f64 },
    BroadcastBytes { payload_hex: String, #[serde(default)] proto_tag: Option<ProtoTag> },
    ClockSkew { node: NodeId, skew: i128 },
    StoreFault { node: NodeId, kind: StoreFaultKind, rate: f64 },
    ByzantineFlip { node: NodeId, enabled: bool },
    Custom { name: String, args: toml::Value },
}

impl Action {
    /// Returns the node ID associated with the action, if any.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Action::Crash { node, .. }
            | Action::Restart { node }
            | Action::ClockSkew { node, .. }
            | Action::StoreFault { node, .. }
            | Action::ByzantineFlip { node, .. } => Some(*node),
            _ => None,
        }
    }
}

/// A serializable version of `DelayDist` for scenarios.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "PascalCase")]
pub enum DelaySpec {
    Const(u64),
    Uniform { lo: u64, hi: u64 },
    Normal { mu: f64, sigma: f64 },
    Pareto { scale: f64, shape: f64 },
}

/// Kinds of storage faults that can be injected.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub enum StoreFaultKind {
    WriteError,
    TornWrite,
    StaleRead,
    ReadError,
    FsyncFail,
    FsyncDelay,
}
