//! # ftsim-engine::scenario::presets
//!
//! Named chaos scenarios, built programmatically rather than loaded from a
//! file, for the common shapes of failure a Raft cluster is expected to
//! survive. Each builder returns a ready-to-validate `Scenario`.

use ftsim_types::{
    envelope::ProtoTag,
    scenario::{Action, Directive, InitialSpec, RaftConfig, Scenario},
    time::sim_from_ms,
    topology::TopologySpec,
};

const RAFT_TAG: ProtoTag = ProtoTag(1);

fn base_scenario(name: &str, nodes: usize, seed: u64) -> Scenario {
    Scenario {
        name: name.to_string(),
        seed: Some(seed),
        initial: InitialSpec {
            nodes,
            proto: RAFT_TAG,
            raft: RaftConfig::default(),
        },
        topology: TopologySpec::FullMesh,
        directives: Vec::new(),
        stop_at: Some(sim_from_ms(10_000)),
        uniform_link_faults: None,
    }
}

/// Crashes the cluster's node 0 partway through the run, then restarts it.
/// Node 0 is not guaranteed to be the leader at crash time, but in a
/// 5-node cluster with a fixed seed it is the node most likely to have won
/// the first election; the scenario exercises the "leader crashes, a new
/// one is elected, the old one rejoins as a follower" path either way.
pub fn leader_failure(seed: u64) -> Scenario {
    let mut s = base_scenario("leader_failure", 5, seed);
    s.directives = vec![
        Directive::At(
            sim_from_ms(2_000),
            Action::Crash {
                node: 0,
                duration: sim_from_ms(3_000),
            },
        ),
        Directive::At(sim_from_ms(5_000), Action::Restart { node: 0 }),
    ];
    s
}

/// Crashes a different node every two seconds, each restarting shortly
/// after the next one goes down, so the cluster never loses quorum but
/// constantly churns its membership's availability.
pub fn rolling_failures(seed: u64) -> Scenario {
    let mut s = base_scenario("rolling_failures", 5, seed);
    let mut directives = Vec::new();
    for i in 0..5u32 {
        let crash_at = sim_from_ms(2_000 * (i as u128 + 1));
        let restart_at = crash_at + sim_from_ms(1_500);
        directives.push(Directive::At(
            crash_at,
            Action::Crash {
                node: i,
                duration: sim_from_ms(1_500),
            },
        ));
        directives.push(Directive::At(restart_at, Action::Restart { node: i }));
    }
    s.directives = directives;
    s
}

/// Splits a 5-node cluster into a majority partition `{0, 1, 2}` and a
/// minority partition `{3, 4}`, holds it long enough for the minority side
/// to exhaust several election timeouts, then heals it. Exercises the
/// "only the majority side can commit" and "minority side never succeeds
/// in an election while partitioned" invariants.
pub fn split_brain(seed: u64) -> Scenario {
    let mut s = base_scenario("split_brain", 5, seed);
    s.directives = vec![
        Directive::At(
            sim_from_ms(1_000),
            Action::Partition {
                sets: vec![vec![0, 1, 2], vec![3, 4]],
            },
        ),
        Directive::At(sim_from_ms(6_000), Action::HealPartition),
    ];
    s
}

/// A more general partition scenario than `split_brain`: repeatedly splits
/// the cluster into two roughly even halves and heals it a few times over
/// the run, exercising reconvergence under a flapping network rather than
/// one single clean split.
pub fn network_partition(seed: u64) -> Scenario {
    let mut s = base_scenario("network_partition", 5, seed);
    s.directives = vec![
        Directive::At(
            sim_from_ms(1_000),
            Action::Partition {
                sets: vec![vec![0, 1], vec![2, 3, 4]],
            },
        ),
        Directive::At(sim_from_ms(4_000), Action::HealPartition),
        Directive::At(
            sim_from_ms(5_000),
            Action::Partition {
                sets: vec![vec![0, 2, 4], vec![1, 3]],
            },
        ),
        Directive::At(sim_from_ms(8_000), Action::HealPartition),
    ];
    s
}
