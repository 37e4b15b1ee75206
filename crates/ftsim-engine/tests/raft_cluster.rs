//! Integration tests that run a full 5-node Raft cluster through the
//! simulation engine and check the end-to-end scenarios and invariants.

use ftsim_engine::{
    events::{Event, EventDiscriminant, FaultEventInternal},
    node::Node,
    prelude::*,
    store::MemStore,
    world::World,
};
use ftsim_proto::{api::boxed_dyn, protocols::raft::Raft};
use ftsim_types::scenario::RaftConfig;

fn build_cluster(n: usize, config: RaftConfig) -> World {
    let nodes = (0..n)
        .map(|i| {
            let proto = boxed_dyn::<_, ftsim_proto::protocols::raft::Message>(Raft::new(config));
            let store = Box::new(MemStore::new());
            Node::new(i as NodeId, proto, store)
        })
        .collect();
    let net = Net::from_topology(n, &TopologySpec::FullMesh, 0);
    World { nodes, net }
}

fn finalize(world: &mut World) {
    let ids: Vec<NodeId> = (0..world.nodes.len() as NodeId).collect();
    for id in ids {
        let peers: Vec<NodeId> = world.net.peers_of(id).collect();
        world.nodes[id as usize].set_peers(peers);
    }
}

fn new_sim(seed: u64, world: World) -> Simulation {
    let (tx, _rx) = crossbeam_channel::unbounded();
    let telemetry = TelemetryBus::new(tx, world.nodes.len());
    let mut sim = Simulation::new(seed, world, telemetry);
    sim.init();
    sim
}

fn leader_count_at_highest_term(status: &Status) -> (u64, usize) {
    let highest_term = status
        .nodes
        .iter()
        .filter_map(|n| n.consensus.as_ref())
        .map(|c| c.term)
        .max()
        .unwrap_or(0);
    let leaders = status
        .nodes
        .iter()
        .filter_map(|n| n.consensus.as_ref())
        .filter(|c| c.term == highest_term && c.role == "leader")
        .count();
    (highest_term, leaders)
}

/// S1: a clean 5-node cluster elects exactly one leader within a single
/// election-timeout window (`RaftConfig::default()` draws from
/// 150..300ms), and every follower has converged to the leader's term.
#[test]
fn s1_single_leader_emerges() {
    let mut world = build_cluster(5, RaftConfig::default());
    finalize(&mut world);
    let mut sim = new_sim(1, world);
    sim.run_until(sim_from_ms(1_000));

    let status = sim.status();
    let (_term, leaders) = leader_count_at_highest_term(&status);
    assert_eq!(leaders, 1, "expected exactly one leader, status: {:?}", status);
    assert!(status.events_processed > 0);
}

/// S2: after electing a leader, ten client commands submitted to it are
/// replicated and committed across the whole cluster.
#[test]
fn s2_commands_replicate_and_commit() {
    let mut world = build_cluster(5, RaftConfig::default());
    finalize(&mut world);
    let mut sim = new_sim(1, world);
    sim.run_until(sim_from_ms(1_000));

    let status = sim.status();
    let leader_id = status
        .nodes
        .iter()
        .find(|n| n.consensus.as_ref().map_or(false, |c| c.role == "leader"))
        .map(|n| n.node_id)
        .expect("a leader must exist by t=1000ms");

    for i in 0..10u8 {
        let accepted = sim.submit_command(leader_id, vec![i]);
        assert!(accepted.is_some(), "leader should accept command {}", i);
    }

    sim.run_until(sim_from_ms(5_000));

    let status = sim.status();
    for n in &status.nodes {
        let c = n.consensus.as_ref().expect("raft node must report a summary");
        assert_eq!(c.log_len, 10, "node {} log_len", n.node_id);
        assert_eq!(c.commit_index, 10, "node {} commit_index", n.node_id);
    }
}

/// S3: crashing the leader produces a new leader with a strictly greater
/// term, and commit_index never regresses on any surviving node.
#[test]
fn s3_leader_crash_reelects_with_higher_term() {
    let mut world = build_cluster(5, RaftConfig::default());
    finalize(&mut world);
    let mut sim = new_sim(42, world);
    sim.run_until(sim_from_ms(1_000));

    let before = sim.status();
    let (old_term, leaders_before) = leader_count_at_highest_term(&before);
    assert_eq!(leaders_before, 1);
    let leader_id = before
        .nodes
        .iter()
        .find(|n| n.consensus.as_ref().map_or(false, |c| c.role == "leader"))
        .map(|n| n.node_id)
        .unwrap();
    let commit_before = before
        .nodes
        .iter()
        .map(|n| n.consensus.as_ref().map_or(0, |c| c.commit_index))
        .max()
        .unwrap();

    sim.schedule_at(
        sim.now(),
        Event::Fault(FaultEventInternal::Crash {
            node_id: leader_id,
            duration: MAX_SIM_TIME,
        }),
        EventDiscriminant::fault(),
    );
    sim.run_until(sim_from_ms(6_000));

    let after = sim.status();
    let (new_term, leaders_after) = leader_count_at_highest_term(&after);
    assert_eq!(leaders_after, 1, "a new leader should be elected, status: {:?}", after);
    assert!(new_term > old_term, "new term {} must exceed old term {}", new_term, old_term);

    for n in &after.nodes {
        if let Some(c) = &n.consensus {
            assert!(c.commit_index >= commit_before, "commit_index regressed on node {}", n.node_id);
        }
    }
}

/// S4: partitioning the cluster into a majority {0,1,2} and a minority
/// {3,4} prevents the minority side from committing anything; healing
/// reconverges the cluster to a single leader at the highest term.
#[test]
fn s4_minority_partition_cannot_commit() {
    let mut world = build_cluster(5, RaftConfig::default());
    finalize(&mut world);
    let mut sim = new_sim(7, world);
    sim.run_until(sim_from_ms(1_000));

    sim.schedule_at(
        sim.now(),
        Event::Fault(FaultEventInternal::Partition {
            sets: vec![vec![0, 1, 2], vec![3, 4]],
        }),
        EventDiscriminant::fault(),
    );
    sim.run_until(sim_from_ms(4_000));

    let during = sim.status();
    for n in &during.nodes {
        if n.node_id == 3 || n.node_id == 4 {
            if let Some(c) = &n.consensus {
                assert_ne!(c.role, "leader", "node {} (minority) must not be committing as leader", n.node_id);
            }
        }
    }

    sim.schedule_at(
        sim.now(),
        Event::Fault(FaultEventInternal::HealPartition),
        EventDiscriminant::fault(),
    );
    sim.run_until(sim_from_ms(10_000));

    let after = sim.status();
    let (_term, leaders) = leader_count_at_highest_term(&after);
    assert_eq!(leaders, 1, "cluster should reconverge to one leader after heal");
}

/// S5: even with a 30% per-message drop rate, the cluster still elects a
/// leader within a generous virtual-time budget.
#[test]
fn s5_lossy_network_still_elects_a_leader() {
    let mut world = build_cluster(5, RaftConfig::default());
    for link in world.net.links.values_mut() {
        link.faults.drop = Bernoulli(0.3);
    }
    finalize(&mut world);
    let mut sim = new_sim(99, world);
    sim.run_until(sim_from_ms(10_000));

    let status = sim.status();
    let (_term, leaders) = leader_count_at_highest_term(&status);
    assert_eq!(leaders, 1, "expected a leader despite message loss, status: {:?}", status);
}

/// S6: re-running S1 with the same seed produces the same event count and
/// the same final term/commit state (a proxy for a bit-identical trace,
/// since the full event log isn't captured by this test harness).
#[test]
fn s6_same_seed_is_deterministic() {
    let run = || {
        let mut world = build_cluster(5, RaftConfig::default());
        finalize(&mut world);
        let mut sim = new_sim(1, world);
        sim.run_until(sim_from_ms(1_000));
        sim.status()
    };

    let a = run();
    let b = run();

    assert_eq!(a.events_processed, b.events_processed);
    let (term_a, _) = leader_count_at_highest_term(&a);
    let (term_b, _) = leader_count_at_highest_term(&b);
    assert_eq!(term_a, term_b);
    for (na, nb) in a.nodes.iter().zip(b.nodes.iter()) {
        assert_eq!(na.consensus.as_ref().map(|c| c.role), nb.consensus.as_ref().map(|c| c.role));
        assert_eq!(na.consensus.as_ref().map(|c| c.term), nb.consensus.as_ref().map(|c| c.term));
    }
}
