//! # ftsim-proto::protocols::raft
//!
//! A complete implementation of the Raft consensus algorithm's leader
//! election, log replication, and commit-advancement rules, built on top of
//! the FTSim SDK. See SPEC_FULL.md §4.3 for the rule-by-rule mapping.

use super::super::{Ctx, FaultEvent, Protocol};
use crate::api::ConsensusSummary;
use ftsim_types::{
    envelope::ProtoTag,
    id::{NodeId, TimerId},
    scenario::RaftConfig,
    time::sim_from_ms,
};
use serde::{Deserialize, Serialize};

pub mod logic;
pub mod rpc;
pub mod state;

use rpc::{AppendEntries, AppendEntriesReply, RequestVote, RequestVoteReply};
use state::{Role, State};

pub const TAG: ProtoTag = ProtoTag(1);

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Message {
    RequestVote(RequestVote),
    RequestVoteReply(RequestVoteReply),
    AppendEntries(AppendEntries),
    AppendEntriesReply(AppendEntriesReply),
}

pub struct Raft {
    state: State,
    election_timer: Option<TimerId>,
    heartbeat_timer: Option<TimerId>,
    /// Set once `init` has run at least once, so a restart-after-crash
    /// `init` call can tell persistent state apart from a fresh boot.
    initialized: bool,
}

impl Raft {
    pub fn new(config: RaftConfig) -> Self {
        let mut state = State::new();
        state.config = config;
        Self {
            state,
            election_timer: None,
            heartbeat_timer: None,
            initialized: false,
        }
    }
}

impl Default for Raft {
    fn default() -> Self {
        Self::new(RaftConfig::default())
    }
}

impl Protocol<Message> for Raft {
    fn name(&self) -> &'static str {
        "raft"
    }

    fn proto_tag(&self) -> ProtoTag {
        TAG
    }

    fn init(&mut self, ctx: &mut Ctx<Message>) {
        self.state.id = ctx.node_id();
        self.state.peers = ctx.peers();

        if self.state.config.heartbeat_interval_ms * 2 > self.state.config.election_timeout_min_ms {
            tracing::warn!(
                node_id = self.state.id,
                t_min = self.state.config.election_timeout_min_ms,
                heartbeat = self.state.config.heartbeat_interval_ms,
                "election_timeout_min_ms is not comfortably larger than heartbeat_interval_ms; spurious elections are likely"
            );
        }

        // Re-synchronizing after a crash: role resets to Follower and
        // leader-only volatile state clears, but persistent fields
        // (current_term, voted_for, log) and the applied-progress markers
        // are left untouched, matching "persistent state survives a crash".
        self.state.role = Role::Follower;
        self.state.next_index.clear();
        self.state.match_index.clear();
        self.state.votes_received.clear();
        self.election_timer = None;
        self.heartbeat_timer = None;
        self.initialized = true;

        self.reset_election_timer(ctx);
        ctx.log_kv("role", "follower");
        ctx.log_kv("term", &self.state.current_term.to_string());
    }

    fn on_message(&mut self, ctx: &mut Ctx<Message>, src: NodeId, msg: Message) {
        match msg {
            Message::RequestVote(args) => logic::handle_request_vote(self, ctx, src, args),
            Message::RequestVoteReply(reply) => {
                logic::handle_request_vote_reply(self, ctx, src, reply)
            }
            Message::AppendEntries(args) => logic::handle_append_entries(self, ctx, src, args),
            Message::AppendEntriesReply(reply) => {
                logic::handle_append_entries_reply(self, ctx, src, reply)
            }
        }
        ctx.log_kv("term", &self.state.current_term.to_string());
        ctx.log_kv("role", &self.state.role.to_string());
        ctx.log_kv("commit_index", &self.state.commit_index.to_string());
        ctx.log_kv("log_len", &self.state.log.len().to_string());
    }

    fn on_timer(&mut self, ctx: &mut Ctx<Message>, timer: TimerId) {
        if self.election_timer == Some(timer) {
            logic::handle_election_timeout(self, ctx);
        } else if self.heartbeat_timer == Some(timer) {
            if self.state.role == Role::Leader {
                self.send_heartbeats(ctx);
                self.arm_heartbeat_timer(ctx);
            }
        } else {
            // Superseded by a role change that re-armed a timer under a new
            // id without physically canceling this one.
            ::metrics::counter!(ftsim_types::metrics::MET_STALE_TIMER).increment(1);
        }
    }

    fn on_fault(&mut self, ctx: &mut Ctx<Message>, fault: FaultEvent) {
        match fault {
            FaultEvent::NodeCrashed => {
                tracing::info!(node_id = self.state.id, "Raft node crashed");
            }
            FaultEvent::NodeRecovered => {
                // `init` is invoked separately by the engine on restart and
                // performs the actual resynchronization; nothing to do here.
                tracing::info!(node_id = self.state.id, "Raft node recovered");
            }
            _ => {
                tracing::debug!(node_id = self.state.id, ?fault, "Raft node observed a fault notification");
            }
        }
    }

    fn consensus_summary(&self) -> Option<ConsensusSummary> {
        Some(ConsensusSummary {
            role: match self.state.role {
                Role::Follower => "follower",
                Role::Candidate => "candidate",
                Role::Leader => "leader",
            },
            term: self.state.current_term,
            commit_index: self.state.commit_index,
            log_len: self.state.log.len() as u64,
        })
    }

    fn submit_command(&mut self, ctx: &mut Ctx<Message>, command: Vec<u8>) -> Option<(u64, u64)> {
        self.propose(ctx, command)
    }
}

impl Raft {
    /// Resets the election timer to a fresh, randomized duration drawn from
    /// the simulation's seeded RNG (the only permitted source of
    /// randomness; see SPEC_FULL.md §9).
    fn reset_election_timer(&mut self, ctx: &mut Ctx<Message>) {
        if let Some(timer) = self.election_timer.take() {
            ctx.cancel_timer(timer);
        }
        let lo = self.state.config.election_timeout_min_ms;
        let hi = self.state.config.election_timeout_max_ms;
        let span = hi.saturating_sub(lo).max(1);
        let timeout_ms = lo + (ctx.rng_u64() % span);
        let timer = ctx.set_timer(sim_from_ms(timeout_ms));
        self.election_timer = Some(timer);
    }

    /// Arms (or re-arms) the heartbeat timer `H` time units from now.
    fn arm_heartbeat_timer(&mut self, ctx: &mut Ctx<Message>) {
        let h = self.state.config.heartbeat_interval_ms;
        let timer = ctx.set_timer(sim_from_ms(h));
        self.heartbeat_timer = Some(timer);
    }

    fn send_heartbeats(&mut self, ctx: &mut Ctx<Message>) {
        logic::send_heartbeats(self, ctx);
    }

    /// Converts the node to a Follower at (at least) the given term.
    fn become_follower(&mut self, ctx: &mut Ctx<Message>, term: u64) {
        let was_leader = self.state.role == Role::Leader;
        self.state.current_term = term;
        self.state.role = Role::Follower;
        self.state.voted_for = None;
        self.state.votes_received.clear();
        if was_leader {
            if let Some(timer) = self.heartbeat_timer.take() {
                ctx.cancel_timer(timer);
            }
        }
        self.reset_election_timer(ctx);
    }

    /// Appends a client command to the log if this node is the Leader, and
    /// kicks off an immediate replication round rather than waiting for the
    /// next scheduled heartbeat.
    fn propose(&mut self, ctx: &mut Ctx<Message>, command: Vec<u8>) -> Option<(u64, u64)> {
        if self.state.role != Role::Leader {
            return None;
        }
        let term = self.state.current_term;
        let index = self.state.append(term, command);
        self.send_heartbeats(ctx);
        Some((term, index))
    }

    /// Advances `last_applied` up to `commit_index`, folding each newly
    /// committed entry through a `log_kv` hook. Full state-machine
    /// application beyond that is left to the embedding caller (see
    /// SPEC_FULL.md §4.3.2 and the Non-goals on log compaction).
    fn apply_committed(&mut self, ctx: &mut Ctx<Message>) {
        while self.state.last_applied < self.state.commit_index {
            self.state.last_applied += 1;
            if let Some(entry) = self
                .state
                .log
                .iter()
                .find(|e| e.index == self.state.last_applied)
            {
                ctx.log_kv_json("last_applied_index", &entry.index);
            }
        }
        debug_assert!(self.state.last_applied <= self.state.commit_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ProtoCtx, StoreView};
    use ftsim_types::errors::StoreError;

    /// A minimal `ProtoCtx` mock: routes `send`/`broadcast` calls into
    /// in-memory outboxes so handler unit tests can assert on what a node
    /// tried to do, without spinning up the full engine.
    struct MockCtx {
        node_id: NodeId,
        peers: Vec<NodeId>,
        now: ftsim_types::time::SimTime,
        next_timer: TimerId,
        rng_seq: u64,
        pub sent: Vec<(NodeId, Vec<u8>)>,
        pub broadcasts: usize,
    }

    impl MockCtx {
        fn new(node_id: NodeId, peers: Vec<NodeId>) -> Self {
            Self {
                node_id,
                peers,
                now: 0,
                next_timer: 1,
                rng_seq: 0,
                sent: Vec::new(),
                broadcasts: 0,
            }
        }
    }

    struct NullStore;
    impl StoreView for NullStore {
        fn append_log(&mut self, _rec: crate::api::LogRecord) -> Result<crate::api::LogIndex, StoreError> {
            Ok(0)
        }
        fn read_log(&mut self, _idx: crate::api::LogIndex) -> Result<Option<crate::api::LogRecord>, StoreError> {
            Ok(None)
        }
        fn kv_put(&mut self, _k: bytes::Bytes, _v: bytes::Bytes) -> Result<(), StoreError> {
            Ok(())
        }
        fn kv_get(&mut self, _k: &[u8]) -> Result<Option<bytes::Bytes>, StoreError> {
            Ok(None)
        }
        fn fsync(&mut self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    impl ProtoCtx for MockCtx {
        fn send_raw(&mut self, dst: NodeId, _proto_tag: ProtoTag, bytes: bytes::Bytes) {
            self.sent.push((dst, bytes.to_vec()));
        }
        fn broadcast_raw(
            &mut self,
            proto_tag: ProtoTag,
            bytes: bytes::Bytes,
            filter: Option<&dyn Fn(NodeId) -> bool>,
        ) {
            self.broadcasts += 1;
            let peers = self.peers.clone();
            for p in peers {
                if filter.map_or(true, |f| f(p)) {
                    self.send_raw(p, proto_tag, bytes.clone());
                }
            }
        }
        fn set_timer(&mut self, _after: ftsim_types::time::SimTime) -> TimerId {
            let id = self.next_timer;
            self.next_timer += 1;
            id
        }
        fn cancel_timer(&mut self, _timer: TimerId) -> bool {
            true
        }
        fn now(&self) -> ftsim_types::time::SimTime {
            self.now
        }
        fn node_id(&self) -> NodeId {
            self.node_id
        }
        fn peers(&self) -> Vec<NodeId> {
            self.peers.clone()
        }
        fn store(&mut self) -> Box<dyn StoreView + '_> {
            Box::new(NullStore)
        }
        fn rng_u64(&mut self) -> u64 {
            self.rng_seq += 1;
            self.rng_seq
        }
        fn log_kv(&mut self, _key: &'static str, _val: &str) {}
    }

    fn new_leader(peers: Vec<NodeId>) -> (Raft, MockCtx) {
        let mut raft = Raft::default();
        let mut mock = MockCtx::new(0, peers.clone());
        {
            let mut ctx = Ctx::<Message>::new(&mut mock, TAG);
            raft.init(&mut ctx);
            raft.state.role = Role::Leader;
            raft.state.current_term = 1;
            let last = raft.state.last_log_index();
            raft.state.next_index = peers.iter().map(|&p| (p, last + 1)).collect();
            raft.state.match_index = peers.iter().map(|&p| (p, 0)).collect();
        }
        (raft, mock)
    }

    #[test]
    fn repeated_append_entries_is_idempotent() {
        let mut raft = Raft::default();
        let mut mock = MockCtx::new(1, vec![0, 2, 3, 4]);
        {
            let mut ctx = Ctx::<Message>::new(&mut mock, TAG);
            raft.init(&mut ctx);

            let args = AppendEntries {
                term: 1,
                leader_id: 0,
                prev_log_index: 0,
                prev_log_term: 0,
                entries: vec![state::LogEntry {
                    term: 1,
                    index: 1,
                    command: vec![42],
                }],
                leader_commit: 0,
            };
            logic::handle_append_entries(&mut raft, &mut ctx, 0, args.clone());
            let log_after_first = raft.state.log.clone();
            logic::handle_append_entries(&mut raft, &mut ctx, 0, args);
            assert_eq!(raft.state.log, log_after_first);
        }
        assert_eq!(mock.sent.len(), 2, "each AppendEntries gets exactly one reply");
    }

    #[test]
    fn election_timeout_starts_campaign_and_broadcasts_request_vote() {
        let mut raft = Raft::default();
        let mut mock = MockCtx::new(1, vec![0, 2, 3, 4]);
        let mut ctx = Ctx::<Message>::new(&mut mock, TAG);
        raft.init(&mut ctx);

        logic::handle_election_timeout(&mut raft, &mut ctx);

        assert_eq!(raft.state.role, Role::Candidate);
        assert_eq!(raft.state.current_term, 1);
        assert_eq!(raft.state.voted_for, Some(1));
        assert_eq!(mock.broadcasts, 1);
        assert_eq!(mock.sent.len(), 4, "RequestVote goes to all 4 peers");
    }

    #[test]
    fn vote_granted_once_per_term_to_same_candidate() {
        let mut raft = Raft::default();
        let mut mock = MockCtx::new(1, vec![0, 2, 3, 4]);
        let mut ctx = Ctx::<Message>::new(&mut mock, TAG);
        raft.init(&mut ctx);

        let args = RequestVote {
            term: 5,
            candidate_id: 0,
            last_log_index: 0,
            last_log_term: 0,
        };
        logic::handle_request_vote(&mut raft, &mut ctx, 0, args.clone());
        assert_eq!(raft.state.voted_for, Some(0));
        logic::handle_request_vote(&mut raft, &mut ctx, 0, args);
        assert_eq!(raft.state.voted_for, Some(0));

        let other = RequestVote {
            term: 5,
            candidate_id: 2,
            last_log_index: 0,
            last_log_term: 0,
        };
        logic::handle_request_vote(&mut raft, &mut ctx, 2, other);
        // Still bound to the first candidate within the same term.
        assert_eq!(raft.state.voted_for, Some(0));
    }

    #[test]
    fn leader_never_commits_prior_term_entry_by_count_alone() {
        let (mut raft, mut mock) = new_leader(vec![1, 2, 3, 4]);
        let mut ctx = Ctx::<Message>::new(&mut mock, TAG);
        // Simulate a leftover entry from a previous term that is only
        // replicated (not yet committed) alongside a majority of match_index.
        raft.state.log.push(state::LogEntry {
            term: 0,
            index: 1,
            command: vec![],
        });
        raft.state.current_term = 2;
        for peer in [1u32, 2, 3] {
            raft.state.match_index.insert(peer, 1);
        }
        let reply = AppendEntriesReply {
            term: 2,
            success: true,
            match_index: 1,
            conflict_index: None,
        };
        logic::handle_append_entries_reply(&mut raft, &mut ctx, 1, reply);
        assert_eq!(raft.state.commit_index, 0, "must not commit a prior-term entry by count alone");
    }

    #[test]
    fn quorum_is_strict_majority() {
        let mut s = State::new();
        s.peers = vec![1, 2, 3, 4];
        assert_eq!(s.cluster_size(), 5);
        assert_eq!(s.quorum(), 3);
    }

    #[test]
    fn term_at_sentinel_is_zero() {
        let s = State::new();
        assert_eq!(s.term_at(0), 0);
    }

    #[test]
    fn append_assigns_contiguous_indices() {
        let mut s = State::new();
        assert_eq!(s.append(1, vec![1]), 1);
        assert_eq!(s.append(1, vec![2]), 2);
        assert_eq!(s.last_log_index(), 2);
        assert_eq!(s.last_log_term(), 1);
    }

    #[test]
    fn truncate_from_drops_suffix_only() {
        let mut s = State::new();
        s.append(1, vec![1]);
        s.append(1, vec![2]);
        s.append(2, vec![3]);
        s.truncate_from(2);
        assert_eq!(s.log.len(), 1);
        assert_eq!(s.log[0].index, 1);
    }
}
