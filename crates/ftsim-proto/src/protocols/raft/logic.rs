//! # ftsim-proto::protocols::raft::logic
//!
//! Contains the business logic for handling Raft RPCs, timeouts, and commit
//! advancement. Kept free of the `Protocol<M>` plumbing (dispatch lives in
//! `mod.rs`) so each rule from the specification maps to one function here.

use super::{rpc::*, state::Role, Message, Raft};
use crate::Ctx;
use ftsim_types::id::NodeId;

/// Applies the "common rules" that precede all role-specific handling:
/// step down to Follower on a higher term. Returns `true` if the message's
/// term is stale and must be rejected without further processing.
fn handle_term(raft: &mut Raft, ctx: &mut Ctx<Message>, msg_term: u64) -> bool {
    if msg_term > raft.state.current_term {
        raft.become_follower(ctx, msg_term);
    }
    msg_term < raft.state.current_term
}

pub fn handle_election_timeout(raft: &mut Raft, ctx: &mut Ctx<Message>) {
    if raft.state.role == Role::Leader {
        return;
    }

    tracing::info!(
        node_id = raft.state.id,
        term = raft.state.current_term,
        "Election timeout, starting new election"
    );
    ::metrics::counter!(ftsim_types::metrics::MET_RAFT_ELECTIONS_STARTED).increment(1);

    raft.state.role = Role::Candidate;
    raft.state.current_term += 1;
    raft.state.voted_for = Some(raft.state.id);
    raft.state.votes_received.clear();
    raft.state.votes_received.insert(raft.state.id);

    raft.reset_election_timer(ctx);

    let args = RequestVote {
        term: raft.state.current_term,
        candidate_id: raft.state.id,
        last_log_index: raft.state.last_log_index(),
        last_log_term: raft.state.last_log_term(),
    };
    ctx.broadcast(&Message::RequestVote(args), None).ok();
}

pub fn handle_request_vote(
    raft: &mut Raft,
    ctx: &mut Ctx<Message>,
    src: NodeId,
    args: RequestVote,
) {
    let stale = handle_term(raft, ctx, args.term);

    let vote_granted = if stale {
        false
    } else {
        let can_vote = raft.state.voted_for.is_none() || raft.state.voted_for == Some(args.candidate_id);
        let up_to_date = (args.last_log_term, args.last_log_index)
            >= (raft.state.last_log_term(), raft.state.last_log_index());
        if can_vote && up_to_date {
            raft.state.voted_for = Some(args.candidate_id);
            // A granted vote is evidence of a live candidate; don't also
            // start our own campaign immediately.
            raft.reset_election_timer(ctx);
            true
        } else {
            false
        }
    };

    let reply = RequestVoteReply {
        term: raft.state.current_term,
        vote_granted,
    };
    ctx.send(src, &Message::RequestVoteReply(reply)).ok();
}

pub fn handle_request_vote_reply(
    raft: &mut Raft,
    ctx: &mut Ctx<Message>,
    src: NodeId,
    reply: RequestVoteReply,
) {
    if handle_term(raft, ctx, reply.term) {
        return;
    }

    if raft.state.role == Role::Candidate
        && reply.term == raft.state.current_term
        && reply.vote_granted
    {
        raft.state.votes_received.insert(src);
        if raft.state.votes_received.len() >= raft.state.quorum() {
            become_leader(raft, ctx);
        }
    }
}

pub fn handle_append_entries(
    raft: &mut Raft,
    ctx: &mut Ctx<Message>,
    src: NodeId,
    args: AppendEntries,
) {
    let stale = handle_term(raft, ctx, args.term);

    if stale {
        let reply = AppendEntriesReply {
            term: raft.state.current_term,
            success: false,
            match_index: 0,
            conflict_index: None,
        };
        ctx.send(src, &Message::AppendEntriesReply(reply)).ok();
        return;
    }

    // A legitimate AppendEntries at or above our term means this is the
    // real leader: if we were Candidate or Follower, (re)synchronize to it.
    if raft.state.role != Role::Follower {
        raft.state.role = Role::Follower;
    }
    raft.reset_election_timer(ctx);

    // Log consistency check.
    if args.prev_log_index > 0 {
        let local_last = raft.state.last_log_index();
        if local_last < args.prev_log_index {
            let reply = AppendEntriesReply {
                term: raft.state.current_term,
                success: false,
                match_index: 0,
                conflict_index: Some(local_last + 1),
            };
            ctx.send(src, &Message::AppendEntriesReply(reply)).ok();
            return;
        }
        let local_term = raft.state.term_at(args.prev_log_index);
        if local_term != args.prev_log_term {
            // Fast backoff: point the leader at the first index of the
            // conflicting term.
            let conflict_index = raft
                .state
                .log
                .iter()
                .find(|e| e.term == local_term)
                .map(|e| e.index)
                .unwrap_or(args.prev_log_index);
            let reply = AppendEntriesReply {
                term: raft.state.current_term,
                success: false,
                match_index: 0,
                conflict_index: Some(conflict_index),
            };
            ctx.send(src, &Message::AppendEntriesReply(reply)).ok();
            return;
        }
    }

    // Merge incoming entries: truncate on the first conflicting index,
    // otherwise leave matching entries untouched (idempotent re-delivery).
    for entry in &args.entries {
        match raft.state.log.iter().find(|e| e.index == entry.index) {
            Some(existing) if existing.term == entry.term => {
                // Already present and identical; no-op.
            }
            Some(_) => {
                raft.state.truncate_from(entry.index);
                raft.state.log.push(entry.clone());
            }
            None => {
                raft.state.log.push(entry.clone());
            }
        }
    }

    let index_of_last_new_entry = args.prev_log_index + args.entries.len() as u64;
    if args.leader_commit > raft.state.commit_index {
        raft.state.commit_index = args.leader_commit.min(index_of_last_new_entry);
        raft.apply_committed(ctx);
    }

    let reply = AppendEntriesReply {
        term: raft.state.current_term,
        success: true,
        match_index: index_of_last_new_entry,
        conflict_index: None,
    };
    ctx.send(src, &Message::AppendEntriesReply(reply)).ok();
}

pub fn handle_append_entries_reply(
    raft: &mut Raft,
    ctx: &mut Ctx<Message>,
    src: NodeId,
    reply: AppendEntriesReply,
) {
    if handle_term(raft, ctx, reply.term) {
        return;
    }

    if raft.state.role != Role::Leader || reply.term != raft.state.current_term {
        return;
    }

    if reply.success {
        raft.state.match_index.insert(src, reply.match_index);
        raft.state.next_index.insert(src, reply.match_index + 1);
        advance_commit_index(raft, ctx);
    } else {
        let next = raft.state.next_index.entry(src).or_insert(1);
        *next = match reply.conflict_index {
            Some(ci) => ci.max(1),
            None => (*next).saturating_sub(1).max(1),
        };
    }
}

/// Finds the largest `N > commit_index` such that `log[N].term ==
/// current_term` and a strict majority of the cluster has replicated up to
/// `N`, and advances `commit_index` to it. A Leader never commits an entry
/// from a prior term by count alone (invariant 7 / §4.3.4).
fn advance_commit_index(raft: &mut Raft, ctx: &mut Ctx<Message>) {
    let quorum = raft.state.quorum();
    let last = raft.state.last_log_index();
    let mut n = last;
    while n > raft.state.commit_index {
        if raft.state.term_at(n) == raft.state.current_term {
            let replicated = 1 + raft
                .state
                .match_index
                .values()
                .filter(|&&m| m >= n)
                .count();
            if replicated >= quorum {
                raft.state.commit_index = n;
                ::metrics::counter!(ftsim_types::metrics::MET_RAFT_ENTRIES_COMMITTED).increment(1);
                raft.apply_committed(ctx);
                return;
            }
        }
        n -= 1;
    }
}

fn become_leader(raft: &mut Raft, ctx: &mut Ctx<Message>) {
    tracing::info!(node_id = raft.state.id, term = raft.state.current_term, "Elected as leader");
    ::metrics::counter!(ftsim_types::metrics::MET_RAFT_LEADER_ELECTED).increment(1);
    raft.state.role = Role::Leader;

    if let Some(timer) = raft.election_timer.take() {
        ctx.cancel_timer(timer);
    }

    let last_log_index = raft.state.last_log_index();
    raft.state.next_index = raft
        .state
        .peers
        .iter()
        .map(|&id| (id, last_log_index + 1))
        .collect();
    raft.state.match_index = raft.state.peers.iter().map(|&id| (id, 0)).collect();

    raft.send_heartbeats(ctx);
    raft.arm_heartbeat_timer(ctx);
}

/// Sends `AppendEntries` (possibly empty — this is also the heartbeat) to
/// every peer, using each peer's own `next_index`.
pub fn send_heartbeats(raft: &mut Raft, ctx: &mut Ctx<Message>) {
    let peers = raft.state.peers.clone();
    for peer in peers {
        let next = *raft.state.next_index.get(&peer).unwrap_or(&1);
        let prev_log_index = next.saturating_sub(1);
        let prev_log_term = raft.state.term_at(prev_log_index);
        let entries = raft.state.entries_from(next);
        let args = AppendEntries {
            term: raft.state.current_term,
            leader_id: raft.state.id,
            prev_log_index,
            prev_log_term,
            entries,
            leader_commit: raft.state.commit_index,
        };
        ctx.send(peer, &Message::AppendEntries(args)).ok();
    }
}
