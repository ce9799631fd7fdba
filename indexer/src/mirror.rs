//! Ranking mirror state and queries.
//!
//! The mirror keeps its own cumulative counters per agent and derives the
//! score with the same formula the program uses, so a full replay of the
//! event log converges to the program's scores. A [`Cursor`] remembers the
//! last ledger position applied, so feeding overlapping log ranges does not
//! count an event twice.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use agent_market::ranking::ranking_score;
use anchor_lang::prelude::Pubkey;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decode::{EventPosition, MarketEvent};
use crate::error::{IndexerError, Result};

/// One agent as seen through the event stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirroredAgent {
    pub agent_id: u64,
    pub owner: Pubkey,
    pub name: String,
    pub category: String,
    pub is_public: bool,
    pub descriptions: Vec<String>,
    pub content_hashes: Vec<[u8; 32]>,
    pub authorized_users: Vec<Pubkey>,
    pub total_staked: u64,
    pub loves: u64,
    pub score: u128,
    pub cloned_from: u64,
}

impl MirroredAgent {
    fn refresh_score(&mut self) {
        self.score = ranking_score(self.total_staked, self.loves);
    }
}

/// Leaderboard ordering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    Score,
    Stake,
    Loves,
    Id,
}

/// Highest slot applied, with the last event index applied for each
/// transaction of that slot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub slot: u64,
    pub applied_in_slot: BTreeMap<String, u32>,
}

impl Cursor {
    /// True when the event at `position` is at or before the cursor.
    pub fn covers(&self, position: &EventPosition) -> bool {
        position.slot < self.slot
            || (position.slot == self.slot
                && self
                    .applied_in_slot
                    .get(&position.signature)
                    .is_some_and(|last| *last >= position.index))
    }

    pub fn advance(&mut self, position: &EventPosition) {
        if position.slot < self.slot {
            return;
        }
        if position.slot > self.slot {
            self.slot = position.slot;
            self.applied_in_slot.clear();
        }
        let last = self
            .applied_in_slot
            .entry(position.signature.clone())
            .or_insert(position.index);
        *last = (*last).max(position.index);
    }
}

#[derive(Clone, Debug, Default)]
pub struct RankingMirror {
    agents: BTreeMap<u64, MirroredAgent>,
    by_owner: BTreeMap<Pubkey, BTreeSet<u64>>,
    events_applied: u64,
    cursor: Cursor,
}

impl RankingMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a mirror from persisted agents.
    pub fn restore(
        agents: impl IntoIterator<Item = MirroredAgent>,
        events_applied: u64,
        cursor: Cursor,
    ) -> Self {
        let mut mirror = Self {
            events_applied,
            cursor,
            ..Self::default()
        };
        for mut agent in agents {
            agent.refresh_score();
            mirror.index(agent.owner, agent.agent_id);
            mirror.agents.insert(agent.agent_id, agent);
        }
        mirror
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn events_applied(&self) -> u64 {
        self.events_applied
    }

    pub fn agents(&self) -> impl Iterator<Item = &MirroredAgent> {
        self.agents.values()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Whether the event at `position` was already fed to this mirror
    pub fn has_seen(&self, position: &EventPosition) -> bool {
        self.cursor.covers(position)
    }

    /// Record `position` as fed, whether or not its event applied.
    pub fn mark_seen(&mut self, position: &EventPosition) {
        self.cursor.advance(position);
    }

    /// Apply one event. On error the mirror is left unchanged.
    pub fn apply(&mut self, event: &MarketEvent) -> Result<()> {
        match event {
            MarketEvent::Minted(e) => {
                if self.agents.contains_key(&e.agent_id) {
                    return Err(IndexerError::DuplicateAgent(e.agent_id));
                }
                self.insert(MirroredAgent {
                    agent_id: e.agent_id,
                    owner: e.owner,
                    name: e.name.clone(),
                    category: e.category.clone(),
                    is_public: e.is_public,
                    descriptions: e.descriptions.clone(),
                    content_hashes: e.content_hashes.clone(),
                    authorized_users: Vec::new(),
                    total_staked: 0,
                    loves: 0,
                    score: 0,
                    cloned_from: 0,
                });
            }
            MarketEvent::Transferred(e) => {
                let agent = self.get_mut(e.agent_id)?;
                agent.content_hashes = e.content_hashes.clone();
                let previous = std::mem::replace(&mut agent.owner, e.to);
                self.unindex(&previous, e.agent_id);
                self.index(e.to, e.agent_id);
            }
            MarketEvent::Cloned(e) => {
                if self.agents.contains_key(&e.new_id) {
                    return Err(IndexerError::DuplicateAgent(e.new_id));
                }
                let source = self
                    .agents
                    .get(&e.source_id)
                    .ok_or(IndexerError::UnknownAgent(e.source_id))?;
                let clone = MirroredAgent {
                    agent_id: e.new_id,
                    owner: e.to,
                    name: source.name.clone(),
                    category: source.category.clone(),
                    is_public: source.is_public,
                    descriptions: source.descriptions.clone(),
                    content_hashes: e.content_hashes.clone(),
                    authorized_users: Vec::new(),
                    total_staked: 0,
                    loves: 0,
                    score: 0,
                    cloned_from: e.source_id,
                };
                self.insert(clone);
            }
            MarketEvent::AuthorizedUsage(e) => {
                let agent = self.get_mut(e.agent_id)?;
                if !agent.authorized_users.contains(&e.user) {
                    agent.authorized_users.push(e.user);
                }
            }
            MarketEvent::UsageRevoked(e) => {
                self.get_mut(e.agent_id)?.authorized_users.retain(|u| *u != e.user);
            }
            MarketEvent::AgentStaked(e) => {
                let agent = self.get_mut(e.agent_id)?;
                agent.total_staked = agent
                    .total_staked
                    .checked_add(e.amount)
                    .ok_or(IndexerError::Overflow(e.agent_id))?;
                agent.refresh_score();
            }
            MarketEvent::AgentLoved(e) => {
                let agent = self.get_mut(e.agent_id)?;
                agent.loves = agent
                    .loves
                    .checked_add(1)
                    .ok_or(IndexerError::Overflow(e.agent_id))?;
                agent.refresh_score();
            }
        }
        self.events_applied += 1;
        debug!(agent_id = event.agent_id(), "Applied event");
        Ok(())
    }

    pub fn agent(&self, agent_id: u64) -> Option<&MirroredAgent> {
        self.agents.get(&agent_id)
    }

    /// Ids held by `owner`, ascending.
    pub fn owned_by(&self, owner: &Pubkey) -> Vec<u64> {
        self.by_owner
            .get(owner)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn authorized_users(&self, agent_id: u64) -> Result<&[Pubkey]> {
        self.agents
            .get(&agent_id)
            .map(|a| a.authorized_users.as_slice())
            .ok_or(IndexerError::UnknownAgent(agent_id))
    }

    /// Up to `limit` agents ordered by `key` (descending, except `Id`),
    /// ties broken by ascending id.
    pub fn top(&self, limit: usize, category: Option<&str>, key: SortKey) -> Vec<&MirroredAgent> {
        let mut ranked: Vec<&MirroredAgent> = self
            .agents
            .values()
            .filter(|a| category.map_or(true, |c| a.category == c))
            .collect();
        match key {
            SortKey::Score => ranked.sort_by_key(|a| (Reverse(a.score), a.agent_id)),
            SortKey::Stake => ranked.sort_by_key(|a| (Reverse(a.total_staked), a.agent_id)),
            SortKey::Loves => ranked.sort_by_key(|a| (Reverse(a.loves), a.agent_id)),
            SortKey::Id => {}
        }
        ranked.truncate(limit);
        ranked
    }

    fn insert(&mut self, agent: MirroredAgent) {
        self.index(agent.owner, agent.agent_id);
        self.agents.insert(agent.agent_id, agent);
    }

    fn get_mut(&mut self, agent_id: u64) -> Result<&mut MirroredAgent> {
        self.agents
            .get_mut(&agent_id)
            .ok_or(IndexerError::UnknownAgent(agent_id))
    }

    fn index(&mut self, owner: Pubkey, agent_id: u64) {
        self.by_owner.entry(owner).or_default().insert(agent_id);
    }

    fn unindex(&mut self, owner: &Pubkey, agent_id: u64) {
        if let Some(ids) = self.by_owner.get_mut(owner) {
            ids.remove(&agent_id);
            if ids.is_empty() {
                self.by_owner.remove(owner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_market::constants::STAKE_SCALE;
    use agent_market::events::{
        AgentLoved, AgentStaked, AuthorizedUsage, Cloned, Minted, Transferred, UsageRevoked,
    };
    use agent_market::state::AgentAccount;

    fn minted(agent_id: u64, owner: Pubkey, category: &str) -> MarketEvent {
        MarketEvent::Minted(Minted {
            agent_id,
            owner,
            content_hashes: vec![[agent_id as u8; 32]],
            descriptions: vec!["bot".to_string()],
            name: format!("agent-{agent_id}"),
            category: category.to_string(),
            is_public: false,
        })
    }

    fn staked(agent_id: u64, amount: u64) -> MarketEvent {
        MarketEvent::AgentStaked(AgentStaked {
            agent_id,
            staker: Pubkey::new_unique(),
            amount,
        })
    }

    fn loved(agent_id: u64) -> MarketEvent {
        MarketEvent::AgentLoved(AgentLoved {
            agent_id,
            user: Pubkey::new_unique(),
        })
    }

    #[test]
    fn stake_and_love_match_program_score() {
        let mut mirror = RankingMirror::new();
        mirror.apply(&minted(1, Pubkey::new_unique(), "AI Agent")).unwrap();
        let events = [
            staked(1, 3 * STAKE_SCALE),
            staked(1, 2 * STAKE_SCALE),
            loved(1),
            loved(1),
        ];
        for event in events {
            mirror.apply(&event).unwrap();
        }
        let agent = mirror.agent(1).unwrap();
        assert_eq!(agent.score, 5_200_000_000);
        assert_eq!(mirror.events_applied(), 5);
    }

    #[test]
    fn replay_converges_with_account_state() {
        let owner = Pubkey::new_unique();
        let mut account = AgentAccount::minted(
            1,
            owner,
            "agent-1".to_string(),
            "AI Agent".to_string(),
            vec!["bot".to_string()],
            vec![[1u8; 32]],
            false,
        );
        let mut mirror = RankingMirror::new();
        mirror.apply(&minted(1, owner, "AI Agent")).unwrap();

        for (step, amount) in [7u64, STAKE_SCALE, 13, STAKE_SCALE / 3].iter().enumerate() {
            account.record_stake(*amount).unwrap();
            mirror.apply(&staked(1, *amount)).unwrap();
            if step % 2 == 0 {
                account.record_love().unwrap();
                mirror.apply(&loved(1)).unwrap();
            }
            let mirrored = mirror.agent(1).unwrap();
            assert_eq!(mirrored.score, account.ranking_score);
            assert_eq!(mirrored.total_staked, account.total_staked);
            assert_eq!(mirrored.loves, account.loves);
        }
    }

    #[test]
    fn transfer_moves_owner_index() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut mirror = RankingMirror::new();
        mirror.apply(&minted(1, alice, "AI Agent")).unwrap();
        mirror.apply(&minted(2, alice, "AI Agent")).unwrap();

        mirror
            .apply(&MarketEvent::Transferred(Transferred {
                agent_id: 1,
                from: alice,
                to: bob,
                content_hashes: vec![[9u8; 32], [8u8; 32]],
            }))
            .unwrap();

        assert_eq!(mirror.owned_by(&alice), vec![2]);
        assert_eq!(mirror.owned_by(&bob), vec![1]);
        let moved = mirror.agent(1).unwrap();
        assert_eq!(moved.owner, bob);
        assert_eq!(moved.content_hashes, vec![[9u8; 32], [8u8; 32]]);
        assert_eq!(moved.descriptions, vec!["bot".to_string()]);
    }

    #[test]
    fn clone_starts_fresh_and_keeps_source() {
        let alice = Pubkey::new_unique();
        let carol = Pubkey::new_unique();
        let mut mirror = RankingMirror::new();
        mirror.apply(&minted(1, alice, "Tools")).unwrap();
        mirror.apply(&staked(1, STAKE_SCALE)).unwrap();
        let before = mirror.agent(1).unwrap().clone();

        mirror
            .apply(&MarketEvent::Cloned(Cloned {
                source_id: 1,
                new_id: 2,
                from: alice,
                to: carol,
                content_hashes: vec![[6u8; 32]],
            }))
            .unwrap();

        let clone = mirror.agent(2).unwrap();
        assert_eq!(clone.owner, carol);
        assert_eq!(clone.category, "Tools");
        assert_eq!(clone.descriptions, before.descriptions);
        assert_eq!(clone.content_hashes, vec![[6u8; 32]]);
        assert_eq!(clone.cloned_from, 1);
        assert_eq!(clone.score, 0);
        assert_eq!(mirror.agent(1).unwrap(), &before);
    }

    #[test]
    fn authorizations_follow_grant_and_revoke() {
        let user = Pubkey::new_unique();
        let mut mirror = RankingMirror::new();
        mirror.apply(&minted(1, Pubkey::new_unique(), "AI Agent")).unwrap();
        let grant = MarketEvent::AuthorizedUsage(AuthorizedUsage { agent_id: 1, user });

        mirror.apply(&grant).unwrap();
        mirror.apply(&grant).unwrap();
        assert_eq!(mirror.authorized_users(1).unwrap(), &[user]);

        mirror
            .apply(&MarketEvent::UsageRevoked(UsageRevoked { agent_id: 1, user }))
            .unwrap();
        assert!(mirror.authorized_users(1).unwrap().is_empty());
        assert!(matches!(
            mirror.authorized_users(9),
            Err(IndexerError::UnknownAgent(9))
        ));
    }

    #[test]
    fn unknown_agents_and_duplicate_mints_are_rejected() {
        let mut mirror = RankingMirror::new();
        assert!(matches!(
            mirror.apply(&staked(5, 1)),
            Err(IndexerError::UnknownAgent(5))
        ));
        mirror.apply(&minted(1, Pubkey::new_unique(), "AI Agent")).unwrap();
        assert!(matches!(
            mirror.apply(&minted(1, Pubkey::new_unique(), "AI Agent")),
            Err(IndexerError::DuplicateAgent(1))
        ));
        assert_eq!(mirror.events_applied(), 1);
    }

    #[test]
    fn top_filters_by_category_and_breaks_ties_by_id() {
        let owner = Pubkey::new_unique();
        let mut mirror = RankingMirror::new();
        for (id, category) in [(1, "AI Agent"), (2, "Tools"), (3, "AI Agent"), (4, "AI Agent")] {
            mirror.apply(&minted(id, owner, category)).unwrap();
        }
        mirror.apply(&staked(3, 2 * STAKE_SCALE)).unwrap();
        mirror.apply(&staked(4, 2 * STAKE_SCALE)).unwrap();
        mirror.apply(&staked(2, 9 * STAKE_SCALE)).unwrap();
        mirror.apply(&loved(1)).unwrap();

        let ids = |agents: Vec<&MirroredAgent>| {
            agents.iter().map(|a| a.agent_id).collect::<Vec<_>>()
        };
        assert_eq!(ids(mirror.top(10, Some("AI Agent"), SortKey::Score)), vec![3, 4, 1]);
        assert_eq!(ids(mirror.top(2, None, SortKey::Score)), vec![2, 3]);
        assert_eq!(ids(mirror.top(10, None, SortKey::Loves)), vec![1, 2, 3, 4]);
        assert_eq!(ids(mirror.top(3, None, SortKey::Id)), vec![1, 2, 3]);
        assert!(mirror.top(10, Some("Games"), SortKey::Score).is_empty());
    }

    fn at(slot: u64, signature: &str, index: u32) -> EventPosition {
        EventPosition {
            slot,
            signature: signature.to_string(),
            index,
        }
    }

    #[test]
    fn mint_records_content_and_descriptions() {
        let mut mirror = RankingMirror::new();
        mirror.apply(&minted(3, Pubkey::new_unique(), "AI Agent")).unwrap();
        let agent = mirror.agent(3).unwrap();
        assert_eq!(agent.content_hashes, vec![[3u8; 32]]);
        assert_eq!(agent.descriptions, vec!["bot".to_string()]);
    }

    #[test]
    fn cursor_covers_everything_up_to_the_last_position() {
        let mut cursor = Cursor::default();
        assert!(!cursor.covers(&at(0, "sigA", 0)));

        cursor.advance(&at(10, "sigA", 0));
        cursor.advance(&at(10, "sigA", 1));
        cursor.advance(&at(10, "sigB", 0));

        assert!(cursor.covers(&at(9, "sigZ", 4)));
        assert!(cursor.covers(&at(10, "sigA", 1)));
        assert!(!cursor.covers(&at(10, "sigA", 2)));
        assert!(!cursor.covers(&at(10, "sigC", 0)));
        assert!(!cursor.covers(&at(11, "sigA", 0)));

        cursor.advance(&at(11, "sigD", 0));
        assert!(cursor.covers(&at(10, "sigC", 0)));
        assert_eq!(cursor.applied_in_slot.len(), 1);

        cursor.advance(&at(5, "sigOld", 0));
        assert_eq!(cursor.slot, 11);
    }

    #[test]
    fn mark_seen_keeps_state_and_moves_cursor() {
        let mut mirror = RankingMirror::new();
        let position = at(4, "sigA", 0);
        assert!(!mirror.has_seen(&position));

        mirror.mark_seen(&position);

        assert!(mirror.has_seen(&position));
        assert_eq!(mirror.cursor().slot, 4);
        assert_eq!(mirror.events_applied(), 0);
    }
}
