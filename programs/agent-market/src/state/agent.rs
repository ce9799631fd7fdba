use anchor_lang::prelude::*;

use crate::constants::MAX_AUTHORIZED_USERS;
use crate::errors::MarketError;
use crate::ranking::ranking_score;

/// Agent account - one AI-agent token
#[account]
#[derive(InitSpace, Debug, PartialEq)]
pub struct AgentAccount {
    /// Unique agent ID (monotonic, starts at 1)
    pub agent_id: u64,

    /// Current holder
    pub owner: Pubkey,

    /// Agent name (max 64 bytes)
    #[max_len(64)]
    pub name: String,

    /// Discovery category, e.g. "AI Agent" (max 32 bytes)
    #[max_len(32)]
    pub category: String,

    /// One description per proof supplied at mint
    #[max_len(8, 128)]
    pub descriptions: Vec<String>,

    /// Hashes of the (possibly encrypted) payload currently bound to the agent
    #[max_len(16)]
    pub content_hashes: Vec<[u8; 32]>,

    /// Public agents can change hands without proofs
    pub is_public: bool,

    /// Identities granted usage rights by the owner
    #[max_len(32)]
    pub authorized_users: Vec<Pubkey>,

    /// Cumulative lamports staked on this agent
    pub total_staked: u64,

    /// Cumulative love count
    pub loves: u64,

    /// Fixed-point ranking score, see `ranking::ranking_score`
    pub ranking_score: u128,

    /// Source agent id when created by clone, 0 for minted agents
    pub cloned_from: u64,

    /// Unix timestamp when agent was created
    pub created_at: i64,

    /// Unix timestamp of the last mutation
    pub updated_at: i64,

    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl AgentAccount {
    pub const SEED_PREFIX: &'static [u8] = b"agent";

    /// Read an agent from a raw account, reporting `UnknownAgent` when the
    /// id was never minted.
    pub fn load(info: &AccountInfo) -> Result<Self> {
        require!(
            info.owner == &crate::ID && !info.data_is_empty(),
            MarketError::UnknownAgent
        );
        let data = info.try_borrow_data()?;
        Self::try_deserialize(&mut &data[..])
    }

    /// Write back an agent obtained from [`AgentAccount::load`].
    pub fn store(&self, info: &AccountInfo) -> Result<()> {
        let mut data = info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        self.try_serialize(&mut writer)
    }

    /// A freshly minted agent with zeroed counters.
    pub fn minted(
        agent_id: u64,
        owner: Pubkey,
        name: String,
        category: String,
        descriptions: Vec<String>,
        content_hashes: Vec<[u8; 32]>,
        is_public: bool,
    ) -> Self {
        Self {
            agent_id,
            owner,
            name,
            category,
            descriptions,
            content_hashes,
            is_public,
            authorized_users: Vec::new(),
            total_staked: 0,
            loves: 0,
            ranking_score: 0,
            cloned_from: 0,
            created_at: 0,
            updated_at: 0,
            bump: 0,
        }
    }

    /// A new agent that copies this one's metadata but nothing else.
    ///
    /// Ownership, content, authorizations and counters start fresh; the
    /// source is only read.
    pub fn spawn_clone(
        &self,
        agent_id: u64,
        owner: Pubkey,
        content_hashes: Vec<[u8; 32]>,
    ) -> Self {
        let mut clone = Self::minted(
            agent_id,
            owner,
            self.name.clone(),
            self.category.clone(),
            self.descriptions.clone(),
            content_hashes,
            self.is_public,
        );
        clone.cloned_from = self.agent_id;
        clone
    }

    /// Move the agent to `to` bound to `content_hashes`, returning the
    /// previous owner. Owner and content always change together.
    pub fn hand_over(&mut self, to: Pubkey, content_hashes: Vec<[u8; 32]>) -> Pubkey {
        self.content_hashes = content_hashes;
        std::mem::replace(&mut self.owner, to)
    }

    /// Owners are always authorized; everyone else needs a grant.
    pub fn is_authorized(&self, user: &Pubkey) -> bool {
        self.owner == *user || self.authorized_users.contains(user)
    }

    /// Grant usage rights. Returns false when the grant was already in effect.
    pub fn authorize(&mut self, user: Pubkey) -> Result<bool> {
        if self.is_authorized(&user) {
            return Ok(false);
        }
        require!(
            self.authorized_users.len() < MAX_AUTHORIZED_USERS,
            MarketError::AuthorizationListFull
        );
        self.authorized_users.push(user);
        Ok(true)
    }

    /// Withdraw usage rights. Returns false when there was nothing to revoke.
    pub fn revoke(&mut self, user: &Pubkey) -> bool {
        let before = self.authorized_users.len();
        self.authorized_users.retain(|u| u != user);
        self.authorized_users.len() != before
    }

    /// Add to the cumulative stake and recompute the score.
    pub fn record_stake(&mut self, amount: u64) -> Result<()> {
        require!(amount > 0, MarketError::ZeroStake);
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        self.refresh_score();
        Ok(())
    }

    /// Count one love and recompute the score.
    pub fn record_love(&mut self) -> Result<()> {
        self.loves = self.loves.checked_add(1).ok_or(MarketError::ArithmeticOverflow)?;
        self.refresh_score();
        Ok(())
    }

    pub fn refresh_score(&mut self) {
        self.ranking_score = ranking_score(self.total_staked, self.loves);
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            agent_id: self.agent_id,
            owner: self.owner,
            name: self.name.clone(),
            category: self.category.clone(),
            is_public: self.is_public,
            content_hashes: self.content_hashes.clone(),
            authorized_count: self.authorized_users.len() as u32,
            total_staked: self.total_staked,
            loves: self.loves,
            ranking_score: self.ranking_score,
            cloned_from: self.cloned_from,
        }
    }
}

/// Return data of `get_agent`
///
/// Sized to fit the runtime's return-data limit for every valid agent, so
/// the authorized user list is reported as a count only.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct AgentView {
    pub agent_id: u64,
    pub owner: Pubkey,
    pub name: String,
    pub category: String,
    pub is_public: bool,
    pub content_hashes: Vec<[u8; 32]>,
    pub authorized_count: u32,
    pub total_staked: u64,
    pub loves: u64,
    pub ranking_score: u128,
    pub cloned_from: u64,
}
