use tracing::{info, warn};

use crate::config::Config;
use crate::session::ledger::CreditLedger;
use crate::session::queue::TaskQueue;
use crate::session::types::{TaskKind, Tier, ViewerTarget};

/// Mutable state owned by the current (single, implicit) session: sign-in
/// flag, subscription tier, credit ledger, and the task queue.
///
/// All mutation flows through methods on this type, whether triggered by a
/// user action or the progress driver's timer; nothing else holds a writer.
/// Everything here is memory-only and is discarded at the session boundary.
#[derive(Debug)]
pub struct Session {
    pub(crate) config: Config,
    pub(crate) signed_in: bool,
    pub(crate) tier: Tier,
    pub(crate) ledger: CreditLedger,
    pub(crate) queue: TaskQueue,
}

impl Session {
    /// Fresh signed-out session on the Free tier with the starting grant.
    pub fn new(config: Config) -> Self {
        let ledger = CreditLedger::new(config.starting_credits);
        Self {
            config,
            signed_in: false,
            tier: Tier::Free,
            ledger,
            queue: TaskQueue::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn credits(&self) -> u32 {
        self.ledger.balance()
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    // ── Account lifecycle ────────────────────────────────────────────────────

    pub fn sign_in(&mut self) {
        self.signed_in = true;
        info!("session signed in");
    }

    /// Sign out: restore the starting grant, drop back to the Free tier,
    /// and discard the queue.  Only the durable viewer-hint flag survives
    /// this boundary.
    pub fn sign_out(&mut self) {
        self.signed_in = false;
        self.tier = Tier::Free;
        self.ledger.reset(self.config.starting_credits);
        self.queue.clear();
        info!("session signed out; state reset");
    }

    /// Top-up path used by the paywall collaborator.
    pub fn top_up(&mut self, amount: u32) {
        self.ledger.credit(amount);
        info!(amount, balance = self.ledger.balance(), "credits topped up");
    }

    /// Replace the subscription tier and apply the new tier's credit grant.
    ///
    /// Tier changes are value replacements, not accretive: the previous
    /// tier's limits stop applying immediately.
    pub fn upgrade(&mut self, tier: Tier) {
        if tier == self.tier {
            warn!(%tier, "upgrade requested into the current tier");
            return;
        }
        self.tier = tier;
        self.ledger.credit(tier.limits().subscription_grant);
        info!(%tier, balance = self.ledger.balance(), "tier upgraded");
    }

    // ── Timer callback ───────────────────────────────────────────────────────

    /// Apply one tick of progress to every processing record.
    pub fn tick(&mut self) {
        self.queue.tick(self.config.tick_increment);
    }

    // ── Viewer handoff ───────────────────────────────────────────────────────

    /// Route a click on a task card to the matching viewer.
    ///
    /// Returns `None` for unknown ids and for records still processing; the
    /// viewer receives display data only, never queue or ledger access.
    pub fn open_task(&self, id: &str) -> Option<ViewerTarget> {
        let record = self.queue.find(id)?;
        if !record.is_completed() {
            return None;
        }
        Some(match record.kind {
            TaskKind::Model => ViewerTarget::Model {
                id: record.id.clone(),
                title: record.title.clone(),
                thumbnail: record.thumbnail.clone(),
            },
            TaskKind::Image => ViewerTarget::Image {
                url: record.thumbnail.clone(),
                title: record.title.clone(),
            },
        })
    }
}
