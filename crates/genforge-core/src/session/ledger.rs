use tracing::debug;

use crate::session::types::LedgerError;

/// A single non-negative credit balance.
///
/// The only mutable piece of account state the session models.  `debit`
/// refuses rather than underflows, so the balance can never go negative
/// regardless of call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditLedger {
    balance: u32,
}

impl CreditLedger {
    pub fn new(starting_balance: u32) -> Self {
        Self {
            balance: starting_balance,
        }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.balance >= cost
    }

    /// Spend `cost` credits.
    ///
    /// Returns [`LedgerError::InsufficientFunds`] and leaves the balance
    /// untouched when the balance cannot cover the cost.
    pub fn debit(&mut self, cost: u32) -> Result<(), LedgerError> {
        if !self.can_afford(cost) {
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available: self.balance,
            });
        }
        self.balance -= cost;
        debug!(cost, balance = self.balance, "credits debited");
        Ok(())
    }

    /// Add `amount` credits (top-up or subscription grant).  Always succeeds;
    /// saturates at `u32::MAX`.
    pub fn credit(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
        debug!(amount, balance = self.balance, "credits granted");
    }

    /// Restore the balance to the session's starting grant (sign-out).
    pub(crate) fn reset(&mut self, starting_balance: u32) {
        self.balance = starting_balance;
    }
}
