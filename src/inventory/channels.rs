//! Channel account bookkeeping.
//!
//! Accounts are held in the mapping shape regardless of how the document
//! declared them, so every write migrates list-shaped channels.

use super::model::{Channel, Instance};
use crate::value::{Map, Value};
use std::collections::HashSet;

impl Instance {
    /// Register `account_id` under `channel`, creating the channel if needed.
    /// Existing per-account metadata is left alone.
    pub fn register_account(&mut self, channel: &str, account_id: &str) {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(Channel::default)
            .accounts
            .entry(account_id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    /// `channel:account` keys referenced by any binding.
    pub fn bound_accounts(&self) -> HashSet<String> {
        self.bindings().map(|(_, b)| b.key()).collect()
    }

    /// Drop accounts no remaining binding refers to. Returns how many were removed.
    pub fn prune_accounts(&mut self) -> usize {
        let used = self.bound_accounts();
        let mut removed = 0;
        for (name, channel) in self.channels.iter_mut() {
            let before = channel.accounts.len();
            channel
                .accounts
                .retain(|account, _| used.contains(&format!("{}:{}", name, account)));
            removed += before - channel.accounts.len();
        }
        removed
    }
}
