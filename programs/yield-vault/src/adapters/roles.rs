use anchor_lang::prelude::*;

use crate::accounting::AccessControl;
use crate::state::{DepositorRecord, ProtocolState};

/// The protocol owner administers fees. Depositors need an active allow-list
/// record for the vault; handlers pass `None` when the caller has none.
pub struct VaultRoles<'a> {
    pub protocol_state: &'a ProtocolState,
    pub depositor_record: Option<&'a DepositorRecord>,
}

impl<'a> AccessControl for VaultRoles<'a> {
    fn is_authorized_depositor(&self, depositor: &Pubkey) -> bool {
        self.depositor_record
            .is_some_and(|record| record.authorized && record.depositor == *depositor)
    }

    fn is_fee_administrator(&self, caller: &Pubkey) -> bool {
        self.protocol_state.is_owner(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depositor_needs_an_active_matching_record() {
        let owner = Pubkey::new_unique();
        let depositor = Pubkey::new_unique();
        let protocol_state = ProtocolState { owner, bump: 255 };
        let mut record = DepositorRecord {
            vault: Pubkey::new_unique(),
            depositor,
            authorized: true,
            bump: 255,
        };

        let roles = VaultRoles {
            protocol_state: &protocol_state,
            depositor_record: None,
        };
        assert!(!roles.is_authorized_depositor(&depositor));
        assert!(roles.is_fee_administrator(&owner));
        assert!(!roles.is_fee_administrator(&depositor));

        let roles = VaultRoles {
            protocol_state: &protocol_state,
            depositor_record: Some(&record),
        };
        assert!(roles.is_authorized_depositor(&depositor));
        assert!(!roles.is_authorized_depositor(&owner));

        record.authorized = false;
        let roles = VaultRoles {
            protocol_state: &protocol_state,
            depositor_record: Some(&record),
        };
        assert!(!roles.is_authorized_depositor(&depositor));
    }
}
