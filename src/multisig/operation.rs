//! Operations an authority can approve and the digest owners sign
//!
//! Operations are a closed set of variants rather than opaque call data.
//! Each has a canonical byte encoding that goes into the execution digest,
//! so two different operations can never share a signature set.

use serde::{Deserialize, Serialize};

use crate::crypto::{sha256, Identity};

const TAG_UPDATE_OWNER: u8 = 0x01;
const TAG_SET_ADDITIONAL_TEAM_VEST: u8 = 0x02;

/// A privileged call forwarded by [`super::MultiSigAuthority::execute`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Add (`add == true`) or remove an owner of the authority itself
    UpdateOwner { owner: Identity, add: bool },
    /// Allocate team vesting to new members, diluting the founders
    SetAdditionalTeamVest {
        accounts: Vec<Identity>,
        amounts: Vec<u128>,
    },
}

impl Operation {
    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Operation::UpdateOwner { .. } => "update_owner",
            Operation::SetAdditionalTeamVest { .. } => "set_additional_team_vest",
        }
    }

    /// Canonical encoding: tag byte, then fields in declaration order.
    /// Lists carry a u32 big-endian length prefix; amounts are u128 big-endian.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Operation::UpdateOwner { owner, add } => {
                out.push(TAG_UPDATE_OWNER);
                out.extend_from_slice(owner.as_bytes());
                out.push(u8::from(*add));
            }
            Operation::SetAdditionalTeamVest { accounts, amounts } => {
                out.push(TAG_SET_ADDITIONAL_TEAM_VEST);
                out.extend_from_slice(&(accounts.len() as u32).to_be_bytes());
                for account in accounts {
                    out.extend_from_slice(account.as_bytes());
                }
                out.extend_from_slice(&(amounts.len() as u32).to_be_bytes());
                for amount in amounts {
                    out.extend_from_slice(&amount.to_be_bytes());
                }
            }
        }
        out
    }
}

/// What a forwarded operation produced
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutput {
    OwnerUpdated { owner: Identity, threshold: usize },
    AdditionalTeamVested { accounts: usize, total: u128 },
}

/// Digest the owners sign to approve one execution.
///
/// Binding the authority identity and chain id rules out replay on another
/// authority or network; binding the nonce rules out replay on this one.
pub fn execution_digest(
    authority: &Identity,
    chain_id: u64,
    target: &Identity,
    value: u128,
    operation: &Operation,
    nonce: u64,
) -> [u8; 32] {
    let payload = operation.encode();

    let mut data = Vec::with_capacity(20 + 8 + 20 + 16 + 4 + payload.len() + 8);
    data.extend_from_slice(authority.as_bytes());
    data.extend_from_slice(&chain_id.to_be_bytes());
    data.extend_from_slice(target.as_bytes());
    data.extend_from_slice(&value.to_be_bytes());
    data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    data.extend_from_slice(&payload);
    data.extend_from_slice(&nonce.to_be_bytes());

    sha256(&data)
}
