//! Output identity.
//!
//! An output's id is a content hash of what it is (destination, coins,
//! hours) and where it came from (the producing transaction's hash). Ids
//! are not random: two outputs with the same fields from the same
//! transaction get the same id, which is exactly how the validator detects
//! duplicate outputs.

use serde::{Deserialize, Serialize};

use crate::config::ENCODED_UX_BODY_LENGTH;
use crate::crypto::{sha256, Address, Hash256};
use crate::encoding::{Decode, DecodeError, Encode, Reader};

/// The hashed body of an unspent output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UxBody {
    /// Hash of the transaction that created the output.
    pub src_transaction: Hash256,
    pub address: Address,
    pub coins: u64,
    pub hours: u64,
}

impl UxBody {
    /// The output identifier: `sha256(encode(body))`.
    pub fn hash(&self) -> Hash256 {
        sha256(&self.encode())
    }
}

impl Encode for UxBody {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.src_transaction.encode_to(buf);
        self.address.encode_to(buf);
        self.coins.encode_to(buf);
        self.hours.encode_to(buf);
    }

    fn encoded_len(&self) -> usize {
        ENCODED_UX_BODY_LENGTH
    }
}

impl Decode for UxBody {
    const MIN_ENCODED_LEN: usize = ENCODED_UX_BODY_LENGTH;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            src_transaction: Hash256::decode_from(reader)?,
            address: Address::decode_from(reader)?,
            coins: u64::decode_from(reader)?,
            hours: u64::decode_from(reader)?,
        })
    }
}

/// Identifier of an output paying `coins`/`hours` to `destination`, created
/// by transaction `src_transaction`.
pub fn output_id(src_transaction: &Hash256, destination: &Address, coins: u64, hours: u64) -> Hash256 {
    UxBody {
        src_transaction: *src_transaction,
        address: *destination,
        coins,
        hours,
    }
    .hash()
}
