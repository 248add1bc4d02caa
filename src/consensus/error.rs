//! Protocol misuse errors

use thiserror::Error;

/// Raised when a node is driven outside the protocol.
///
/// Misbehaving followees are never reported through this type; they end up
/// on the blacklist instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("followees have already been set")]
    FolloweesAlreadySet,

    #[error("followees must be set before this operation")]
    FolloweesNotSet,

    #[error("pending transactions have already been set")]
    PendingAlreadySet,

    #[error("receive called after all {num_rounds} rounds were processed")]
    RoundLimitExceeded { num_rounds: usize },

    #[error("candidate sender {sender} out of range for {node_count} nodes")]
    SenderOutOfRange { sender: usize, node_count: usize },

    #[error("candidate sender {sender} is not a followee")]
    NotAFollowee { sender: usize },
}
