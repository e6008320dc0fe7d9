//! Identity of the party issuing a create or update request.

use super::link::Creator;

/// The caller of a mutating operation.
///
/// Admin callers were verified by the bearer-token gate and bypass the rate
/// limiter. Client callers are identified only by an opaque, client-generated
/// id, which is an anti-abuse hint and not a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Admin,
    Client(String),
}

impl Caller {
    /// The id used for rate limiting; `None` for trusted callers.
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::Admin => None,
            Self::Client(id) => Some(id),
        }
    }

    pub fn creator(&self) -> Creator {
        match self {
            Self::Admin => Creator::Admin,
            Self::Client(_) => Creator::Client,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}
