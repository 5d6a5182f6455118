pub mod chunk;
pub mod delivery;
pub mod line;

use async_trait::async_trait;

use crate::models::{DeliveryError, Profile};

pub use delivery::broadcast;
pub use line::LineClient;

/// Outbound side of the messaging platform. Every call is a single
/// immediate API request; there are no delivery receipts.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    async fn push(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryError>;

    /// Replies through a single-use conversation token.
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), DeliveryError>;

    async fn profile(&self, user_id: &str) -> Result<Profile, DeliveryError>;
}
