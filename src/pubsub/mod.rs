// Pub/sub transport: trait-based abstraction over the notification topic.
//
// The PubSubTransport trait is what the subscription manager, router and
// notifier talk to. SnsClient implements it over the AWS SDK SNS client.

pub mod filter;
pub mod sns;
pub mod traits;

pub use filter::{FilterPolicy, SubscriptionHandle, SubscriptionRecord, SubscriptionState};
pub use traits::{MessageAttributes, PubSubTransport, PublishResult};
