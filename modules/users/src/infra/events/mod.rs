pub mod broadcast;
pub mod http_publisher;
pub mod payload;

pub use broadcast::BroadcastEventPublisher;
pub use http_publisher::HttpEventPublisher;
pub use payload::{UserEventPayload, UserSnapshot};
