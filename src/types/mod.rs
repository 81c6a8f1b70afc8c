//! Public types for the Mimir API.

mod push;
mod request;
mod response;

pub use push::{Notification, NotificationData, PushPayload};
pub use request::{Destination, Method, RequestMode, RequestRecord};
pub use response::ResponseRecord;
