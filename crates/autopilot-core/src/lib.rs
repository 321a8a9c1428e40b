pub mod ids;
pub mod mux;
pub mod session;
pub mod work_item;

pub use ids::{SessionName, WorkItemId};
pub use mux::{MuxError, Multiplexer};
pub use session::{SessionHandle, SessionRecord, SessionStatus};
pub use work_item::{Assignee, WebhookEvent, WorkItem};
