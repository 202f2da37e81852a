mod bus;
mod http;
mod local;
mod traits;

pub use bus::EventBus;
pub use http::HttpService;
pub use local::LocalService;
pub use traits::{DiscussionService, ServiceError};
