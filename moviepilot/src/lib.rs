//! MoviePilot client library: REST client, dashboard snapshots, state-change
//! detection and the periodic refresh driver.

pub mod api;
pub mod consts;
pub mod error;
pub mod notifier;
pub mod overview;
pub mod profiles;
pub mod refresh;
pub mod sensors;
pub mod types;
pub mod util;

pub use api::{ClientConfig, MoviePilotClient};
pub use error::{ApiError, ApiResult, RefreshError};
pub use notifier::{Edge, Signals, StateChangeNotifier, TransitionEvent, TransitionKind};
pub use refresh::{Coordinator, CoordinatorState, Update};
pub use types::{Coverage, NotificationEvent, NotificationType, Snapshot};
