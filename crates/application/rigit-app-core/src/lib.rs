pub mod app_core;
pub mod bus;
pub mod dispatcher;
pub mod kernel;
pub mod notice;
pub mod ports;
pub mod reconcile;
pub mod topics;
pub mod view;
pub mod viewmodel;
pub mod views;

pub use app_core::{MountId, ViewEvent, ViewState, ViewStore};
pub use bus::{Notification, NotificationBus, Subscription};
pub use dispatcher::{Action, ActionDispatcher, ActionError};
pub use kernel::AppKernel;
pub use notice::{MemoryNotifier, TracingNotifier};
pub use ports::*;
pub use reconcile::MountedView;
pub use topics::Topic;
pub use view::{EntityView, LoadOutcome, ViewContext, ViewSpec};
pub use viewmodel::*;
pub use views::*;
