pub mod events;
pub mod reducer;
pub mod store;

pub use events::{MountId, ViewEvent};
pub use reducer::reduce;
pub use store::{ViewState, ViewStore};
