/// Identifies one mount of a view. Results tagged with an older mount are
/// dropped by the reducer.
pub type MountId = uuid::Uuid;

#[derive(Debug, Clone)]
pub enum ViewEvent<R> {
    // Lifecycle
    Mounted(MountId),
    Unmounted(MountId),

    // List loading; `mount` is the mount that issued the request
    LoadStarted,
    Loaded {
        mount: Option<MountId>,
        items: Vec<R>,
    },
    LoadFailed {
        mount: Option<MountId>,
        message: String,
    },

    // Optimistic row updates
    ItemUpserted(R),
    ItemRemoved(String),

    // Row actions in flight
    ActionStarted(String),
    ActionFinished(String),
}
