pub mod attributes;
pub mod batch;
pub mod error;
pub mod grouper;
pub mod images;
pub mod notify;
pub mod reconcile;
pub mod sweep;

pub use batch::{BatchOutcome, BatchReport, FullReport, SyncEngine};
pub use error::{ItemError, SyncError};
pub use grouper::{group_by_sku, SkuGroup};
pub use notify::{LogNotifier, Notifier};
pub use reconcile::Reconciler;
pub use sweep::sweep_missing;
