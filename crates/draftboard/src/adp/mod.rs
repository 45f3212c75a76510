// ADP data: platform page adapter and the two-platform reconciler.

pub mod reconcile;
pub mod source;
