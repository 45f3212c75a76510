// Custom rankings: the persisted order, its file store, and the merge with
// fresh ADP data.

pub mod merge;
pub mod order;
pub mod store;
