// Draft session state and the tracker operations over it.

pub mod session;
pub mod tracker;
