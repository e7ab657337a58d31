//! Placement strategies that can be passed to [`super::RingHash::get_n`]

/// Accepts every candidate. The same node id can be returned more than once
/// if it owns several consecutive virtual points.
pub fn accept_any(_chosen: &[String], _candidate: &str) -> bool {
    true
}

/// Accepts only node ids that were not chosen yet
pub fn accept_unique(chosen: &[String], candidate: &str) -> bool {
    !chosen.iter().any(|id| id == candidate)
}
