//! Cross-crate scenarios that only make sense wired end-to-end through
//! `chain::Chain` (fork choice, stabilization lag, equivocation detection).
//! Properties that are local to a single crate — deputy rotation
//! (`scheduler`), change-log undo/redo (`account_engine`), confirm-threshold
//! arithmetic (`confirmer::threshold`) — are covered by that crate's own
//! `#[cfg(test)]` modules instead of being re-tested here.

#[cfg(test)]
mod support;

#[cfg(test)]
mod two_peer_progression;

#[cfg(test)]
mod fork_switch;

#[cfg(test)]
mod equivocation;
