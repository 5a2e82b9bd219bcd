pub mod blocklist;
pub mod hotlines;
pub mod roster;
