pub mod events;
pub mod gaps;

/// Default width of the windows `events` walks through, like a week view
pub const DEFAULT_STEP_DAYS: u64 = 7;
