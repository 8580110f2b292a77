// Timer refresh cadence while the clock is running
pub const TICK_INTERVAL_MS: u64 = 100;

// Puzzle layout: lone white knight in the h8 corner, black queen in the centre.
// White is always to move; counters stay at their initial values.
pub const STARTING_POSITION: &str = "7N/8/8/3q4/8/8/8/8 w - - 0 1";
pub const QUEEN_SQUARE: &str = "d5";

// The cursor starts past the knight's own square (h8 is TargetSequence[0])
pub const INITIAL_TARGET_INDEX: usize = 1;
