//! Simulation hyperparameters.

// === State Encoding ===
/// Side length of the obstacle window centred on the agent
pub const OBSTACLE_WINDOW_SIZE: usize = 3;
/// Distances to the goal are snapped to multiples of this step
pub const DISTANCE_STEP: i32 = 3;
/// Bearings to the goal are snapped to multiples of this step (degrees)
pub const BEARING_STEP: i32 = 10;

// === Actions ===
/// Strength shared by every compass action in the catalog
pub const DEFAULT_ACTION_STRENGTH: i32 = 2;
/// Angular spacing between compass actions (degrees)
pub const COMPASS_STEP: i32 = 45;
pub const COMPASS_ACTIONS: usize = 8;

// === Sentinels ===
pub const OBSTACLE_STRENGTH: i32 = -1;
pub const OBSTACLE_ANGLE: i32 = -1;
pub const GOAL_STRENGTH: i32 = 10;
pub const GOAL_ANGLE: i32 = 10;

// === Host Loop ===
/// Minimum real time between two ticks
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
/// Tick cap for headless episodes
pub const DEFAULT_MAX_TICKS: u64 = 500;

// === Demo Map Generation ===
pub const DEMO_WIDTH: i32 = 100;
pub const DEMO_HEIGHT: i32 = 100;
pub const DEMO_START: (i32, i32) = (5, 5);
pub const DEMO_END: (i32, i32) = (95, 95);
/// Height of each horizontal current band
pub const DEMO_BAND_HEIGHT: i32 = 12;
pub const DEMO_OBSTACLE_COUNT_MIN: usize = 6;
pub const DEMO_OBSTACLE_COUNT_MAX: usize = 14;
pub const DEMO_OBSTACLE_RADIUS_MIN: i32 = 2;
pub const DEMO_OBSTACLE_RADIUS_MAX: i32 = 6;
/// Blobs never cover cells this close to the start or end point
pub const DEMO_CLEARANCE: i32 = 4;
