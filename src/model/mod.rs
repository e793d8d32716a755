pub mod outcome;
pub mod pool;
pub mod record;
pub mod units;
