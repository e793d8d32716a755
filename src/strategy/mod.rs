pub mod classifier;
pub mod implementations;
pub mod need;
pub mod segmentation;
pub mod traits;
