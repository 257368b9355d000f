//! Thread plumbing around the combat simulation: the fixed-rate game
//! loop, the AI worker pool, and the kill-reclaim worker.

pub mod ai_pool;
pub mod game_loop;
pub mod reclaim;
pub mod state;
