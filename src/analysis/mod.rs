pub mod champion_stats;
pub mod overview;
pub mod rankings;
pub mod timeline;
