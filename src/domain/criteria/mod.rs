//! Built-in entry criteria.

pub mod prev_day_volume_ratio;
pub mod volume_health;

pub use prev_day_volume_ratio::PrevDayVolumeRatioCriterion;
pub use volume_health::VolumeHealthCriterion;
