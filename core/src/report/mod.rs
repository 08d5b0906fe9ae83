//! Report-form helpers: the debounced duplicate-issue lookup.

pub mod scheduler;
pub mod suggestions;

pub use scheduler::{ScheduledHandle, Scheduler, TokioScheduler};
pub use suggestions::{
    DEFAULT_QUIET_PERIOD, MIN_DESCRIPTION_CHARS, MIN_LOCATION_CHARS, SuggestionController,
    SuggestionState, meets_threshold,
};
