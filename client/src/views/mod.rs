//! View controllers
//!
//! Each view owns its own loading flag, error message and data snapshot.
//! None of them render anything; the front end reads their state.

mod history;
mod play;
mod results;
mod stats;

pub use history::{HistoryView, HISTORY_PAGE_SIZE};
pub use play::PlayView;
pub use results::{follow, ResultFeed, ResultsView, RESULT_FEED_CAPACITY};
pub use stats::StatsView;
