//! Command-line front end for `search-core`: corpus loading, paging of
//! results, recent-request statistics and timing.

pub mod corpus;
pub mod duration;
pub mod paginator;
pub mod request_queue;

pub use corpus::{build_server, load_corpus, InputDoc};
pub use duration::LogDuration;
pub use paginator::{paginate, Page, Paginator};
pub use request_queue::RequestQueue;
