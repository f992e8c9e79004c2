//! Web search providers used for corrective augmentation
//!
//! - [`tavily`](crate::tools::tavily) - Tavily search API (needs `TAVILY_API_KEY`)
//! - [`search`](crate::tools::search) - DuckDuckGo via daedra, no key required

/// Web search using DuckDuckGo.
pub mod search;
/// Web search using the Tavily API.
pub mod tavily;

pub use search::DuckDuckGoSearch;
pub use tavily::TavilySearch;
