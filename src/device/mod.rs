//! Wall Connector device access
//!
//! JSON records and the per-poll HTTP scraper.

mod records;
mod scraper;

pub use records::*;
pub use scraper::{Endpoint, PollSnapshot, ScrapeOutcome, Scraper};
