pub mod filter;
pub mod geocode;
pub mod geocode_cache;
pub mod geodesy;
pub mod listing;
pub mod rate_gate;
pub mod search;

pub use filter::{MatchOutcome, evaluate, filter_restaurants, matches};
pub use geocode::GeocodeResolver;
pub use geocode_cache::{Clock, GeocodeCache, ManualClock, SystemClock};
pub use listing::{RecordError, parse_listing, parse_listings};
pub use rate_gate::{IntervalGate, NoopGate, RateGate};
pub use search::{RestaurantSearchService, SearchError};
