//! # lg-core: the Leadgrid pipeline
//!
//! Server-side data pipeline behind the leads table. A request's query string
//! becomes a [`SearchParams`]; the rows of one table are then filtered,
//! faceted, charted, sorted and paginated, and the result is assembled into a
//! [`LeadsResponse`].
//!
//! Everything here is pure and request-scoped. Fetching rows and serving
//! HTTP live in `lg-hub`.
//!
//! ```text
//! query ─▶ params::decode ─▶ response::execute(rows) ─▶ superjson::to_string
//! ```

pub mod chart;
pub mod cursor;
pub mod facets;
pub mod filter;
pub mod lead;
pub mod params;
pub mod percentile;
pub mod response;
pub mod sort;
pub mod superjson;
pub mod time;

pub use chart::ChartBucket;
pub use cursor::Cursors;
pub use facets::{Facet, FacetRow, FacetValue, Facets};
pub use lead::{CallStatus, Lead, LeadStatus, Outcome};
pub use params::{DateFilter, Direction, NumericFilter, SearchParams, SortSpec};
pub use percentile::{PercentileBand, Percentiles};
pub use response::{execute, LeadRow, LeadsResponse, Meta};
pub use sort::SortField;
