//! Pure ranking core: query construction, hit aggregation, and author ranking.
//!
//! Nothing in this crate performs network I/O. The only file access is the one-time stop-word load
//! performed when a [`QueryBuilder`] is built from configuration.

pub mod aggregate;
pub mod authors;
pub mod query;
pub mod request;
pub mod text;

mod error;

pub use aggregate::{AggregatedResult, HitGroup, ResultAggregator, ScoredHit, cmp_f64_desc};
pub use authors::{AggregateStrategy, AuthorAggregate, AuthoredHit, RankedAuthor, rank_authors};
pub use error::{Error, Result};
pub use query::{BoolQuery, FilterCriteria, LikeDocument, MoreLikeThis, Query, QueryBuilder};
pub use request::{IndexRequest, SortSpec, TermsAggregationRequest};
pub use text::{StopWords, TextNormalizer, collapse_whitespace};
