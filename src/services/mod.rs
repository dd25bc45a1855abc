pub mod catalog;
pub mod fundraising;
pub mod images;
pub mod releases;
pub mod revalidation;

pub use catalog::{parse_status_filter, CatalogService, SearchQuery};
pub use fundraising::FundraisingProgress;
pub use images::ImageResolver;
pub use releases::{CacheStatus, ReleasePolicy, ReleaseService};
pub use revalidation::{RevalidateRequest, RevalidationService};
