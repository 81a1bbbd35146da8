//! Size-availability extraction for storefront product pages.
//!
//! A probe walks one page through consent dismissal, identity resolution,
//! variant-group discovery and availability reading, and always yields one
//! [`ProductProbeResult`](sizewatch_core::ProductProbeResult). The browser is
//! reached only through [`PageSession`] and [`BrowserSession`].

pub mod batch;
pub mod browser;
pub mod combos;
pub mod consent;
pub mod decision;
pub mod error;
pub mod groups;
pub mod identity;
pub mod options;
pub mod orchestrator;
pub mod page;
pub mod prober;
pub mod static_read;
pub mod vocab;

pub use batch::{run_batch, BatchSummary};
pub use browser::{ChromiumBrowser, ChromiumPage, LaunchOptions};
pub use error::PageError;
pub use groups::{classify, locate_groups, ClassifiedGroups, GroupKind, VariantGroup};
pub use options::{OptionPayload, VariantOption};
pub use orchestrator::probe_product;
pub use page::{BrowserSession, Node, PageSession};
