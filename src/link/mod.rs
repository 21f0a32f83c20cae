//! Entity auto-linking for wiki content.
//!
//! - [`linker`]: wraps known page names in anchors
//! - [`markup`]: locates tags and existing anchors
//! - [`route`]: builds and parses page hrefs
//! - [`unlink`]: strips anchors to a removed page
//! - [`batch`]: relinks many pages on a worker pool

pub mod batch;
pub mod linker;
pub mod markup;
pub mod route;
pub mod unlink;

pub use batch::{BatchLinker, LinkJob, PageLinkResult};
pub use linker::{auto_link, EntityLinker, InsertedLink, LinkContext, LinkOutcome};
pub use route::{linked_page_ids, PageRoute, DEFAULT_ROUTE_PREFIX};
pub use unlink::unlink_page;
