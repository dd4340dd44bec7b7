//! Read-side orchestration for moments.
//!
//! [`MomentFinder`] combines the visibility rule, caller filters and
//! pagination into one storage query, then hands each result to the
//! [`EnrichmentPipeline`] which attaches statistics and owner details.
//! Storage and the auxiliary record lookups sit behind the
//! [`ExtensionClient`] trait; the caller's identity is always passed in
//! explicitly as an `Option<&Viewer>`.

mod client;
mod enrich;
mod error;
mod finder;
mod subject;

pub use client::{resolve_or_anonymous, ExtensionClient, ViewerResolver};
pub use enrich::EnrichmentPipeline;
pub use error::{ClientError, FinderError};
pub use finder::{tag_permalink, MomentFinder};
pub use subject::{MomentCommentSubject, SubjectDisplay, SubjectRef, SUBJECT_KIND_NAME};
