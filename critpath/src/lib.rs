//! Reconstructs the chain of script loads that led up to an ad request from a set of captured
//! network records, and scores how long that chain is.
//!
//! The usual entry point is [`audit::audit`], which locates the ad request, builds its critical
//! path tree and packages the result into a [`audit::CriticalPathReport`].

pub mod audit;
pub mod error;
#[cfg(feature = "serde")]
pub mod from_json;
pub mod index;
pub mod locator;
pub mod records;
pub mod tree;
pub mod types;
