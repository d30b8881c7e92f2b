//! Version constraints, tag matching and tag listing.
//!
//! # Example
//!
//! ```
//! use comcol::version::{resolve, ResolverPolicy, VersionConstraint};
//!
//! let constraint = VersionConstraint::parse(">=1.0.1");
//! let tags: Vec<String> = ["0.9", "1.0.1", "1.2.0", "1.2.0-alpine"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let accepted = resolve(&constraint, &tags, ResolverPolicy::default());
//! assert_eq!(accepted, vec!["1.0.1", "1.2.0"]);
//! ```

pub mod constraint;
pub mod resolver;
pub mod tags;

pub use constraint::{
    NumericPart, Operator, VersionCandidate, VersionConstraint, LATEST_TAG, VERSIONLESS,
};
pub use resolver::{accepts, compare_candidates, resolve, select, ResolverPolicy, Selection};
pub use tags::{DockerHubTags, LiteralTags, SourceTags, StaticTags, TagSource, DOCKER_HUB_URL};
