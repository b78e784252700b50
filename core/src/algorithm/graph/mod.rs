//! Graph canonicalization and isomorphism search
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod refinement;
pub mod canonical;
pub mod isomorphism;

pub use self::refinement::PartitionRefiner;
pub use self::canonical::{canonical_forms_par, isomorphism_classes, CanonicalForm, CanonicalLabeler};
pub use self::isomorphism::{is_isomorphic, IsomorphismMatcher, Mapping};
