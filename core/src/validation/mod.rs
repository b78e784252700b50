//! Independent checks of search results
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod correctness;

pub use self::correctness::{is_equitable, verify_isomorphism};
