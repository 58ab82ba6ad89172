//! # INJECTA CORE LIBRARY
//!
//! **DEPENDENCY-INJECTION RESOLUTION ENGINE**
//!
//! **ARCHITECTURE**: Registrations carry a build chain and intrinsic
//! policies; a resolve call runs that chain against a per-call context that
//! recurses into dependencies depth-first
//! **GUARANTEE**: A resolve call returns a fully built object graph or the
//! innermost failure together with the path that led to it

pub mod api;
pub mod build;
pub mod config;
pub mod dependencies;
pub mod errors;
pub mod lifetime;
pub mod policy;
pub mod resolution;
pub mod types;
