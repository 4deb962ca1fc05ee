//! Graph entity types, complex types and enumerations.
include!(concat!(env!("OUT_DIR"), "/models.rs"));
