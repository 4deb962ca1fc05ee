//! Microsoft Graph (beta) models and the OData JSON serialization they rely on.
//!
//! The models are generated at build time from `resources/graph-beta.yaml` by the
//! `graph-codegen` crate. Every property is optional, unknown members are preserved in each
//! value's additional data and polymorphic types are read through `Any<Base>` enums that
//! dispatch on `@odata.type`.
//!
//! ```
//! use msgraph_beta_models::models::Customer;
//! use msgraph_beta_models::serialization::{deserialize_from_json, serialize_to_json};
//!
//! let mut customer = Customer::new();
//! customer.set_display_name(Some("Acme".to_string()));
//! customer.set_tax_liable(Some(true));
//!
//! let content = serialize_to_json(&customer).unwrap();
//! let parsed: Customer = deserialize_from_json(&content).unwrap();
//! assert_eq!(parsed.display_name(), Some("Acme"));
//! assert_eq!(parsed.email(), None);
//! ```
pub mod error;
pub mod models;
pub mod serialization;

pub use error::SerializationError;
