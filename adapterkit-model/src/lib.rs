//! Monitored-entity graph for adapterkit.
//!
//! An adapter describes what it collected as a graph of [`Object`]s, each
//! identified by a structural [`Key`]:
//! - [`Key`] / [`Identifier`]: entity identity; [`Key::identity`] is the one
//!   comparison used for deduplication
//! - [`Object`]: metrics, properties, events and parent/child key sets
//! - [`CollectResult`]: at most one object per identity for one collection
//!   cycle, plus an optional error message
//! - [`TestResult`] / [`EndpointResult`]: results of the other host methods
//!
//! # Example
//!
//! ```
//! use adapterkit_model::{CollectResult, Identifier, Key};
//!
//! let mut result = CollectResult::new();
//! let key = Key::new("MyAdapter", "Host", "esx-01", vec![Identifier::new("uuid", "42")]);
//! result.get_or_create_object(key.clone()).with_metric("cpu|usage", 12.5);
//!
//! let renamed = Key::new("MyAdapter", "Host", "esx-01.lab", vec![Identifier::new("uuid", "42")]);
//! assert!(result.get_object(&renamed).is_some());
//! assert_eq!(result.len(), 1);
//! ```

mod data;
mod error;
mod event;
mod ids;
mod key;
mod object;
mod result;
pub mod wire;

pub use data::{Metric, Property, PropertyValue, now_millis};
pub use error::{ModelError, ModelResult};
pub use event::{Criticality, Event};
pub use ids::ObjectId;
pub use key::{Discriminator, Identifier, Key, KeyIdentity, KeySet};
pub use object::Object;
pub use result::{CollectResult, EndpointResult, RelationshipUpdateMode, TestResult};
