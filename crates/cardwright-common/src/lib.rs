//! Shared types and services for cardwright: the template data model, the
//! catalog client, configuration, errors and the observable [`Store`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod media;
pub mod store;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod types;

pub use crate::catalog::CatalogClient;
pub use crate::config::{Config, FileStore};
pub use crate::error::{CardwrightError, CatalogError, ConfigError, MediaError};
pub use crate::media::MediaClient;
pub use crate::store::{Store, SubscriptionId};
pub use crate::types::{
    CardKind, FeatureId, TemplateCard, TemplateCategory, TemplateCollection, TemplateFeature,
    TemplateGroup,
};
