mod app_config;
mod config;
mod product;
mod slug;
mod status;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::{
    AttributeDefinition, CatalogProduct, CatalogVariation, PricePair, StaleDraft,
};
pub use slug::{label_from_slug, slugify};
pub use status::{ProductKind, ProductStatus};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
