//! Data models: canonical fields, label table and configuration.

pub mod config;
pub mod fields;
pub mod labels;

pub use config::{AssemblyConfig, EnhancementConfig, IncaConfig, SearchConfig};
pub use fields::{CanonicalField, FieldCategory, FieldProfile, FieldValues, Party, ValueKind};
pub use labels::{LabelSpec, LabelTable};
