pub mod catalog_parser;
pub mod catalog_serializer;
pub mod csv;

pub use catalog_parser::{
    Anomaly, attach_substeps, parse_catalog, parse_steps, parse_substeps, split_integrations,
};
pub use catalog_serializer::{serialize_steps, serialize_substeps};
