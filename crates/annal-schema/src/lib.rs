//! History schema derivation for annal.
//!
//! Given the entity schemas of a project, derives one `<Name>History` shadow
//! schema per tracked entity together with the render context the code
//! generator needs to emit it. Pure data transformation; file emission is the
//! caller's job.
//!
//! # Quick start
//!
//! ```no_run
//! use annal_core::{config::GeneratorConfig, schema::SchemaDefinition};
//!
//! # async fn run(schemas: Vec<SchemaDefinition>) -> annal_core::Result<()> {
//! let config = GeneratorConfig::default().with_history_time_index();
//! let generation = annal_schema::generate(schemas, config).await?;
//! for ctx in &generation.contexts {
//!   println!("{} -> {}", ctx.schema.name, ctx.table_name);
//! }
//! # Ok(())
//! # }
//! ```

mod clone;
mod context;
mod derive;
mod generate;
mod policy;

pub use clone::{HISTORY_FIELD_OFFSET, clone_fields};
pub use context::{IdType, RenderContext};
pub use derive::{
  DerivedSchema, HISTORY_TABLE_SUFFIX, derive, package_name, should_generate,
  table_name,
};
pub use generate::{Generation, generate};
pub use policy::{infer_policy, is_org_owned, is_user_owned};
