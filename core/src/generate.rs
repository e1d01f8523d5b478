use std::collections::HashSet;

use crate::config::Config;
use crate::emit::Emitter;
use crate::schema::{read_schema, Catalog};
use crate::sink::Sink;
use crate::Result;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Type names handed to the sink, in catalog order.
    pub generated: Vec<String>,
    /// Tables whose name transformed to an empty identifier.
    pub skipped: Vec<String>,
    /// Tables whose type name was already generated in this run; their file replaced the earlier one.
    pub duplicates: Vec<String>,
}

/// Reads the catalog once and emits one Go file per table, strictly in catalog order.
///
/// Stops at the first error. Files already handed to the sink are left in place.
pub async fn generate<C, S>(catalog: &mut C, config: &Config, sink: &mut S) -> Result<Summary>
where
    C: Catalog + ?Sized,
    S: Sink + ?Sized,
{
    config.validate()?;
    if config.struct_name_to_camel_case || config.separate_file {
        tracing::debug!("struct_name_to_camel_case and separate_file have no effect");
    }
    let schema = read_schema(catalog, config.table.as_deref(), &config.prefix).await?;
    if schema.is_empty() {
        tracing::warn!(table = config.table.as_deref(), "No tables found");
    }

    let emitter = Emitter::new(config);
    let mut summary = Summary::default();
    let mut seen = HashSet::new();
    for (table, columns) in &schema {
        tracing::debug!(table = %table, columns = columns.len(), "Generating");
        let Some(ty) = emitter.build(table, columns) else {
            summary.skipped.push(table.clone());
            continue;
        };
        if !seen.insert(ty.name.clone()) {
            tracing::warn!(table = %table, name = %ty.name, "Several tables map to the same type name, the later file wins");
            summary.duplicates.push(table.clone());
        }
        let file = emitter.render(&ty);
        sink.write(&file)?;
        summary.generated.push(ty.name);
    }
    Ok(summary)
}
