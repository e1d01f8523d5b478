//! Reads a MySQL catalog and renders one Go model struct per table.
pub use self::config::Config;
pub use self::emit::{Emitter, GeneratedField, GeneratedType, GoFile};
pub use self::error::{Error, Result};
pub use self::generate::{generate, Summary};
pub use self::schema::{read_schema, Catalog, ColumnDescriptor, TableColumns};
pub use self::sink::{FileSink, Sink, WriterSink};
pub use self::typemap::{TargetType, TemporalMode, TypeMap};

mod error;
pub mod config;
pub mod emit;
pub mod generate;
pub mod naming;
pub mod schema;
pub mod sink;
pub mod tag;
pub mod typemap;
