use async_trait::async_trait;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::Result;

/// One row of `information_schema.COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// `DATA_TYPE`, e.g. `varchar`. No length or precision.
    pub data_type: String,
    pub nullable: bool,
    pub table_name: String,
    pub comment: String,
}

/// Raw table name → its columns in declaration order. Tables are in name order.
pub type TableColumns = IndexMap<String, Vec<ColumnDescriptor>>;

/// Anything that can list the columns of the currently selected database.
///
/// Implementations must return rows ordered by table name, then ordinal position,
/// and must surface driver errors as-is.
#[async_trait]
pub trait Catalog: Send {
    /// `table` is the full (already prefixed) table name to restrict to.
    async fn fetch_columns(&mut self, table: Option<&str>) -> Result<Vec<ColumnDescriptor>>;
}

const COLUMNS_QUERY: &str = r#"
SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
       CAST(DATA_TYPE AS CHAR) AS data_type,
       CAST(IS_NULLABLE AS CHAR) AS is_nullable,
       CAST(TABLE_NAME AS CHAR) AS table_name,
       CAST(COLUMN_COMMENT AS CHAR) AS column_comment
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE()"#;

const TABLE_FILTER: &str = "\n  AND TABLE_NAME = ?";
const ORDERING: &str = "\nORDER BY TABLE_NAME ASC, ORDINAL_POSITION ASC";

/// The catalog query. When `filtered`, it expects the table name as its single bind parameter.
pub fn columns_query(filtered: bool) -> String {
    let mut sql = String::from(COLUMNS_QUERY);
    if filtered {
        sql.push_str(TABLE_FILTER);
    }
    sql.push_str(ORDERING);
    sql
}

/// Reads the whole schema (or one table of it) and groups it by table.
///
/// The prefix is applied to the requested table before filtering; the returned names are
/// the real table names. A table that does not exist yields an empty map.
pub async fn read_schema<C: Catalog + ?Sized>(catalog: &mut C, table: Option<&str>, prefix: &str) -> Result<TableColumns> {
    let filter = table.filter(|t| !t.is_empty()).map(|t| format!("{prefix}{t}"));
    tracing::debug!(table = filter.as_deref(), "Reading catalog");
    let columns = catalog.fetch_columns(filter.as_deref()).await?;
    let tables = group_by_table(columns);
    tracing::debug!(tables = tables.len(), "Read catalog");
    Ok(tables)
}

pub fn group_by_table(columns: Vec<ColumnDescriptor>) -> TableColumns {
    let mut tables = TableColumns::new();
    for (table, chunk) in &columns.into_iter().chunk_by(|c| c.table_name.clone()) {
        tables.entry(table).or_default().extend(chunk);
    }
    tables
}

#[cfg(feature = "mysql")]
mod mysql {
    use super::*;
    use sqlx::{FromRow, MySql, MySqlConnection, MySqlPool};

    #[derive(Debug, FromRow)]
    struct ColumnRow {
        column_name: String,
        data_type: String,
        is_nullable: String,
        table_name: String,
        column_comment: Option<String>,
    }

    impl From<ColumnRow> for ColumnDescriptor {
        fn from(row: ColumnRow) -> Self {
            Self {
                name: row.column_name,
                data_type: row.data_type,
                nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
                table_name: row.table_name,
                comment: row.column_comment.unwrap_or_default(),
            }
        }
    }

    async fn fetch<'e, E>(executor: E, table: Option<&str>) -> Result<Vec<ColumnDescriptor>>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let sql = columns_query(table.is_some());
        let mut query = sqlx::query_as::<_, ColumnRow>(&sql);
        if let Some(table) = table {
            query = query.bind(table);
        }
        let rows = query.fetch_all(executor).await?;
        Ok(rows.into_iter().map(ColumnDescriptor::from).collect())
    }

    #[async_trait]
    impl Catalog for MySqlConnection {
        async fn fetch_columns(&mut self, table: Option<&str>) -> Result<Vec<ColumnDescriptor>> {
            fetch(&mut *self, table).await
        }
    }

    #[async_trait]
    impl Catalog for MySqlPool {
        async fn fetch_columns(&mut self, table: Option<&str>) -> Result<Vec<ColumnDescriptor>> {
            fetch(&*self, table).await
        }
    }
}
