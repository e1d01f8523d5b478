use anyhow::Result;
use sqlx::{Connection, MySqlConnection};
use tokio::runtime::Runtime;
use url::Url;

pub(crate) fn create_runtime() -> Result<Runtime> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()?;
    Ok(runtime)
}

pub fn create_connection(url: &str, runtime: &Runtime) -> Result<MySqlConnection> {
    let conn = runtime.block_on(MySqlConnection::connect(url))?;
    Ok(conn)
}

/// The url with its password replaced, for log lines.
pub fn redact_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return "<unparseable database url>".to_string();
    };
    if parsed.password().is_some() {
        // errors only for cannot-be-a-base urls, which have no password
        let _ = parsed.set_password(Some("****"));
    }
    parsed.to_string()
}
