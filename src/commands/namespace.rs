use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::namespace::Namespace;

/// Print the namespace this run would use, optionally creating it.
pub fn execute(config: &Config, create: bool) -> Result<()> {
    let namespace = Namespace::allocate(&config.namespace);
    if create {
        namespace.ensure()?;
        tracing::info!(path = %namespace.unique_path().display(), "Namespace created");
    }
    println!("{}", namespace.unique_path().display().to_string().bold());
    Ok(())
}
