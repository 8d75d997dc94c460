//! Database Config

use clap::Args;

use binary_craft_app::database::DEFAULT_MAX_CONNECTIONS;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Most connections the server keeps open at once
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub database_max_connections: u32,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        database: DatabaseConfig,
    }

    #[test]
    fn test_pool_size_defaults() -> TestResult {
        let cli = Cli::try_parse_from([
            "binary-craft-json",
            "--database-url",
            "postgres://localhost/binary_craft",
        ])?;

        assert_eq!(cli.database.database_max_connections, DEFAULT_MAX_CONNECTIONS);

        Ok(())
    }
}
