use clap::{Parser, Subcommand};

mod database;
mod db;
mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "binary-craft-app", about = "Binary Craft CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    User(user::UserCommand),
    Token(token::TokenCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::User(command) => user::run(command).await,
            Commands::Token(command) => token::run(command).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_user_create() {
        let parsed = Cli::try_parse_from([
            "binary-craft-app",
            "user",
            "create",
            "--database-url",
            "postgres://localhost/binary_craft",
            "--email",
            "admin@example.com",
            "--role",
            "admin",
        ]);

        assert!(parsed.is_ok(), "expected user create to parse, got {parsed:?}");
    }

    #[test]
    fn rejects_unknown_role() {
        let parsed = Cli::try_parse_from([
            "binary-craft-app",
            "user",
            "create",
            "--database-url",
            "postgres://localhost/binary_craft",
            "--email",
            "admin@example.com",
            "--role",
            "superuser",
        ]);

        assert!(parsed.is_err());
    }

    #[test]
    fn parses_token_create_with_relative_expiry() {
        let parsed = Cli::try_parse_from([
            "binary-craft-app",
            "token",
            "create",
            "--database-url",
            "postgres://localhost/binary_craft",
            "--user-uuid",
            "00000000-0000-0000-0000-000000000001",
            "--expires-in-days",
            "30",
        ]);

        assert!(parsed.is_ok(), "expected token create to parse, got {parsed:?}");
    }

    #[test]
    fn rejects_both_expiry_flags() {
        let parsed = Cli::try_parse_from([
            "binary-craft-app",
            "token",
            "create",
            "--database-url",
            "postgres://localhost/binary_craft",
            "--user-uuid",
            "00000000-0000-0000-0000-000000000001",
            "--expires-at",
            "2030-01-01T00:00:00Z",
            "--expires-in-days",
            "30",
        ]);

        assert!(parsed.is_err());
    }
}
