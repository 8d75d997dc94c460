use binary_craft_app::{
    auth::{ApiTokenMetadata, PgAuthService},
    domain::users::records::UserUuid,
};
use clap::{Args, Subcommand};
use jiff::{SignedDuration, Timestamp};
use uuid::Uuid;

use super::database::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokenSubcommand {
    /// Issue a bearer token for a user
    Create {
        #[command(flatten)]
        database: DatabaseArgs,

        /// User that will own the token
        #[arg(long)]
        user_uuid: Uuid,

        /// Expire the token at this RFC 3339 timestamp
        #[arg(long, conflicts_with = "expires_in_days")]
        expires_at: Option<Timestamp>,

        /// Expire the token this many days from now
        #[arg(long)]
        expires_in_days: Option<u16>,
    },

    /// List a user's tokens, including revoked ones
    List {
        #[command(flatten)]
        database: DatabaseArgs,

        #[arg(long)]
        user_uuid: Uuid,
    },

    /// Revoke a token so it can no longer authenticate
    Revoke {
        #[command(flatten)]
        database: DatabaseArgs,

        #[arg(long)]
        token_uuid: Uuid,
    },
}

impl TokenSubcommand {
    fn database(&self) -> &DatabaseArgs {
        match self {
            Self::Create { database, .. }
            | Self::List { database, .. }
            | Self::Revoke { database, .. } => database,
        }
    }
}

pub(crate) async fn run(command: TokenCommand) -> Result<(), String> {
    let service = PgAuthService::new(command.command.database().connect().await?);

    match command.command {
        TokenSubcommand::Create {
            user_uuid,
            expires_at,
            expires_in_days,
            ..
        } => {
            let expires_at = expiry(Timestamp::now(), expires_at, expires_in_days)?;

            let issued = service
                .issue_api_token(UserUuid::from_uuid(user_uuid), expires_at)
                .await
                .map_err(|error| format!("failed to create token: {error}"))?;

            print_token(&issued.metadata);
            println!("api_token: {}", issued.token);
            println!("store this token now; it is only shown once");
        }
        TokenSubcommand::List { user_uuid, .. } => {
            let tokens = service
                .list_api_tokens(UserUuid::from_uuid(user_uuid))
                .await
                .map_err(|error| format!("failed to list tokens: {error}"))?;

            if tokens.is_empty() {
                println!("no tokens found for user {user_uuid}");
            }

            for token in &tokens {
                print_token(token);
                println!();
            }
        }
        TokenSubcommand::Revoke { token_uuid, .. } => {
            let revoked = service
                .revoke_api_token(token_uuid)
                .await
                .map_err(|error| format!("failed to revoke token: {error}"))?;

            if revoked {
                println!("revoked token {token_uuid}");
            } else {
                println!("token {token_uuid} was not active");
            }
        }
    }

    Ok(())
}

/// Resolve the requested expiry, which must lie after `now`.
fn expiry(
    now: Timestamp,
    expires_at: Option<Timestamp>,
    expires_in_days: Option<u16>,
) -> Result<Option<Timestamp>, String> {
    let expires_at = match (expires_at, expires_in_days) {
        (Some(at), _) => Some(at),
        (None, Some(days)) => Some(
            now.checked_add(SignedDuration::from_hours(i64::from(days) * 24))
                .map_err(|error| format!("invalid expires-in-days: {error}"))?,
        ),
        (None, None) => None,
    };

    match expires_at {
        Some(at) if at <= now => Err("token expiry must be in the future".to_string()),
        _ => Ok(expires_at),
    }
}

fn print_token(token: &ApiTokenMetadata) {
    let or = |value: Option<Timestamp>, fallback: &str| {
        value.map_or_else(|| fallback.to_string(), |value| value.to_string())
    };

    println!("token_uuid: {}", token.uuid);
    println!("user_uuid: {}", token.user_uuid);
    println!("token_version: {}", token.version.as_i16());
    println!("created_at: {}", token.created_at);
    println!("last_used_at: {}", or(token.last_used_at, "never"));
    println!("expires_at: {}", or(token.expires_at, "none"));
    println!("revoked_at: {}", or(token.revoked_at, "active"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_in_days_is_relative_to_now() {
        let now = Timestamp::UNIX_EPOCH;

        assert_eq!(
            expiry(now, None, Some(2)),
            Ok(Some(Timestamp::from_second(2 * 86_400).unwrap()))
        );
    }

    #[test]
    fn expiry_defaults_to_never() {
        assert_eq!(expiry(Timestamp::UNIX_EPOCH, None, None), Ok(None));
    }

    #[test]
    fn expiry_in_the_past_is_rejected() {
        let now = Timestamp::from_second(1_000).unwrap();

        assert!(expiry(now, Some(Timestamp::UNIX_EPOCH), None).is_err());
        assert!(expiry(now, None, Some(0)).is_err());
    }
}
