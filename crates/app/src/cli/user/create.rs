use binary_craft_app::domain::users::{
    PgUsersService, UsersService,
    data::NewUser,
    records::{Role, UserUuid},
};
use clap::Args;

use crate::cli::database::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Login email address
    #[arg(long)]
    email: String,

    /// Access role: `customer` or `admin`
    #[arg(long, default_value = "customer", value_parser = parse_role)]
    role: Role,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let user = PgUsersService::new(args.database.connect().await?)
        .create_user(NewUser {
            uuid: UserUuid::new(),
            email: args.email,
            role: args.role,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);
    println!("role: {}", user.role);

    Ok(())
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.trim()
        .to_ascii_lowercase()
        .parse::<Role>()
        .map_err(|error| error.to_string())
}
