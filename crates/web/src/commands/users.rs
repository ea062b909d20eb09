//! Users command - account administration from the shell.

use accounts::service::UserService;
use common::AppResult;

use crate::cli::args::{UsersAction, UsersArgs};
use crate::config::WebConfig;

/// Execute the users command
pub async fn execute(args: UsersArgs, config: WebConfig) -> AppResult<()> {
    let services = accounts::connect(&config.database, config.jwt.clone()).await?;
    let users = services.users;

    match args.action {
        UsersAction::CreateSuperuser {
            username,
            email,
            password,
        } => {
            let user = users.create_superuser(username, email, password).await?;
            println!("Superuser {} created ({})", user.username, user.id);
        }
        UsersAction::Grant {
            username,
            permission,
        } => {
            users.grant_permission(&username, &permission).await?;
            println!("Granted {} to {}", permission, username);
        }
        UsersAction::SetStaff { username, revoke } => {
            let user = users.set_staff(&username, !revoke).await?;
            println!("{} staff: {}", user.username, user.is_staff);
        }
    }

    Ok(())
}
