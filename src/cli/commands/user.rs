use crate::AppContext;
use crate::cli::parser::{Credentials, UserCmd};
use crate::core::users::UserLogic;
use crate::errors::AppResult;
use crate::models::user::User;
use crate::ui::messages;

/// Resolve `--user/--password` into an account.
pub(crate) fn login(ctx: &AppContext, creds: &Credentials) -> AppResult<User> {
    UserLogic::authenticate(&ctx.exec, &creds.email, &creds.password)
}

pub fn handle(cmd: &UserCmd, ctx: &AppContext) -> AppResult<()> {
    match cmd {
        UserCmd::Register {
            name,
            email,
            password,
        } => {
            let user = UserLogic::register(&ctx.exec, name, email, password)?;
            print_registered(ctx, &user)?;
        }
        UserCmd::AddManager {
            name,
            email,
            new_password,
            creds,
        } => {
            let granter = login(ctx, creds)?;
            let user = UserLogic::create_manager(&ctx.exec, &granter, name, email, new_password)?;
            print_registered(ctx, &user)?;
        }
        UserCmd::Login { creds } => {
            let user = login(ctx, creds)?;
            if ctx.json {
                return messages::json(&user);
            }
            messages::success(format!(
                "Welcome, {} ({})",
                user.full_name,
                user.role.to_db_str()
            ));
        }
    }
    Ok(())
}

fn print_registered(ctx: &AppContext, user: &User) -> AppResult<()> {
    if ctx.json {
        return messages::json(user);
    }
    messages::success(format!(
        "Registered {} <{}> as {} (id {})",
        user.full_name,
        user.email,
        user.role.to_db_str(),
        user.id
    ));
    Ok(())
}
