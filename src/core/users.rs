use crate::core::seedgen::{hash_password, verify_password};
use crate::core::audit::AuditLogic;
use crate::db::executor::QueryExecutor;
use crate::errors::{AppError, AppResult};
use crate::models::audit::NewAuditEntry;
use crate::models::user::{Role, User};
use rusqlite::params;

const SELECT_USER: &str = "SELECT id, full_name, email, password, role FROM users";

pub struct UserLogic;

impl UserLogic {
    /// Self-service sign-up. The account always gets role `user`; a second
    /// account with the same email is a `Duplicate`, reported by the
    /// `UNIQUE` constraint.
    pub fn register(exec: &QueryExecutor, full_name: &str, email: &str, password: &str) -> AppResult<User> {
        Self::insert(exec, full_name, email, password, Role::User, None)
    }

    /// Create a manager account on behalf of an existing manager.
    pub fn create_manager(
        exec: &QueryExecutor,
        granter: &User,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<User> {
        if !granter.role.is_manager() {
            return Err(AppError::PermissionDenied(
                "only a manager can create manager accounts".into(),
            ));
        }
        Self::insert(exec, full_name, email, password, Role::Manager, Some(granter))
    }

    fn insert(
        exec: &QueryExecutor,
        full_name: &str,
        email: &str,
        password: &str,
        role: Role,
        granter: Option<&User>,
    ) -> AppResult<User> {
        let full_name = full_name.trim();
        let email = email.trim().to_lowercase();
        if full_name.is_empty() {
            return Err(AppError::InvalidInput("full name is empty".into()));
        }
        if !email.contains('@') {
            return Err(AppError::InvalidInput(format!("not an email address: {email}")));
        }
        if password.is_empty() {
            return Err(AppError::InvalidInput("password is empty".into()));
        }
        let actor = granter.map_or(email.as_str(), |g| g.email.as_str());

        let id = exec
            .transaction(|tx| {
                tx.execute(
                    "INSERT INTO users (full_name, email, password, role) VALUES (?1, ?2, ?3, ?4)",
                    params![full_name, email, hash_password(password), role.to_db_str()],
                )?;
                let id = tx.last_insert_rowid();
                AuditLogic::append(
                    tx,
                    &NewAuditEntry::new(actor, "register", "user")
                        .target(id)
                        .details(role.to_db_str()),
                )?;
                Ok(id)
            })
            .map_err(|e| match e {
                AppError::Duplicate(_) => AppError::Duplicate(format!("email {email}")),
                other => other,
            })?;

        Self::get(exec, id)?.ok_or_else(|| AppError::NotFound(format!("user {id}")))
    }

    /// Check an email/password pair. Unknown email and wrong password give
    /// the same error.
    pub fn authenticate(exec: &QueryExecutor, email: &str, password: &str) -> AppResult<User> {
        match Self::find_by_email(exec, email)? {
            Some(user) if verify_password(password, &user.password_hash) => Ok(user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    pub fn find_by_email(exec: &QueryExecutor, email: &str) -> AppResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE email = ?1");
        exec.query_opt(&sql, [email.trim().to_lowercase()], User::from_row)
    }

    pub fn get(exec: &QueryExecutor, id: i64) -> AppResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE id = ?1");
        exec.query_opt(&sql, [id], User::from_row)
    }
}
