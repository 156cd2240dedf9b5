//! User operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, email, company_name, tripletex_token, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let created_at_str: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        company_name: row.get(2)?,
        tripletex_token: row.get(3)?,
        created_at: parse_datetime(&created_at_str),
    })
}

/// Emails are compared case-insensitively
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Database {
    /// Register a new user
    ///
    /// Returns [`Error::DuplicateEmail`] if the email is already taken.
    pub fn create_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn()?;
        let email = normalize_email(&user.email);

        let inserted = conn.execute(
            "INSERT INTO users (email, password_hash, company_name) VALUES (?, ?, ?)",
            params![email, user.password_hash, user.company_name],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::DuplicateEmail(email));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                params![normalize_email(email)],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Look up a user together with their stored password hash (for login)
    pub fn get_user_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                &format!(
                    "SELECT {}, password_hash FROM users WHERE email = ?",
                    USER_COLUMNS
                ),
                params![normalize_email(email)],
                |row| Ok((row_to_user(row)?, row.get::<_, String>(5)?)),
            )
            .optional()?;
        Ok(found)
    }

    /// Store (or replace) the user's Tripletex session token
    pub fn set_tripletex_token(&self, user_id: i64, token: &str) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET tripletex_token = ? WHERE id = ?",
            params![token, user_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    /// The user's Tripletex session token, if one is linked
    pub fn get_tripletex_token(&self, user_id: i64) -> Result<Option<String>> {
        let conn = self.conn()?;
        let token: Option<Option<String>> = conn
            .query_row(
                "SELECT tripletex_token FROM users WHERE id = ?",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(token.flatten().filter(|t| !t.is_empty()))
    }

    /// List all users ordered by registration
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at, id",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }
}
