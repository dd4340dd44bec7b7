//! Counters and users.
//!
//! These records belong to other subsystems of the host; the service only
//! reads them, but the upserts are used to seed data and by tests.

use moments_types::{Counter, User};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::StoreError;

/// Inserts or replaces a counter.
pub fn upsert_counter(conn: &Connection, counter: &Counter) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO counters (name, visit, upvote, total_comment, approved_comment)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(name) DO UPDATE SET
            visit = excluded.visit,
            upvote = excluded.upvote,
            total_comment = excluded.total_comment,
            approved_comment = excluded.approved_comment",
        params![
            counter.name,
            counter.visit,
            counter.upvote,
            counter.total_comment,
            counter.approved_comment,
        ],
    )?;
    Ok(())
}

/// Retrieves a counter by its full counter name.
pub fn find_counter(conn: &Connection, name: &str) -> Result<Option<Counter>, StoreError> {
    let counter = conn
        .query_row(
            "SELECT name, visit, upvote, total_comment, approved_comment
             FROM counters WHERE name = ?1",
            [name],
            map_row_to_counter,
        )
        .optional()?;
    Ok(counter)
}

/// Inserts or replaces a user.
pub fn upsert_user(conn: &Connection, user: &User) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO users (name, display_name, avatar, bio, email)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(name) DO UPDATE SET
            display_name = excluded.display_name,
            avatar = excluded.avatar,
            bio = excluded.bio,
            email = excluded.email",
        params![user.name, user.display_name, user.avatar, user.bio, user.email],
    )?;
    Ok(())
}

pub fn find_user(conn: &Connection, name: &str) -> Result<Option<User>, StoreError> {
    let user = conn
        .query_row(
            "SELECT name, display_name, avatar, bio, email FROM users WHERE name = ?1",
            [name],
            map_row_to_user,
        )
        .optional()?;
    Ok(user)
}

fn map_row_to_counter(row: &Row) -> rusqlite::Result<Counter> {
    Ok(Counter {
        name: row.get(0)?,
        visit: row.get(1)?,
        upvote: row.get(2)?,
        total_comment: row.get(3)?,
        approved_comment: row.get(4)?,
    })
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        name: row.get(0)?,
        display_name: row.get(1)?,
        avatar: row.get(2)?,
        bio: row.get(3)?,
        email: row.get(4)?,
    })
}
