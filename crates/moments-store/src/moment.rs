//! Moment persistence and listing.

use std::collections::{BTreeMap, BTreeSet};

use moments_query::{ListOptions, PageRequest, Sort};
use moments_types::{
    format_timestamp, parse_timestamp, ListResult, Metadata, Moment, MomentSpec, MomentVisibility,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::error::StoreError;
use crate::sql::{lower, order_by};

const SELECT_MOMENT: &str = "SELECT
        m.name, m.owner, m.approved, m.approved_time, m.visible, m.release_time,
        m.creation_timestamp, m.deletion_timestamp, m.content_json,
        (SELECT json_group_array(tag) FROM moment_tags WHERE moment_name = m.name),
        (SELECT json_group_object(key, value) FROM moment_labels WHERE moment_name = m.name)
    FROM moments m";

/// Rewrites a timestamp in the fixed-width form range filters compare
/// against.
fn canonical(field: &'static str, value: &str) -> Result<String, StoreError> {
    parse_timestamp(value)
        .map(|dt| format_timestamp(&dt))
        .map_err(|_| StoreError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

fn canonical_opt(field: &'static str, value: Option<&str>) -> Result<Option<String>, StoreError> {
    value.map(|v| canonical(field, v)).transpose()
}

/// Inserts or replaces a moment together with its tags and labels.
///
/// Timestamps are stored in canonical form; an unparseable one is rejected
/// before anything is written. The creation timestamp of an existing record
/// is kept.
pub fn upsert_moment(conn: &Connection, moment: &Moment) -> Result<(), StoreError> {
    let content_json = serde_json::to_string(&moment.spec.content)?;
    let name = moment.name();
    let release_time = canonical("spec.releaseTime", &moment.spec.release_time)?;
    let approved_time = canonical_opt("spec.approvedTime", moment.spec.approved_time.as_deref())?;
    let creation_timestamp = canonical_opt(
        "metadata.creationTimestamp",
        moment.metadata.creation_timestamp.as_deref(),
    )?;
    let deletion_timestamp = canonical_opt(
        "metadata.deletionTimestamp",
        moment.metadata.deletion_timestamp.as_deref(),
    )?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO moments (
            name, owner, approved, approved_time, visible, release_time,
            creation_timestamp, deletion_timestamp, content_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(name) DO UPDATE SET
            owner = excluded.owner,
            approved = excluded.approved,
            approved_time = excluded.approved_time,
            visible = excluded.visible,
            release_time = excluded.release_time,
            creation_timestamp = COALESCE(moments.creation_timestamp, excluded.creation_timestamp),
            deletion_timestamp = excluded.deletion_timestamp,
            content_json = excluded.content_json",
        params![
            name,
            moment.spec.owner,
            moment.spec.approved,
            approved_time,
            moment.spec.visible.as_str(),
            release_time,
            creation_timestamp,
            deletion_timestamp,
            content_json,
        ],
    )?;

    tx.execute("DELETE FROM moment_tags WHERE moment_name = ?1", [name])?;
    for tag in &moment.spec.tags {
        tx.execute(
            "INSERT INTO moment_tags (moment_name, tag) VALUES (?1, ?2)",
            [name, tag.as_str()],
        )?;
    }

    tx.execute("DELETE FROM moment_labels WHERE moment_name = ?1", [name])?;
    for (key, value) in &moment.metadata.labels {
        tx.execute(
            "INSERT INTO moment_labels (moment_name, key, value) VALUES (?1, ?2, ?3)",
            [name, key.as_str(), value.as_str()],
        )?;
    }

    tx.commit()?;
    tracing::debug!(moment = name, "moment stored");
    Ok(())
}

/// Retrieves a moment by name, whatever its visibility or lifecycle state.
pub fn find_moment(conn: &Connection, name: &str) -> Result<Option<Moment>, StoreError> {
    let moment = conn
        .query_row(
            &format!("{SELECT_MOMENT} WHERE m.name = ?1"),
            [name],
            map_row_to_moment,
        )
        .optional()?;
    Ok(moment)
}

/// Like [`find_moment`] but treats absence as an error.
pub fn get_moment(conn: &Connection, name: &str) -> Result<Moment, StoreError> {
    find_moment(conn, name)?.ok_or_else(|| StoreError::NotFound(name.to_string()))
}

/// Sets the soft-deletion marker.
pub fn mark_deleted(conn: &Connection, name: &str, deleted_at: &str) -> Result<(), StoreError> {
    let deleted_at = canonical("metadata.deletionTimestamp", deleted_at)?;
    let count = conn.execute(
        "UPDATE moments SET deletion_timestamp = ?2 WHERE name = ?1",
        [name, deleted_at.as_str()],
    )?;
    if count == 0 {
        return Err(StoreError::NotFound(name.to_string()));
    }
    Ok(())
}

/// Removes a moment and, by cascade, its tags and labels.
pub fn delete_moment(conn: &Connection, name: &str) -> Result<(), StoreError> {
    let count = conn.execute("DELETE FROM moments WHERE name = ?1", [name])?;
    if count == 0 {
        return Err(StoreError::NotFound(name.to_string()));
    }
    Ok(())
}

/// Lists every moment matching `options`, ordered by `sort`.
pub fn list_moments(
    conn: &Connection,
    options: &ListOptions,
    sort: &Sort,
) -> Result<Vec<Moment>, StoreError> {
    let filter = lower(&options.query);
    let sql = format!(
        "{SELECT_MOMENT} WHERE {} ORDER BY {}",
        filter.sql,
        order_by(sort)
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(filter.params.iter()), map_row_to_moment)?;
    let mut moments = Vec::new();
    for row in rows {
        moments.push(row?);
    }
    Ok(moments)
}

/// Counts the moments matching `options`.
pub fn count_moments(conn: &Connection, options: &ListOptions) -> Result<u64, StoreError> {
    let filter = lower(&options.query);
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM moments m WHERE {}", filter.sql),
        params_from_iter(filter.params.iter()),
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Returns one page of the moments matching `options`.
///
/// A page past the end is empty but still reports the full `total`.
pub fn page_moments(
    conn: &Connection,
    options: &ListOptions,
    page: &PageRequest,
) -> Result<ListResult<Moment>, StoreError> {
    let total = count_moments(conn, options)?;
    if page.offset() >= total {
        return Ok(ListResult::new(page.page(), page.size(), total, Vec::new()));
    }

    let mut filter = lower(&options.query);
    let sql = format!(
        "{SELECT_MOMENT} WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
        filter.sql,
        order_by(page.sort())
    );
    filter.params.push(i64::from(page.size()).into());
    filter
        .params
        .push(i64::try_from(page.offset()).unwrap_or(i64::MAX).into());

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(filter.params.iter()), map_row_to_moment)?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(ListResult::new(page.page(), page.size(), total, items))
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_row_to_moment(row: &Row) -> rusqlite::Result<Moment> {
    let visible_str: String = row.get(4)?;
    let visible: MomentVisibility = visible_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let tags: BTreeSet<String> = json_column(row, 9)?;
    let labels: BTreeMap<String, String> = json_column(row, 10)?;

    Ok(Moment {
        metadata: Metadata {
            name: row.get(0)?,
            labels,
            creation_timestamp: row.get(6)?,
            deletion_timestamp: row.get(7)?,
        },
        spec: MomentSpec {
            content: json_column(row, 8)?,
            release_time: row.get(5)?,
            visible,
            owner: row.get(1)?,
            tags,
            approved: row.get(2)?,
            approved_time: row.get(3)?,
        },
    })
}
