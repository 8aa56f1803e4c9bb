//! Task-tracker schema definition, creation and verification.
//!
//! Tables:
//! - `users`: accounts, unique `username`
//! - `categories`: task categories
//! - `tasks`: work items, optionally owned by a user and filed under a category
//!
//! Every statement is guarded with `IF NOT EXISTS`, so applying the schema to
//! an initialized database leaves existing rows and definitions untouched.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::error::SchemaError;

/// Status of a task that has not been completed. Column default.
pub const TASK_STATUS_PENDING: i64 = 0;

/// Status of a completed task.
pub const TASK_STATUS_DONE: i64 = 1;

pub const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL
)"#;

pub const CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
)"#;

pub const TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    status INTEGER DEFAULT 0,
    user_id INTEGER,
    category_id INTEGER,
    FOREIGN KEY(user_id) REFERENCES users(id),
    FOREIGN KEY(category_id) REFERENCES categories(id)
)"#;

/// Expected definition of a single column.
#[derive(Debug, Clone, Copy)]
struct ColumnDef {
    name: &'static str,
    decl_type: &'static str,
    not_null: bool,
    default: Option<&'static str>,
    primary_key: bool,
    /// Backed by a full, single-column unique index.
    unique: bool,
}

/// Expected `FOREIGN KEY(from) REFERENCES table(to)` clause.
#[derive(Debug, Clone, Copy)]
struct ForeignKeyDef {
    from: &'static str,
    table: &'static str,
    to: &'static str,
}

/// A table owned by this schema.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub ddl: &'static str,
    /// `id` is declared `AUTOINCREMENT`, so ids are never reused.
    autoincrement: bool,
    columns: &'static [ColumnDef],
    foreign_keys: &'static [ForeignKeyDef],
}

const fn column(
    name: &'static str,
    decl_type: &'static str,
    not_null: bool,
    default: Option<&'static str>,
    primary_key: bool,
) -> ColumnDef {
    ColumnDef {
        name,
        decl_type,
        not_null,
        default,
        primary_key,
        unique: false,
    }
}

const fn unique(column: ColumnDef) -> ColumnDef {
    ColumnDef {
        unique: true,
        ..column
    }
}

const ID: ColumnDef = column("id", "INTEGER", false, None, true);

/// Tables in creation order. `tasks` references the other two, so it is last.
pub const TABLES: [TableDef; 3] = [
    TableDef {
        name: "users",
        ddl: USERS_TABLE,
        autoincrement: true,
        columns: &[
            ID,
            unique(column("username", "TEXT", true, None, false)),
            column("password_hash", "TEXT", true, None, false),
        ],
        foreign_keys: &[],
    },
    TableDef {
        name: "categories",
        ddl: CATEGORIES_TABLE,
        autoincrement: true,
        columns: &[ID, column("name", "TEXT", true, None, false)],
        foreign_keys: &[],
    },
    TableDef {
        name: "tasks",
        ddl: TASKS_TABLE,
        autoincrement: true,
        columns: &[
            ID,
            column("title", "TEXT", true, None, false),
            column("status", "INTEGER", false, Some("0"), false),
            column("user_id", "INTEGER", false, None, false),
            column("category_id", "INTEGER", false, None, false),
        ],
        foreign_keys: &[
            ForeignKeyDef {
                from: "user_id",
                table: "users",
                to: "id",
            },
            ForeignKeyDef {
                from: "category_id",
                table: "categories",
                to: "id",
            },
        ],
    },
];

/// Whether the task-tracker tables are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// At least one of the three tables is missing.
    Uninitialized,
    /// All three tables exist.
    Initialized,
}

/// A column as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

/// Apply connection-level pragmas.
///
/// `foreign_keys` is per connection and cannot change inside a transaction,
/// so this must run right after opening.
pub fn apply_pragmas(conn: &Connection, enforce_foreign_keys: bool) -> rusqlite::Result<()> {
    let mode = if enforce_foreign_keys { "ON" } else { "OFF" };
    conn.pragma_update(None, "foreign_keys", mode)
}

/// Create any missing tables and verify the shape of existing ones.
///
/// All three statements and the verification run in one transaction: a
/// conflict on any table rolls the whole attempt back.
pub fn initialize_schema(conn: &mut Connection) -> Result<(), SchemaError> {
    let tx = conn.transaction()?;

    for table in &TABLES {
        ensure_name_is_free(&tx, table.name)?;
        tx.execute_batch(table.ddl)?;
        verify_table(&tx, table)?;
        debug!(table = table.name, "Table ready");
    }

    tx.commit()?;
    Ok(())
}

/// Check that all three tables exist with a compatible shape.
pub fn verify_schema(conn: &Connection) -> Result<(), SchemaError> {
    for table in &TABLES {
        match object_type(conn, table.name)? {
            Some(kind) if kind == "table" => verify_table(conn, table)?,
            Some(kind) => {
                return Err(SchemaError::conflict(
                    table.name,
                    format!("name is taken by an existing {kind}"),
                ))
            }
            None => return Err(SchemaError::conflict(table.name, "table does not exist")),
        }
    }
    Ok(())
}

/// Report whether all three tables exist.
pub fn schema_state(conn: &Connection) -> Result<SchemaState, SchemaError> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master
         WHERE type = 'table'
           AND name COLLATE NOCASE IN ('users', 'categories', 'tasks')",
        [],
        |row| row.get(0),
    )?;

    if existing as usize == TABLES.len() {
        Ok(SchemaState::Initialized)
    } else {
        Ok(SchemaState::Uninitialized)
    }
}

/// List user tables in the database, sorted by name.
pub fn table_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name ASC",
    )?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Columns of `table` in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk
         FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let rows = stmt
        .query_map(params![table], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                decl_type: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
                default: row.get(3)?,
                primary_key: row.get::<_, i64>(4)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Type of the schema object called `name`, if any.
///
/// Tables, views and indexes share one namespace.
fn object_type(conn: &Connection, name: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT type FROM sqlite_master
         WHERE name = ?1 COLLATE NOCASE AND type IN ('table', 'view', 'index')",
        params![name],
        |row| row.get(0),
    )
    .optional()
}

/// `CREATE TABLE IF NOT EXISTS` is silently skipped when a view owns the
/// name, so that case must be caught before the statement runs.
fn ensure_name_is_free(conn: &Connection, table: &str) -> Result<(), SchemaError> {
    match object_type(conn, table)? {
        Some(kind) if kind != "table" => Err(SchemaError::conflict(
            table,
            format!("name is taken by an existing {kind}"),
        )),
        _ => Ok(()),
    }
}

/// Compare an existing table against its expected definition.
///
/// Extra columns are tolerated as long as a row written against the expected
/// shape can still be inserted, i.e. they are nullable or carry a default.
fn verify_table(conn: &Connection, table: &TableDef) -> Result<(), SchemaError> {
    let actual = table_columns(conn, table.name)?;

    for expected in table.columns {
        let Some(found) = actual
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(expected.name))
        else {
            return Err(SchemaError::conflict(
                table.name,
                format!("missing column '{}'", expected.name),
            ));
        };
        check_column(table.name, expected, found)?;
        if expected.unique && !has_unique_index(conn, table.name, expected.name)? {
            return Err(SchemaError::conflict(
                table.name,
                format!("column '{}' is not unique", expected.name),
            ));
        }
    }

    for extra in actual.iter().filter(|c| {
        !table
            .columns
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(&c.name))
    }) {
        if extra.not_null && extra.default.is_none() {
            return Err(SchemaError::conflict(
                table.name,
                format!("unexpected required column '{}'", extra.name),
            ));
        }
    }

    if table.autoincrement && !declares_autoincrement(conn, table.name)? {
        return Err(SchemaError::conflict(
            table.name,
            "primary key is not AUTOINCREMENT",
        ));
    }

    verify_foreign_keys(conn, table)
}

/// Whether `column` alone is covered by a unique index over all rows.
///
/// Any origin counts: a `UNIQUE` column constraint, a table constraint or a
/// separate `CREATE UNIQUE INDEX` enforce the same thing. Partial indexes
/// do not.
fn has_unique_index(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    conn.prepare(
        "SELECT il.name
         FROM pragma_index_list(?1) AS il, pragma_index_info(il.name) AS ii
         WHERE il.\"unique\" = 1 AND il.partial = 0
         GROUP BY il.name
         HAVING COUNT(*) = 1 AND MAX(ii.name = ?2 COLLATE NOCASE) = 1",
    )?
    .exists(params![table, column])
}

/// SQLite keeps no flag for `AUTOINCREMENT`; the stored DDL is the only record.
fn declares_autoincrement(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let sql: Option<String> = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            params![table],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?
        .flatten();
    Ok(sql.is_some_and(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT")))
}

fn check_column(table: &str, expected: &ColumnDef, found: &ColumnInfo) -> Result<(), SchemaError> {
    if !found.decl_type.eq_ignore_ascii_case(expected.decl_type) {
        return Err(SchemaError::conflict(
            table,
            format!(
                "column '{}' is declared {}, expected {}",
                expected.name, found.decl_type, expected.decl_type
            ),
        ));
    }
    if found.primary_key != expected.primary_key {
        return Err(SchemaError::conflict(
            table,
            format!("column '{}' primary key mismatch", expected.name),
        ));
    }
    if found.not_null != expected.not_null {
        return Err(SchemaError::conflict(
            table,
            format!("column '{}' nullability mismatch", expected.name),
        ));
    }
    if found.default.as_deref() != expected.default {
        return Err(SchemaError::conflict(
            table,
            format!(
                "column '{}' default is {:?}, expected {:?}",
                expected.name, found.default, expected.default
            ),
        ));
    }
    Ok(())
}

fn verify_foreign_keys(conn: &Connection, table: &TableDef) -> Result<(), SchemaError> {
    if table.foreign_keys.is_empty() {
        return Ok(());
    }

    let mut stmt =
        conn.prepare("SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1)")?;
    let actual = stmt
        .query_map(params![table.name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for fk in table.foreign_keys {
        let present = actual.iter().any(|(from, target, to)| {
            from.eq_ignore_ascii_case(fk.from)
                && target.eq_ignore_ascii_case(fk.table)
                // A bare `REFERENCES users` targets the primary key.
                && to.as_deref().map_or(true, |to| to.eq_ignore_ascii_case(fk.to))
        });
        if !present {
            return Err(SchemaError::conflict(
                table.name,
                format!(
                    "missing foreign key {} -> {}({})",
                    fk.from, fk.table, fk.to
                ),
            ));
        }
    }
    Ok(())
}
