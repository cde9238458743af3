//! Generic record table operations.
//!
//! [`Engine`] is stateless: every method takes a connection and runs SQL
//! against the table described by `T`. Writes run inside their own
//! transaction (prepare, execute, finalize, commit); dropping the transaction
//! on any error rolls it back.

use std::marker::PhantomData;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use crate::errors::{Result, StoreError};
use crate::options::{ListOptions, UniqueValuesOptions};
use crate::sqlite::query::{order_clause, SqlBuilder};
use crate::sqlite::tables::Table;

/// Record table operations for `T`.
pub struct Engine<T>(PhantomData<T>);

impl<T: Table> Engine<T> {
    /// Insert one row in its own transaction.
    pub fn insert(conn: &mut Connection, row: &T::Row) -> Result<()> {
        let placeholders: Vec<String> = (1..=T::COLUMNS.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::NAME,
            T::COLUMNS.join(", "),
            placeholders.join(", ")
        );

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            let _ = stmt.execute(params_from_iter(T::values(row)))?;
            stmt.finalize()?;
        }
        tx.commit()?;
        debug!(table = T::NAME, uuid = T::uuid(row), "row inserted");
        Ok(())
    }

    /// Replace every column of the row matched by its unique identifier.
    ///
    /// Returns the number of rows changed; an unknown identifier yields 0.
    pub fn update(conn: &mut Connection, row: &T::Row) -> Result<usize> {
        let mut assignments = Vec::with_capacity(T::COLUMNS.len());
        let mut values = Vec::with_capacity(T::COLUMNS.len());
        for (column, value) in T::COLUMNS.iter().zip(T::values(row)) {
            if *column == "uuid" {
                continue;
            }
            values.push(value);
            assignments.push(format!("{column} = ?{}", values.len()));
        }
        values.push(rusqlite::types::Value::Text(T::uuid(row).to_string()));
        let sql = format!(
            "UPDATE {} SET {} WHERE uuid = ?{}",
            T::NAME,
            assignments.join(", "),
            values.len()
        );

        let tx = conn.transaction()?;
        let changed = {
            let mut stmt = tx.prepare(&sql)?;
            let changed = stmt.execute(params_from_iter(values))?;
            stmt.finalize()?;
            changed
        };
        tx.commit()?;
        debug!(table = T::NAME, uuid = T::uuid(row), changed, "row updated");
        Ok(changed)
    }

    /// Fetch the row with `uuid`, or an arbitrary single row when `uuid` is
    /// `None` or empty. Which row is returned without a filter is unspecified.
    pub fn get(conn: &Connection, uuid: Option<&str>) -> Result<Option<T::Row>> {
        let mut builder = SqlBuilder::new();
        let _ = builder.eq_opt("uuid", uuid);
        let sql = format!(
            "SELECT {} FROM {}{} LIMIT 1",
            T::select_list(),
            T::NAME,
            builder.where_clause()
        );
        let row = conn
            .query_row(&sql, params_from_iter(builder.params()), T::map_row)
            .optional()?;
        Ok(row)
    }

    /// Filtered page of rows plus the count of all matching rows.
    pub fn list(conn: &Connection, opts: &ListOptions) -> Result<(Vec<T::Row>, i64)> {
        if opts.aggregate_uuid.is_some() && !T::has_column("aggregate_uuid") {
            return Err(StoreError::InvalidArgument(format!(
                "{} cannot be filtered by aggregate",
                T::NAME
            )));
        }
        let order_by = Self::checked_column(opts.order_by.as_deref())?;

        let mut builder = SqlBuilder::new();
        let _ = builder
            .eq_opt("tenant_uuid", opts.tenant_uuid.as_deref())
            .eq_opt("aggregate_uuid", opts.aggregate_uuid.as_deref())
            .eq_opt("data_type", opts.data_type.as_deref())
            .is_in("domain", &opts.domains)
            .lt("created_at", opts.before)
            .gt("created_at", opts.after);
        let where_sql = builder.where_clause();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(id) FROM {}{where_sql}", T::NAME),
            params_from_iter(builder.params()),
            |row| row.get(0),
        )?;

        let page_sql = builder.page_clause(opts.limit, opts.offset);
        let sql = format!(
            "SELECT {} FROM {}{where_sql}{}{page_sql}",
            T::select_list(),
            T::NAME,
            order_clause(order_by, opts.ascending),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(builder.params()), T::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(table = T::NAME, returned = rows.len(), total, "rows listed");
        Ok((rows, total))
    }

    /// Delete the row with `uuid`. Returns whether a row was removed.
    pub fn delete(conn: &Connection, uuid: &str) -> Result<bool> {
        let changed = conn.execute(
            &format!("DELETE FROM {} WHERE uuid = ?1", T::NAME),
            [uuid],
        )?;
        debug!(table = T::NAME, uuid, changed, "row deleted");
        Ok(changed > 0)
    }

    /// Unconditional row count.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row(&format!("SELECT COUNT(id) FROM {}", T::NAME), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// Largest `created_at`, 0 for an empty table.
    pub fn last_created_at(conn: &Connection) -> Result<i64> {
        let last: i64 = conn.query_row(
            &format!("SELECT COALESCE(MAX(created_at), 0) FROM {}", T::NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(last)
    }

    /// Distinct values of a column plus the number of distinct values.
    pub fn unique_values(
        conn: &Connection,
        opts: &UniqueValuesOptions,
    ) -> Result<(Vec<String>, i64)> {
        let field = Self::checked_column(Some(opts.field.as_str()))?
            .ok_or_else(|| StoreError::InvalidArgument("unique field must not be empty".into()))?;

        let mut builder = SqlBuilder::new();
        let _ = builder
            .eq_opt("tenant_uuid", opts.tenant_uuid.as_deref())
            .eq_opt("domain", opts.domain.as_deref());
        let where_sql = builder.where_clause();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(DISTINCT {field}) FROM {}{where_sql}", T::NAME),
            params_from_iter(builder.params()),
            |row| row.get(0),
        )?;

        let page_sql = builder.page_clause(opts.limit, opts.offset);
        let sql = format!(
            "SELECT DISTINCT {field} FROM {}{where_sql}{}{page_sql}",
            T::NAME,
            order_clause(Some(field), opts.ascending),
        );
        let mut stmt = conn.prepare(&sql)?;
        let values = stmt
            .query_map(params_from_iter(builder.params()), |row| {
                Ok(render_value(row.get_ref(0)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((values, total))
    }

    /// Validate an identifier against the table's column whitelist.
    fn checked_column(column: Option<&str>) -> Result<Option<&str>> {
        match column {
            None | Some("") => Ok(None),
            Some(column) if T::has_column(column) => Ok(Some(column)),
            Some(column) => Err(StoreError::InvalidArgument(format!(
                "unknown column '{column}' for {}",
                T::NAME
            ))),
        }
    }
}

/// Render a column value as text; integers become decimal strings.
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::sqlite::row_types::{CommandRow, EventRow};
    use crate::sqlite::schema::migrate;
    use crate::sqlite::tables::{CommandsTable, EventsTable};
    use assert_matches::assert_matches;

    type Events = Engine<EventsTable>;
    type Commands = Engine<CommandsTable>;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn make_event(uuid: &str, tenant: &str, domain: &str, created_at: i64) -> EventRow {
        EventRow {
            id: 0,
            instance_id: 1,
            uuid: uuid.into(),
            tenant_uuid: tenant.into(),
            command_uuid: format!("cmd-{uuid}"),
            domain: domain.into(),
            aggregate_uuid: format!("agg-{tenant}"),
            version: 1,
            created_at,
            data_type: "Thing".into(),
            data_bytes: format!("{{\"uuid\":\"{uuid}\"}}").into_bytes(),
        }
    }

    #[test]
    fn insert_and_get() {
        let mut conn = setup();
        let row = make_event("e1", "t1", "d1", 1000);
        Events::insert(&mut conn, &row).unwrap();

        let got = Events::get(&conn, Some("e1")).unwrap().unwrap();
        assert!(got.id > 0);
        assert_eq!(EventRow { id: 0, ..got }, row);
    }

    #[test]
    fn get_missing_is_none() {
        let conn = setup();
        assert!(Events::get(&conn, Some("nope")).unwrap().is_none());
        assert!(Events::get(&conn, None).unwrap().is_none());
    }

    #[test]
    fn get_without_filter_returns_some_row() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t1", "d1", 1)).unwrap();
        Events::insert(&mut conn, &make_event("e2", "t1", "d1", 2)).unwrap();
        let got = Events::get(&conn, None).unwrap().unwrap();
        assert!(got.uuid == "e1" || got.uuid == "e2");
    }

    #[test]
    fn surrogate_ids_increase() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t", "d", 1)).unwrap();
        Events::insert(&mut conn, &make_event("e2", "t", "d", 1)).unwrap();
        let a = Events::get(&conn, Some("e1")).unwrap().unwrap().id;
        let b = Events::get(&conn, Some("e2")).unwrap().unwrap().id;
        assert!(b > a);
    }

    #[test]
    fn surrogate_id_not_reused_after_delete() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t", "d", 1)).unwrap();
        Events::insert(&mut conn, &make_event("e2", "t", "d", 2)).unwrap();
        let deleted_id = Events::get(&conn, Some("e2")).unwrap().unwrap().id;
        assert!(Events::delete(&conn, "e2").unwrap());

        Events::insert(&mut conn, &make_event("e3", "t", "d", 3)).unwrap();
        let new_id = Events::get(&conn, Some("e3")).unwrap().unwrap().id;
        assert!(new_id > deleted_id);
    }

    #[test]
    fn empty_filters_are_ignored() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t1", "d", 1)).unwrap();
        Events::insert(&mut conn, &make_event("e2", "t2", "d", 2)).unwrap();

        let (rows, total) = Events::list(&conn, &ListOptions::default().tenant("")).unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);
        assert!(Events::get(&conn, Some("")).unwrap().is_some());
    }

    #[test]
    fn list_defaults_order_by_created_at() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e3", "t", "d", 30)).unwrap();
        Events::insert(&mut conn, &make_event("e1", "t", "d", 10)).unwrap();
        Events::insert(&mut conn, &make_event("e2", "t", "d", 20)).unwrap();

        let (rows, total) = Events::list(&conn, &ListOptions::default()).unwrap();
        assert_eq!(total, 3);
        let uuids: Vec<_> = rows.iter().map(|r| r.uuid.as_str()).collect();
        assert_eq!(uuids, ["e1", "e2", "e3"]);

        let (rows, _) =
            Events::list(&conn, &ListOptions::default().order_by("created_at", false)).unwrap();
        assert_eq!(rows[0].uuid, "e3");
    }

    #[test]
    fn list_total_ignores_pagination() {
        let mut conn = setup();
        for i in 0..7 {
            Events::insert(&mut conn, &make_event(&format!("e{i}"), "t", "d", i)).unwrap();
        }
        let (rows, total) = Events::list(&conn, &ListOptions::default().page(3, 5)).unwrap();
        assert_eq!(total, 7);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].uuid, "e5");
    }

    #[test]
    fn list_negative_limit_returns_all_from_offset() {
        let mut conn = setup();
        for i in 0..4 {
            Events::insert(&mut conn, &make_event(&format!("e{i}"), "t", "d", i)).unwrap();
        }
        let (rows, _) = Events::list(&conn, &ListOptions::default().page(-1, 1)).unwrap();
        assert_eq!(rows.len(), 3);
        let (rows, _) = Events::list(&conn, &ListOptions::default().page(-1, -1)).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn list_filters_combine() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t1", "orders", 100)).unwrap();
        Events::insert(&mut conn, &make_event("e2", "t1", "billing", 200)).unwrap();
        Events::insert(&mut conn, &make_event("e3", "t2", "orders", 300)).unwrap();
        Events::insert(&mut conn, &make_event("e4", "t1", "users", 400)).unwrap();

        let (rows, total) = Events::list(&conn, &ListOptions::default().tenant("t1")).unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 3);

        let opts = ListOptions::default()
            .tenant("t1")
            .domains(["orders", "billing"]);
        let (rows, total) = Events::list(&conn, &opts).unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows[1].uuid, "e2");

        let opts = ListOptions::default().after(100).before(400);
        let (rows, _) = Events::list(&conn, &opts).unwrap();
        let uuids: Vec<_> = rows.iter().map(|r| r.uuid.as_str()).collect();
        assert_eq!(uuids, ["e2", "e3"]);

        let (rows, _) = Events::list(&conn, &ListOptions::default().aggregate("agg-t2")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].uuid, "e3");

        let (rows, total) = Events::list(&conn, &ListOptions::default().data_type("Other")).unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn list_rejects_unknown_order_column() {
        let conn = setup();
        let err = Events::list(&conn, &ListOptions::default().order_by("1; DROP TABLE events", true))
            .unwrap_err();
        assert_matches!(err, StoreError::InvalidArgument(_));
        assert!(Events::count(&conn).is_ok());
    }

    #[test]
    fn commands_reject_aggregate_filter() {
        let conn = setup();
        let err = Commands::list(&conn, &ListOptions::default().aggregate("a")).unwrap_err();
        assert_matches!(err, StoreError::InvalidArgument(_));
    }

    #[test]
    fn quotes_in_values_are_data() {
        let mut conn = setup();
        let row = make_event("it's", "o'brien", "d", 1);
        Events::insert(&mut conn, &row).unwrap();
        assert!(Events::get(&conn, Some("it's")).unwrap().is_some());
        let (rows, _) = Events::list(&conn, &ListOptions::default().tenant("o'brien")).unwrap();
        assert_eq!(rows.len(), 1);
        let (rows, _) = Events::list(&conn, &ListOptions::default().tenant("x' OR '1'='1")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn update_replaces_fields() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t1", "d1", 1)).unwrap();
        let mut row = make_event("e1", "t9", "d9", 99);
        row.version = 7;
        row.data_bytes = b"new".to_vec();
        assert_eq!(Events::update(&mut conn, &row).unwrap(), 1);

        let got = Events::get(&conn, Some("e1")).unwrap().unwrap();
        assert_eq!(got.tenant_uuid, "t9");
        assert_eq!(got.version, 7);
        assert_eq!(got.created_at, 99);
        assert_eq!(got.data_bytes, b"new");
        assert_eq!(Events::count(&conn).unwrap(), 1);
    }

    #[test]
    fn update_unknown_uuid_changes_nothing() {
        let mut conn = setup();
        assert_eq!(Events::update(&mut conn, &make_event("ghost", "t", "d", 1)).unwrap(), 0);
        assert_eq!(Events::count(&conn).unwrap(), 0);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t", "d", 1)).unwrap();
        assert!(Events::delete(&conn, "e1").unwrap());
        assert!(!Events::delete(&conn, "e1").unwrap());
        assert_eq!(Events::count(&conn).unwrap(), 0);
    }

    #[test]
    fn last_created_at_empty_and_filled() {
        let mut conn = setup();
        assert_eq!(Events::last_created_at(&conn).unwrap(), 0);
        Events::insert(&mut conn, &make_event("e1", "t", "d", 50)).unwrap();
        Events::insert(&mut conn, &make_event("e2", "t", "d", 40)).unwrap();
        assert_eq!(Events::last_created_at(&conn).unwrap(), 50);
    }

    #[test]
    fn unique_values_with_filters() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t1", "orders", 1)).unwrap();
        Events::insert(&mut conn, &make_event("e2", "t1", "billing", 2)).unwrap();
        Events::insert(&mut conn, &make_event("e3", "t2", "orders", 3)).unwrap();
        Events::insert(&mut conn, &make_event("e4", "t3", "orders", 4)).unwrap();

        let (values, total) = Events::unique_values(&conn, &UniqueValuesOptions::default()).unwrap();
        assert_eq!(values, ["t1", "t2", "t3"]);
        assert_eq!(total, 3);

        let opts = UniqueValuesOptions::field("tenant_uuid").domain("orders");
        let (values, total) = Events::unique_values(&conn, &opts).unwrap();
        assert_eq!(values, ["t1", "t2", "t3"]);
        assert_eq!(total, 3);

        let opts = UniqueValuesOptions::field("domain").tenant("t1");
        let (values, total) = Events::unique_values(&conn, &opts).unwrap();
        assert_eq!(values, ["billing", "orders"]);
        assert_eq!(total, 2);

        let opts = UniqueValuesOptions {
            limit: 1,
            offset: 1,
            ..UniqueValuesOptions::default()
        };
        let (values, total) = Events::unique_values(&conn, &opts).unwrap();
        assert_eq!(values, ["t2"]);
        assert_eq!(total, 3);
    }

    #[test]
    fn unique_values_renders_integers() {
        let mut conn = setup();
        Events::insert(&mut conn, &make_event("e1", "t", "d", 5)).unwrap();
        let (values, _) =
            Events::unique_values(&conn, &UniqueValuesOptions::field("created_at")).unwrap();
        assert_eq!(values, ["5"]);
    }

    #[test]
    fn unique_values_rejects_unknown_field() {
        let conn = setup();
        let err = Commands::unique_values(&conn, &UniqueValuesOptions::field("aggregate_uuid"))
            .unwrap_err();
        assert_matches!(err, StoreError::InvalidArgument(_));
    }

    #[test]
    fn commands_roundtrip() {
        let mut conn = setup();
        let row = CommandRow {
            id: 0,
            instance_id: 2,
            uuid: "c1".into(),
            tenant_uuid: "t1".into(),
            domain: "billing".into(),
            created_at: 10,
            data_type: "Charge".into(),
            data_bytes: b"{}".to_vec(),
            req_ctx: r#"{"sender_tenant_uuid":"t1"}"#.into(),
        };
        Commands::insert(&mut conn, &row).unwrap();
        let got = Commands::get(&conn, Some("c1")).unwrap().unwrap();
        assert_eq!(CommandRow { id: 0, ..got }, row);
        assert_eq!(Events::count(&conn).unwrap(), 0);
    }

    #[test]
    fn failed_insert_leaves_no_row() {
        let mut conn = setup();
        conn.execute_batch(
            "CREATE TRIGGER reject_bad BEFORE INSERT ON events
             WHEN NEW.uuid = 'bad' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();
        assert!(Events::insert(&mut conn, &make_event("bad", "t", "d", 1)).is_err());
        assert_eq!(Events::count(&conn).unwrap(), 0);
        Events::insert(&mut conn, &make_event("good", "t", "d", 1)).unwrap();
        assert_eq!(Events::count(&conn).unwrap(), 1);
    }

    #[test]
    fn missing_table_errors() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(Events::count(&conn).is_err());
        assert!(Events::get(&conn, Some("x")).is_err());
    }
}
