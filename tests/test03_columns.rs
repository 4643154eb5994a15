use chrono::NaiveDate;
use serde_json::json;
use sql_connector::prelude::*;

fn seeded() -> Result<Connector, SqlConnectorError> {
    let connector = Connector::open("Data Source=:memory:")?;
    connector.execute_batch(
        "
        CREATE TABLE people (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER,
            score REAL,
            born TEXT,
            active INTEGER,
            avatar BLOB,
            prefs TEXT
        );
        ",
    )?;
    connector
        .text_command(
            "INSERT INTO people (id, name, age, score, born, active, avatar, prefs)
             VALUES (@id, @name, @age, @score, @born, @active, @avatar, @prefs)",
            &args![
                "@id", 1,
                "@name", "alice",
                "@age", 42,
                "@score", 97.5,
                "@born", NaiveDate::from_ymd_opt(1982, 5, 17).and_then(|d| d.and_hms_opt(8, 30, 0)),
                "@active", true,
                "@avatar", vec![1u8, 2, 3],
                "@prefs", json!({"theme": "dark"}),
            ],
        )?
        .execute_non_query()?;

    connector
        .text_command(
            "INSERT INTO people (id, name) VALUES (@id, @name)",
            &args!["@id", 2, "@name", "bob"],
        )?
        .execute_non_query()?;
    Ok(connector)
}

#[test]
fn cursor_reads_typed_values_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let connector = seeded()?;
    let select = connector.text_command("SELECT * FROM people ORDER BY id", &[])?;
    let mut prepared = select.prepare()?;
    assert_eq!(prepared.column_names()[1], "name");

    let mut cursor = prepared.execute_reader()?;
    let first = cursor.next_row()?.ok_or("missing first row")?;
    assert_eq!(first.get_i64("id")?, 1);
    assert_eq!(first.get_string("name")?, "alice");
    assert_eq!(first.get_i32("age")?, 42);
    assert_eq!(first.get_f64("score")?, 97.5);
    assert_eq!(first.get_f32("score")?, 97.5);
    assert_eq!(
        first.get_datetime("born")?,
        NaiveDate::from_ymd_opt(1982, 5, 17)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .ok_or("bad date")?
    );
    assert!(first.get_bool("active")?);
    assert_eq!(first.get_bytes("avatar")?, vec![1, 2, 3]);
    assert_eq!(first.get_json("prefs")?, json!({"theme": "dark"}));

    let second = cursor.next_row()?.ok_or("missing second row")?;
    assert_eq!(second.get_string("name")?, "bob");
    assert!(cursor.next_row()?.is_none());
    Ok(())
}

#[test]
fn null_columns_read_as_zero_values() -> Result<(), Box<dyn std::error::Error>> {
    let connector = seeded()?;
    let select = connector.text_command("SELECT * FROM people WHERE id = @id", &args!["@id", 2])?;
    select.execute_reader(|cursor| {
        let Some(row) = cursor.next_row()? else {
            panic!("query returned no rows");
        };
        assert!(row.is_null("age")?);
        assert!(!row.is_null("name")?);
        assert_eq!(row.get_i32("age")?, 0);
        assert_eq!(row.get_i64("age")?, 0);
        assert_eq!(row.get_f64("score")?, 0.0);
        assert_eq!(row.get_f32("score")?, 0.0);
        assert_eq!(row.get_string("born")?, "");
        assert_eq!(row.get_datetime("born")?, chrono::NaiveDateTime::default());
        assert!(!row.get_bool("active")?);
        assert!(row.get_bytes("avatar")?.is_empty());
        assert_eq!(row.get::<Option<f64>>("score")?, None);
        assert_eq!(row.get::<SqlValue>("prefs")?, SqlValue::Null);
        Ok(())
    })?;
    Ok(())
}

#[test]
fn incompatible_stored_types_are_type_mismatches() -> Result<(), Box<dyn std::error::Error>> {
    let connector = seeded()?;
    let select = connector.text_command("SELECT * FROM people WHERE id = 1", &[])?;
    let rows = select.execute_query()?;
    let row = &rows.rows()[0];

    for result in [
        row.get_i32("name").map(|_| ()),
        row.get_i64("name").map(|_| ()),
        row.get_f64("name").map(|_| ()),
        row.get_string("age").map(|_| ()),
        row.get_bytes("name").map(|_| ()),
        row.get_datetime("score").map(|_| ()),
        row.get_json("age").map(|_| ()),
    ] {
        assert!(
            matches!(result, Err(SqlConnectorError::TypeMismatch { .. })),
            "expected type mismatch, got {result:?}"
        );
    }

    match row.get_i32("name") {
        Err(SqlConnectorError::TypeMismatch { column, found, .. }) => {
            assert_eq!(column, "name");
            assert_eq!(found, "TEXT");
        }
        other => panic!("expected type mismatch, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unknown_column_fails_every_getter() -> Result<(), Box<dyn std::error::Error>> {
    let connector = seeded()?;
    let select = connector.text_command("SELECT id, name FROM people", &[])?;
    select.execute_reader(|cursor| {
        let Some(row) = cursor.next_row()? else {
            panic!("query returned no rows");
        };
        let results = [
            row.is_null("missing").map(|_| ()),
            row.get_string("missing").map(|_| ()),
            row.get_i32("missing").map(|_| ()),
            row.get_i64("missing").map(|_| ()),
            row.get_f32("missing").map(|_| ()),
            row.get_f64("missing").map(|_| ()),
            row.get_bool("missing").map(|_| ()),
            row.get_datetime("missing").map(|_| ()),
            row.get_bytes("missing").map(|_| ()),
            row.get_json("missing").map(|_| ()),
            row.get::<Option<String>>("missing").map(|_| ()),
        ];
        for result in results {
            assert!(
                matches!(&result, Err(SqlConnectorError::UnknownColumn(name)) if name == "missing"),
                "expected unknown column, got {result:?}"
            );
        }
        Ok(())
    })?;
    Ok(())
}

#[test]
fn column_names_resolve_case_insensitively() -> Result<(), Box<dyn std::error::Error>> {
    let connector = seeded()?;
    let rows = connector
        .text_command("SELECT name AS Display_Name FROM people ORDER BY id", &[])?
        .execute_query()?;
    assert_eq!(rows.column_names(), ["Display_Name"]);
    let names = rows
        .rows()
        .iter()
        .map(|row| row.get_string("display_name"))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(names, ["alice", "bob"]);
    Ok(())
}

#[test]
fn materialized_rows_outlive_the_cursor() -> Result<(), Box<dyn std::error::Error>> {
    let connector = seeded()?;
    let rows = connector
        .text_command("SELECT id, age FROM people ORDER BY id", &[])?
        .execute_query()?;
    drop(connector);

    let ages = rows
        .into_iter()
        .map(|row| row.get::<Option<i64>>("age"))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(ages, [Some(42), None]);
    Ok(())
}
