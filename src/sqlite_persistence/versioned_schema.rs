use anyhow::{bail, Result};
use rusqlite::{params, types::Type, Connection};

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

pub const BASE_DB_VERSION: usize = 31000;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Only mutated when optional field assignments are passed (e.g. `non_null = true`)
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

#[allow(unused)]
#[derive(Debug, PartialEq, Eq)]
pub enum ForeignKeyOnChange {
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::SetNull => "SET NULL",
            ForeignKeyOnChange::SetDefault => "SET DEFAULT",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<S>,
    pub foreign_key: Option<&'a ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

/// A foreign-key edge, `table.column -> foreign_table.foreign_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: &'static str,
    pub column: &'static str,
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!(
                "{} {}",
                column.name,
                match column.sql_type {
                    SqlType::Text => "TEXT",
                    SqlType::Integer => "INTEGER",
                    SqlType::Real => "REAL",
                    SqlType::Blob => "BLOB",
                }
            ));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if column.is_unique {
                create_sql.push_str(" UNIQUE");
            }
            if let Some(default_value) = column.default_value {
                create_sql.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(foreign_key) = column.foreign_key {
                create_sql.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    foreign_key.foreign_table,
                    foreign_key.foreign_column,
                    foreign_key.on_delete.as_sql()
                ));
            }
        }

        for unique_constraint in self.unique_constraints {
            create_sql.push_str(&format!(", UNIQUE ({})", unique_constraint.join(", ")));
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    pub fn primary_key(&self) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = ForeignKeyRef> + '_ {
        self.columns.iter().filter_map(|column| {
            column.foreign_key.map(|fk| ForeignKeyRef {
                table: self.name,
                column: column.name,
                foreign_table: fk.foreign_table,
                foreign_column: fk.foreign_column,
            })
        })
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

fn strip_leading_and_trailing_parentheses<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    if s.starts_with('(') && s.ends_with(')') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    /// Every foreign-key edge declared by the schema's tables.
    pub fn foreign_keys(&self) -> Vec<ForeignKeyRef> {
        self.tables.iter().flat_map(|t| t.foreign_keys()).collect()
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.name))?;
            let actual_columns: Vec<Column<'_, String>> = stmt
                .query_map(params![], |row| {
                    let name = row.get::<usize, String>(1)?;
                    let sql_type = match row.get::<_, String>(2)?.as_str() {
                        "TEXT" => &SqlType::Text,
                        "INTEGER" => &SqlType::Integer,
                        "REAL" => &SqlType::Real,
                        "BLOB" => &SqlType::Blob,
                        _ => {
                            return Err(rusqlite::Error::InvalidColumnType(
                                2,
                                "".to_string(),
                                Type::Text,
                            ))
                        }
                    };

                    Ok(Column {
                        name,
                        sql_type,
                        non_null: row.get::<_, i32>(3)? == 1,
                        default_value: row.get::<_, Option<String>>(4)?,
                        is_primary_key: row.get::<_, i32>(5)? == 1,
                        is_unique: false,
                        foreign_key: None,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            if actual_columns.len() != table.columns.len() {
                bail!(
                    "Table {} has {} columns, expected {}. Found column names: {}, expected: {}",
                    table.name,
                    actual_columns.len(),
                    table.columns.len(),
                    actual_columns
                        .iter()
                        .map(|c| c.name.clone())
                        .collect::<Vec<String>>()
                        .join(", "),
                    table
                        .columns
                        .iter()
                        .map(|c| c.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }

            for (actual_column, expected_column) in actual_columns.iter().zip(table.columns.iter())
            {
                if actual_column.name != expected_column.name {
                    bail!(
                        "Table {} Column name mismatch: expected {}, got {}",
                        &table.name,
                        expected_column.name,
                        actual_column.name
                    );
                }
                if actual_column.sql_type != expected_column.sql_type {
                    bail!(
                        "Table {} Column {} type mismatch: expected {:?}, got {:?}",
                        &table.name,
                        expected_column.name,
                        expected_column.sql_type,
                        actual_column.sql_type
                    );
                }
                if actual_column.non_null != expected_column.non_null {
                    bail!(
                        "Table {} Column {} non-null mismatch: expected {}, got {}",
                        &table.name,
                        expected_column.name,
                        expected_column.non_null,
                        actual_column.non_null
                    );
                }

                // Default values might be wrapped in parentheses, so we strip them before comparing
                if actual_column
                    .default_value
                    .as_ref()
                    .map(strip_leading_and_trailing_parentheses)
                    != expected_column
                        .default_value
                        .map(strip_leading_and_trailing_parentheses)
                {
                    bail!(
                        "Table {} Column {} default value mismatch: expected {:?}, got {:?}",
                        &table.name,
                        expected_column.name,
                        expected_column.default_value,
                        actual_column.default_value
                    );
                }
                if actual_column.is_primary_key != expected_column.is_primary_key {
                    bail!(
                        "Table {} Column {} primary key mismatch: expected {}, got {}",
                        &table.name,
                        expected_column.name,
                        expected_column.is_primary_key,
                        actual_column.is_primary_key
                    );
                }
            }

            for (index_name, _columns) in table.indices {
                let index_exists: bool = conn
                    .query_row(
                        "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                        params![index_name, table.name],
                        |_| Ok(true),
                    )
                    .unwrap_or(false);

                if !index_exists {
                    bail!("Table {} is missing index '{}'", table.name, index_name);
                }
            }

            if !table.unique_constraints.is_empty() {
                let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", table.name))?;
                let unique_indices: Vec<String> = stmt
                    .query_map([], |row| {
                        let name: String = row.get(1)?;
                        let is_unique: i32 = row.get(2)?;
                        Ok((name, is_unique))
                    })?
                    .filter_map(|r| r.ok())
                    .filter(|(_, is_unique)| *is_unique == 1)
                    .map(|(name, _)| name)
                    .collect();

                let mut unique_index_columns: Vec<Vec<String>> = Vec::new();
                for index_name in &unique_indices {
                    let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
                    let mut cols: Vec<String> = idx_stmt
                        .query_map([], |row| row.get::<_, String>(2))?
                        .filter_map(|r| r.ok())
                        .collect();
                    cols.sort();
                    unique_index_columns.push(cols);
                }

                for expected_columns in table.unique_constraints {
                    let mut expected_cols_sorted: Vec<&str> = expected_columns.to_vec();
                    expected_cols_sorted.sort();

                    let found = unique_index_columns.iter().any(|actual_cols| {
                        actual_cols.iter().map(|s| s.as_str()).collect::<Vec<_>>()
                            == expected_cols_sorted
                    });

                    if !found {
                        bail!(
                            "Table {} is missing unique constraint on columns ({})",
                            table.name,
                            expected_columns.join(", ")
                        );
                    }
                }
            }

            // PRAGMA foreign_key_list returns: id, seq, table, from, to, on_update, on_delete, match
            let mut fk_stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", table.name))?;
            let actual_fks: Vec<(String, String, String, String)> = fk_stmt
                .query_map([], |row| {
                    Ok((row.get(3)?, row.get(2)?, row.get(4)?, row.get(6)?))
                })?
                .filter_map(|r| r.ok())
                .collect();

            for column in table.columns {
                let Some(expected_fk) = column.foreign_key else {
                    continue;
                };
                let expected_on_delete = expected_fk.on_delete.as_sql();
                let found = actual_fks.iter().any(|(from, to_table, to_column, on_delete)| {
                    from == column.name
                        && to_table == expected_fk.foreign_table
                        && to_column == expected_fk.foreign_column
                        && on_delete == expected_on_delete
                });
                if !found {
                    bail!(
                        "Table {} column {} is missing foreign key: expected REFERENCES {}({}) ON DELETE {}",
                        table.name,
                        column.name,
                        expected_fk.foreign_table,
                        expected_fk.foreign_column,
                        expected_on_delete
                    );
                }
            }
        }
        Ok(())
    }
}
