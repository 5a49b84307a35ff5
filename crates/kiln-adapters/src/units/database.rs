//! `database`: connection package and, for SQL drivers, initial migrations.
//!
//! Migration file names carry the record's timestamp, so they are stable for
//! a given record but differ between records built at different times.

use kiln_core::domain::{ConfigRecord, DomainError, FileSet};

use super::BuiltinUnit;

pub const UNIT: BuiltinUnit = BuiltinUnit {
    name: "database",
    version: "1.0.0",
    description: "Database connection pool and initial schema migrations",
    dependencies: &["config"],
    enabled: |record| record.database().is_some(),
    blueprint,
};

fn blueprint(record: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    if record.database().is_sql() {
        files.add("internal/database/database.go", || SQL_GO)?;
        files.add(
            format!("migrations/{}_init.up.sql", record.timestamp()),
            || UP_SQL,
        )?;
        files.add(
            format!("migrations/{}_init.down.sql", record.timestamp()),
            || DOWN_SQL,
        )
    } else {
        files.add("internal/database/database.go", || MONGO_GO)
    }
}

const SQL_GO: &str = r#"// Package database owns the {{ database }} connection pool.
package database

import (
	"context"
	"database/sql"
	"fmt"
	"time"
{% if database == "postgres" %}
	_ "github.com/jackc/pgx/v5/stdlib"
{% elif database == "mysql" %}
	_ "github.com/go-sql-driver/mysql"
{% else %}
	_ "modernc.org/sqlite"
{% endif %}
)

const driverName = "{% if database == "postgres" %}pgx{% elif database == "mysql" %}mysql{% else %}sqlite{% endif %}"

// DB wraps the shared connection pool.
type DB struct {
	*sql.DB
}

// Open connects and verifies the connection with a ping.
func Open(dsn string) (*DB, error) {
	if dsn == "" {
		return nil, fmt.Errorf("database: DATABASE_URL is empty")
	}

	pool, err := sql.Open(driverName, dsn)
	if err != nil {
		return nil, fmt.Errorf("database: open: %w", err)
	}
{% if database == "sqlite" %}
	pool.SetMaxOpenConns(1)
{% else %}
	pool.SetMaxOpenConns(10)
	pool.SetMaxIdleConns(5)
{% endif %}
	pool.SetConnMaxLifetime(30 * time.Minute)

	ctx, cancel := context.WithTimeout(context.Background(), 5*time.Second)
	defer cancel()
	if err := pool.PingContext(ctx); err != nil {
		pool.Close()
		return nil, fmt.Errorf("database: ping: %w", err)
	}
	return &DB{DB: pool}, nil
}
"#;

const MONGO_GO: &str = r#"// Package database owns the MongoDB client.
package database

import (
	"context"
	"fmt"
	"time"
	"go.mongodb.org/mongo-driver/mongo"
	"go.mongodb.org/mongo-driver/mongo/options"
)

// DB wraps the shared client.
type DB struct {
	Client *mongo.Client
}

// Open connects and verifies the connection with a ping.
func Open(uri string) (*DB, error) {
	if uri == "" {
		return nil, fmt.Errorf("database: DATABASE_URL is empty")
	}

	ctx, cancel := context.WithTimeout(context.Background(), 5*time.Second)
	defer cancel()

	client, err := mongo.Connect(ctx, options.Client().ApplyURI(uri))
	if err != nil {
		return nil, fmt.Errorf("database: connect: %w", err)
	}
	if err := client.Ping(ctx, nil); err != nil {
		_ = client.Disconnect(ctx)
		return nil, fmt.Errorf("database: ping: %w", err)
	}
	return &DB{Client: client}, nil
}

// PingContext reports whether the server is reachable.
func (d *DB) PingContext(ctx context.Context) error {
	return d.Client.Ping(ctx, nil)
}

// Close disconnects the client.
func (d *DB) Close() error {
	ctx, cancel := context.WithTimeout(context.Background(), 5*time.Second)
	defer cancel()
	return d.Client.Disconnect(ctx)
}
"#;

const UP_SQL: &str = r#"-- {{ timestamp }}_init: initial schema for {{ app_name }}

CREATE TABLE IF NOT EXISTS users (
{% if database == "postgres" %}
    id          BIGSERIAL PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
{% elif database == "mysql" %}
    id          BIGINT AUTO_INCREMENT PRIMARY KEY,
    email       VARCHAR(255) NOT NULL UNIQUE,
    created_at  TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
{% else %}
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
{% endif %}
);
"#;

const DOWN_SQL: &str = r#"-- {{ timestamp }}_init: revert

DROP TABLE IF EXISTS users;
"#;
