//! `project`: module file, entry point, and repository housekeeping.

use kiln_core::domain::{ConfigRecord, DomainError, FileSet};

use super::{BuiltinUnit, always};

pub const UNIT: BuiltinUnit = BuiltinUnit {
    name: "project",
    version: "1.0.0",
    description: "Go module, server entry point, README, Makefile and ignore rules",
    dependencies: &[],
    enabled: always,
    blueprint,
};

fn blueprint(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("go.mod", || GO_MOD)?;
    files.add("cmd/server/main.go", || MAIN_GO)?;
    files.add("README.md", || README)?;
    files.add(".gitignore", || GITIGNORE)?;
    files.add("Makefile", || MAKEFILE)?;
    files.add("LICENSE", || LICENSE)
}

const GO_MOD: &str = r#"module {{ module_path }}

go 1.22
{% if backend != "std" or has_database %}

require (
{% if backend == "chi" %}
	github.com/go-chi/chi/v5 v5.0.12
{% elif backend == "echo" %}
	github.com/labstack/echo/v4 v4.12.0
{% elif backend == "fiber" %}
	github.com/gofiber/fiber/v2 v2.52.5
{% elif backend == "gin" %}
	github.com/gin-gonic/gin v1.10.0
{% endif %}
{% if database == "postgres" %}
	github.com/jackc/pgx/v5 v5.6.0
{% elif database == "mysql" %}
	github.com/go-sql-driver/mysql v1.8.1
{% elif database == "sqlite" %}
	modernc.org/sqlite v1.30.1
{% elif database == "mongo" %}
	go.mongodb.org/mongo-driver v1.16.0
{% endif %}
)
{% endif %}
"#;

const MAIN_GO: &str = r#"// Command server runs the {{ app_name }} HTTP service.
package main

import (
	"context"
	"errors"
	"log/slog"
	"os"
	"os/signal"
	"syscall"
	"time"
	"{{ module_path }}/internal/config"
{% if has_database %}
	"{{ module_path }}/internal/database"
{% endif %}
{% if events %}
	"{{ module_path }}/internal/events"
{% endif %}
	"{{ module_path }}/internal/server"
)

func main() {
	logger := slog.New(slog.NewTextHandler(os.Stdout, nil))

	if err := run(logger); err != nil {
		logger.Error("server stopped", "error", err)
		os.Exit(1)
	}
}

func run(logger *slog.Logger) error {
	cfg, err := config.Load()
	if err != nil {
		return err
	}

	var opts []server.Option
{% if has_database %}

	db, err := database.Open(cfg.DatabaseURL)
	if err != nil {
		return err
	}
	defer db.Close()
	opts = append(opts, server.WithDatabase(db))
{% endif %}
{% if events %}

	bus := events.NewBus()
	defer bus.Close()
	opts = append(opts, server.WithEvents(bus))
{% endif %}

	srv := server.New(cfg, logger, opts...)

	ctx, stop := signal.NotifyContext(context.Background(), os.Interrupt, syscall.SIGTERM)
	defer stop()

	errCh := make(chan error, 1)
	go func() { errCh <- srv.Start() }()

	select {
	case err := <-errCh:
		return err
	case <-ctx.Done():
	}

	shutdownCtx, cancel := context.WithTimeout(context.Background(), 10*time.Second)
	defer cancel()
	if err := srv.Shutdown(shutdownCtx); err != nil && !errors.Is(err, context.Canceled) {
		return err
	}
	logger.Info("shutdown complete")
	return nil
}
"#;

const README: &str = r#"# {{ app_name }}

{% if description %}
{{ description }}

{% endif %}
A Go web service built on **{{ backend }}**{% if has_database %} with **{{ database }}**{% endif %}{% if has_ui %} and a **{{ ui }}** front end{% endif %}.

## Getting started

```sh
cp .env.example .env
make run
```

The server listens on port {{ port }} by default. Check it with:

```sh
curl http://localhost:{{ port }}/healthz
```

## Layout

| Path | Purpose |
|------|---------|
| `cmd/server` | entry point |
| `internal/config` | environment-based configuration |
| `internal/server` | HTTP server and routes |
| `internal/handlers` | request handlers |
| `internal/middleware` | request logging, recovery, request IDs |
{% if has_database %}
| `internal/database` | {{ database }} connection |
{% endif %}
{% if has_sql %}
| `migrations` | SQL migrations |
{% endif %}
{% if events %}
| `internal/events` | in-process event bus |
{% endif %}
{% if has_ui %}
| `web` | templates and static assets |
{% endif %}

---

Generated by kiln ({{ fingerprint }}).
"#;

const GITIGNORE: &str = r#"# Binaries
/bin/
*.exe
*.test
*.out

# Environment
.env

# Editors
.idea/
.vscode/
*.swp
{% if database == "sqlite" %}

# Local database
*.db
{% endif %}
{% if ui in ["react", "vue", "svelte"] %}

# Front end
web/node_modules/
web/dist/
{% endif %}
"#;

const MAKEFILE: &str = r#"BINARY := bin/{{ app_name_kebab }}

.PHONY: build run test lint clean{% if docker %} docker{% endif %}


build:
	go build -o $(BINARY) ./cmd/server

run:
	go run ./cmd/server

test:
	go test ./...

lint:
	go vet ./...

clean:
	rm -rf bin
{% if docker %}

docker:
	docker build -t {{ app_name_kebab }}:latest .
{% endif %}
"#;

const LICENSE: &str = r#"MIT License

Copyright (c) {{ year }} {% if author %}{{ author }}{% else %}The {{ app_name }} authors{% endif %}


Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
"#;
