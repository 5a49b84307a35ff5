//! `docker`: container image and local compose stack.

use kiln_core::domain::{ConfigRecord, DomainError, FileSet};

use super::BuiltinUnit;

pub const UNIT: BuiltinUnit = BuiltinUnit {
    name: "docker",
    version: "1.0.0",
    description: "Multi-stage Dockerfile and docker-compose stack",
    dependencies: &["project"],
    enabled: |record| record.docker(),
    blueprint,
};

fn blueprint(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("Dockerfile", || DOCKERFILE)?;
    files.add(".dockerignore", || DOCKERIGNORE)?;
    files.add("docker-compose.yml", || COMPOSE)
}

const DOCKERFILE: &str = r#"# syntax=docker/dockerfile:1

FROM golang:1.22-alpine AS build
WORKDIR /src
COPY go.mod go.sum* ./
RUN go mod download
COPY . .
RUN CGO_ENABLED=0 go build -trimpath -ldflags="-s -w" -o /out/{{ app_name_kebab }} ./cmd/server

FROM gcr.io/distroless/static-debian12
WORKDIR /app
COPY --from=build /out/{{ app_name_kebab }} /app/{{ app_name_kebab }}
{% if has_ui %}
COPY --from=build /src/web /app/web
{% endif %}
{% if has_sql %}
COPY --from=build /src/migrations /app/migrations
{% endif %}
ENV PORT={{ port }}
EXPOSE {{ port }}
USER nonroot:nonroot
ENTRYPOINT ["/app/{{ app_name_kebab }}"]
"#;

const DOCKERIGNORE: &str = r#".git
.env
bin/
*.test
{% if has_ui %}
web/node_modules/
{% endif %}
"#;

const COMPOSE: &str = r#"services:
  app:
    build: .
    ports:
      - "{{ port }}:{{ port }}"
    environment:
      APP_ENV: development
      PORT: "{{ port }}"
{% if database == "postgres" %}
      DATABASE_URL: postgres://postgres:postgres@db:5432/{{ app_name_snake }}?sslmode=disable
    depends_on:
      - db

  db:
    image: postgres:16-alpine
    environment:
      POSTGRES_USER: postgres
      POSTGRES_PASSWORD: postgres
      POSTGRES_DB: {{ app_name_snake }}
    ports:
      - "5432:5432"
    volumes:
      - db-data:/var/lib/postgresql/data

volumes:
  db-data:
{% elif database == "mysql" %}
      DATABASE_URL: root:root@tcp(db:3306)/{{ app_name_snake }}?parseTime=true
    depends_on:
      - db

  db:
    image: mysql:8.4
    environment:
      MYSQL_ROOT_PASSWORD: root
      MYSQL_DATABASE: {{ app_name_snake }}
    ports:
      - "3306:3306"
    volumes:
      - db-data:/var/lib/mysql

volumes:
  db-data:
{% elif database == "mongo" %}
      DATABASE_URL: mongodb://db:27017/{{ app_name_snake }}
    depends_on:
      - db

  db:
    image: mongo:7
    ports:
      - "27017:27017"
    volumes:
      - db-data:/data/db

volumes:
  db-data:
{% elif database == "sqlite" %}
      DATABASE_URL: file:/data/{{ app_name_snake }}.db
    volumes:
      - app-data:/data

volumes:
  app-data:
{% endif %}
"#;
