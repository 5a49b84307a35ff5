//! `config`: environment-driven configuration package.

use kiln_core::domain::{ConfigRecord, DomainError, FileSet};

use super::{BuiltinUnit, always};

pub const UNIT: BuiltinUnit = BuiltinUnit {
    name: "config",
    version: "1.0.0",
    description: "Configuration loaded from environment variables with defaults",
    dependencies: &["project"],
    enabled: always,
    blueprint,
};

fn blueprint(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("internal/config/config.go", || CONFIG_GO)?;
    files.add("internal/config/config_test.go", || CONFIG_TEST_GO)?;
    files.add(".env.example", || ENV_EXAMPLE)
}

const CONFIG_GO: &str = r#"// Package config loads runtime settings from the environment.
package config

import (
	"fmt"
	"os"
	"strconv"
)

// Config holds every setting the service reads at startup.
type Config struct {
	AppName string
	Env     string
	Port    int
{% if has_database %}
	DatabaseURL string
{% endif %}
}

// Load reads the environment, falling back to generated defaults.
func Load() (*Config, error) {
	port, err := strconv.Atoi(getenv("PORT", "{{ port }}"))
	if err != nil {
		return nil, fmt.Errorf("config: invalid PORT: %w", err)
	}
	if port <= 0 || port > 65535 {
		return nil, fmt.Errorf("config: PORT out of range: %d", port)
	}

	cfg := &Config{
		AppName: getenv("APP_NAME", "{{ app_name }}"),
		Env:     getenv("APP_ENV", "development"),
		Port:    port,
{% if has_database %}
		DatabaseURL: getenv("DATABASE_URL", "{{ database_url }}"),
{% endif %}
	}
	return cfg, nil
}

func getenv(key, fallback string) string {
	if v, ok := os.LookupEnv(key); ok && v != "" {
		return v
	}
	return fallback
}
"#;

const CONFIG_TEST_GO: &str = r#"package config

import (
	"testing"
)

func TestLoadDefaults(t *testing.T) {
	t.Setenv("PORT", "")
	t.Setenv("APP_NAME", "")

	cfg, err := Load()
	if err != nil {
		t.Fatalf("Load: %v", err)
	}
	if cfg.Port != {{ port }} {
		t.Errorf("Port = %d, want {{ port }}", cfg.Port)
	}
	if cfg.AppName != "{{ app_name }}" {
		t.Errorf("AppName = %q", cfg.AppName)
	}
}

func TestLoadRejectsBadPort(t *testing.T) {
	t.Setenv("PORT", "not-a-number")
	if _, err := Load(); err == nil {
		t.Fatal("expected an error for a non-numeric PORT")
	}
}
"#;

const ENV_EXAMPLE: &str = r#"APP_NAME={{ app_name }}
APP_ENV=development
PORT={{ port }}
{% if has_database %}
DATABASE_URL={{ database_url }}
{% endif %}
"#;
