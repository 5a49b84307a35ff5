//! `router`: HTTP server, route table and handlers for the chosen backend.
//!
//! Handlers are plain `net/http`; each backend adapts them at the route
//! table so the handler package is the same for every framework.

use kiln_core::domain::{ConfigRecord, DomainError, FileSet};

use super::{BuiltinUnit, always};

pub const UNIT: BuiltinUnit = BuiltinUnit {
    name: "router",
    version: "1.0.0",
    description: "HTTP server, routes and handlers for the selected backend",
    dependencies: &["config"],
    enabled: always,
    blueprint,
};

fn blueprint(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("internal/server/server.go", || SERVER_GO)?;
    files.add("internal/server/routes.go", || ROUTES_GO)?;
    files.add("internal/handlers/handlers.go", || HANDLERS_GO)?;
    files.add("internal/handlers/handlers_test.go", || HANDLERS_TEST_GO)
}

const SERVER_GO: &str = r#"// Package server wires configuration, dependencies and routes together.
package server

import (
	"context"
	"fmt"
	"log/slog"
{% if backend != "fiber" %}
	"net/http"
	"time"
{% endif %}
	"{{ module_path }}/internal/config"
{% if has_database %}
	"{{ module_path }}/internal/database"
{% endif %}
{% if events %}
	"{{ module_path }}/internal/events"
{% endif %}
{% if backend == "fiber" %}
	"github.com/gofiber/fiber/v2"
{% endif %}
)

// Server is the {{ app_name }} HTTP server.
type Server struct {
	cfg    *config.Config
	logger *slog.Logger
{% if has_database %}
	db     *database.DB
{% endif %}
{% if events %}
	bus    *events.Bus
{% endif %}
{% if backend == "fiber" %}
	app    *fiber.App
{% else %}
	http   *http.Server
{% endif %}
}

// Option customizes a Server at construction time.
type Option func(*Server)
{% if has_database %}

// WithDatabase makes the connection pool available to handlers.
func WithDatabase(db *database.DB) Option {
	return func(s *Server) { s.db = db }
}
{% endif %}
{% if events %}

// WithEvents attaches the in-process event bus.
func WithEvents(bus *events.Bus) Option {
	return func(s *Server) { s.bus = bus }
}
{% endif %}

// New builds a server listening on cfg.Port.
func New(cfg *config.Config, logger *slog.Logger, opts ...Option) *Server {
	s := &Server{cfg: cfg, logger: logger}
	for _, opt := range opts {
		opt(s)
	}
{% if backend == "fiber" %}
	s.app = fiber.New(fiber.Config{AppName: cfg.AppName, DisableStartupMessage: true})
	s.routes(s.app)
{% else %}
	s.http = &http.Server{
		Addr:              fmt.Sprintf(":%d", cfg.Port),
		Handler:           s.routes(),
		ReadHeaderTimeout: 5 * time.Second,
	}
{% endif %}
	return s
}

// Start blocks serving requests until Shutdown is called.
func (s *Server) Start() error {
	s.logger.Info("listening", "port", s.cfg.Port)
{% if backend == "fiber" %}
	return s.app.Listen(fmt.Sprintf(":%d", s.cfg.Port))
{% else %}
	if err := s.http.ListenAndServe(); err != nil && err != http.ErrServerClosed {
		return err
	}
	return nil
{% endif %}
}

// Shutdown stops accepting connections and drains in-flight requests.
func (s *Server) Shutdown(ctx context.Context) error {
{% if backend == "fiber" %}
	return s.app.ShutdownWithContext(ctx)
{% else %}
	return s.http.Shutdown(ctx)
{% endif %}
}

func (s *Server) healthCheck(ctx context.Context) error {
{% if has_database %}
	return s.db.PingContext(ctx)
{% else %}
	return nil
{% endif %}
}
"#;

const ROUTES_GO: &str = r#"package server

import (
{% if backend == "chi" %}
	"net/http"
	"github.com/go-chi/chi/v5"
{% elif backend == "echo" %}
	"net/http"
	"github.com/labstack/echo/v4"
{% elif backend == "gin" %}
	"net/http"
	"github.com/gin-gonic/gin"
{% elif backend == "fiber" %}
	"github.com/gofiber/fiber/v2"
	"github.com/gofiber/fiber/v2/middleware/adaptor"
{% else %}
	"net/http"
{% endif %}
	"{{ module_path }}/internal/handlers"
	"{{ module_path }}/internal/middleware"
)
{% if backend == "chi" %}

func (s *Server) routes() http.Handler {
	r := chi.NewRouter()
	r.Use(middleware.RequestID)
	r.Use(middleware.Logger(s.logger))
	r.Use(middleware.Recoverer(s.logger))

	r.Get("/healthz", handlers.Health(s.healthCheck))
	r.Get("/api/v1/hello", handlers.Hello(s.cfg.AppName))
{% if has_ui %}
	r.Handle("/*", s.pageHandler())
{% endif %}
	return r
}
{% elif backend == "echo" %}

func (s *Server) routes() http.Handler {
	e := echo.New()
	e.HideBanner = true
	e.Use(echo.WrapMiddleware(middleware.RequestID))
	e.Use(echo.WrapMiddleware(middleware.Logger(s.logger)))
	e.Use(echo.WrapMiddleware(middleware.Recoverer(s.logger)))

	e.GET("/healthz", echo.WrapHandler(handlers.Health(s.healthCheck)))
	e.GET("/api/v1/hello", echo.WrapHandler(handlers.Hello(s.cfg.AppName)))
{% if has_ui %}
	e.GET("/*", echo.WrapHandler(s.pageHandler()))
{% endif %}
	return e
}
{% elif backend == "gin" %}

func (s *Server) routes() http.Handler {
	gin.SetMode(gin.ReleaseMode)
	r := gin.New()
	r.Use(middleware.Gin(middleware.RequestID))
	r.Use(middleware.Gin(middleware.Logger(s.logger)))
	r.Use(middleware.Gin(middleware.Recoverer(s.logger)))

	r.GET("/healthz", gin.WrapH(handlers.Health(s.healthCheck)))
	r.GET("/api/v1/hello", gin.WrapH(handlers.Hello(s.cfg.AppName)))
{% if has_ui %}
	r.NoRoute(gin.WrapH(s.pageHandler()))
{% endif %}
	return r
}
{% elif backend == "fiber" %}

func (s *Server) routes(app *fiber.App) {
	app.Use(adaptor.HTTPMiddleware(middleware.RequestID))
	app.Use(adaptor.HTTPMiddleware(middleware.Logger(s.logger)))
	app.Use(adaptor.HTTPMiddleware(middleware.Recoverer(s.logger)))

	app.Get("/healthz", adaptor.HTTPHandler(handlers.Health(s.healthCheck)))
	app.Get("/api/v1/hello", adaptor.HTTPHandler(handlers.Hello(s.cfg.AppName)))
{% if has_ui %}
	app.Use(adaptor.HTTPHandler(s.pageHandler()))
{% endif %}
}
{% else %}

func (s *Server) routes() http.Handler {
	mux := http.NewServeMux()
	mux.Handle("GET /healthz", handlers.Health(s.healthCheck))
	mux.Handle("GET /api/v1/hello", handlers.Hello(s.cfg.AppName))
{% if has_ui %}
	mux.Handle("/", s.pageHandler())
{% endif %}

	var h http.Handler = mux
	h = middleware.Recoverer(s.logger)(h)
	h = middleware.Logger(s.logger)(h)
	h = middleware.RequestID(h)
	return h
}
{% endif %}
"#;

const HANDLERS_GO: &str = r#"// Package handlers holds framework-independent HTTP handlers.
package handlers

import (
	"context"
	"encoding/json"
	"net/http"
	"time"
)

// Health reports 200 when check succeeds and 503 otherwise.
func Health(check func(context.Context) error) http.HandlerFunc {
	return func(w http.ResponseWriter, r *http.Request) {
		ctx, cancel := context.WithTimeout(r.Context(), 2*time.Second)
		defer cancel()

		if err := check(ctx); err != nil {
			writeJSON(w, http.StatusServiceUnavailable, map[string]string{
				"status": "unavailable",
				"error":  err.Error(),
			})
			return
		}
		writeJSON(w, http.StatusOK, map[string]string{"status": "ok"})
	}
}

// Hello greets the caller on behalf of the named service.
func Hello(service string) http.HandlerFunc {
	return func(w http.ResponseWriter, r *http.Request) {
		name := r.URL.Query().Get("name")
		if name == "" {
			name = "world"
		}
		writeJSON(w, http.StatusOK, map[string]string{
			"message": "hello, " + name,
			"service": service,
		})
	}
}

func writeJSON(w http.ResponseWriter, status int, body any) {
	w.Header().Set("Content-Type", "application/json")
	w.WriteHeader(status)
	_ = json.NewEncoder(w).Encode(body)
}
"#;

const HANDLERS_TEST_GO: &str = r#"package handlers

import (
	"context"
	"errors"
	"net/http"
	"net/http/httptest"
	"strings"
	"testing"
)

func TestHealthOK(t *testing.T) {
	rec := httptest.NewRecorder()
	Health(func(context.Context) error { return nil })(rec, httptest.NewRequest(http.MethodGet, "/healthz", nil))

	if rec.Code != http.StatusOK {
		t.Fatalf("status = %d, want %d", rec.Code, http.StatusOK)
	}
}

func TestHealthUnavailable(t *testing.T) {
	rec := httptest.NewRecorder()
	failing := func(context.Context) error { return errors.New("down") }
	Health(failing)(rec, httptest.NewRequest(http.MethodGet, "/healthz", nil))

	if rec.Code != http.StatusServiceUnavailable {
		t.Fatalf("status = %d, want %d", rec.Code, http.StatusServiceUnavailable)
	}
}

func TestHelloUsesName(t *testing.T) {
	rec := httptest.NewRecorder()
	Hello("{{ app_name }}")(rec, httptest.NewRequest(http.MethodGet, "/api/v1/hello?name=gopher", nil))

	if !strings.Contains(rec.Body.String(), "hello, gopher") {
		t.Fatalf("unexpected body: %s", rec.Body.String())
	}
}
"#;
