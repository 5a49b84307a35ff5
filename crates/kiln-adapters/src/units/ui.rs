//! `ui`: server-rendered pages plus front-end assets.
//!
//! Page templates are Go `html/template` files. Their Go actions are wrapped
//! in `{% raw %}` so only the record fields are substituted at generation
//! time, and those substitutions are HTML-escaped.

use kiln_core::domain::{ConfigRecord, DomainError, FileSet, UiFramework};

use super::BuiltinUnit;

pub const UNIT: BuiltinUnit = BuiltinUnit {
    name: "ui",
    version: "1.0.0",
    description: "Page templates, static assets and front-end bootstrap",
    dependencies: &["router"],
    enabled: |record| record.ui().is_some(),
    blueprint,
};

fn blueprint(record: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("internal/server/pages.go", || PAGES_GO)?;
    files.add("web/templates/layout.html", || LAYOUT_HTML)?;
    files.add("web/templates/index.html", || INDEX_HTML)?;
    files.add("web/static/css/app.css", || APP_CSS)?;
    files.add("web/static/js/app.js", || APP_JS)?;

    let bundled = matches!(
        record.ui(),
        UiFramework::React | UiFramework::Vue | UiFramework::Svelte
    );
    files.add_if(bundled, "web/package.json", || PACKAGE_JSON)?;
    files.add_if(bundled, "web/src/main.js", || MAIN_JS)?;
    files.add_if(
        record.ui() == UiFramework::Svelte,
        "web/src/App.svelte",
        || APP_SVELTE,
    )
}

const PAGES_GO: &str = r#"package server

import (
	"html/template"
	"net/http"
)

// pageHandler serves rendered pages and files under /static/.
func (s *Server) pageHandler() http.Handler {
	tmpl := template.Must(template.ParseGlob("web/templates/*.html"))

	mux := http.NewServeMux()
	mux.Handle("/static/", http.StripPrefix("/static/", http.FileServer(http.Dir("web/static"))))
	mux.HandleFunc("/", func(w http.ResponseWriter, r *http.Request) {
		if r.URL.Path != "/" {
			http.NotFound(w, r)
			return
		}
		data := map[string]any{"Title": s.cfg.AppName}
		if err := tmpl.ExecuteTemplate(w, "index.html", data); err != nil {
			s.logger.Error("render page", "error", err)
			http.Error(w, "internal error", http.StatusInternalServerError)
		}
	})
	return mux
}
"#;

const LAYOUT_HTML: &str = r##"{% raw %}{{ define "layout" }}{% endraw %}
<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="description" content="{{ description }}">
  <title>{% raw %}{{ .Title }}{% endraw %}</title>
  <link rel="stylesheet" href="/static/css/app.css">
{% if ui == "htmx" %}
  <script src="https://unpkg.com/htmx.org@1.9.12" defer></script>
{% endif %}
</head>
<body>
  <main id="app">
    {% raw %}{{ template "content" . }}{% endraw %}

  </main>
  <script src="/static/js/app.js" defer></script>
</body>
</html>
{% raw %}{{ end }}{% endraw %}

"##;

const INDEX_HTML: &str = r##"{% raw %}{{ template "layout" . }}{% endraw %}

{% raw %}{{ define "content" }}{% endraw %}

<h1>{{ app_name }}</h1>
{% if description %}
<p class="lead">{{ description }}</p>
{% endif %}
{% if ui == "htmx" %}
<button hx-get="/api/v1/hello" hx-target="#greeting" hx-swap="innerHTML">Say hello</button>
<pre id="greeting"></pre>
{% else %}
<div id="root" data-framework="{{ ui }}"></div>
{% endif %}
{% raw %}{{ end }}{% endraw %}

"##;

const APP_CSS: &str = r#":root {
  --fg: #1f2328;
  --bg: #ffffff;
  --accent: #0969da;
}

body {
  margin: 0;
  font-family: system-ui, sans-serif;
  color: var(--fg);
  background: var(--bg);
}

main {
  max-width: 48rem;
  margin: 4rem auto;
  padding: 0 1rem;
}

button {
  padding: 0.5rem 1rem;
  border: 1px solid var(--accent);
  border-radius: 6px;
  background: transparent;
  color: var(--accent);
  cursor: pointer;
}
"#;

const APP_JS: &str = r#"// {{ app_name }} client-side helpers.
document.addEventListener("DOMContentLoaded", () => {
  document.documentElement.dataset.ui = "{{ ui }}";
});
"#;

const PACKAGE_JSON: &str = r#"{
  "name": "{{ app_name_kebab }}-web",
  "private": true,
  "version": "0.1.0",
  "type": "module",
  "scripts": {
    "dev": "vite",
    "build": "vite build --outDir ../web/static/js/dist"
  },
  "dependencies": {
{% if ui == "react" %}
    "react": "^18.3.1",
    "react-dom": "^18.3.1"
{% elif ui == "vue" %}
    "vue": "^3.4.0"
{% else %}
    "svelte": "^4.2.0"
{% endif %}
  },
  "devDependencies": {
{% if ui == "svelte" %}
    "@sveltejs/vite-plugin-svelte": "^3.1.0",
{% endif %}
    "vite": "^5.3.0"
  }
}
"#;

const MAIN_JS: &str = r##"{% if ui == "react" %}
import React from "react";
import { createRoot } from "react-dom/client";

function App() {
  return React.createElement("p", null, "Hello from {{ app_name }}");
}

createRoot(document.getElementById("root")).render(React.createElement(App));
{% elif ui == "vue" %}
import { createApp, h } from "vue";

createApp({ render: () => h("p", "Hello from {{ app_name }}") }).mount("#root");
{% else %}
import App from "./App.svelte";

const app = new App({
  target: document.getElementById("root"),
  props: { name: "{{ app_name }}" },
});

export default app;
{% endif %}

"##;

const APP_SVELTE: &str = r#"<script>
  export let name;
</script>

<p>Hello from {name}</p>
"#;
