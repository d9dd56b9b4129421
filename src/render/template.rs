//! Compiled configuration template.
//!
//! # Responsibilities
//! - Compile the template once, with the helper table registered
//! - Execute it against a [`GlobalConfig`] into a fresh buffer per call

use std::io;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, Error, ErrorKind, UndefinedBehavior, Value};
use thiserror::Error;

use crate::model::GlobalConfig;
use crate::render::functions;

/// Version of the helper table below. Bumped whenever a helper is added,
/// removed or changes its contract.
pub const HELPERS_VERSION: u32 = 1;

/// Helper names available to templates.
pub const HELPERS: [&str; 11] = [
    "iif",
    "get_servers",
    "is_shared",
    "is_default",
    "is_ca_cert",
    "hostname_regex",
    "alias_regex",
    "is_wildcard_hostname",
    "is_regex_hostname",
    "size_suffix",
    "has_suffix",
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to compile template {name}: {source}")]
    Compile {
        name: String,
        #[source]
        source: Error,
    },

    #[error("failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to execute template: {0}")]
    Execute(#[source] Error),
}

/// A compiled template, safe to share between concurrent renders.
#[derive(Debug)]
pub struct ConfigRenderer {
    env: Environment<'static>,
    name: String,
}

impl ConfigRenderer {
    /// Compile `source` under `name`.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self, RenderError> {
        let name = name.into();
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        register_helpers(&mut env);

        env.add_template_owned(name.clone(), source.into())
            .map_err(|source| RenderError::Compile {
                name: name.clone(),
                source,
            })?;

        tracing::debug!(template = %name, helpers_version = HELPERS_VERSION, "Template compiled");
        Ok(Self { env, name })
    }

    /// Read and compile a template file. The file name becomes the template
    /// name.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(name, source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the document for `config`.
    pub fn render(&self, config: &GlobalConfig) -> Result<Vec<u8>, RenderError> {
        let template = self.env.get_template(&self.name).map_err(RenderError::Execute)?;
        let document = template
            .render(Value::from_serialize(config))
            .map_err(RenderError::Execute)?;
        Ok(document.into_bytes())
    }
}

fn register_helpers(env: &mut Environment<'static>) {
    env.add_global("helpers_version", HELPERS_VERSION);

    env.add_function("iif", |condition: Value, when_true: Value, when_false: Value| {
        functions::iif(condition.is_true(), when_true, when_false)
    });
    env.add_function("get_servers", |servers: Vec<Value>, single: Option<Value>| {
        let single = single.filter(|s| !s.is_none());
        Value::from(
            functions::effective_servers(&servers, single.as_ref())
                .into_iter()
                .cloned()
                .collect::<Vec<_>>(),
        )
    });
    env.add_function("is_shared", |single: Option<Value>| {
        single.map_or(true, |s| s.is_none())
    });
    env.add_function("is_default", |single: Option<Value>| flag(single, "is_default_server"));
    env.add_function("is_ca_cert", |single: Option<Value>| flag(single, "is_ca_cert"));
    env.add_function("hostname_regex", functions::hostname_regex);
    env.add_function("alias_regex", functions::alias_regex);
    env.add_function("is_wildcard_hostname", functions::is_wildcard_hostname);
    env.add_function("is_regex_hostname", functions::is_regex_hostname);
    env.add_function("size_suffix", functions::size_suffix);
    env.add_function("has_suffix", functions::has_suffix);
}

/// Boolean attribute of a single host; false when there is none.
fn flag(single: Option<Value>, attr: &str) -> Result<bool, Error> {
    match single {
        Some(host) if !host.is_none() => host
            .get_attr(attr)
            .map(|v| v.is_true())
            .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("{attr}: {e}"))),
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxySettings;
    use crate::model::HostRecord;

    fn render(source: &str, config: &GlobalConfig) -> Result<String, RenderError> {
        let renderer = ConfigRenderer::new("test", source)?;
        renderer
            .render(config)
            .map(|bytes| String::from_utf8(bytes).unwrap())
    }

    fn config() -> GlobalConfig {
        let mut config = GlobalConfig::new(ProxySettings::default());
        config.hosts.push(HostRecord::new("app.local"));
        let mut mtls = HostRecord::new("*.secure.local");
        mtls.is_ca_cert = true;
        config.hosts.push(mtls);
        config
    }

    #[test]
    fn test_helpers() {
        let out = render(
            "{{ hostname_regex(hosts[1].hostname) }}|{{ alias_regex('a.b') }}|\
             {{ is_wildcard_hostname(hosts[1].hostname) }}|{{ is_regex_hostname('a.b') }}|\
             {{ size_suffix('10m') }}|{{ size_suffix('10q') }}|{{ has_suffix('web-443', '-443') }}|\
             {{ iif(true, 'yes', 'no') }}|{{ helpers_version }}",
            &config(),
        )
        .unwrap();

        assert_eq!(
            out,
            r"^([^\.]+)\.secure\.local(:[0-9]+)?$|^a\.b(:[0-9]+)?$|true|false|10485760|10q|true|yes|1"
        );
    }

    #[test]
    fn test_single_server_helpers() {
        let source = "{% for h in get_servers(hosts, single) %}{{ h.hostname }} {% endfor %}\
                      {{ is_shared(single) }} {{ is_ca_cert(single) }} {{ is_default(single) }}";

        let env_shared = render(&source.replace("single", "none"), &config()).unwrap();
        assert_eq!(env_shared, "app.local *.secure.local true false false");

        let single = render(&source.replace("single", "hosts[1]"), &config()).unwrap();
        assert_eq!(single, "*.secure.local false true false");
    }

    #[test]
    fn test_compile_failure() {
        let err = ConfigRenderer::new("broken", "{% for x in %}").unwrap_err();
        assert!(matches!(err, RenderError::Compile { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_execute_failure_is_recoverable() {
        let renderer = ConfigRenderer::new("strict", "{{ missing.field }}").unwrap();
        assert!(matches!(renderer.render(&config()), Err(RenderError::Execute(_))));
        assert!(matches!(renderer.render(&config()), Err(RenderError::Execute(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ConfigRenderer::from_file(Path::new("/nonexistent/haproxy.tmpl")).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
