//! Pluggable serializer backends and the registry that dispatches to them.
//!
//! The [`SerializerBackend`] trait decouples the `Serialize`/`Deserialize`
//! operators from any particular file format. Backends are registered
//! explicitly, either from the compiled-in catalog ([`builtin`]) or through
//! [`SerializerRegistry::register`]; tests register fakes the same way.

mod json;
mod raw;

use std::fmt;
use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::{debug, instrument, warn};

use crate::core::value::{Record, Value};
use crate::error::{EvalError, EvalResult};

pub use json::JsonSerializer;
pub use raw::RawSerializer;

/// Type names of the compiled-in backends, in default lookup order.
pub const BUILTIN_TYPES: &[&str] = &[RawSerializer::TYPE, JsonSerializer::TYPE];

/// A named codec that writes values to files and reads them back.
///
/// Implementations are stateless; `options` carries per-call settings and each
/// backend reads only the keys it understands.
pub trait SerializerBackend: Send + Sync {
    /// Identifier callers use to select this backend (e.g. `"RAW"`).
    fn type_name(&self) -> &str;

    fn serialize(&self, value: &Value, path: &Path, options: &Record) -> EvalResult<()>;

    fn deserialize(&self, path: &Path, options: &Record) -> EvalResult<Value>;
}

/// Outcome of a registry dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<T> {
    /// A backend with the requested type handled the call.
    Found(T),
    /// No registered backend has the requested type. Nothing was touched.
    NotFound,
}

/// Instantiate a compiled-in backend by type name.
pub fn builtin(type_name: &str) -> Option<Box<dyn SerializerBackend>> {
    match type_name {
        RawSerializer::TYPE => Some(Box::new(RawSerializer)),
        JsonSerializer::TYPE => Some(Box::new(JsonSerializer)),
        _ => None,
    }
}

/// Ordered set of backends, looked up by exact type name.
///
/// Populated once at startup and read-only afterwards.
#[derive(Default)]
pub struct SerializerRegistry {
    backends: Vec<Box<dyn SerializerBackend>>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every compiled-in backend.
    pub fn with_builtins() -> Self {
        Self::from_names(BUILTIN_TYPES).unwrap_or_default()
    }

    /// Registry holding the named compiled-in backends, in the given order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut registry = Self::new();
        for name in names {
            let name = name.as_ref();
            let backend = builtin(name).ok_or_else(|| anyhow!("unknown serializer {name}"))?;
            registry.register_boxed(backend);
        }
        debug!(types = ?registry.types().collect::<Vec<_>>(), "serializer registry ready");
        Ok(registry)
    }

    pub fn register<B: SerializerBackend + 'static>(&mut self, backend: B) {
        self.register_boxed(Box::new(backend));
    }

    /// Add a backend after the existing ones. When its type name is already
    /// taken the earlier backend keeps answering lookups.
    pub fn register_boxed(&mut self, backend: Box<dyn SerializerBackend>) {
        if self.lookup(backend.type_name()).is_some() {
            warn!(
                type_name = backend.type_name(),
                "duplicate serializer type, earlier registration wins"
            );
        }
        self.backends.push(backend);
    }

    /// First registered backend whose type equals `type_name`.
    pub fn lookup(&self, type_name: &str) -> Option<&dyn SerializerBackend> {
        self.backends
            .iter()
            .find(|backend| backend.type_name() == type_name)
            .map(|backend| &**backend)
    }

    /// Registered type names, in lookup order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(|backend| backend.type_name())
    }

    #[instrument(skip(self, value, path, options), fields(path = %path.display()))]
    pub fn serialize(
        &self,
        value: &Value,
        path: &Path,
        type_name: &str,
        options: &Record,
    ) -> EvalResult<Dispatch<()>> {
        let Some(backend) = self.lookup(type_name) else {
            debug!("no serializer registered for type");
            return Ok(Dispatch::NotFound);
        };
        backend.serialize(value, path, options)?;
        Ok(Dispatch::Found(()))
    }

    #[instrument(skip(self, path, options), fields(path = %path.display()))]
    pub fn deserialize(
        &self,
        path: &Path,
        type_name: &str,
        options: &Record,
    ) -> EvalResult<Dispatch<Value>> {
        let Some(backend) = self.lookup(type_name) else {
            debug!("no serializer registered for type");
            return Ok(Dispatch::NotFound);
        };
        backend.deserialize(path, options).map(Dispatch::Found)
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.types()).finish()
    }
}

/// Required boolean option, e.g. `compress`.
pub(crate) fn bool_option(backend: &str, options: &Record, key: &'static str) -> EvalResult<bool> {
    optional_bool_option(backend, options, key)?.ok_or_else(|| EvalError::Option {
        backend: backend.to_string(),
        key,
        expected: "boolean",
    })
}

/// Boolean option that may be absent. Present but not boolean is an error.
pub(crate) fn optional_bool_option(
    backend: &str,
    options: &Record,
    key: &'static str,
) -> EvalResult<Option<bool>> {
    match options.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(EvalError::Option {
            backend: backend.to_string(),
            key,
            expected: "boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::test_support::sample_value;

    /// Records calls without touching the filesystem.
    struct CountingBackend {
        name: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl SerializerBackend for CountingBackend {
        fn type_name(&self) -> &str {
            self.name
        }

        fn serialize(&self, _value: &Value, _path: &Path, _options: &Record) -> EvalResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn deserialize(&self, _path: &Path, _options: &Record) -> EvalResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Value::string(self.name))
        }
    }

    #[test]
    fn unknown_type_is_not_found_and_writes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("out.bin");
        let registry = SerializerRegistry::with_builtins();

        let outcome = registry
            .serialize(&sample_value(), &path, "UNKNOWN_TYPE", &Record::new())
            .expect("dispatch");
        assert_eq!(outcome, Dispatch::NotFound);
        assert!(!path.exists());

        let outcome = registry
            .deserialize(&path, "UNKNOWN_TYPE", &Record::new())
            .expect("dispatch");
        assert_eq!(outcome, Dispatch::NotFound);
    }

    #[test]
    fn lookup_is_exact_match() {
        let registry = SerializerRegistry::with_builtins();
        assert!(registry.lookup("RAW").is_some());
        assert!(registry.lookup("raw").is_none());
        assert!(registry.lookup("RAW ").is_none());
    }

    #[test]
    fn first_registration_wins_on_duplicate_type() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut registry = SerializerRegistry::new();
        registry.register(CountingBackend {
            name: "FAKE",
            calls: first.clone(),
        });
        registry.register(CountingBackend {
            name: "FAKE",
            calls: second.clone(),
        });

        let outcome = registry
            .deserialize(Path::new("/unused"), "FAKE", &Record::new())
            .expect("dispatch");
        assert_eq!(outcome, Dispatch::Found(Value::string("FAKE")));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn from_names_keeps_order_and_rejects_unknown() {
        let registry = SerializerRegistry::from_names(&["JSON", "RAW"]).expect("registry");
        assert_eq!(registry.types().collect::<Vec<_>>(), vec!["JSON", "RAW"]);
        assert!(SerializerRegistry::from_names(&["XML"]).is_err());
    }

    #[test]
    fn bool_option_checks_presence_and_type() {
        let options = Record::from([
            ("compress".to_string(), Value::Bool(true)),
            ("pretty".to_string(), Value::Int(1)),
        ]);
        assert!(bool_option("RAW", &options, "compress").expect("option"));
        assert!(matches!(
            bool_option("RAW", &Record::new(), "compress"),
            Err(EvalError::Option { key: "compress", .. })
        ));
        assert!(optional_bool_option("JSON", &options, "pretty").is_err());
        assert_eq!(
            optional_bool_option("JSON", &Record::new(), "pretty").expect("option"),
            None
        );
    }
}
