//! Evaluator-facing operators.
//!
//! [`IoUtils`] is the context an evaluator holds for the lifetime of the
//! process: the environment snapshot, the serializer registry, and the exec
//! settings are fixed when it is built and never change afterwards.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::core::convert;
use crate::core::value::Value;
use crate::error::{EvalError, EvalResult};
use crate::exec::{ExecRequest, exec};
use crate::io::config::IoConfig;
use crate::io::env::EnvSnapshot;
use crate::io::serializer::{Dispatch, SerializerRegistry};
use crate::io::value_stream::{read_value_file, write_value_file};

/// Operator identifiers and their argument counts.
pub const OPERATORS: &[(&str, usize)] = &[
    ("IODeserialize", 2),
    ("IOSerialize", 3),
    ("Serialize", 4),
    ("Deserialize", 3),
    ("IOEnv", 0),
    ("IOExec", 1),
    ("IOEnvExec", 2),
    ("IOExecTemplate", 2),
    ("IOEnvExecTemplate", 3),
    ("atoi", 1),
];

/// Operator context: environment snapshot, serializer registry, exec settings.
#[derive(Debug)]
pub struct IoUtils {
    env: EnvSnapshot,
    registry: SerializerRegistry,
    exec_timeout: Option<Duration>,
}

impl IoUtils {
    /// Capture the environment and build the registry named by `config`.
    pub fn new(config: &IoConfig) -> Result<Self> {
        config.validate()?;
        let registry = SerializerRegistry::from_names(&config.serializers)?;
        let env = EnvSnapshot::capture();
        info!(
            serializers = ?config.serializers,
            env_vars = env.len(),
            timeout_secs = ?config.exec.timeout_secs,
            "operator context initialized"
        );
        Ok(Self::from_parts(env, registry, config.exec.timeout()))
    }

    pub fn from_parts(
        env: EnvSnapshot,
        registry: SerializerRegistry,
        exec_timeout: Option<Duration>,
    ) -> Self {
        Self {
            env,
            registry,
            exec_timeout,
        }
    }

    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    /// `IODeserialize(path, compress)`: read a native value file.
    pub fn io_deserialize(&self, path: &Value, compress: &Value) -> EvalResult<Value> {
        const OP: &str = "IODeserialize";
        let path = convert::expect_str(OP, path)?;
        let compress = convert::expect_bool(OP, compress)?;
        read_value_file(Path::new(path), compress)
    }

    /// `IOSerialize(value, path, compress)`: write a native value file.
    pub fn io_serialize(&self, value: &Value, path: &Value, compress: &Value) -> EvalResult<Value> {
        const OP: &str = "IOSerialize";
        let path = convert::expect_str(OP, path)?;
        let compress = convert::expect_bool(OP, compress)?;
        write_value_file(Path::new(path), value, compress)?;
        Ok(Value::Bool(true))
    }

    /// `Serialize(value, path, backend, options)`.
    ///
    /// `FALSE` when no backend has the requested type; nothing is written then.
    pub fn serialize(
        &self,
        value: &Value,
        path: &Value,
        backend: &Value,
        options: &Value,
    ) -> EvalResult<Value> {
        const OP: &str = "Serialize";
        let path = convert::expect_str(OP, path)?;
        let backend = convert::expect_str(OP, backend)?;
        let options = convert::expect_record(OP, options)?;
        let outcome = self
            .registry
            .serialize(value, Path::new(path), backend, options)?;
        Ok(Value::Bool(matches!(outcome, Dispatch::Found(()))))
    }

    /// `Deserialize(path, backend, options)`.
    ///
    /// When no backend has the requested type the result is the sentinel
    /// `FALSE` in place of a value. Use [`SerializerRegistry::deserialize`]
    /// to tell the two apart without ambiguity.
    pub fn deserialize(&self, path: &Value, backend: &Value, options: &Value) -> EvalResult<Value> {
        const OP: &str = "Deserialize";
        let path = convert::expect_str(OP, path)?;
        let backend = convert::expect_str(OP, backend)?;
        let options = convert::expect_record(OP, options)?;
        match self
            .registry
            .deserialize(Path::new(path), backend, options)?
        {
            Dispatch::Found(value) => Ok(value),
            Dispatch::NotFound => Ok(Value::Bool(false)),
        }
    }

    /// `IOEnv`: the environment as captured when this context was built.
    pub fn io_env(&self) -> Value {
        self.env.as_value().clone()
    }

    /// `IOExec(cmd)`.
    pub fn io_exec(&self, command: &Value) -> EvalResult<Value> {
        exec(ExecRequest::literal("IOExec", command), self.exec_timeout)
    }

    /// `IOEnvExec(env, cmd)`.
    pub fn io_env_exec(&self, env: &Value, command: &Value) -> EvalResult<Value> {
        exec(
            ExecRequest::literal("IOEnvExec", command).with_env(env),
            self.exec_timeout,
        )
    }

    /// `IOExecTemplate(template, params)`.
    pub fn io_exec_template(&self, template: &Value, params: &Value) -> EvalResult<Value> {
        exec(
            ExecRequest::literal("IOExecTemplate", template).with_params(params),
            self.exec_timeout,
        )
    }

    /// `IOEnvExecTemplate(env, template, params)`.
    pub fn io_env_exec_template(
        &self,
        env: &Value,
        template: &Value,
        params: &Value,
    ) -> EvalResult<Value> {
        exec(
            ExecRequest::literal("IOEnvExecTemplate", template)
                .with_env(env)
                .with_params(params),
            self.exec_timeout,
        )
    }

    /// `atoi(s)`.
    pub fn atoi(&self, s: &Value) -> EvalResult<Value> {
        convert::parse_int("atoi", s).map(Value::Int)
    }

    /// Invoke an operator by identifier.
    #[instrument(skip(self, args), fields(args = args.len()))]
    pub fn call(&self, name: &str, args: &[Value]) -> EvalResult<Value> {
        let (operator, arity) = OPERATORS
            .iter()
            .copied()
            .find(|(op, _)| *op == name)
            .ok_or_else(|| EvalError::UnknownOperator(name.to_string()))?;
        if args.len() != arity {
            return Err(EvalError::Arity {
                operator,
                expected: arity,
                actual: args.len(),
            });
        }
        debug!("dispatching operator");

        match (operator, args) {
            ("IODeserialize", [path, compress]) => self.io_deserialize(path, compress),
            ("IOSerialize", [value, path, compress]) => self.io_serialize(value, path, compress),
            ("Serialize", [value, path, backend, options]) => {
                self.serialize(value, path, backend, options)
            }
            ("Deserialize", [path, backend, options]) => self.deserialize(path, backend, options),
            ("IOEnv", []) => Ok(self.io_env()),
            ("IOExec", [command]) => self.io_exec(command),
            ("IOEnvExec", [env, command]) => self.io_env_exec(env, command),
            ("IOExecTemplate", [template, params]) => self.io_exec_template(template, params),
            ("IOEnvExecTemplate", [env, template, params]) => {
                self.io_env_exec_template(env, template, params)
            }
            ("atoi", [s]) => self.atoi(s),
            _ => Err(EvalError::UnknownOperator(name.to_string())),
        }
    }
}
