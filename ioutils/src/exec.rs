//! Process bridge shared by the four exec operators.
//!
//! Every variant runs the same pipeline: validate and convert the arguments,
//! optionally expand command templates, launch the process with any
//! environment overrides merged over the inherited environment, capture both
//! output streams, and package the result record.

use std::time::Duration;

use tracing::{debug, instrument};

use crate::core::convert;
use crate::core::template::format_template;
use crate::core::value::Value;
use crate::error::{EvalError, EvalResult};
use crate::io::process::{CommandSpec, run_command};

/// Arguments of one exec operator call, still unvalidated.
#[derive(Debug, Clone, Copy)]
pub struct ExecRequest<'a> {
    /// Operator name reported in shape errors.
    pub operator: &'static str,
    /// Record of variables to merge into the child's environment.
    pub env: Option<&'a Value>,
    /// Command tokens, or format templates when `params` is set.
    pub command: &'a Value,
    /// Positional template arguments.
    pub params: Option<&'a Value>,
}

impl<'a> ExecRequest<'a> {
    pub fn literal(operator: &'static str, command: &'a Value) -> Self {
        Self {
            operator,
            env: None,
            command,
            params: None,
        }
    }

    pub fn with_env(mut self, env: &'a Value) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_params(mut self, params: &'a Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Validate and convert into an argv-style invocation.
    pub fn to_spec(self) -> EvalResult<CommandSpec> {
        let operator = self.operator;
        let overrides = match self.env {
            Some(env) => convert::env_overrides(operator, env)?,
            None => Vec::new(),
        };

        let tokens = convert::strings(operator, self.command)?;
        let argv = match self.params {
            Some(params) => {
                let params = convert::strings(operator, params)?;
                tokens
                    .iter()
                    .map(|token| {
                        format_template(token, &params)
                            .map_err(|source| EvalError::Format { operator, source })
                    })
                    .collect::<EvalResult<Vec<_>>>()?
            }
            None => tokens,
        };

        CommandSpec::from_argv(argv)
            .map(|spec| spec.with_env(overrides))
            .ok_or_else(|| EvalError::shape(operator, "non-empty sequence", self.command))
    }
}

/// Run the request and return `[exitValue |-> .., stdout |-> .., stderr |-> ..]`.
///
/// A non-zero exit code is returned as data, never as an error.
#[instrument(skip_all, fields(operator = request.operator))]
pub fn exec(request: ExecRequest<'_>, timeout: Option<Duration>) -> EvalResult<Value> {
    let spec = request.to_spec()?;
    debug!(argv_len = spec.args.len() + 1, "exec request validated");
    let output = run_command(&spec, timeout)?;
    Ok(output.into_value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_tokens_pass_through_unchanged() {
        let command = Value::tuple(["echo", "a b", "$HOME", "'q'"]);
        let spec = ExecRequest::literal("IOExec", &command)
            .to_spec()
            .expect("spec");
        assert_eq!(spec.program, "echo");
        assert_eq!(spec.args, vec!["a b", "$HOME", "'q'"]);
        assert!(spec.env.is_empty());
    }

    #[test]
    fn templates_are_expanded_per_token() {
        let template = Value::tuple(["echo", "%s", "%2$s-%1$s"]);
        let params = Value::tuple(["x", "y"]);
        let spec = ExecRequest::literal("IOExecTemplate", &template)
            .with_params(&params)
            .to_spec()
            .expect("spec");
        assert_eq!(spec.program, "echo");
        assert_eq!(spec.args, vec!["x", "y-x"]);
    }

    #[test]
    fn template_arity_errors_name_the_operator() {
        let template = Value::tuple(["echo", "%s %s"]);
        let params = Value::tuple(["x"]);
        let err = ExecRequest::literal("IOExecTemplate", &template)
            .with_params(&params)
            .to_spec()
            .expect_err("format error");
        assert!(matches!(
            err,
            EvalError::Format {
                operator: "IOExecTemplate",
                ..
            }
        ));
    }

    #[test]
    fn env_overrides_are_validated() {
        let command = Value::tuple(["env"]);
        let env = Value::tuple(["FOO=bar"]);
        let err = ExecRequest::literal("IOEnvExec", &command)
            .with_env(&env)
            .to_spec()
            .expect_err("shape error");
        assert!(err.to_string().contains("should be a record"));
    }

    #[test]
    fn empty_command_is_a_shape_error() {
        let command = Value::Tuple(Vec::new());
        let err = ExecRequest::literal("IOExec", &command)
            .to_spec()
            .expect_err("shape error");
        assert!(matches!(
            err,
            EvalError::ArgumentShape {
                expected: "non-empty sequence",
                ..
            }
        ));
    }
}
