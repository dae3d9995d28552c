use orion_error::prelude::*;

use rulex_config::EngineConfig;
use rulex_lang::ast::Expression;
use rulex_lang::{ParseError, ParseLimits, Value, parse_expression_with};

use crate::error::{CoreReason, CoreResult};
use crate::eval::evaluate;
use crate::event::{EventContext, FieldSource};

/// Parse-once, evaluate-many facade.
///
/// Holds only the parse limits, so one engine can be shared by any number of
/// threads along with the expressions it produced.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    limits: ParseLimits,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_limits(ParseLimits::from(&config.limits))
    }

    pub fn with_limits(limits: ParseLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ParseLimits {
        &self.limits
    }

    /// Parse with the typed error, for callers that map codes themselves.
    pub fn try_parse(&self, source: &str) -> Result<Expression, ParseError> {
        match parse_expression_with(source, &self.limits) {
            Ok(expr) => {
                rx_debug!(parse, len = source.len(), "expression parsed");
                Ok(expr)
            }
            Err(e) => {
                rx_debug!(
                    parse,
                    code = e.code(),
                    position = e.position,
                    error = %e,
                    "expression rejected"
                );
                Err(e)
            }
        }
    }

    /// Decode `event_json`, evaluate and render, with the typed reason.
    pub fn try_evaluate(&self, expr: &Expression, event_json: &str) -> Result<String, CoreReason> {
        let ctx = EventContext::from_json(event_json).inspect_err(|e| {
            rx_debug!(eval, error = %e, "event payload rejected");
        })?;
        rx_trace!(eval, fields = ctx.len(), "event decoded");
        let value = self.try_evaluate_value(expr, &ctx)?;
        Ok(value.render())
    }

    pub fn try_evaluate_value(
        &self,
        expr: &Expression,
        source: &dyn FieldSource,
    ) -> Result<Value, CoreReason> {
        match evaluate(expr, source) {
            Ok(value) => {
                rx_debug!(eval, kind = %value.kind(), "expression evaluated");
                Ok(value)
            }
            Err(e) => {
                rx_debug!(eval, code = e.code(), node = %e.node, error = %e.kind, "evaluation failed");
                Err(e.into())
            }
        }
    }

    pub fn parse(&self, source: &str) -> CoreResult<Expression> {
        self.try_parse(source).map_err(|e| {
            StructError::from(CoreReason::from(e)).with_detail(format!("parsing {source:?}"))
        })
    }

    pub fn evaluate(&self, expr: &Expression, event_json: &str) -> CoreResult<String> {
        self.try_evaluate(expr, event_json)
            .map_err(|reason| StructError::from(reason).with_detail("evaluating event payload"))
    }

    pub fn evaluate_value(&self, expr: &Expression, source: &dyn FieldSource) -> CoreResult<Value> {
        self.try_evaluate_value(expr, source)
            .map_err(|reason| StructError::from(reason).with_detail("evaluating field source"))
    }
}
