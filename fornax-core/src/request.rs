use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_STEPS: usize = 20;
pub const DEFAULT_GUIDANCE: f64 = 4.5;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_WIDTH: usize = 1024;
pub const DEFAULT_HEIGHT: usize = 1024;

/// Wire-format generation request.
///
/// Numeric fields arrive as raw JSON values so that both numbers and numeric
/// strings coming off the form are accepted; [`GenerationRequest::resolve`]
/// coerces them. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub steps: Option<Value>,
    #[serde(default)]
    pub guidance: Option<Value>,
    #[serde(default)]
    pub seed: Option<Value>,
    #[serde(default)]
    pub width: Option<Value>,
    #[serde(default)]
    pub height: Option<Value>,
}

/// Fully resolved parameters handed to the pipeline. No range validation
/// happens here; out-of-range values are the pipeline's to reject.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub prompt: String,
    pub steps: usize,
    pub guidance: f64,
    pub seed: u64,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("{0} is not a number")]
    NotNumeric(&'static str),
    #[error("{0} must not be negative")]
    Negative(&'static str),
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Coerces the raw fields into typed parameters, applying defaults.
    pub fn resolve(&self) -> Result<GenerationParams, ParamError> {
        Ok(GenerationParams {
            prompt: self.prompt.clone(),
            steps: int_param("steps", self.steps.as_ref(), DEFAULT_STEPS as u64)? as usize,
            guidance: float_param("guidance", self.guidance.as_ref(), DEFAULT_GUIDANCE)?,
            seed: int_param("seed", self.seed.as_ref(), DEFAULT_SEED)?,
            width: int_param("width", self.width.as_ref(), DEFAULT_WIDTH as u64)? as usize,
            height: int_param("height", self.height.as_ref(), DEFAULT_HEIGHT as u64)? as usize,
        })
    }
}

fn float_param(name: &'static str, value: Option<&Value>, default: f64) -> Result<f64, ParamError> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n.as_f64().ok_or(ParamError::NotNumeric(name)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ParamError::NotNumeric(name)),
        Some(_) => Err(ParamError::NotNumeric(name)),
    }
}

/// Integer coercion: fractions truncate, negatives are rejected.
fn int_param(name: &'static str, value: Option<&Value>, default: u64) -> Result<u64, ParamError> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(value) => {
            let raw = float_param(name, Some(value), 0.0)?;
            if !raw.is_finite() {
                return Err(ParamError::NotNumeric(name));
            }
            if raw < 0.0 {
                return Err(ParamError::Negative(name));
            }
            Ok(raw.trunc() as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_request_resolves_to_defaults() {
        let params = GenerationRequest::new("a red fox").resolve().unwrap();
        assert_eq!(params.prompt, "a red fox");
        assert_eq!(params.steps, DEFAULT_STEPS);
        assert_eq!(params.guidance, DEFAULT_GUIDANCE);
        assert_eq!(params.seed, DEFAULT_SEED);
        assert_eq!(params.width, DEFAULT_WIDTH);
        assert_eq!(params.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let request = GenerationRequest {
            steps: Some(json!("12")),
            guidance: Some(json!("3.5")),
            seed: Some(json!(" 7 ")),
            ..GenerationRequest::new("x")
        };
        let params = request.resolve().unwrap();
        assert_eq!(params.steps, 12);
        assert_eq!(params.guidance, 3.5);
        assert_eq!(params.seed, 7);
    }

    #[test]
    fn fractional_integers_truncate() {
        let request = GenerationRequest {
            seed: Some(json!(42.9)),
            ..GenerationRequest::new("x")
        };
        assert_eq!(request.resolve().unwrap().seed, 42);
    }

    #[test]
    fn non_numeric_steps_fail() {
        let request = GenerationRequest {
            steps: Some(json!("twenty")),
            ..GenerationRequest::new("x")
        };
        assert_eq!(request.resolve(), Err(ParamError::NotNumeric("steps")));
    }

    #[test]
    fn negative_seed_fails() {
        let request = GenerationRequest {
            seed: Some(json!(-3)),
            ..GenerationRequest::new("x")
        };
        assert_eq!(request.resolve(), Err(ParamError::Negative("seed")));
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let request: GenerationRequest =
            serde_json::from_value(json!({ "prompt": "x", "seed": null, "width": 512 })).unwrap();
        let params = request.resolve().unwrap();
        assert_eq!(params.seed, DEFAULT_SEED);
        assert_eq!(params.width, 512);
    }
}
