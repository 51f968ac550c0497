//! Business error-code configuration and response classification.

use crate::response::{HasError, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Code value(s) that mean "no business error".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeNormal {
    /// Any of these codes is normal.
    Many(Vec<Value>),
    /// Only this code is normal.
    One(Value),
}

impl CodeNormal {
    /// A single normal code.
    pub fn one(code: impl Into<Value>) -> Self {
        Self::One(code.into())
    }

    /// A set of normal codes.
    pub fn any_of<I, V>(codes: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Many(codes.into_iter().map(Into::into).collect())
    }

    /// Check membership with strict JSON equality (`0` and `"0"` differ).
    pub fn contains(&self, code: &Value) -> bool {
        match self {
            Self::One(normal) => normal == code,
            Self::Many(normals) => normals.contains(code),
        }
    }
}

/// Per-domain refinement of [`BizConfig`]. Present fields win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainBizConfig {
    /// Field holding the business code.
    pub code_key: Option<String>,
    /// Codes that mean success.
    pub code_normal: Option<CodeNormal>,
    /// Field holding the failure reason.
    pub msg_key: Option<String>,
    /// Field holding the server trace id.
    pub trace_key: Option<String>,
}

/// Business error-code configuration.
///
/// Classification is active only when both `code_key` and `code_normal` are
/// set here; a domain override alone never enables it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BizConfig {
    /// Field of the response body holding the business code.
    pub code_key: Option<String>,
    /// Code value(s) considered normal.
    pub code_normal: Option<CodeNormal>,
    /// Field holding the failure reason.
    pub msg_key: Option<String>,
    /// Field holding the server trace id.
    pub trace_key: Option<String>,
    /// Overrides keyed by hostname.
    pub by_domain: HashMap<String, DomainBizConfig>,
}

impl BizConfig {
    /// Create an active configuration.
    pub fn new(code_key: impl Into<String>, code_normal: CodeNormal) -> Self {
        Self {
            code_key: Some(code_key.into()),
            code_normal: Some(code_normal),
            ..Default::default()
        }
    }

    /// Set the reason field.
    pub fn msg_key(mut self, key: impl Into<String>) -> Self {
        self.msg_key = Some(key.into());
        self
    }

    /// Set the trace id field.
    pub fn trace_key(mut self, key: impl Into<String>) -> Self {
        self.trace_key = Some(key.into());
        self
    }

    /// Add an override for `hostname`.
    pub fn domain(mut self, hostname: impl Into<String>, config: DomainBizConfig) -> Self {
        self.by_domain.insert(hostname.into(), config);
        self
    }

    /// Resolve the configuration that applies to `hostname`.
    ///
    /// Returns `None` when classification is disabled.
    pub fn resolve(&self, hostname: Option<&str>) -> Option<ResolvedBizConfig> {
        let (Some(code_key), Some(code_normal)) = (&self.code_key, &self.code_normal) else {
            return None;
        };

        let mut resolved = ResolvedBizConfig {
            code_key: code_key.clone(),
            code_normal: code_normal.clone(),
            msg_key: self.msg_key.clone(),
            trace_key: self.trace_key.clone(),
        };

        let Some(domain) = hostname.and_then(|host| self.by_domain.get(host)) else {
            return Some(resolved);
        };

        if let Some(key) = non_empty(&domain.code_key) {
            resolved.code_key = key;
        }
        if let Some(normal) = &domain.code_normal {
            resolved.code_normal = normal.clone();
        }
        if let Some(key) = non_empty(&domain.msg_key) {
            resolved.msg_key = Some(key);
        }
        if let Some(key) = non_empty(&domain.trace_key) {
            resolved.trace_key = Some(key);
        }

        Some(resolved)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Business configuration after domain overrides are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBizConfig {
    /// Field holding the business code.
    pub code_key: String,
    /// Codes that mean success.
    pub code_normal: CodeNormal,
    /// Field holding the failure reason.
    pub msg_key: Option<String>,
    /// Field holding the server trace id.
    pub trace_key: Option<String>,
}

impl ResolvedBizConfig {
    /// Business code carried by the response, if present.
    pub fn code<'a>(&self, response: &'a Response) -> Option<&'a Value> {
        response.field(&self.code_key)
    }

    /// Failure reason carried by the response, if configured and present.
    pub fn reason<'a>(&self, response: &'a Response) -> Option<&'a Value> {
        self.msg_key.as_deref().and_then(|key| response.field(key))
    }

    /// Server trace id carried by the response, if configured and present.
    pub fn trace_id<'a>(&self, response: &'a Response) -> Option<&'a Value> {
        self.trace_key.as_deref().and_then(|key| response.field(key))
    }
}

/// Classify a transport-successful response.
///
/// A response without the code field counts as a success.
pub fn classify(response: &Response, biz: Option<&ResolvedBizConfig>) -> HasError {
    let Some(biz) = biz else {
        return HasError::Success;
    };

    match biz.code(response) {
        Some(code) if !biz.code_normal.contains(code) => HasError::BizError,
        _ => HasError::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(data: Value) -> Response {
        Response::new(200, data)
    }

    #[test]
    fn test_scalar_code_normal() {
        let biz = BizConfig::new("code", CodeNormal::one(0)).resolve(None);

        assert_eq!(classify(&response(json!({"code": 0})), biz.as_ref()), HasError::Success);
        assert_eq!(classify(&response(json!({"code": 1})), biz.as_ref()), HasError::BizError);
    }

    #[test]
    fn test_code_normal_set() {
        let biz = BizConfig::new("code", CodeNormal::any_of([0, 1])).resolve(None);

        assert_eq!(classify(&response(json!({"code": 1})), biz.as_ref()), HasError::Success);
        assert_eq!(classify(&response(json!({"code": 2})), biz.as_ref()), HasError::BizError);
    }

    #[test]
    fn test_missing_code_field_is_success() {
        let biz = BizConfig::new("code", CodeNormal::one(0)).resolve(None);
        assert_eq!(classify(&response(json!({"other": 5})), biz.as_ref()), HasError::Success);
        assert_eq!(classify(&response(json!("text body")), biz.as_ref()), HasError::Success);
    }

    #[test]
    fn test_strict_equality() {
        let biz = BizConfig::new("code", CodeNormal::one(0)).resolve(None);
        assert_eq!(classify(&response(json!({"code": "0"})), biz.as_ref()), HasError::BizError);
    }

    #[test]
    fn test_inactive_config() {
        let config = BizConfig {
            code_key: Some("code".to_string()),
            ..Default::default()
        };
        assert!(config.resolve(Some("a.com")).is_none());
        assert_eq!(classify(&response(json!({"code": 9})), None), HasError::Success);
    }

    #[test]
    fn test_domain_override() {
        let config = BizConfig::new("code", CodeNormal::one(0))
            .msg_key("msg")
            .domain(
                "b.com",
                DomainBizConfig {
                    code_key: Some("errno".to_string()),
                    code_normal: Some(CodeNormal::one("OK")),
                    trace_key: Some("traceId".to_string()),
                    ..Default::default()
                },
            );

        let resolved = config.resolve(Some("b.com")).unwrap();
        assert_eq!(resolved.code_key, "errno");
        assert_eq!(resolved.code_normal, CodeNormal::one("OK"));
        assert_eq!(resolved.msg_key.as_deref(), Some("msg"));
        assert_eq!(resolved.trace_key.as_deref(), Some("traceId"));

        let fallback = config.resolve(Some("a.com")).unwrap();
        assert_eq!(fallback.code_key, "code");
        assert_eq!(fallback.trace_key, None);
    }

    #[test]
    fn test_reason_and_trace_lookup() {
        let resolved = BizConfig::new("code", CodeNormal::one(0))
            .msg_key("msg")
            .trace_key("trace")
            .resolve(None)
            .unwrap();
        let res = response(json!({"code": 3, "msg": "denied", "trace": "t-1"}));

        assert_eq!(resolved.code(&res), Some(&json!(3)));
        assert_eq!(resolved.reason(&res), Some(&json!("denied")));
        assert_eq!(resolved.trace_id(&res), Some(&json!("t-1")));
    }

    #[test]
    fn test_deserialize_from_camel_case() {
        let config: BizConfig = serde_json::from_value(json!({
            "codeKey": "code",
            "codeNormal": [0, "0"],
            "byDomain": {"a.com": {"codeNormal": 200}}
        }))
        .unwrap();

        assert_eq!(config.code_normal, Some(CodeNormal::any_of([json!(0), json!("0")])));
        assert_eq!(
            config.by_domain["a.com"].code_normal,
            Some(CodeNormal::one(200))
        );
    }
}
