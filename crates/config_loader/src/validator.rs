//! 配置校验模块
//!
//! 校验规则：
//! - 至少配置一个 sink
//! - sink 名称唯一
//! - webhook sink 必须携带非空 url
//! - max_payload_bytes > 0
//! - quiet_window_ms > 0

use std::collections::HashSet;

use contracts::{RelayBlueprint, RelayError, SinkKind};

/// 校验 RelayBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), RelayError> {
    validate_relay(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验聚合窗口与源端限制
fn validate_relay(blueprint: &RelayBlueprint) -> Result<(), RelayError> {
    if blueprint.relay.quiet_window_ms == 0 {
        return Err(RelayError::config_validation(
            "relay.quiet_window_ms",
            "quiet window must be > 0",
        ));
    }
    if blueprint.source.max_asset_bytes == 0 {
        return Err(RelayError::config_validation(
            "source.max_asset_bytes",
            "source asset limit must be > 0",
        ));
    }
    Ok(())
}

/// 校验 sink 列表
fn validate_sinks(blueprint: &RelayBlueprint) -> Result<(), RelayError> {
    if blueprint.sinks.is_empty() {
        return Err(RelayError::config_validation(
            "sinks",
            "at least one sink must be configured",
        ));
    }

    let mut seen = HashSet::new();
    for sink in &blueprint.sinks {
        if !seen.insert(&sink.name) {
            return Err(RelayError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }

        if sink.max_payload_bytes == 0 {
            return Err(RelayError::config_validation(
                format!("sinks[{}].max_payload_bytes", sink.name),
                "payload limit must be > 0",
            ));
        }

        if sink.kind == SinkKind::Webhook {
            match &sink.url {
                Some(url) if !url.is_empty() => {}
                _ => {
                    return Err(RelayError::config_validation(
                        format!("sinks[{}].url", sink.name),
                        "webhook sink requires a url",
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SinkSpec, SourceOptions};

    fn blueprint_with_sinks(sinks: Vec<SinkSpec>) -> RelayBlueprint {
        RelayBlueprint {
            version: Default::default(),
            relay: Default::default(),
            source: SourceOptions::default(),
            converter: Default::default(),
            sinks,
        }
    }

    fn webhook_sink(name: &str, url: Option<&str>) -> SinkSpec {
        SinkSpec {
            name: name.to_string(),
            kind: SinkKind::Webhook,
            url: url.map(String::from),
            max_payload_bytes: 1024,
            silent: false,
        }
    }

    #[test]
    fn test_valid_blueprint() {
        let blueprint =
            blueprint_with_sinks(vec![webhook_sink("main", Some("https://example.test"))]);
        assert!(validate(&blueprint).is_ok());
    }

    #[test]
    fn test_no_sinks_rejected() {
        let blueprint = blueprint_with_sinks(vec![]);
        assert!(validate(&blueprint).is_err());
    }

    #[test]
    fn test_duplicate_sink_names_rejected() {
        let blueprint = blueprint_with_sinks(vec![
            webhook_sink("main", Some("https://a.test")),
            webhook_sink("main", Some("https://b.test")),
        ]);
        let err = validate(&blueprint).unwrap_err();
        assert!(matches!(err, RelayError::ConfigValidation { .. }));
    }

    #[test]
    fn test_webhook_without_url_rejected() {
        let blueprint = blueprint_with_sinks(vec![webhook_sink("main", None)]);
        assert!(validate(&blueprint).is_err());
    }

    #[test]
    fn test_zero_payload_limit_rejected() {
        let mut sink = webhook_sink("main", Some("https://a.test"));
        sink.max_payload_bytes = 0;
        let blueprint = blueprint_with_sinks(vec![sink]);
        assert!(validate(&blueprint).is_err());
    }

    #[test]
    fn test_zero_quiet_window_rejected() {
        let mut blueprint =
            blueprint_with_sinks(vec![webhook_sink("main", Some("https://a.test"))]);
        blueprint.relay.quiet_window_ms = 0;
        assert!(validate(&blueprint).is_err());
    }
}
