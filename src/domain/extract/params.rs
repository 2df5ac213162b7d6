// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::utils::errors::ConfigError;

/// 提取器参数
///
/// 每种提取器对应一个封闭的参数结构，`KEYS` 列出可识别的键
pub trait Params: DeserializeOwned + Default {
    const KEYS: &'static [&'static str];
}

/// 将字段描述中的 `params` 转换为类型化参数
///
/// 未识别的键只记录警告；类型不匹配返回配置错误
pub fn decode<T: Params>(field: &str, params: Option<&Value>) -> Result<T, ConfigError> {
    let value = match params {
        None | Some(Value::Null) => return Ok(T::default()),
        Some(value) => value,
    };

    let Value::Object(map) = value else {
        return Err(ConfigError::InvalidParams {
            field: field.to_string(),
            reason: format!("expected an object, got {}", value),
        });
    };

    for key in map.keys() {
        if !T::KEYS.contains(&key.as_str()) {
            warn!(field, key = key.as_str(), "Ignoring unknown extractor parameter");
        }
    }

    serde_json::from_value(value.clone()).map_err(|e| ConfigError::InvalidParams {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
