// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::robots::RobotsPolicy;

/// 抓取会话
///
/// 在同一任务的各页面之间传递，抓取引擎返回的 Cookie 会应用到下一次请求
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// 已解析的 robots.txt 策略
    pub robots: Option<RobotsPolicy>,
    /// Cookie 字符串，格式为 `name=value; name2=value2`
    pub cookies: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用抓取引擎返回的 Cookie
    pub fn apply_cookies(&mut self, cookies: Option<String>) {
        if let Some(cookies) = cookies {
            self.cookies = cookies;
        }
    }

    /// 是否有可发送的 Cookie
    pub fn has_cookies(&self) -> bool {
        !self.cookies.trim().is_empty()
    }
}

/// 将 Set-Cookie 头合并到现有 Cookie 字符串中
///
/// 同名 Cookie 以新值覆盖并保留原有顺序，属性（Path、HttpOnly 等）被丢弃
pub fn merge_set_cookies<'a, I>(existing: &str, set_cookies: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut pairs: Vec<(String, String)> = existing
        .split(';')
        .filter_map(split_pair)
        .collect();

    for header in set_cookies {
        let Some((name, value)) = header.split(';').next().and_then(split_pair) else {
            continue;
        };
        match pairs.iter_mut().find(|(n, _)| *n == name) {
            Some(pair) => pair.1 = value,
            None => pairs.push((name, value)),
        }
    }

    pairs
        .iter()
        .map(|(n, v)| format!("{}={}", n, v))
        .collect::<Vec<_>>()
        .join("; ")
}

fn split_pair(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
