// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::payload::Payload;
use crate::domain::models::results::Results;
use crate::domain::models::scraper::Scraper;
use crate::domain::models::session::Session;
use crate::engines::traits::FetchRequest;
use crate::utils::errors::ConfigError;

/// 抓取任务
///
/// 一次完整的抓取执行：拥有独立的会话与结果，抓取计划可与其他任务共享
#[derive(Debug)]
pub struct Task {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 抓取计划
    pub scraper: Arc<Scraper>,
    /// 起始请求
    pub request: FetchRequest,
    /// 会话（Cookie、robots 策略）
    pub session: Session,
    /// 任务状态
    pub status: TaskStatus,
    /// 已收集的结果
    pub results: Results,
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Created → Running → Completed/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 已创建，尚未开始执行
    #[default]
    Created,
    /// 执行中
    Running,
    /// 已完成
    Completed,
    /// 已失败，已收集的结果仍然保留
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Created => write!(f, "created"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(TaskStatus::Created),
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(()),
        }
    }
}

impl Task {
    /// 编译负载并创建任务
    ///
    /// # 返回值
    ///
    /// * `Ok(Task)` - 新创建的任务
    /// * `Err(ConfigError)` - 负载无法编译为抓取计划
    pub fn new(payload: &Payload) -> Result<Self, ConfigError> {
        let scraper = Scraper::new(payload)?;
        Ok(Self::with_scraper(Arc::new(scraper), payload.request.clone()))
    }

    /// 使用已编译（可能被共享）的抓取计划创建任务
    pub fn with_scraper(scraper: Arc<Scraper>, request: FetchRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            scraper,
            request,
            session: Session::new(),
            status: TaskStatus::Created,
            results: Results::new(),
        }
    }

    /// 任务开始时间
    pub fn start_time(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// 按抓取选项整理后的结果
    pub fn output(&self) -> serde_json::Value {
        self.results.output(self.scraper.opts.paginate_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::payload::FieldSpec;

    fn payload() -> Payload {
        Payload {
            request: FetchRequest::new("https://example.com", Default::default()),
            fields: vec![FieldSpec::new("title", "h1", "text")],
            ..Default::default()
        }
    }

    #[test]
    fn test_new_task() {
        let before = Utc::now();
        let task = Task::new(&payload()).unwrap();

        assert_eq!(task.status, TaskStatus::Created);
        assert_eq!(task.request.url, "https://example.com");
        assert!(task.start_time() >= before);
        assert!(task.results.visited.is_empty());
        assert!(!task.is_finished());
    }

    #[test]
    fn test_tasks_share_scraper_but_not_identity() {
        let scraper = Arc::new(Scraper::new(&payload()).unwrap());
        let a = Task::with_scraper(scraper.clone(), FetchRequest::default());
        let b = Task::with_scraper(scraper.clone(), FetchRequest::default());

        assert_ne!(a.id, b.id);
        assert!(Arc::ptr_eq(&a.scraper, &b.scraper));
    }

    #[test]
    fn test_invalid_payload_prevents_task_creation() {
        let err = Task::new(&Payload::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoParts));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TaskStatus::Created,
            TaskStatus::Running,
            TaskStatus::Completed,
            TaskStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<TaskStatus>(), Ok(status));
        }
        assert!("queued".parse::<TaskStatus>().is_err());
    }
}
