// ==========================================
// 混凝土搅拌站过磅系统 - 仪表 API
// ==========================================
// 职责: 面向 UI 的设备操作入口（连接/断开/去皮/清零）
// 说明: 设备错误统一归入 ApiError::DeviceError,
// 让操作员一眼分清硬件问题与数据问题
// ==========================================

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::api::error::ApiResult;
use crate::device::link::DeviceLink;
use crate::device::policy::AutoPolicyEngine;
use crate::domain::{ConnectionStatus, Reading};

/// 仪表 API
pub struct ScaleApi<L: DeviceLink + 'static> {
    engine: Arc<AutoPolicyEngine<L>>,
}

impl<L: DeviceLink + 'static> ScaleApi<L> {
    pub fn new(engine: Arc<AutoPolicyEngine<L>>) -> Self {
        Self { engine }
    }

    /// 连接仪表
    pub async fn connect(&self, port: &str) -> ApiResult<ConnectionStatus> {
        info!(port = %port, model = %self.engine.config().model_key, "连接称重仪表");
        self.engine.connect(port).await?;
        Ok(self.engine.status())
    }

    /// 断开仪表（幂等）
    pub async fn disconnect(&self) -> ApiResult<ConnectionStatus> {
        self.engine.disconnect().await;
        Ok(self.engine.status())
    }

    /// 当前连接状态快照
    pub fn status(&self) -> ConnectionStatus {
        self.engine.status()
    }

    /// 订阅重量读数流
    pub fn subscribe_readings(&self) -> broadcast::Receiver<Reading> {
        self.engine.subscribe_readings()
    }

    /// 订阅连接状态变更
    pub fn subscribe_status(&self) -> broadcast::Receiver<ConnectionStatus> {
        self.engine.subscribe_status()
    }

    /// 去皮
    pub async fn tare(&self) -> ApiResult<()> {
        Ok(self.engine.tare().await?)
    }

    /// 清零
    pub async fn zero(&self) -> ApiResult<()> {
        Ok(self.engine.zero().await?)
    }

    /// 主动取重一次
    pub async fn request_weight(&self) -> ApiResult<()> {
        Ok(self.engine.request_weight().await?)
    }
}
