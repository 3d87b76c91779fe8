// ==========================================
// 混凝土搅拌站过磅系统 - 连接自动化策略
// ==========================================
// 职责: 按仪表型号配置包装链路行为
// - 连接静置延时、连接后自动去皮/清零
// - 周期轮询取重
// - 有界命令重试、有界自动重连
// 红线: 重试与重连都有上限,耗尽后把错误交还调用方
// ==========================================

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::device::error::{CommandError, ConnectionError};
use crate::device::link::DeviceLink;
use crate::domain::{ConnectionStatus, Reading, ScaleModelConfig};

/// 自动去皮/清零后的静置等待
const SETTLE_WAIT: Duration = Duration::from_secs(1);

/// 命令重试间隔
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// 自动重连延时
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

// ==========================================
// AutoPolicyEngine
// ==========================================

/// 连接自动化策略引擎
///
/// 独占持有一份 ScaleModelConfig（会话期间不变）,
/// 通过 DeviceLink 接口驱动链路,便于测试时替换为内存链路
pub struct AutoPolicyEngine<L: DeviceLink + 'static> {
    link: Arc<L>,
    config: ScaleModelConfig,
    port: Mutex<Option<String>>,
    reconnect_attempts: AtomicU32,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    watch_task: Mutex<Option<JoinHandle<()>>>,
    reconnect_task: Mutex<Option<JoinHandle<()>>>,
}

impl<L: DeviceLink + 'static> AutoPolicyEngine<L> {
    pub fn new(link: Arc<L>, config: ScaleModelConfig) -> Self {
        Self {
            link,
            config,
            port: Mutex::new(None),
            reconnect_attempts: AtomicU32::new(0),
            poll_task: Mutex::new(None),
            watch_task: Mutex::new(None),
            reconnect_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ScaleModelConfig {
        &self.config
    }

    pub fn status(&self) -> ConnectionStatus {
        self.link.status()
    }

    pub fn subscribe_readings(&self) -> broadcast::Receiver<Reading> {
        self.link.subscribe_readings()
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<ConnectionStatus> {
        self.link.subscribe_status()
    }

    // ==========================================
    // 连接管理
    // ==========================================

    /// 连接串口并应用连接期自动化策略
    ///
    /// 失败时若配置了 auto_reconnect,会在后台按 5 秒间隔
    /// 有界重连,同时把本次错误交还调用方
    pub async fn connect(self: &Arc<Self>, port: &str) -> Result<(), ConnectionError> {
        {
            let mut guard = lock_unpoisoned(&self.port);
            *guard = Some(port.to_string());
        }

        match self.try_connect().await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(port = %port, error = %e, "连接失败");
                self.schedule_reconnect();
                Err(e)
            }
        }
    }

    /// 断开连接: 停轮询、停监视、停重连、关链路。幂等
    pub async fn disconnect(&self) {
        abort_task(&self.reconnect_task);
        abort_task(&self.watch_task);
        abort_task(&self.poll_task);
        self.link.close().await;
    }

    /// 单次连接流程（不触发重连调度）
    async fn try_connect(self: &Arc<Self>) -> Result<(), ConnectionError> {
        let port = lock_unpoisoned(&self.port)
            .clone()
            .ok_or(ConnectionError::NotConnected)?;

        // 读循环异常退出后链路里残留旧句柄,未关闭前无法重新打开
        self.link.close().await;
        self.link.open(&port, &self.config).await?;
        self.reconnect_attempts.store(0, Ordering::SeqCst);

        // 连接静置: 等仪表上电稳定后再发命令
        let delay = self.config.auto.connection_delay_ms;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        // 自动去皮/清零失败只记日志,不影响连接
        if self.config.auto.auto_tare {
            if let Some(cmd) = self.config.commands.tare.clone() {
                if let Err(e) = self.link.send(&cmd).await {
                    warn!(error = %e, "自动去皮失败");
                }
                tokio::time::sleep(SETTLE_WAIT).await;
            }
        }
        if self.config.auto.auto_zero {
            if let Some(cmd) = self.config.commands.zero.clone() {
                if let Err(e) = self.link.send(&cmd).await {
                    warn!(error = %e, "自动清零失败");
                }
                tokio::time::sleep(SETTLE_WAIT).await;
            }
        }

        self.start_polling();
        self.start_watch();
        Ok(())
    }

    /// 启动取重轮询（polling_interval_ms = 0 表示仪表连续输出,不轮询）
    fn start_polling(self: &Arc<Self>) {
        abort_task(&self.poll_task);

        let interval_ms = self.config.auto.polling_interval_ms;
        if interval_ms == 0 {
            return;
        }
        let cmd = match self.config.commands.get_weight.clone() {
            Some(cmd) => cmd,
            None => {
                warn!("配置了轮询但型号未定义取重命令,不启动轮询");
                return;
            }
        };

        let link = Arc::clone(&self.link);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                if let Err(e) = link.send(&cmd).await {
                    warn!(error = %e, "轮询取重命令发送失败");
                }
            }
        });
        *lock_unpoisoned(&self.poll_task) = Some(handle);
    }

    /// 监视链路状态,读循环异常退出时触发自动重连
    fn start_watch(self: &Arc<Self>) {
        abort_task(&self.watch_task);

        let me = Arc::clone(self);
        let mut rx = self.link.subscribe_status();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(st) => {
                        if !st.connected && st.error.is_some() {
                            me.schedule_reconnect();
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        *lock_unpoisoned(&self.watch_task) = Some(handle);
    }

    /// 调度有界自动重连（每次间隔 5 秒,最多 retry_attempts 次）
    fn schedule_reconnect(self: &Arc<Self>) {
        if !self.config.auto.auto_reconnect {
            return;
        }

        let mut guard = lock_unpoisoned(&self.reconnect_task);
        if guard.as_ref().map(|h| !h.is_finished()).unwrap_or(false) {
            // 已有重连任务在跑
            return;
        }

        let me = Arc::clone(self);
        *guard = Some(tokio::spawn(async move {
            loop {
                let attempt = me.reconnect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt > me.config.auto.retry_attempts {
                    warn!("自动重连次数耗尽,停止重连");
                    break;
                }
                info!(attempt = attempt, "将在 5 秒后自动重连");
                tokio::time::sleep(RECONNECT_DELAY).await;

                match me.try_connect().await {
                    Ok(()) => {
                        info!("自动重连成功");
                        break;
                    }
                    Err(e) => {
                        warn!(attempt = attempt, error = %e, "自动重连失败");
                    }
                }
            }
        }));
    }

    // ==========================================
    // 命令发送
    // ==========================================

    /// 有界重试发送: 最多 retry_attempts 次,每次失败后等 1 秒
    ///
    /// "发送成功"指底层写入未报错,本协议没有设备应答可确认
    pub async fn send_with_retry(&self, command: &str) -> Result<(), CommandError> {
        let attempts = self.config.auto.retry_attempts.max(1);

        for attempt in 1..=attempts {
            match self.link.send(command).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(attempt = attempt, error = %e, "命令发送失败");
                    if attempt < attempts {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        }
        Err(CommandError::SendFailed { attempts })
    }

    /// 取重
    pub async fn request_weight(&self) -> Result<(), CommandError> {
        let cmd = require_command(&self.config.commands.get_weight, "get_weight")?;
        self.send_with_retry(&cmd).await
    }

    /// 去皮
    pub async fn tare(&self) -> Result<(), CommandError> {
        let cmd = require_command(&self.config.commands.tare, "tare")?;
        self.send_with_retry(&cmd).await
    }

    /// 清零
    pub async fn zero(&self) -> Result<(), CommandError> {
        let cmd = require_command(&self.config.commands.zero, "zero")?;
        self.send_with_retry(&cmd).await
    }

    /// 查询仪表状态
    pub async fn query_status(&self) -> Result<(), CommandError> {
        let cmd = require_command(&self.config.commands.status, "status")?;
        self.send_with_retry(&cmd).await
    }

    /// 仪表复位
    pub async fn reset(&self) -> Result<(), CommandError> {
        let cmd = require_command(&self.config.commands.reset, "reset")?;
        self.send_with_retry(&cmd).await
    }
}

// ==========================================
// 内部工具
// ==========================================

fn require_command(
    cmd: &Option<String>,
    name: &'static str,
) -> Result<String, CommandError> {
    cmd.clone().ok_or(CommandError::MissingCommand { name })
}

fn abort_task(slot: &Mutex<Option<JoinHandle<()>>>) {
    if let Some(handle) = lock_unpoisoned(slot).take() {
        handle.abort();
    }
}

fn lock_unpoisoned<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
