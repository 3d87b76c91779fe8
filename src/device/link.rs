// ==========================================
// 混凝土搅拌站过磅系统 - 串口链路
// ==========================================
// 职责: 持有串口连接,提供发送原语,运行后台读循环
// 读循环: 字节流 -> 按行切分 -> FrameParser -> 广播 Reading
// 红线: 一条链路独占一个串口句柄; close() 幂等
// ==========================================

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, WriteHalf};
use tokio::sync::broadcast;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_serial::SerialStream;
use tracing::{debug, info, warn};

use crate::device::error::ConnectionError;
use crate::device::frame_parser::FrameParser;
use crate::domain::{ConnectionStatus, DataBits, Parity, Reading, ScaleModelConfig, StopBits};

/// 广播通道容量（读数突发时允许的积压量）
const CHANNEL_CAPACITY: usize = 64;

/// 行缓冲上限,超过即认为流内无行分隔符,丢弃防止无界增长
const LINE_BUFFER_LIMIT: usize = 1024;

/// 仪表串口支持的波特率档位
const SUPPORTED_BAUD_RATES: [u32; 7] = [2_400, 4_800, 9_600, 19_200, 38_400, 57_600, 115_200];

// ==========================================
// DeviceLink trait - 链路接口
// ==========================================

/// 串口链路接口
///
/// AutoPolicyEngine 通过该接口驱动链路,测试时可用内存实现替换
#[async_trait]
pub trait DeviceLink: Send + Sync {
    /// 按型号配置打开串口并启动读循环
    async fn open(&self, port: &str, config: &ScaleModelConfig) -> Result<(), ConnectionError>;

    /// 向链路写入一条原始命令
    async fn send(&self, command: &str) -> Result<(), ConnectionError>;

    /// 关闭链路: 取消读循环、释放句柄。幂等,重复关闭不报错
    async fn close(&self);

    /// 订阅重量读数流（丢弃接收端即取消订阅）
    fn subscribe_readings(&self) -> broadcast::Receiver<Reading>;

    /// 订阅连接状态变更
    fn subscribe_status(&self) -> broadcast::Receiver<ConnectionStatus>;

    /// 当前连接状态快照
    fn status(&self) -> ConnectionStatus;
}

// ==========================================
// SerialDeviceLink - tokio-serial 实现
// ==========================================

struct LinkInner {
    writer: WriteHalf<SerialStream>,
    read_task: JoinHandle<()>,
}

/// 基于 tokio-serial 的串口链路
pub struct SerialDeviceLink {
    reading_tx: broadcast::Sender<Reading>,
    status_tx: broadcast::Sender<ConnectionStatus>,
    status: Arc<Mutex<ConnectionStatus>>,
    inner: AsyncMutex<Option<LinkInner>>,
}

impl Default for SerialDeviceLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialDeviceLink {
    pub fn new() -> Self {
        let (reading_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (status_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            reading_tx,
            status_tx,
            status: Arc::new(Mutex::new(ConnectionStatus::default())),
            inner: AsyncMutex::new(None),
        }
    }
}

#[async_trait]
impl DeviceLink for SerialDeviceLink {
    async fn open(&self, port: &str, config: &ScaleModelConfig) -> Result<(), ConnectionError> {
        if !SUPPORTED_BAUD_RATES.contains(&config.baud_rate) {
            return Err(ConnectionError::Unsupported(format!(
                "波特率 {}",
                config.baud_rate
            )));
        }

        let mut guard = self.inner.lock().await;
        if guard.is_some() {
            return Err(ConnectionError::OpenFailed(
                "链路已打开,请先关闭".to_string(),
            ));
        }

        let builder = tokio_serial::new(port, config.baud_rate)
            .data_bits(map_data_bits(config.data_bits))
            .stop_bits(map_stop_bits(config.stop_bits))
            .parity(map_parity(config.parity));

        let stream = SerialStream::open(&builder).map_err(|e| {
            let err = ConnectionError::OpenFailed(e.to_string());
            publish_status(&self.status, &self.status_tx, |st| {
                st.connected = false;
                st.error = Some(err.to_string());
            });
            err
        })?;

        let (reader, writer) = tokio::io::split(stream);

        publish_status(&self.status, &self.status_tx, |st| {
            st.connected = true;
            st.port = Some(port.to_string());
            st.model_key = Some(config.model_key.clone());
            st.error = None;
        });

        let read_task = spawn_read_loop(
            reader,
            self.reading_tx.clone(),
            self.status_tx.clone(),
            Arc::clone(&self.status),
        );

        *guard = Some(LinkInner { writer, read_task });
        info!(port = %port, model = %config.model_key, "串口已打开");
        Ok(())
    }

    async fn send(&self, command: &str) -> Result<(), ConnectionError> {
        let mut guard = self.inner.lock().await;
        let inner = guard.as_mut().ok_or(ConnectionError::NotConnected)?;

        inner
            .writer
            .write_all(command.as_bytes())
            .await
            .map_err(|e| {
                let err = ConnectionError::WriteFailed(e.to_string());
                // 单次写失败只记入 error,链路存活与否由读循环判定
                publish_status(&self.status, &self.status_tx, |st| {
                    st.error = Some(err.to_string());
                });
                err
            })?;
        debug!(command = %command.escape_debug().to_string(), "命令已发送");
        Ok(())
    }

    async fn close(&self) {
        let mut guard = self.inner.lock().await;
        if let Some(inner) = guard.take() {
            inner.read_task.abort();
            drop(inner.writer);
            publish_status(&self.status, &self.status_tx, |st| {
                st.connected = false;
                st.port = None;
                st.error = None;
            });
            info!("串口已关闭");
        }
        // 已关闭时为空操作
    }

    fn subscribe_readings(&self) -> broadcast::Receiver<Reading> {
        self.reading_tx.subscribe()
    }

    fn subscribe_status(&self) -> broadcast::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    fn status(&self) -> ConnectionStatus {
        self.status
            .lock()
            .map(|st| st.clone())
            .unwrap_or_default()
    }
}

// ==========================================
// 读循环
// ==========================================

/// 启动后台读循环
///
/// 注意: 单次 read 无超时,仪表静默时循环停在 read 上
/// 而不是报超时错误（与现场既有行为保持一致）
fn spawn_read_loop<R>(
    mut reader: R,
    reading_tx: broadcast::Sender<Reading>,
    status_tx: broadcast::Sender<ConnectionStatus>,
    status: Arc<Mutex<ConnectionStatus>>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 256];
        let mut line_buf = String::new();

        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => {
                    publish_status(&status, &status_tx, |st| {
                        st.connected = false;
                        st.error = Some("串口读取失败: 数据流已结束".to_string());
                    });
                    warn!("串口数据流已结束,读循环退出");
                    break;
                }
                Ok(n) => {
                    line_buf.push_str(&String::from_utf8_lossy(&chunk[..n]));

                    for line in drain_complete_lines(&mut line_buf) {
                        match FrameParser::parse(&line) {
                            Some(reading) => {
                                publish_status(&status, &status_tx, |st| {
                                    st.current_weight = reading.weight;
                                    st.last_update = Some(reading.timestamp);
                                });
                                let _ = reading_tx.send(reading);
                            }
                            None => {
                                // 无法解析的帧直接丢弃,不中断读循环
                                debug!(frame = %line, "丢弃无法解析的帧");
                            }
                        }
                    }

                    if line_buf.len() > LINE_BUFFER_LIMIT {
                        warn!("行缓冲超限,清空缓冲");
                        line_buf.clear();
                    }
                }
                Err(e) => {
                    publish_status(&status, &status_tx, |st| {
                        st.connected = false;
                        st.error = Some(format!("串口读取失败: {}", e));
                    });
                    warn!(error = %e, "串口读取失败,读循环退出");
                    break;
                }
            }
        }
    })
}

/// 从缓冲中取出所有完整行（以 \n 结尾）,余量留在缓冲内
fn drain_complete_lines(buf: &mut String) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buf.find('\n') {
        let line = buf[..pos].trim_end_matches('\r').to_string();
        buf.drain(..=pos);
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// 修改状态并广播快照
fn publish_status(
    status: &Arc<Mutex<ConnectionStatus>>,
    status_tx: &broadcast::Sender<ConnectionStatus>,
    mutate: impl FnOnce(&mut ConnectionStatus),
) {
    let snapshot = match status.lock() {
        Ok(mut st) => {
            mutate(&mut st);
            st.clone()
        }
        Err(poisoned) => {
            let mut st = poisoned.into_inner();
            mutate(&mut st);
            st.clone()
        }
    };
    // 无订阅者时发送失败是正常情况
    let _ = status_tx.send(snapshot);
}

// ==========================================
// 串口参数映射
// ==========================================

fn map_data_bits(bits: DataBits) -> tokio_serial::DataBits {
    match bits {
        DataBits::Seven => tokio_serial::DataBits::Seven,
        DataBits::Eight => tokio_serial::DataBits::Eight,
    }
}

fn map_stop_bits(bits: StopBits) -> tokio_serial::StopBits {
    match bits {
        StopBits::One => tokio_serial::StopBits::One,
        StopBits::Two => tokio_serial::StopBits::Two,
    }
}

fn map_parity(parity: Parity) -> tokio_serial::Parity {
    match parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Odd => tokio_serial::Parity::Odd,
        Parity::Even => tokio_serial::Parity::Even,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_complete_lines() {
        let mut buf = "ST,100,kg\r\nST,200".to_string();
        let lines = drain_complete_lines(&mut buf);
        assert_eq!(lines, vec!["ST,100,kg"]);
        // 不完整的行留在缓冲里
        assert_eq!(buf, "ST,200");

        buf.push_str(",kg\r\n");
        let lines = drain_complete_lines(&mut buf);
        assert_eq!(lines, vec!["ST,200,kg"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_drain_skips_blank_lines() {
        let mut buf = "\r\n\r\n12000\r\n".to_string();
        let lines = drain_complete_lines(&mut buf);
        assert_eq!(lines, vec!["12000"]);
    }

    #[test]
    fn test_map_serial_params() {
        assert_eq!(map_data_bits(DataBits::Seven), tokio_serial::DataBits::Seven);
        assert_eq!(map_stop_bits(StopBits::Two), tokio_serial::StopBits::Two);
        assert_eq!(map_parity(Parity::Even), tokio_serial::Parity::Even);
    }

    #[tokio::test]
    async fn test_read_loop_broadcasts_readings_and_updates_status() {
        let (reading_tx, mut reading_rx) = broadcast::channel(16);
        let (status_tx, _keep_open) = broadcast::channel(16);
        let status = Arc::new(Mutex::new(ConnectionStatus::default()));

        let (reader, mut writer) = tokio::io::duplex(256);
        let task = spawn_read_loop(reader, reading_tx, status_tx, Arc::clone(&status));

        writer
            .write_all(b"ST,12000,kg\r\ngarbage\r\n8000kg\r\n")
            .await
            .unwrap();

        let first = reading_rx.recv().await.unwrap();
        assert!((first.weight - 12000.0).abs() < 0.001);
        assert!(first.stable);

        // "garbage" 被丢弃且不中断循环,下一条读数直接是 8000kg
        let second = reading_rx.recv().await.unwrap();
        assert!((second.weight - 8000.0).abs() < 0.001);
        assert!(!second.stable);

        let snapshot = status.lock().unwrap().clone();
        assert_eq!(snapshot.current_weight, 8000.0);
        assert!(snapshot.last_update.is_some());

        // 对端关闭 -> 读循环以错误状态退出
        drop(writer);
        task.await.unwrap();
        let snapshot = status.lock().unwrap().clone();
        assert!(!snapshot.connected);
        assert!(snapshot.error.is_some());
    }

    #[tokio::test]
    async fn test_open_rejects_unsupported_baud_rate() {
        let link = SerialDeviceLink::new();
        let mut config = crate::config::default_model();
        config.baud_rate = 1_234;

        let err = link.open("COM_TEST", &config).await.unwrap_err();
        assert!(matches!(err, ConnectionError::Unsupported(_)));
        assert!(!link.status().connected);
    }

    #[tokio::test]
    async fn test_send_when_not_connected() {
        let link = SerialDeviceLink::new();
        let err = link.send("W\r\n").await.unwrap_err();
        assert!(matches!(err, ConnectionError::NotConnected));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let link = SerialDeviceLink::new();
        link.close().await;
        link.close().await;
        assert!(!link.status().connected);
    }
}
