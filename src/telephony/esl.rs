use super::event::TelephonyEvent;
use super::ForkControl;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};

const EVENT_SUBSCRIPTION: &str =
    "event json CHANNEL_ANSWER CHANNEL_HANGUP CUSTOM mod_audio_fork::json conference::maintenance";

/// Event-socket link to the telephony platform.
///
/// Connects, authenticates, subscribes to the event set the coordinator
/// consumes, and hands decoded events to the returned channel. Commands go
/// out as `bgapi` lines so dispatch never waits on the platform.
pub struct EslTransport {
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl EslTransport {
    pub async fn connect(
        host: &str,
        port: u16,
        password: &str,
    ) -> Result<(Self, mpsc::Receiver<TelephonyEvent>)> {
        info!("Connecting to event socket at {}:{}", host, port);

        let stream = TcpStream::connect((host, port))
            .await
            .context("Failed to connect to event socket")?;
        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let writer = Arc::new(Mutex::new(write_half));

        let greeting = read_frame(&mut reader).await?;
        if greeting.content_type() != Some("auth/request") {
            bail!("Unexpected event socket greeting: {:?}", greeting.content_type());
        }

        send(&writer, &format!("auth {password}")).await?;
        let reply = read_frame(&mut reader).await?;
        if !reply.reply_ok() {
            bail!("Event socket rejected authentication");
        }

        send(&writer, EVENT_SUBSCRIPTION).await?;
        let reply = read_frame(&mut reader).await?;
        if !reply.reply_ok() {
            bail!("Event subscription rejected");
        }

        info!("Connected to event socket");

        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(async move {
            loop {
                let frame = match read_frame(&mut reader).await {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!("Event socket read failed: {:#}", e);
                        break;
                    }
                };

                if frame.content_type() != Some("text/event-json") {
                    continue;
                }

                let Ok(value) = serde_json::from_str(&frame.body) else {
                    continue;
                };
                let Some(event) = TelephonyEvent::from_esl_json(&value) else {
                    continue;
                };

                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok((Self { writer }, rx))
    }
}

#[async_trait]
impl ForkControl for EslTransport {
    async fn execute(&self, command: &str) -> Result<()> {
        send(&self.writer, &format!("bgapi {command}"))
            .await
            .context("Failed to dispatch fork-control command")
    }
}

struct Frame {
    headers: HashMap<String, String>,
    body: String,
}

impl Frame {
    fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type").map(String::as_str)
    }

    fn reply_ok(&self) -> bool {
        self.headers
            .get("Reply-Text")
            .map(|text| text.starts_with("+OK"))
            .unwrap_or(false)
    }
}

/// Header lines up to a blank line, then a `Content-Length` sized body.
async fn read_frame(reader: &mut BufReader<OwnedReadHalf>) -> Result<Frame> {
    let mut headers = HashMap::new();

    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            bail!("Event socket closed");
        }

        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(": ") {
            headers.insert(name.to_string(), value.to_string());
        }
    }

    let body = match headers
        .get("Content-Length")
        .and_then(|v| v.parse::<usize>().ok())
    {
        Some(length) => {
            let mut buf = vec![0u8; length];
            reader.read_exact(&mut buf).await?;
            String::from_utf8_lossy(&buf).into_owned()
        }
        None => String::new(),
    };

    Ok(Frame { headers, body })
}

async fn send(writer: &Arc<Mutex<OwnedWriteHalf>>, line: &str) -> Result<()> {
    let mut guard = writer.lock().await;
    guard.write_all(line.as_bytes()).await?;
    guard.write_all(b"\n\n").await?;
    guard.flush().await?;
    Ok(())
}
