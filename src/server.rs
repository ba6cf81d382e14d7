use std::net::SocketAddr;
use std::sync::Arc;

use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::RecordType;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::error::SyncError;
use crate::handler::UpdateHandler;

/// Largest datagram the listener accepts. Anything bigger is truncated by
/// the socket read and dropped at decode.
const MAX_PACKET_SIZE: usize = 4096;

/// UDP listener feeding NOTIFY packets into the update pipeline.
pub struct NotifyServer {
    socket: Arc<UdpSocket>,
    config: Arc<AppConfig>,
    update_handler: Arc<UpdateHandler>,
}

impl NotifyServer {
    /// Bind the listening socket for the configured address.
    pub async fn bind(
        config: Arc<AppConfig>,
        update_handler: Arc<UpdateHandler>,
    ) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(config.listen).await?;
        info!("listening on {}", config.listen);

        Ok(Self {
            socket: Arc::new(socket),
            config,
            update_handler,
        })
    }

    /// Address the listener actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive loop. Each packet is handled on its own task, so a slow
    /// update never stalls the socket. Returns when the shutdown channel
    /// fires.
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("notify listener shutting down");
                    return;
                }
                recv = self.socket.recv_from(&mut buf) => match recv {
                    Ok((len, sender)) => {
                        debug!("read {} bytes from {}", len, sender);
                        let data = buf[..len].to_vec();
                        let socket = self.socket.clone();
                        let config = self.config.clone();
                        let update_handler = self.update_handler.clone();

                        tokio::spawn(async move {
                            handle_packet(socket, config, update_handler, data, sender).await;
                        });
                    }
                    Err(e) => {
                        error!("udp receive failed: {}", e);
                    }
                }
            }
        }
    }
}

/// Handle one datagram end to end: filter, decode, fan out to the
/// configured handlers, acknowledge.
async fn handle_packet(
    socket: Arc<UdpSocket>,
    config: Arc<AppConfig>,
    update_handler: Arc<UpdateHandler>,
    data: Vec<u8>,
    sender: SocketAddr,
) {
    if !update_handler.dispatcher().remote_allowed(sender.ip()) {
        info!("discarding packet from unlisted remote {}", sender.ip());
        return;
    }

    let msg = match Message::from_vec(&data) {
        Ok(msg) => msg,
        Err(e) => {
            let err = SyncError::Decode(e.to_string());
            error!("discarding packet from {}: {}", sender, err);
            return;
        }
    };

    if !is_actionable_notify(&msg) {
        info!("skipping non-notify message from {}", sender);
        return;
    }
    if let Some(answer) = msg.answers().first() {
        info!("received notify for {}", answer.name());
    }

    for handler_config in &config.handlers {
        debug!("processing message for {}", handler_config.name);
        if let Err(e) = update_handler.handle(handler_config, &msg, sender).await {
            error!("handler {} failed: {}", handler_config.name, e);
        }
    }

    // The sender gets an acknowledgement once the packet was judged
    // protocol-valid, regardless of how the handlers fared.
    let reply = build_reply(&msg);
    match reply.to_vec() {
        Ok(bytes) => {
            debug!("sending reply to {}", sender);
            if let Err(e) = socket.send_to(&bytes, sender).await {
                error!("failed to send reply to {}: {}", sender, e);
            }
        }
        Err(e) => error!("failed to encode reply for {}: {}", sender, e),
    }
}

/// A packet is worth processing when it is a NOTIFY whose first answer is
/// an SOA record.
fn is_actionable_notify(msg: &Message) -> bool {
    msg.op_code() == OpCode::Notify
        && msg.answers().first().map(|a| a.record_type()) == Some(RecordType::SOA)
}

/// Mirror id, opcode and question back at the sender as an acknowledgement.
fn build_reply(msg: &Message) -> Message {
    let mut reply = Message::new();
    reply
        .set_id(msg.id())
        .set_message_type(MessageType::Response)
        .set_op_code(msg.op_code())
        .set_response_code(ResponseCode::NoError);
    for query in msg.queries() {
        reply.add_query(query.clone());
    }
    reply
}
