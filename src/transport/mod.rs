//! Recognition transport collaborator: the streaming WebSocket connection.
//!
//! Audio bytes go out as binary frames; JSON recognition events come back as
//! text frames (see [`RecognitionEvent`]).

mod events;

pub use events::{Alternative, Channel, RecognitionEvent};

use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};
use tracing::debug;

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Open the streaming connection, authenticating with a short-lived token
pub async fn connect(endpoint: &str, token: &str) -> Result<WsStream, tungstenite::Error> {
    let mut request = endpoint.into_client_request()?;
    let auth = http::HeaderValue::from_str(&format!("Token {token}"))
        .map_err(http::Error::from)?;
    request.headers_mut().insert(http::header::AUTHORIZATION, auth);

    let (stream, response) = connect_async(request).await?;
    debug!(status = %response.status(), "recognition transport connected");

    Ok(stream)
}
