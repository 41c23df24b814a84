//! Line-delimited JSON server
//!
//! Each input line is one raw request object; each output line is the
//! serialized [`ResponseEnvelope`]. Requests are handled one at a time and
//! the loop ends at EOF.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::router::{Dispatcher, ResponseEnvelope};

/// Serve requests from `input` until EOF, writing responses to `output`
pub async fn serve_lines<R, W>(dispatcher: &Dispatcher, input: R, mut output: W) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0u64;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = dispatcher.handle_json(&line).await;
        debug!("Responding {}", response.status_code);

        output.write_all(encode(&response).as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        handled += 1;
    }

    info!("Input closed after {} request(s)", handled);
    Ok(handled)
}

fn encode(response: &ResponseEnvelope) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        let body = serde_json::json!({ "error": e.to_string() }).to_string();
        serde_json::json!({ "statusCode": 500, "headers": {}, "body": body }).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfigStore, RawPrincipal};
    use crate::probe::NetworkProber;
    use crate::router::DispatcherConfig;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_serves_each_line() {
        let store = MemoryConfigStore::default().with_session(
            "tok",
            RawPrincipal {
                username: Some("alice".to_string()),
                ..Default::default()
            },
        );
        let dispatcher = Dispatcher::new(
            DispatcherConfig::default(),
            Arc::new(store),
            Arc::new(NetworkProber),
        );

        let input = concat!(
            r#"{"path": "/services/app_api/ping", "sessionKey": "tok"}"#,
            "\n\n",
            r#"{"path": "/services/app_api/ping"}"#,
            "\n",
            "not json\n",
        );
        let mut output = Vec::new();

        let handled = serve_lines(&dispatcher, input.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(handled, 3);

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let codes: Vec<&Value> = responses.iter().map(|r| &r["statusCode"]).collect();
        assert_eq!(codes, vec![&json!(200), &json!(401), &json!(400)]);
        assert_eq!(responses[0]["headers"]["Content-Type"], "application/json");
    }
}
