//! JSON-lines message channel.
//!
//! The host writes one [`Request`] per line to stdin and reads one
//! [`Response`](crate::protocol::Response) per line from stdout. Requests that
//! produce no response write nothing. Lines that are not UTF-8 or do not parse
//! are logged and skipped. The loop ends when stdin closes.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::{Request, SyncService};

pub async fn run_stdio(service: &SyncService) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    tracing::info!("serving messages on stdin/stdout");
    let handled = serve_lines(service, stdin, stdout).await?;
    tracing::info!(handled, "stdin closed");
    Ok(())
}

/// Serve requests from `reader` until EOF. Returns the number of requests handled.
pub async fn serve_lines<R, W>(service: &SyncService, mut reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut handled = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim(),
            Err(e) => {
                tracing::warn!("ignoring message that is not valid UTF-8: {}", e);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("ignoring malformed message: {}", e);
                continue;
            }
        };
        handled += 1;

        if let Some(response) = service.handle(request).await {
            let mut text = serde_json::to_string(&response)?;
            text.push('\n');
            writer.write_all(text.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Response;
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    const DOC: &str = "metadata:\n  generated_at: x\n  chunk_count: 1\n  version: v1\nchunks:\n  - title: A\n    description: a\n    tags: []\n    generated_timestamp: t\n";

    #[tokio::test]
    async fn test_lines_in_responses_out() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw("v1", DOC);
        let svc = SyncService::new(store);

        let input = concat!(
            "{\"command\":\"getVersions\"}\n",
            "\n",
            "not json\n",
            "{\"command\":\"getChunks\",\"version\":\"missing\"}\n",
            "{\"command\":\"deleteChunk\",\"version\":\"v1\",\"target\":{\"index\":0}}\n",
        );
        let mut output = Vec::new();
        let handled = serve_lines(&svc, input.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(handled, 3);

        let text = String::from_utf8(output).unwrap();
        let responses: Vec<Response> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            responses,
            vec![
                Response::Versions {
                    data: vec!["v1".to_string()]
                },
                Response::RefreshChunks {
                    version: "v1".to_string(),
                    chunks: vec![]
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw("v1", DOC);
        let svc = SyncService::new(store);

        let input: &[u8] = b"\xff\xfe garbage\n{\"command\":\"getVersions\"}\n";
        let mut output = Vec::new();
        let handled = serve_lines(&svc, input, &mut output).await.unwrap();
        assert_eq!(handled, 1);

        let text = String::from_utf8(output).unwrap();
        let response: Response = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(
            response,
            Response::Versions {
                data: vec!["v1".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let store = Arc::new(MemoryStore::new());
        let svc = SyncService::new(store);

        let mut output = Vec::new();
        let handled = serve_lines(&svc, &b"{\"command\":\"getVersions\"}"[..], &mut output)
            .await
            .unwrap();
        assert_eq!(handled, 1);
        assert_eq!(String::from_utf8(output).unwrap(), "{\"command\":\"versions\",\"data\":[]}\n");
    }
}
