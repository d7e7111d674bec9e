//! Newline-delimited JSON input source.
//!
//! Any front end (a touch-screen shell, a test harness, a recorded trace)
//! can drive the client by writing one [`InputEvent`] per line:
//!
//! ```text
//! {"type":"mouse_move","dx":3,"dy":-1}
//! {"type":"touch_start","contacts":[{"id":1,"x":120.0,"y":80.0}]}
//! ```
//!
//! Malformed lines are logged and skipped.

use lux_core::InputEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Reads input events from a line-oriented async reader.
pub struct NdjsonInputSource<R> {
    reader: R,
}

impl<R> NdjsonInputSource<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Forwards events to `tx` until the reader ends or the receiver is
    /// dropped.  Returns the number of events forwarded.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails.
    pub async fn run(self, tx: mpsc::Sender<InputEvent>) -> std::io::Result<u64> {
        let mut lines = self.reader.lines();
        let mut forwarded = 0;
        let mut line_no = 0_u64;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<InputEvent>(line) {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        debug!("input receiver dropped, stopping");
                        break;
                    }
                    forwarded += 1;
                }
                Err(e) => warn!(line = line_no, "skipping malformed input: {e}"),
            }
        }
        Ok(forwarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::MouseButton;

    #[tokio::test]
    async fn test_reads_events_and_skips_garbage() {
        // Arrange
        let input = b"{\"type\":\"mouse_move\",\"dx\":3,\"dy\":-1}\n\
                      not json\n\
                      \n\
                      {\"type\":\"mouse_button\",\"button\":2,\"pressed\":true}\n";
        let source = NdjsonInputSource::new(&input[..]);
        let (tx, mut rx) = mpsc::channel(8);

        // Act
        let forwarded = source.run(tx).await.unwrap();

        // Assert
        assert_eq!(forwarded, 2);
        assert_eq!(rx.recv().await, Some(InputEvent::MouseMove { dx: 3.0, dy: -1.0 }));
        assert_eq!(
            rx.recv().await,
            Some(InputEvent::MouseButton { button: MouseButton::Right, pressed: true })
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        // Arrange: the event arrives in two chunks, as from a pipe
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"type\":\"key\",\"code\":\"Ke")
            .read(b"yA\",\"pressed\":true}\n")
            .build();
        let (tx, mut rx) = mpsc::channel(8);

        // Act
        let forwarded = NdjsonInputSource::new(tokio::io::BufReader::new(reader))
            .run(tx)
            .await
            .unwrap();

        // Assert
        assert_eq!(forwarded, 1);
        assert_eq!(
            rx.recv().await,
            Some(InputEvent::Key { code: "KeyA".into(), pressed: true })
        );
    }

    #[tokio::test]
    async fn test_stops_when_receiver_dropped() {
        let input = b"{\"type\":\"mouse_move\",\"dx\":1,\"dy\":1}\n{\"type\":\"mouse_move\",\"dx\":1,\"dy\":1}\n";
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        let forwarded = NdjsonInputSource::new(&input[..]).run(tx).await.unwrap();

        assert_eq!(forwarded, 0);
    }
}
