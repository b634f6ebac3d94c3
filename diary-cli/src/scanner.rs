//! Barcode input from a keyboard-wedge scanner.
//!
//! Handheld USB scanners type the decoded code followed by Enter, so the
//! "camera" here is standard input and a decode is one line.

use async_trait::async_trait;
use diary_core::{BarcodeDecoder, Camera, CaptureStream, ScanError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// Line-oriented capture stream.
pub struct LineStream<R> {
    lines: Lines<R>,
    open: bool,
}

impl<R> CaptureStream for LineStream<R>
where
    R: Send,
{
    fn stop(&mut self) {
        self.open = false;
    }
}

/// Hands out one line stream over a reader.
pub struct KeyboardWedge<R> {
    reader: Option<R>,
}

impl KeyboardWedge<BufReader<tokio::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> KeyboardWedge<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R> Camera for KeyboardWedge<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    type Stream = LineStream<R>;

    fn acquire(&mut self) -> Result<LineStream<R>, ScanError> {
        let reader = self.reader.take().ok_or(ScanError::Unavailable)?;
        Ok(LineStream {
            lines: reader.lines(),
            open: true,
        })
    }
}

/// Reads the next non-empty line as the barcode.
pub struct LineDecoder;

#[async_trait]
impl<R> BarcodeDecoder<LineStream<R>> for LineDecoder
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn decode_once(&mut self, stream: &mut LineStream<R>) -> Result<String, ScanError> {
        if !stream.open {
            return Err(ScanError::Unavailable);
        }
        loop {
            match stream.lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Ok(line),
                Ok(None) => return Err(ScanError::Capture("input closed".to_string())),
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    return Err(ScanError::PermissionDenied)
                }
                Err(e) => return Err(ScanError::Capture(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diary_core::scan_once;

    #[tokio::test]
    async fn test_reads_first_non_empty_line() {
        let input: &[u8] = b"\n  \n4607001234567\nignored\n";
        let mut camera = KeyboardWedge::new(BufReader::new(input));

        let code = scan_once(&mut camera, &mut LineDecoder).await.unwrap();
        assert_eq!(code, "4607001234567");
    }

    #[tokio::test]
    async fn test_closed_input_is_capture_error() {
        let input: &[u8] = b"";
        let mut camera = KeyboardWedge::new(BufReader::new(input));

        let result = scan_once(&mut camera, &mut LineDecoder).await;
        assert!(matches!(result, Err(ScanError::Capture(_))));
    }

    #[tokio::test]
    async fn test_reader_is_handed_out_once() {
        let input: &[u8] = b"123\n";
        let mut camera = KeyboardWedge::new(BufReader::new(input));

        scan_once(&mut camera, &mut LineDecoder).await.unwrap();
        let again = scan_once(&mut camera, &mut LineDecoder).await;
        assert_eq!(again, Err(ScanError::Unavailable));
    }
}
