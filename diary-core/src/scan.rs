//! Single-shot barcode scanning over a scoped capture device.
//!
//! A [`ScanSession`] owns the acquired stream and stops it when it goes out
//! of scope, so the device is released after a decode, after a failure and
//! when the scanning future is dropped mid-way.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while scanning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No capture device available")]
    Unavailable,

    #[error("Capture failed: {0}")]
    Capture(String),
}

impl ScanError {
    /// Message for the person holding the device.
    pub fn user_message(&self) -> &'static str {
        match self {
            ScanError::PermissionDenied => {
                "Camera access was denied. Allow access and try again."
            }
            ScanError::Unavailable => "Scanner is not available on this device.",
            ScanError::Capture(_) => "Could not read a barcode. Check the camera and try again.",
        }
    }
}

/// An open capture stream.
pub trait CaptureStream: Send {
    /// Stops all tracks and detaches the stream. Called exactly once.
    fn stop(&mut self);
}

/// A device that can hand out a capture stream.
pub trait Camera {
    type Stream: CaptureStream;

    fn acquire(&mut self) -> Result<Self::Stream, ScanError>;
}

/// Decodes one payload from a running stream.
#[async_trait]
pub trait BarcodeDecoder<S: CaptureStream>: Send {
    async fn decode_once(&mut self, stream: &mut S) -> Result<String, ScanError>;
}

/// Holds an acquired stream and stops it on drop.
pub struct ScanSession<S: CaptureStream> {
    stream: S,
    released: bool,
}

impl<S: CaptureStream> ScanSession<S> {
    pub fn start<C>(camera: &mut C) -> Result<Self, ScanError>
    where
        C: Camera<Stream = S>,
    {
        let stream = camera.acquire()?;
        tracing::debug!("capture stream acquired");
        Ok(Self {
            stream,
            released: false,
        })
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Stops the stream now instead of at drop.
    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if !self.released {
            self.released = true;
            self.stream.stop();
            tracing::debug!("capture stream released");
        }
    }
}

impl<S: CaptureStream> Drop for ScanSession<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Acquires the camera, decodes a single payload and releases the camera.
///
/// Surrounding whitespace is trimmed; an empty payload counts as a capture
/// failure.
pub async fn scan_once<C, D>(camera: &mut C, decoder: &mut D) -> Result<String, ScanError>
where
    C: Camera,
    D: BarcodeDecoder<C::Stream>,
{
    let mut session = ScanSession::start(camera)?;
    let decoded = decoder.decode_once(session.stream_mut()).await;
    session.release();

    let payload = decoded?.trim().to_string();
    if payload.is_empty() {
        return Err(ScanError::Capture("empty payload".to_string()));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct FakeStream {
        stops: Arc<AtomicUsize>,
    }

    impl CaptureStream for FakeStream {
        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeCamera {
        result: Result<(), ScanError>,
        stops: Arc<AtomicUsize>,
    }

    impl FakeCamera {
        fn working() -> Self {
            Self {
                result: Ok(()),
                stops: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(error: ScanError) -> Self {
            Self {
                result: Err(error),
                stops: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    impl Camera for FakeCamera {
        type Stream = FakeStream;

        fn acquire(&mut self) -> Result<FakeStream, ScanError> {
            self.result.clone()?;
            Ok(FakeStream {
                stops: self.stops.clone(),
            })
        }
    }

    enum FakeDecoder {
        Payload(&'static str),
        Fail(ScanError),
        Hang,
    }

    #[async_trait]
    impl BarcodeDecoder<FakeStream> for FakeDecoder {
        async fn decode_once(&mut self, _stream: &mut FakeStream) -> Result<String, ScanError> {
            match self {
                FakeDecoder::Payload(p) => Ok(p.to_string()),
                FakeDecoder::Fail(e) => Err(e.clone()),
                FakeDecoder::Hang => {
                    futures::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    #[tokio::test]
    async fn test_scan_once_returns_trimmed_payload_and_releases() {
        let mut camera = FakeCamera::working();
        let mut decoder = FakeDecoder::Payload(" 4600000000017\n");

        let code = scan_once(&mut camera, &mut decoder).await.unwrap();

        assert_eq!(code, "4600000000017");
        assert_eq!(camera.stops(), 1);
    }

    #[tokio::test]
    async fn test_decode_failure_releases_stream() {
        let mut camera = FakeCamera::working();
        let mut decoder = FakeDecoder::Fail(ScanError::Capture("blurry".into()));

        let result = scan_once(&mut camera, &mut decoder).await;

        assert_eq!(result, Err(ScanError::Capture("blurry".into())));
        assert_eq!(camera.stops(), 1);
    }

    #[tokio::test]
    async fn test_empty_payload_is_capture_error() {
        let mut camera = FakeCamera::working();
        let mut decoder = FakeDecoder::Payload("   ");

        let result = scan_once(&mut camera, &mut decoder).await;

        assert!(matches!(result, Err(ScanError::Capture(_))));
        assert_eq!(camera.stops(), 1);
    }

    #[tokio::test]
    async fn test_permission_denied_never_acquires() {
        let mut camera = FakeCamera::failing(ScanError::PermissionDenied);
        let mut decoder = FakeDecoder::Payload("123");

        let result = scan_once(&mut camera, &mut decoder).await;

        assert_eq!(result, Err(ScanError::PermissionDenied));
        assert_eq!(camera.stops(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_releases_stream() {
        let mut camera = FakeCamera::working();
        let mut decoder = FakeDecoder::Hang;

        let result = tokio::time::timeout(
            Duration::from_millis(10),
            scan_once(&mut camera, &mut decoder),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(camera.stops(), 1);
    }

    #[test]
    fn test_session_stops_once() {
        let mut camera = FakeCamera::working();
        let session = ScanSession::start(&mut camera).unwrap();
        session.release();
        assert_eq!(camera.stops(), 1);
    }

    #[test]
    fn test_user_messages_distinguish_permission() {
        assert!(ScanError::PermissionDenied.user_message().contains("denied"));
        assert_ne!(
            ScanError::PermissionDenied.user_message(),
            ScanError::Capture("x".into()).user_message()
        );
    }
}
