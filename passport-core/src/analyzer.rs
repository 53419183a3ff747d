//! The face detection capability consumed by the pipeline.
//!
//! The detector model itself lives outside this crate. It is injected through
//! [`FaceAnalyzer`], which exposes the two operations the pipeline needs: locating face
//! boxes on the source photo and extracting landmarks on the canonical crop.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::{Result, anyhow};
use image::DynamicImage;

use crate::geometry::BoundingBox;
use crate::landmarks::LandmarkSet;

/// Thread-safe face detection backend.
///
/// Both methods return one entry per detected face; an empty list means no face was
/// found. Errors are reserved for backend failures and abort the verification of the
/// current image.
pub trait FaceAnalyzer: Send + Sync {
    /// Locate face boxes in `image`, in its own pixel coordinates.
    fn locate_faces(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>>;

    /// Extract a landmark set for every face in `image`.
    fn extract_landmarks(&self, image: &DynamicImage) -> Result<Vec<LandmarkSet>>;
}

/// Detection backend that needs exclusive access while running.
///
/// Wrap it in [`Serialized`] to share it between batch workers.
pub trait FaceAnalyzerMut: Send {
    fn locate_faces(&mut self, image: &DynamicImage) -> Result<Vec<BoundingBox>>;

    fn extract_landmarks(&mut self, image: &DynamicImage) -> Result<Vec<LandmarkSet>>;
}

/// Serializes every call into a [`FaceAnalyzerMut`] behind a mutex.
pub struct Serialized<T> {
    inner: Mutex<T>,
}

impl<T: FaceAnalyzerMut> Serialized<T> {
    pub fn new(analyzer: T) -> Self {
        Self {
            inner: Mutex::new(analyzer),
        }
    }

    /// Recover the wrapped backend.
    pub fn into_inner(self) -> Result<T> {
        self.inner
            .into_inner()
            .map_err(|_| anyhow!("face analyzer lock poisoned"))
    }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("face analyzer lock poisoned"))?;
        f(&mut guard)
    }
}

impl<T: FaceAnalyzerMut> FaceAnalyzer for Serialized<T> {
    fn locate_faces(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>> {
        self.with(|a| a.locate_faces(image))
    }

    fn extract_landmarks(&self, image: &DynamicImage) -> Result<Vec<LandmarkSet>> {
        self.with(|a| a.extract_landmarks(image))
    }
}

impl<T: FaceAnalyzer + ?Sized> FaceAnalyzer for &T {
    fn locate_faces(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>> {
        (**self).locate_faces(image)
    }

    fn extract_landmarks(&self, image: &DynamicImage) -> Result<Vec<LandmarkSet>> {
        (**self).extract_landmarks(image)
    }
}

impl<T: FaceAnalyzer + ?Sized> FaceAnalyzer for Box<T> {
    fn locate_faces(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>> {
        (**self).locate_faces(image)
    }

    fn extract_landmarks(&self, image: &DynamicImage) -> Result<Vec<LandmarkSet>> {
        (**self).extract_landmarks(image)
    }
}

impl<T: FaceAnalyzer + ?Sized> FaceAnalyzer for Arc<T> {
    fn locate_faces(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>> {
        (**self).locate_faces(image)
    }

    fn extract_landmarks(&self, image: &DynamicImage) -> Result<Vec<LandmarkSet>> {
        (**self).extract_landmarks(image)
    }
}

/// Analyzer that replays detections computed elsewhere.
///
/// Every call to [`FaceAnalyzer::locate_faces`] returns the same boxes and every call to
/// [`FaceAnalyzer::extract_landmarks`] the same landmark sets, whatever the image. Call
/// counters make it possible to assert which stages ran.
#[derive(Debug, Default)]
pub struct ReplayAnalyzer {
    faces: Vec<BoundingBox>,
    landmarks: Vec<LandmarkSet>,
    locate_calls: AtomicUsize,
    extract_calls: AtomicUsize,
}

impl ReplayAnalyzer {
    pub fn new(faces: Vec<BoundingBox>, landmarks: Vec<LandmarkSet>) -> Self {
        Self {
            faces,
            landmarks,
            ..Self::default()
        }
    }

    pub fn locate_calls(&self) -> usize {
        self.locate_calls.load(Ordering::Relaxed)
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::Relaxed)
    }
}

impl FaceAnalyzer for ReplayAnalyzer {
    fn locate_faces(&self, _image: &DynamicImage) -> Result<Vec<BoundingBox>> {
        self.locate_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.faces.clone())
    }

    fn extract_landmarks(&self, _image: &DynamicImage) -> Result<Vec<LandmarkSet>> {
        self.extract_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.landmarks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingDetector {
        calls: usize,
    }

    impl FaceAnalyzerMut for CountingDetector {
        fn locate_faces(&mut self, image: &DynamicImage) -> Result<Vec<BoundingBox>> {
            self.calls += 1;
            let (w, h) = (image.width() as i32, image.height() as i32);
            Ok(vec![BoundingBox::new(0, w, h, 0)])
        }

        fn extract_landmarks(&mut self, _image: &DynamicImage) -> Result<Vec<LandmarkSet>> {
            self.calls += 1;
            Ok(Vec::new())
        }
    }

    #[test]
    fn serialized_wrapper_forwards_and_counts() {
        let shared = Arc::new(Serialized::new(CountingDetector { calls: 0 }));
        let image = DynamicImage::new_rgb8(8, 6);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let shared = Arc::clone(&shared);
                let image = &image;
                scope.spawn(move || {
                    let faces = shared.locate_faces(image).expect("locate");
                    assert_eq!(faces, vec![BoundingBox::new(0, 8, 6, 0)]);
                    assert!(shared.extract_landmarks(image).expect("extract").is_empty());
                });
            }
        });

        let inner = Arc::try_unwrap(shared)
            .ok()
            .expect("sole owner")
            .into_inner()
            .expect("unpoisoned");
        assert_eq!(inner.calls, 8);
    }

    #[test]
    fn replay_analyzer_counts_calls() {
        let replay = ReplayAnalyzer::new(vec![BoundingBox::new(1, 2, 3, 0)], Vec::new());
        let image = DynamicImage::new_rgb8(4, 4);
        let boxed: Box<dyn FaceAnalyzer + '_> = Box::new(&replay);
        assert_eq!(boxed.locate_faces(&image).expect("locate").len(), 1);
        assert!(boxed.extract_landmarks(&image).expect("extract").is_empty());
        assert_eq!(replay.locate_calls(), 1);
        assert_eq!(replay.extract_calls(), 1);
    }
}
