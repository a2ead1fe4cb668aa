//! An opened image together with its sidecar files and georeferencing session.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::files::DATA_FILE_EXTENSION;
use crate::format::{self, FormatError};
use crate::model::{ControlPoint, GeoPoint, ImagePoint};
use crate::session::{GeoreferencingSession, SessionError, SessionState};
use crate::transform::{AffineTransform, REQUIRED_CONTROL_POINTS};

/// What to do when saving over an existing world file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Refuse, so the caller can ask the user first
    #[default]
    Ask,
    /// Replace the existing file
    Overwrite,
}

/// Errors from document-level operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Reading or writing a sidecar file failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The session refused the operation
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Saving would replace an existing world file
    #[error("World file already exists: {path:?}")]
    WorldFileExists {
        /// The existing world file
        path: PathBuf,
    },

    /// The image name has no extension to derive a world file name from
    #[error("Cannot derive a world file name for {image:?}")]
    NoWorldFilePath {
        /// The opened image
        image: PathBuf,
    },

    /// A reference point file must hold exactly three points to be solved
    #[error("Expected {expected} reference points, found {found}")]
    WrongPointCount {
        /// Points needed for a solve
        expected: usize,
        /// Points in the input
        found: usize,
    },

    /// The active transform was not solved from control points in this session
    #[error("No control points to save, the transform was loaded or not solved yet")]
    NoControlPoints,
}

/// One image being georeferenced.
#[derive(Debug, Clone)]
pub struct GeoDocument {
    image_path: PathBuf,
    world_file_path: Option<PathBuf>,
    data_file_path: Option<PathBuf>,
    world_file_precision: Option<usize>,
    session: GeoreferencingSession,
}

impl GeoDocument {
    /// Open an image with a default session.
    ///
    /// If the image already has a world file it is loaded. A broken world file
    /// is logged and the document stays un-referenced.
    pub fn open(image_path: impl Into<PathBuf>) -> Self {
        Self::open_with(image_path, GeoreferencingSession::new())
    }

    /// Open an image using a preconfigured session.
    pub fn open_with(image_path: impl Into<PathBuf>, mut session: GeoreferencingSession) -> Self {
        let image_path = image_path.into();
        let world_file_path = format::world_file_path(&image_path);
        session.reset();

        match &world_file_path {
            Some(path) if path.exists() => match format::load_world_file(path) {
                Ok(transform) => session.use_transform(transform),
                Err(e) => log::warn!("Failed to load world file {:?}: {}", path, e),
            },
            Some(path) => log::debug!("No world file at {:?}", path),
            None => log::debug!("No world file name for {:?}", image_path),
        }

        Self {
            image_path,
            world_file_path,
            data_file_path: None,
            world_file_precision: None,
            session,
        }
    }

    /// Write world files with a fixed number of fractional digits.
    pub fn with_world_file_precision(mut self, precision: Option<usize>) -> Self {
        self.world_file_precision = precision;
        self
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Sidecar world file location derived from the image name.
    pub fn world_file_path(&self) -> Option<&Path> {
        self.world_file_path.as_deref()
    }

    /// Data file last saved to or loaded from.
    pub fn data_file_path(&self) -> Option<&Path> {
        self.data_file_path.as_deref()
    }

    /// Where samples are saved when no data file was chosen yet.
    pub fn default_data_file_path(&self) -> PathBuf {
        self.data_file_path
            .clone()
            .unwrap_or_else(|| self.image_path.with_extension(DATA_FILE_EXTENSION))
    }

    pub fn session(&self) -> &GeoreferencingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GeoreferencingSession {
        &mut self.session
    }

    pub fn begin_referencing(&mut self) {
        self.session.begin_referencing();
    }

    pub fn add_control_point(
        &mut self,
        image: ImagePoint,
        lon: f64,
        lat: f64,
    ) -> Result<SessionState, SessionError> {
        self.session.add_control_point(image, lon, lat)
    }

    pub fn is_referenced(&self) -> bool {
        self.session.is_referenced()
    }

    pub fn georeference(&self, image: ImagePoint) -> Option<GeoPoint> {
        self.session.georeference(image)
    }

    pub fn transform(&self) -> Option<&AffineTransform> {
        self.session.transform()
    }

    /// Save the active transform to the image's world file.
    ///
    /// Returns the path written.
    pub fn save_world_file(&self, policy: OverwritePolicy) -> Result<PathBuf, DocumentError> {
        let path = self
            .world_file_path
            .clone()
            .ok_or_else(|| DocumentError::NoWorldFilePath {
                image: self.image_path.clone(),
            })?;

        if policy == OverwritePolicy::Ask && path.exists() {
            return Err(DocumentError::WorldFileExists { path });
        }

        self.save_world_file_to(&path)?;
        Ok(path)
    }

    /// Save the active transform to an arbitrary path, replacing any file there.
    pub fn save_world_file_to(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let transform = self.active_transform("save a world file")?;
        format::save_world_file_with_precision(path, transform, self.world_file_precision)?;
        Ok(())
    }

    /// Load a world file and make it the active transform.
    ///
    /// On failure the current transform is kept.
    pub fn load_world_file_from(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let transform = format::load_world_file(path.as_ref())?;
        self.session.use_transform(transform);
        Ok(())
    }

    /// Write the recorded samples to a data file.
    pub fn save_samples(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        format::save_samples(path, self.session.samples())?;
        self.data_file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Load a data file so that new samples are appended to it.
    ///
    /// On failure the current samples are kept.
    pub fn load_samples(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let precision = self.session.samples().precision();
        let buffer = format::load_samples(path)?.with_precision(precision);
        self.session.load_samples(buffer);
        self.data_file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Write the three control points behind the active transform.
    ///
    /// The file reads back with [`load_reference_points`](Self::load_reference_points).
    pub fn save_reference_points(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let points = self
            .session
            .control_points()
            .ok_or(DocumentError::NoControlPoints)?;
        format::save_reference_points(path, points, None)?;
        Ok(())
    }

    /// Georeference from a reference point file holding exactly three points.
    pub fn load_reference_points(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let points = format::load_reference_points(path)?;
        self.reference_from(&points)
    }

    /// Georeference from exactly three control points.
    ///
    /// On failure the current transform is kept.
    pub fn reference_from(&mut self, points: &[ControlPoint]) -> Result<(), DocumentError> {
        let points: [ControlPoint; REQUIRED_CONTROL_POINTS] =
            points
                .try_into()
                .map_err(|_| DocumentError::WrongPointCount {
                    expected: REQUIRED_CONTROL_POINTS,
                    found: points.len(),
                })?;
        self.session.use_control_points(points)?;
        Ok(())
    }

    fn active_transform(&self, operation: &'static str) -> Result<&AffineTransform, SessionError> {
        self.session
            .transform()
            .filter(|_| self.session.is_referenced())
            .ok_or_else(|| SessionError::InvalidState {
                operation,
                state: self.session.state(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn px(x: f64, y: f64) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    fn reference(doc: &mut GeoDocument) {
        doc.begin_referencing();
        doc.add_control_point(px(10.0, 10.0), -3.0, 48.0).unwrap();
        doc.add_control_point(px(110.0, 10.0), -2.0, 48.0).unwrap();
        doc.add_control_point(px(10.0, 110.0), -3.0, 47.0).unwrap();
    }

    #[test]
    fn test_open_without_world_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = GeoDocument::open(dir.path().join("chart.png"));

        assert!(!doc.is_referenced());
        assert_eq!(doc.world_file_path(), Some(dir.path().join("chart.pgw").as_path()));
        assert!(doc.data_file_path().is_none());
        assert_eq!(doc.default_data_file_path(), dir.path().join("chart.txt"));
    }

    #[test]
    fn test_open_loads_existing_world_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chart.tfw"), "1\n0\n0\n-1\n100\n50\n").unwrap();

        let doc = GeoDocument::open(dir.path().join("chart.tiff"));
        assert!(doc.is_referenced());
        assert_eq!(doc.georeference(px(2.0, 3.0)), Some(GeoPoint::new(102.0, 47.0)));
        assert!(doc.session().control_points().is_none());
    }

    #[test]
    fn test_open_with_broken_world_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chart.jgw"), "1\n0\n").unwrap();

        let doc = GeoDocument::open(dir.path().join("chart.jpg"));
        assert!(!doc.is_referenced());
    }

    #[test]
    fn test_save_world_file_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("chart.png");
        let mut doc = GeoDocument::open(&image);
        reference(&mut doc);

        let written = doc.save_world_file(OverwritePolicy::Ask).unwrap();
        assert_eq!(written, dir.path().join("chart.pgw"));

        let reopened = GeoDocument::open(&image);
        assert_eq!(reopened.transform(), doc.transform());
        let geo = reopened.georeference(px(60.0, 60.0)).unwrap();
        assert_relative_eq!(geo.lon(), -2.5, epsilon = 1e-12);
        assert_relative_eq!(geo.lat(), 47.5, epsilon = 1e-12);
    }

    #[test]
    fn test_overwrite_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let world = dir.path().join("chart.pgw");
        std::fs::write(&world, "1\n0\n0\n-1\n0\n0\n").unwrap();

        let mut doc = GeoDocument::open(dir.path().join("chart.png"));
        reference(&mut doc);

        match doc.save_world_file(OverwritePolicy::Ask) {
            Err(DocumentError::WorldFileExists { path }) => assert_eq!(path, world),
            other => panic!("expected WorldFileExists, got {:?}", other),
        }
        assert_eq!(std::fs::read_to_string(&world).unwrap(), "1\n0\n0\n-1\n0\n0\n");

        doc.save_world_file(OverwritePolicy::Overwrite).unwrap();
        assert_ne!(std::fs::read_to_string(&world).unwrap(), "1\n0\n0\n-1\n0\n0\n");
    }

    #[test]
    fn test_save_without_transform() {
        let dir = tempfile::tempdir().unwrap();
        let doc = GeoDocument::open(dir.path().join("chart.png"));
        assert!(matches!(
            doc.save_world_file(OverwritePolicy::Overwrite),
            Err(DocumentError::Session(SessionError::InvalidState { .. }))
        ));
        assert!(!dir.path().join("chart.pgw").exists());
    }

    #[test]
    fn test_save_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = GeoDocument::open(dir.path().join("chart"));
        reference(&mut doc);
        assert!(matches!(
            doc.save_world_file(OverwritePolicy::Overwrite),
            Err(DocumentError::NoWorldFilePath { .. })
        ));
    }

    #[test]
    fn test_bad_world_file_keeps_transform() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.pgw");
        std::fs::write(&bad, "1\n0\nnan?\n-1\n0\n0\n").unwrap();

        let mut doc = GeoDocument::open(dir.path().join("chart.png"));
        reference(&mut doc);
        let before = *doc.transform().unwrap();

        assert!(matches!(
            doc.load_world_file_from(&bad),
            Err(DocumentError::Format(FormatError::InvalidNumber { index: 2, .. }))
        ));
        assert_eq!(doc.transform(), Some(&before));
        assert!(doc.session().control_points().is_some());
    }

    #[test]
    fn test_world_file_precision() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = GeoDocument::open(dir.path().join("chart.png")).with_world_file_precision(Some(3));
        doc.session_mut()
            .use_transform(AffineTransform::from_coefficients([0.01, 0.0, 0.0, -0.01, -3.1, 48.1]));

        let path = doc.save_world_file(OverwritePolicy::Ask).unwrap();
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "0.010\n0.000\n0.000\n-0.010\n-3.100\n48.100\n"
        );
    }

    #[test]
    fn test_samples_save_and_append() {
        use crate::session::SamplingMode;

        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("isobaths.txt");
        let mut doc = GeoDocument::open(dir.path().join("chart.png"));
        reference(&mut doc);

        let session = doc.session_mut();
        session.start_sampling(SamplingMode::Fixed(20.0)).unwrap();
        session.record_sample(px(60.0, 60.0), None).unwrap();
        doc.save_samples(&data).unwrap();
        assert_eq!(doc.data_file_path(), Some(data.as_path()));

        let mut other = GeoDocument::open(dir.path().join("chart.png"));
        reference(&mut other);
        other.load_samples(&data).unwrap();
        let session = other.session_mut();
        session.start_sampling(SamplingMode::Fixed(30.0)).unwrap();
        session.record_sample(px(10.0, 10.0), None).unwrap();
        other.save_samples(&data).unwrap();

        let values: Vec<f64> = format::load_samples(&data)
            .unwrap()
            .samples()
            .unwrap()
            .iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec![20.0, 30.0]);
    }

    #[test]
    fn test_reference_points_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let points = dir.path().join("chart.points");
        let mut doc = GeoDocument::open(dir.path().join("chart.png"));
        reference(&mut doc);
        doc.save_reference_points(&points).unwrap();

        let mut other = GeoDocument::open(dir.path().join("chart.png"));
        other.load_reference_points(&points).unwrap();
        assert_eq!(other.transform(), doc.transform());
        assert_eq!(other.session().history(), doc.session().history());
    }

    #[test]
    fn test_reference_points_after_repick() {
        let dir = tempfile::tempdir().unwrap();
        let points = dir.path().join("chart.points");
        let mut doc = GeoDocument::open(dir.path().join("chart.png"));

        // First pass rejected, second accepted, then a full re-reference
        doc.begin_referencing();
        doc.add_control_point(px(0.0, 0.0), 0.0, 0.0).unwrap();
        doc.add_control_point(px(1.0, 1.0), 1.0, 1.0).unwrap();
        assert!(doc.add_control_point(px(2.0, 2.0), 2.0, 2.0).is_err());
        doc.add_control_point(px(10.0, 10.0), -3.0, 48.0).unwrap();
        doc.add_control_point(px(110.0, 10.0), -2.0, 48.0).unwrap();
        doc.add_control_point(px(10.0, 110.0), -3.0, 47.0).unwrap();
        reference(&mut doc);
        assert_eq!(doc.session().history().len(), 9);

        doc.save_reference_points(&points).unwrap();
        assert_eq!(std::fs::read_to_string(&points).unwrap().lines().count(), 3);

        let mut other = GeoDocument::open(dir.path().join("chart.png"));
        other.load_reference_points(&points).unwrap();
        assert_eq!(other.transform(), doc.transform());
    }

    #[test]
    fn test_save_reference_points_needs_solved_points() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = GeoDocument::open(dir.path().join("chart.png"));
        doc.session_mut()
            .use_transform(AffineTransform::from_coefficients([1.0, 0.0, 0.0, -1.0, 0.0, 0.0]));

        assert!(matches!(
            doc.save_reference_points(dir.path().join("chart.points")),
            Err(DocumentError::NoControlPoints)
        ));
    }

    #[test]
    fn test_bad_reference_points_keep_transform() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chart.pgw"), "1\n0\n0\n-1\n100\n50\n").unwrap();
        let points = dir.path().join("collinear.points");
        std::fs::write(&points, "0 0 0 0\n1 1 1 1\n2 2 2 2\n").unwrap();

        let mut doc = GeoDocument::open(dir.path().join("chart.png"));
        let before = *doc.transform().unwrap();

        assert!(matches!(
            doc.load_reference_points(&points),
            Err(DocumentError::Session(SessionError::Solve(_)))
        ));
        assert_eq!(doc.session().state(), SessionState::Referenced);
        assert_eq!(doc.transform(), Some(&before));
    }

    #[test]
    fn test_reference_from_wrong_count() {
        let mut doc = GeoDocument::open("chart.png");
        let p = ControlPoint::new(px(0.0, 0.0), GeoPoint::new(0.0, 0.0));
        assert!(matches!(
            doc.reference_from(&[p, p]),
            Err(DocumentError::WrongPointCount { expected: 3, found: 2 })
        ));
        assert_eq!(doc.session().state(), SessionState::Idle);
    }
}
