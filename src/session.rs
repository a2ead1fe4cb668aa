//! Georeferencing session: collects control points, owns the active transform
//! and the value-sampling pass.
//!
//! ```text
//! Idle ──begin_referencing──▶ Collecting(0) ─add─▶ Collecting(1) ─add─▶ Collecting(2)
//!   ▲                              ▲                                        │ add
//!   │ reset                        └────────── singular ◀── solve ◀─────────┘
//!   │                                                         │ ok
//!   └──────────────────────────────────────────────────── Referenced
//! ```

use std::fmt;

use thiserror::Error;

use crate::format::SampleBuffer;
use crate::model::{ControlPoint, GeoPoint, ImagePoint, Sample};
use crate::transform::{AffineSolver, AffineTransform, REQUIRED_CONTROL_POINTS, SolveError};

/// Where the session is in the georeferencing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No georeferencing pass started, no transform
    Idle,
    /// Waiting for control points; holds how many were accepted so far
    Collecting(usize),
    /// A transform is active
    Referenced,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Collecting(n) => {
                write!(f, "collecting ({}/{})", n, REQUIRED_CONTROL_POINTS)
            }
            SessionState::Referenced => write!(f, "referenced"),
        }
    }
}

/// How clicks are turned into data samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SamplingMode {
    /// Clicks are not recorded
    #[default]
    Off,
    /// Every click carries its own value
    PerClick,
    /// Every click records the same value, e.g. one isobath depth
    Fixed(f64),
}

/// Errors returned by session operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// The operation is not allowed in the current state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The three control points could not be solved
    #[error("Georeferencing failed: {0}")]
    Solve(#[from] SolveError),

    /// Per-click sampling needs a value with every click
    #[error("A value is required for each sample")]
    MissingValue,
}

impl SessionError {
    fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }
}

/// State of georeferencing for one open image.
#[derive(Debug, Clone, Default)]
pub struct GeoreferencingSession {
    solver: AffineSolver,
    collecting: bool,
    pending: Vec<ControlPoint>,
    transform: Option<AffineTransform>,
    control_points: Option<[ControlPoint; REQUIRED_CONTROL_POINTS]>,
    history: Vec<ControlPoint>,
    sampling: SamplingMode,
    samples: SampleBuffer,
}

impl GeoreferencingSession {
    /// Create an idle session using the default solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a solver with custom settings.
    pub fn with_solver(mut self, solver: AffineSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Use a sample buffer with custom output settings.
    pub fn with_samples(mut self, samples: SampleBuffer) -> Self {
        self.samples = samples;
        self
    }

    pub fn state(&self) -> SessionState {
        if self.collecting {
            SessionState::Collecting(self.pending.len())
        } else if self.transform.is_some() {
            SessionState::Referenced
        } else {
            SessionState::Idle
        }
    }

    pub fn is_referenced(&self) -> bool {
        self.state() == SessionState::Referenced
    }

    /// Start a new georeferencing pass.
    ///
    /// Unfinished points and the active transform are dropped and sampling
    /// stops. Recorded samples are kept.
    pub fn begin_referencing(&mut self) {
        self.collecting = true;
        self.pending.clear();
        self.transform = None;
        self.control_points = None;
        self.sampling = SamplingMode::Off;
        log::debug!("Georeferencing started, waiting for {} points", REQUIRED_CONTROL_POINTS);
    }

    /// Accept one control point.
    ///
    /// The third point triggers the solve. A singular configuration discards
    /// all three points and the pass restarts at `Collecting(0)`.
    pub fn add_control_point(
        &mut self,
        image: ImagePoint,
        lon: f64,
        lat: f64,
    ) -> Result<SessionState, SessionError> {
        let state = self.state();
        if !matches!(state, SessionState::Collecting(_)) {
            return Err(SessionError::invalid_state("add a control point", state));
        }

        let point = ControlPoint::new(image, GeoPoint::new(lon, lat));
        self.pending.push(point);
        self.history.push(point);
        log::debug!(
            "Control point {}/{}: {} -> {}",
            self.pending.len(),
            REQUIRED_CONTROL_POINTS,
            point.image,
            point.geo
        );

        let Ok(points) = <[ControlPoint; REQUIRED_CONTROL_POINTS]>::try_from(self.pending.as_slice())
        else {
            return Ok(self.state());
        };

        match self.solver.solve(&points) {
            Ok(transform) => {
                self.collecting = false;
                self.pending.clear();
                self.transform = Some(transform);
                self.control_points = Some(points);
                log::info!(
                    "Image georeferenced: origin {}, pixel size {} x {}",
                    transform.origin(),
                    transform.x_scale(),
                    transform.y_scale()
                );
                Ok(SessionState::Referenced)
            }
            Err(e) => {
                self.pending.clear();
                log::warn!("Control points rejected, starting over: {}", e);
                Err(e.into())
            }
        }
    }

    /// Control points accepted in the current pass, not yet solved.
    pub fn pending_points(&self) -> &[ControlPoint] {
        &self.pending
    }

    /// The control points the active transform was solved from.
    ///
    /// `None` when there is no transform or it was loaded from a world file.
    pub fn control_points(&self) -> Option<&[ControlPoint; REQUIRED_CONTROL_POINTS]> {
        self.control_points.as_ref()
    }

    pub fn transform(&self) -> Option<&AffineTransform> {
        self.transform.as_ref()
    }

    /// Every control point accepted since the last reset, in entry order.
    pub fn history(&self) -> &[ControlPoint] {
        &self.history
    }

    /// Make `transform` active, e.g. after loading a world file.
    pub fn use_transform(&mut self, transform: AffineTransform) {
        self.collecting = false;
        self.pending.clear();
        self.transform = Some(transform);
        self.control_points = None;
        log::debug!("Using transform with origin {}", transform.origin());
    }

    /// Solve `points` and make the result the active transform.
    ///
    /// The points are solved before anything changes, so on error the
    /// session is left as it was.
    pub fn use_control_points(
        &mut self,
        points: [ControlPoint; REQUIRED_CONTROL_POINTS],
    ) -> Result<(), SessionError> {
        let transform = self.solver.solve(&points)?;
        self.collecting = false;
        self.pending.clear();
        self.transform = Some(transform);
        self.control_points = Some(points);
        self.history.extend_from_slice(&points);
        self.sampling = SamplingMode::Off;
        log::info!("Image georeferenced from {} stored points", points.len());
        Ok(())
    }

    /// Geographic position of an image pixel.
    pub fn apply(&self, image: ImagePoint) -> Result<GeoPoint, SessionError> {
        match (self.state(), self.transform.as_ref()) {
            (SessionState::Referenced, Some(t)) => Ok(t.apply(image)),
            (state, _) => Err(SessionError::invalid_state("georeference a point", state)),
        }
    }

    /// Like [`apply`](Self::apply), `None` when not referenced.
    pub fn georeference(&self, image: ImagePoint) -> Option<GeoPoint> {
        self.apply(image).ok()
    }

    /// Forget everything, e.g. when another image is opened.
    pub fn reset(&mut self) {
        let solver = self.solver;
        let precision = self.samples.precision();
        *self = Self::new()
            .with_solver(solver)
            .with_samples(SampleBuffer::new().with_precision(precision));
        log::debug!("Session reset");
    }

    /// Start recording clicks as samples.
    pub fn start_sampling(&mut self, mode: SamplingMode) -> Result<(), SessionError> {
        let state = self.state();
        if state != SessionState::Referenced {
            return Err(SessionError::invalid_state("start sampling", state));
        }
        self.sampling = mode;
        log::debug!("Sampling mode: {:?}", mode);
        Ok(())
    }

    pub fn stop_sampling(&mut self) {
        self.sampling = SamplingMode::Off;
    }

    pub fn sampling_mode(&self) -> SamplingMode {
        self.sampling
    }

    /// Georeference a click and append it to the sample buffer.
    ///
    /// An explicit `value` overrides a fixed sampling value.
    pub fn record_sample(
        &mut self,
        image: ImagePoint,
        value: Option<f64>,
    ) -> Result<Sample, SessionError> {
        let value = match (self.sampling, value) {
            (SamplingMode::Off, _) => {
                return Err(SessionError::invalid_state(
                    "record a sample",
                    self.state(),
                ));
            }
            (_, Some(v)) => v,
            (SamplingMode::Fixed(v), None) => v,
            (SamplingMode::PerClick, None) => return Err(SessionError::MissingValue),
        };

        let geo = self.apply(image)?;
        let sample = Sample::new(image, geo, value);
        self.samples.push(&sample);
        log::debug!("Sample {} at {} = {}", self.samples.len(), geo, value);
        Ok(sample)
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut SampleBuffer {
        &mut self.samples
    }

    /// Replace the sample buffer, e.g. with a loaded data file to append to.
    pub fn load_samples(&mut self, samples: SampleBuffer) {
        self.samples = samples;
    }
}
