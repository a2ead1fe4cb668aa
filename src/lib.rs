//! GeoDesk - georeferencing for scanned maps and charts
//!
//! Three clicked control points with known longitude/latitude define an affine
//! transform from image pixels to geographic coordinates. The transform is
//! stored in a world file next to the image, and further clicks can be turned
//! into georeferenced data samples such as isobath depths.
//!
//! ```rust,ignore
//! use geodesk::document::{GeoDocument, OverwritePolicy};
//! use geodesk::model::ImagePoint;
//!
//! let mut doc = GeoDocument::open("chart.png");
//! doc.begin_referencing();
//! doc.add_control_point(ImagePoint::new(10.0, 10.0), -3.0, 48.0)?;
//! doc.add_control_point(ImagePoint::new(110.0, 10.0), -2.0, 48.0)?;
//! doc.add_control_point(ImagePoint::new(10.0, 110.0), -3.0, 47.0)?;
//! doc.save_world_file(OverwritePolicy::Ask)?;
//!
//! let geo = doc.georeference(ImagePoint::new(60.0, 60.0));
//! ```

pub mod config;
pub mod constants;
pub mod document;
pub mod format;
pub mod model;
pub mod session;
pub mod transform;
pub mod viewport;

pub use document::{DocumentError, GeoDocument, OverwritePolicy};
pub use format::{FormatError, load_world_file, save_world_file};
pub use model::{ControlPoint, GeoPoint, ImagePoint, Sample};
pub use session::{GeoreferencingSession, SamplingMode, SessionError, SessionState};
pub use transform::{AffineSolver, AffineTransform, SolveError, solve_affine};
pub use viewport::{ViewState, ViewportMapper, map_click_to_image};
