//! Image processing via the external `magick` binary.
//!
//! All pixel pushing is delegated to ImageMagick; this crate shells out,
//! checks exit codes, and treats an absent tool as "nothing to do" wherever
//! the pipeline allows it.

pub mod magick;
pub mod optimize;

pub use magick::{is_lossy_format, normalize_format, CropGeometry, Magick, MediaError};
pub use optimize::{
    collect_optimizable, existing_variants, OptimizeReport, Optimizer, RESPONSIVE_WIDTHS,
};
