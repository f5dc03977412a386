//! Thin wrapper around the `magick` command-line tool.

use std::fmt;
use std::path::Path;
use std::process::Command;

/// Errors from invoking ImageMagick.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("ImageMagick is not installed or not available in PATH")]
    ToolUnavailable,

    #[error("Failed to run magick: {0}")]
    Spawn(String),

    #[error("magick failed for {path}: {output}")]
    CommandFailed { path: String, output: String },

    #[error("Could not read image dimensions of {path}")]
    Identify { path: String },
}

/// Center-crop geometry in ImageMagick notation (`WxH+X+Y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGeometry {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropGeometry {
    /// Crop `(width, height)` centered to the given aspect ratio.
    /// Returns `None` when the image already matches (within 1%).
    pub fn to_aspect(width: u32, height: u32, target_ratio: f64) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let current_ratio = width as f64 / height as f64;
        if (current_ratio - target_ratio).abs() <= 0.01 {
            return None;
        }

        if current_ratio > target_ratio {
            // Wider than target, crop horizontally
            let new_width = (height as f64 * target_ratio) as u32;
            Some(Self {
                width: new_width,
                height,
                x: (width - new_width) / 2,
                y: 0,
            })
        } else {
            // Taller than target, crop vertically
            let new_height = (width as f64 / target_ratio) as u32;
            Some(Self {
                width,
                height: new_height,
                x: 0,
                y: (height - new_height) / 2,
            })
        }
    }
}

impl fmt::Display for CropGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Handle to the external `magick` binary.
#[derive(Debug, Clone)]
pub struct Magick {
    binary: String,
}

impl Default for Magick {
    fn default() -> Self {
        Self::new()
    }
}

impl Magick {
    pub fn new() -> Self {
        Self {
            binary: "magick".to_string(),
        }
    }

    /// Check whether the tool can be invoked at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    /// Whether ImageMagick can write the given format (e.g. `webp`, `avif`).
    pub fn supports_format(&self, format: &str) -> bool {
        let Ok(output) = Command::new(&self.binary).args(["-list", "format"]).output() else {
            return false;
        };
        if !output.status.success() {
            return false;
        }

        let wanted = format.to_ascii_uppercase();
        let listing = String::from_utf8_lossy(&output.stdout);

        // Lines look like "     WEBP* WEBP      rw+   WebP Image Format"
        listing.lines().any(|line| {
            line.split_whitespace()
                .next()
                .map(|name| name.trim_end_matches('*') == wanted)
                .unwrap_or(false)
        })
    }

    /// Pixel dimensions of an image, via `magick identify`.
    pub fn identify_size(&self, path: &Path) -> Result<(u32, u32), MediaError> {
        let output = Command::new(&self.binary)
            .arg("identify")
            .args(["-format", "%w %h"])
            .arg(path)
            .output()
            .map_err(|e| MediaError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(MediaError::Identify {
                path: path.display().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let mut parts = text.split_whitespace();
        let width = parts.next().and_then(|p| p.parse().ok());
        let height = parts.next().and_then(|p| p.parse().ok());

        match (width, height) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(MediaError::Identify {
                path: path.display().to_string(),
            }),
        }
    }

    /// Convert an image, optionally cropping first and resizing, at the given
    /// quality. `crop` and `resize` map directly to the magick arguments.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        crop: Option<CropGeometry>,
        resize: Option<&str>,
        quality: u32,
    ) -> Result<(), MediaError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(input);

        if let Some(geometry) = crop {
            cmd.args(["-crop", &geometry.to_string()]);
        }
        if let Some(geometry) = resize {
            cmd.args(["-resize", geometry]);
        }
        cmd.args(["-quality", &quality.to_string()]);
        cmd.arg(output);

        self.run(cmd, input)?;

        if !output.exists() {
            return Err(MediaError::CommandFailed {
                path: input.display().to_string(),
                output: "no output file produced".into(),
            });
        }
        Ok(())
    }

    /// Downscale to a fixed width, keeping aspect ratio.
    ///
    /// Uses `-thumbnail Nx` rather than `-resize Nx0`; the latter produces
    /// corrupt 1x1 output on some platforms.
    pub fn resize_to_width(
        &self,
        input: &Path,
        output: &Path,
        width: u32,
        quality: u32,
    ) -> Result<(), MediaError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(input)
            .args(["-thumbnail", &format!("{width}x")])
            .args(["-quality", &quality.to_string()])
            .arg(output);

        self.run(cmd, input)?;

        if !output.exists() {
            return Err(MediaError::CommandFailed {
                path: input.display().to_string(),
                output: "no output file produced".into(),
            });
        }
        Ok(())
    }

    /// Fixed-geometry thumbnail (e.g. `400x225`).
    pub fn thumbnail(
        &self,
        input: &Path,
        output: &Path,
        geometry: &str,
        quality: u32,
    ) -> Result<(), MediaError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(input)
            .args(["-thumbnail", geometry])
            .args(["-quality", &quality.to_string()])
            .arg(output);

        self.run(cmd, input)?;

        if !output.exists() {
            return Err(MediaError::CommandFailed {
                path: input.display().to_string(),
                output: "no output file produced".into(),
            });
        }
        Ok(())
    }

    fn run(&self, mut cmd: Command, input: &Path) -> Result<(), MediaError> {
        let output = cmd.output().map_err(|e| MediaError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(MediaError::CommandFailed {
                path: input.display().to_string(),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Normalize a format extension for comparison: jpg and jpeg are equivalent.
pub fn normalize_format(format: &str) -> String {
    let lower = format.to_ascii_lowercase();
    if lower == "jpeg" {
        "jpg".to_string()
    } else {
        lower
    }
}

/// Lossy formats benefit from an explicit quality setting.
pub fn is_lossy_format(format: &str) -> bool {
    matches!(
        format.to_ascii_lowercase().as_str(),
        "webp" | "jpg" | "jpeg" | "avif" | "heic" | "heif" | "jxl"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_noop_when_aspect_matches() {
        // 1920x520 is exactly the header aspect
        assert_eq!(CropGeometry::to_aspect(1920, 520, 1920.0 / 520.0), None);
    }

    #[test]
    fn crops_wider_images_horizontally() {
        let crop = CropGeometry::to_aspect(4000, 520, 1920.0 / 520.0).unwrap();

        assert_eq!(crop.height, 520);
        assert_eq!(crop.width, 1920);
        assert_eq!(crop.x, (4000 - 1920) / 2);
        assert_eq!(crop.y, 0);
        assert_eq!(crop.to_string(), "1920x520+1040+0");
    }

    #[test]
    fn crops_taller_images_vertically() {
        let crop = CropGeometry::to_aspect(1600, 1600, 16.0 / 9.0).unwrap();

        assert_eq!(crop.width, 1600);
        assert_eq!(crop.height, 900);
        assert_eq!(crop.x, 0);
        assert_eq!(crop.y, 350);
    }

    #[test]
    fn format_normalization_merges_jpeg() {
        assert_eq!(normalize_format("JPEG"), "jpg");
        assert_eq!(normalize_format("jpg"), "jpg");
        assert_eq!(normalize_format("WebP"), "webp");
    }

    #[test]
    fn lossy_format_detection() {
        assert!(is_lossy_format("webp"));
        assert!(is_lossy_format("AVIF"));
        assert!(!is_lossy_format("png"));
        assert!(!is_lossy_format("svg"));
    }
}
