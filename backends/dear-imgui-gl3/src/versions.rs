//! OpenGL version detection and feature gating

use crate::{InitError, InitResult};
use glow::{Context, HasContext};

/// OpenGL version information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
    pub is_es: bool,
}

impl GlVersion {
    /// Lowest desktop version able to compile the embedded GLSL 330 program
    pub const MIN_DESKTOP: GlVersion = GlVersion {
        major: 3,
        minor: 3,
        is_es: false,
    };

    /// Read the OpenGL version from the current context
    pub fn read(gl: &Context) -> Self {
        let version_string = unsafe { gl.get_parameter_string(glow::VERSION) };
        Self::parse(&version_string)
    }

    /// Parse an OpenGL version string
    ///
    /// Accepts desktop strings such as `"4.6.0 NVIDIA 460.89"` and ES strings
    /// such as `"OpenGL ES 3.0 Mesa 21.0"`. Unparseable desktop strings are
    /// treated as 2.1 so that [`GlVersion::ensure_supported`] rejects them.
    pub fn parse(version_string: &str) -> Self {
        let is_es = version_string.contains("OpenGL ES") || version_string.contains("WebGL");
        let fallback = if is_es { (2, 0) } else { (2, 1) };
        let (major, minor) = Self::parse_version_numbers(version_string).unwrap_or(fallback);

        Self {
            major,
            minor,
            is_es,
        }
    }

    fn parse_version_numbers(version_string: &str) -> Option<(u32, u32)> {
        version_string.split_whitespace().find_map(|word| {
            let (major_str, rest) = word.split_once('.')?;
            let minor_str = rest.split('.').next().unwrap_or(rest);
            let minor_str: String = minor_str.chars().take_while(char::is_ascii_digit).collect();
            Some((major_str.parse().ok()?, minor_str.parse().ok()?))
        })
    }

    fn at_least(self, major: u32, minor: u32) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }

    /// Reject contexts that cannot run the GLSL 330 program
    pub fn ensure_supported(self) -> InitResult<()> {
        if !self.is_es && self.at_least(Self::MIN_DESKTOP.major, Self::MIN_DESKTOP.minor) {
            Ok(())
        } else {
            Err(InitError::UnsupportedVersion(self.to_string()))
        }
    }

    /// Vertex array objects (OpenGL 3.0+)
    pub fn bind_vertex_array_support(self) -> bool {
        self.major >= 3
    }

    /// `glDrawElementsBaseVertex` (desktop OpenGL 3.2+)
    pub fn vertex_offset_support(self) -> bool {
        !self.is_es && self.at_least(3, 2)
    }

    /// `glBindSampler` (desktop OpenGL 3.3+)
    pub fn bind_sampler_support(self) -> bool {
        if self.is_es {
            self.major >= 3
        } else {
            self.at_least(3, 3)
        }
    }
}

impl std::fmt::Display for GlVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_es {
            write!(f, "OpenGL ES {}.{}", self.major, self.minor)
        } else {
            write!(f, "OpenGL {}.{}", self.major, self.minor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_vendor_strings() {
        assert_eq!(
            GlVersion::parse("4.6.0 NVIDIA 460.89"),
            GlVersion {
                major: 4,
                minor: 6,
                is_es: false
            }
        );
        assert_eq!(
            GlVersion::parse("3.3 (Core Profile) Mesa 23.1.4"),
            GlVersion {
                major: 3,
                minor: 3,
                is_es: false
            }
        );
        assert_eq!(
            GlVersion::parse("OpenGL ES 3.2 Mesa 22.0"),
            GlVersion {
                major: 3,
                minor: 2,
                is_es: true
            }
        );
    }

    #[test]
    fn garbage_falls_back_to_legacy() {
        let version = GlVersion::parse("unknown renderer");
        assert_eq!((version.major, version.minor), (2, 1));
        assert!(version.ensure_supported().is_err());
    }

    #[test]
    fn requires_desktop_330() {
        assert!(GlVersion::parse("3.3.0").ensure_supported().is_ok());
        assert!(GlVersion::parse("4.1 Metal - 83.1").ensure_supported().is_ok());
        assert!(GlVersion::parse("3.2.0").ensure_supported().is_err());
        assert!(GlVersion::parse("OpenGL ES 3.2").ensure_supported().is_err());
    }

    #[test]
    fn feature_gates() {
        let gl32 = GlVersion::parse("3.2.0");
        assert!(gl32.vertex_offset_support());
        assert!(!gl32.bind_sampler_support());

        let gl31 = GlVersion::parse("3.1.0");
        assert!(!gl31.vertex_offset_support());
        assert!(gl31.bind_vertex_array_support());

        let es = GlVersion::parse("OpenGL ES 3.0");
        assert!(!es.vertex_offset_support());
        assert!(es.bind_sampler_support());
    }

    #[test]
    fn unsupported_error_names_version() {
        let err = GlVersion::parse("2.1 Mesa").ensure_supported().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported OpenGL version: OpenGL 2.1");
    }
}
