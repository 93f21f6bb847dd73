//! Platform configuration

/// Frame timing knobs for [`Win32Platform`](crate::Win32Platform)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlatformOptions {
    /// Delta time reported for the very first frame, in seconds
    pub first_frame_delta: f32,
    /// Lower bound for every reported delta; Dear ImGui rejects zero
    pub min_delta: f32,
}

impl Default for PlatformOptions {
    fn default() -> Self {
        Self {
            first_frame_delta: 1.0 / 60.0,
            min_delta: 1.0e-6,
        }
    }
}

impl PlatformOptions {
    pub fn with_first_frame_delta(mut self, seconds: f32) -> Self {
        self.first_frame_delta = seconds;
        self
    }

    pub fn with_min_delta(mut self, seconds: f32) -> Self {
        self.min_delta = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_frame_is_sixtieth_of_a_second() {
        let options = PlatformOptions::default();
        assert_relative_eq!(options.first_frame_delta, 1.0 / 60.0);
        assert!(options.min_delta > 0.0);
    }
}
