use serde::{Deserialize, Serialize};

/// Single color channel of the shared depth buffer a mask writes into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChannel {
    Red,
    Green,
    #[default]
    Blue,
    Alpha,
}

impl ColorChannel {
    /// Write-mask bit, matching the host renderer's `COLOR_MASK_BITS`.
    pub fn bits(self) -> u8 {
        match self {
            ColorChannel::Red => 0x1,
            ColorChannel::Green => 0x2,
            ColorChannel::Blue => 0x4,
            ColorChannel::Alpha => 0x8,
        }
    }

    /// Byte offset of the channel inside an RGBA8888 pixel.
    pub fn rgba_offset(self) -> usize {
        match self {
            ColorChannel::Red => 0,
            ColorChannel::Green => 1,
            ColorChannel::Blue => 2,
            ColorChannel::Alpha => 3,
        }
    }
}

/// Names used to read mask markers out of host documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub namespace: String,
    pub mask_flag: String,
    pub invert_flag: String,
    pub suppress_behavior: String,
    pub channel: ColorChannel,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            namespace: "fxmaster".to_string(),
            mask_flag: "masking".to_string(),
            invert_flag: "invert".to_string(),
            suppress_behavior: "suppressWeather".to_string(),
            channel: ColorChannel::Blue,
        }
    }
}
