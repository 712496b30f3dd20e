use fxmask_core::{
    ColorChannel, CompositeMask, FillPart, MaskCommand, MaskLayer, MaskNode, MaskShape, MaskSlot,
};
use kurbo::{BezPath, PathEl};
use skia_safe::{
    surfaces, AlphaType, BlendMode, Canvas, Color, ColorType, ImageInfo, Paint, Path, PathOp,
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface")]
    SurfaceFailure,
    #[error("Failed to read back pixels")]
    ReadbackFailure,
    #[error("Buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Canvas {width}x{height} is too large to rasterize")]
    CanvasTooLarge { width: u32, height: u32 },
}

/// Byte length of a `width` x `height` buffer with `channels` bytes per pixel.
fn buffer_len(width: u32, height: u32, channels: usize) -> Result<usize, RenderError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(RenderError::CanvasTooLarge { width, height })
}

pub struct SkiaMaskRenderer;

impl SkiaMaskRenderer {
    /// Draws the commands in order: fill groups are painted with `color`, hole groups clear
    /// whatever was painted before them.
    pub fn draw(canvas: &Canvas, mask: &CompositeMask, color: Color) {
        let mut fill = Paint::default();
        fill.set_anti_alias(true);
        fill.set_color(color);

        let mut clear = Paint::default();
        clear.set_anti_alias(true);
        clear.set_blend_mode(BlendMode::Clear);

        for command in mask {
            match command {
                MaskCommand::Fill(group) => {
                    for part in &group.parts {
                        canvas.draw_path(&part_path(part), &fill);
                    }
                }
                MaskCommand::Hole(group) => {
                    for shape in &group.shapes {
                        canvas.draw_path(&shape_path(shape), &clear);
                    }
                }
            }
        }
    }

    /// Rasterizes the mask into one coverage byte per pixel.
    pub fn coverage(mask: &CompositeMask, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let len = buffer_len(width, height, 4)?;
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(RenderError::CanvasTooLarge { width, height });
        };
        let info = ImageInfo::new(
            (w, h),
            ColorType::RGBA8888,
            AlphaType::Premul,
            None,
        );
        let mut surface = surfaces::raster(&info, None, None).ok_or(RenderError::SurfaceFailure)?;
        surface.canvas().clear(Color::TRANSPARENT);
        Self::draw(surface.canvas(), mask, Color::BLUE);

        let mut bytes = vec![0u8; len];
        if !surface.read_pixels(&info, &mut bytes, width as usize * 4, (0, 0)) {
            return Err(RenderError::ReadbackFailure);
        }
        Ok(bytes.chunks_exact(4).map(|px| px[3]).collect())
    }
}

/// RGBA8888 buffer shared by several masks, each owning one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        Ok(Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height, 4)?],
        })
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        let expected = buffer_len(width, height, 4)?;
        if pixels.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Overwrites `channel` with the mask's coverage. Other channels are left untouched.
    pub fn write_channel(&mut self, channel: ColorChannel, coverage: &[u8]) -> Result<(), RenderError> {
        let expected = self.width as usize * self.height as usize;
        if coverage.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: coverage.len(),
            });
        }
        let offset = channel.rgba_offset();
        for (px, value) in self.pixels.chunks_exact_mut(4).zip(coverage) {
            px[offset] = *value;
        }
        Ok(())
    }

    pub fn apply(&mut self, node: &MaskNode) -> Result<(), RenderError> {
        let coverage = SkiaMaskRenderer::coverage(&node.mask, self.width, self.height)?;
        self.write_channel(node.channel, &coverage)
    }
}

/// Mask container of a rendering layer. Holds this subsystem's single mask node.
#[derive(Debug, Default)]
pub struct DepthMaskContainer {
    slot: MaskSlot,
}

impl DepthMaskContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the installed node into `buffer`. Returns `false` when nothing is installed.
    pub fn render(&self, buffer: &mut DepthBuffer) -> Result<bool, RenderError> {
        let Some(node) = self.slot.installed() else {
            return Ok(false);
        };
        buffer.apply(node)?;
        Ok(true)
    }
}

impl MaskLayer for DepthMaskContainer {
    fn install(&mut self, node: MaskNode) -> Option<MaskNode> {
        if node.channel != ColorChannel::Blue {
            warn!(channel = ?node.channel, "Mask installed outside the blue channel");
        }
        let color_mask = node.channel.bits();
        let previous = self.slot.install(node);
        debug!(replaced = previous.is_some(), color_mask, "Mask node installed");
        previous
    }

    fn installed(&self) -> Option<&MaskNode> {
        self.slot.installed()
    }
}

fn part_path(part: &FillPart) -> Path {
    let mut path = shape_path(&part.shape);
    for hole in &part.holes {
        match path.op(&shape_path(hole), PathOp::Difference) {
            Some(result) => path = result,
            None => warn!(shape = ?part.shape, ?hole, "Failed to cut hole out of fill part"),
        }
    }
    path
}

fn shape_path(shape: &MaskShape) -> Path {
    kurbo_to_skia_path(&shape.to_path())
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn kurbo_to_skia_path(bez_path: &BezPath) -> Path {
    let mut path = Path::new();
    for el in bez_path.elements() {
        match el {
            PathEl::MoveTo(p) => {
                path.move_to((sanitize(p.x as f32), sanitize(p.y as f32)));
            }
            PathEl::LineTo(p) => {
                path.line_to((sanitize(p.x as f32), sanitize(p.y as f32)));
            }
            PathEl::QuadTo(p1, p2) => {
                path.quad_to(
                    (sanitize(p1.x as f32), sanitize(p1.y as f32)),
                    (sanitize(p2.x as f32), sanitize(p2.y as f32)),
                );
            }
            PathEl::CurveTo(p1, p2, p3) => {
                path.cubic_to(
                    (sanitize(p1.x as f32), sanitize(p1.y as f32)),
                    (sanitize(p2.x as f32), sanitize(p2.y as f32)),
                    (sanitize(p3.x as f32), sanitize(p3.y as f32)),
                );
            }
            PathEl::ClosePath => {
                path.close();
            }
        }
    }
    path
}
