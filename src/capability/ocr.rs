use image::RgbImage;

/// Pixel box of a recognized text span: `[x0, x1) × [y0, y1)`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub x1: i32,
    pub y0: i32,
    pub y1: i32,
}

impl Rect {
    pub const fn new(x0: i32, x1: i32, y0: i32, y1: i32) -> Self {
        Self { x0, x1, y0, y1 }
    }
    pub fn centre_x(&self) -> i32 {
        (self.x0 + self.x1) / 2
    }
    pub fn shift(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x0 + dx, self.x1 + dx, self.y0 + dy, self.y1 + dy)
    }
}

/// One text span returned by the OCR backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    pub rect: Rect,
    pub confidence: f32,
}

impl Recognition {
    pub fn new(text: impl Into<String>, rect: Rect, confidence: f32) -> Self {
        Self {
            text: text.into(),
            rect,
            confidence,
        }
    }
}

/// Text recognition backend.
///
/// Calls may take a sizeable fraction of a tick, so they are awaited off the
/// control loop. Empty or low-confidence output is a normal answer.
#[async_trait::async_trait]
pub trait Ocr: Send + Sync {
    async fn read(&self, image: &RgbImage) -> anyhow::Result<Vec<Recognition>>;
}

/// Backend that never recognizes anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blank;

#[async_trait::async_trait]
impl Ocr for Blank {
    async fn read(&self, _: &RgbImage) -> anyhow::Result<Vec<Recognition>> {
        Ok(Vec::new())
    }
}
