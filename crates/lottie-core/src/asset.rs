use crate::error::AssetError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use lottie_data::model::{self as data, LottieJson};
use std::collections::HashMap;

/// Where the pixels of an image asset come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Decoded bytes of an inline `data:` URI (PNG/JPG).
    Embedded(Vec<u8>),
    /// A path resolved by the host's image provider.
    External(String),
    /// An inline `data:` URI that failed to decode.
    Malformed,
}

fn image_source(asset: &data::Asset) -> Option<ImageSource> {
    let p = asset.p.as_ref()?;
    if p.starts_with("data:") {
        let source = p
            .split_once(";base64,")
            .and_then(|(_, payload)| BASE64_STANDARD.decode(payload).ok())
            .map_or(ImageSource::Malformed, ImageSource::Embedded);
        return Some(source);
    }
    match &asset.u {
        Some(u) if !u.is_empty() => Some(ImageSource::External(format!("{u}{p}"))),
        _ => Some(ImageSource::External(p.clone())),
    }
}

/// Immutable animation asset: frame range, frame rate and named sub-assets.
#[derive(Debug)]
pub struct LottieAsset {
    pub model: LottieJson,
    pub width: f32,
    pub height: f32,
    pub images: HashMap<String, ImageSource>,
    precompositions: HashMap<String, usize>,
}

impl LottieAsset {
    pub fn from_model(model: LottieJson) -> Self {
        let width = model.w as f32;
        let height = model.h as f32;

        let mut images = HashMap::new();
        let mut precompositions = HashMap::new();
        for (index, asset) in model.assets.iter().enumerate() {
            if asset.layers.is_some() {
                precompositions.insert(asset.id.clone(), index);
            } else if let Some(source) = image_source(asset) {
                images.insert(asset.id.clone(), source);
            }
        }

        Self {
            model,
            width,
            height,
            images,
            precompositions,
        }
    }

    pub fn from_slice(json: &[u8]) -> Result<Self, AssetError> {
        Ok(Self::from_model(serde_json::from_slice(json)?))
    }

    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        Ok(Self::from_model(serde_json::from_str(json)?))
    }

    pub fn start_frame(&self) -> f32 {
        self.model.ip
    }

    pub fn end_frame(&self) -> f32 {
        self.model.op
    }

    pub fn frame_rate(&self) -> f32 {
        self.model.fr
    }

    /// Length of the whole animation in seconds, whichever way the frame
    /// range runs.
    pub fn duration(&self) -> f64 {
        f64::from((self.end_frame() - self.start_frame()).abs()) / f64::from(self.frame_rate())
    }

    /// Normalized position of `frame` within `[start_frame, end_frame]`.
    pub fn progress_time(&self, frame: f32, clamped: bool) -> f64 {
        let range = f64::from(self.end_frame()) - f64::from(self.start_frame());
        let progress = (f64::from(frame) - f64::from(self.start_frame())) / range;
        if clamped {
            progress.clamp(0.0, 1.0)
        } else {
            progress
        }
    }

    /// Seconds elapsed between the start frame and `frame`.
    pub fn time(&self, frame: f32) -> f64 {
        (f64::from(frame) - f64::from(self.start_frame())) / f64::from(self.frame_rate())
    }

    pub fn frame_time(&self, progress: f64) -> f32 {
        let range = f64::from(self.end_frame()) - f64::from(self.start_frame());
        (f64::from(self.start_frame()) + progress * range) as f32
    }

    pub fn frame_for_time(&self, seconds: f64) -> f32 {
        (f64::from(self.start_frame()) + seconds * f64::from(self.frame_rate())) as f32
    }

    pub fn precomposition(&self, ref_id: &str) -> Option<&[data::Layer]> {
        let index = *self.precompositions.get(ref_id)?;
        self.model.assets[index].layers.as_deref()
    }

    pub fn image(&self, ref_id: &str) -> Option<&ImageSource> {
        self.images.get(ref_id)
    }

    /// Frame range `(start, end)` covered by the named marker.
    pub fn marker(&self, name: &str) -> Option<(f32, f32)> {
        let marker = self
            .model
            .markers
            .iter()
            .find(|m| m.cm.as_deref() == Some(name))?;
        let start = marker.tm?;
        Some((start, start + marker.dr.unwrap_or(0.0)))
    }
}
