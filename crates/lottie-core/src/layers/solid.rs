use super::BaseLayer;
use crate::backing::StagedAnimations;
use crate::context::LayerAnimationContext;
use crate::curve::CurveValue;
use crate::error::SetupError;
use glam::Vec4;
use lottie_data::model::Property;

/// Parses `#rrggbb` (alpha is always opaque).
pub(crate) fn parse_hex_color(hex: &str) -> Option<Vec4> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    Some(Vec4::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0))
}

#[derive(Debug)]
pub struct SolidLayer {
    pub(crate) base: BaseLayer,
    color: Option<Vec4>,
}

impl SolidLayer {
    pub(crate) fn new(base: BaseLayer) -> Self {
        let color = base.model().color.as_deref().and_then(parse_hex_color);
        Self { base, color }
    }

    pub fn color(&self) -> Option<Vec4> {
        self.color
    }

    pub(crate) fn stage(
        &self,
        context: &LayerAnimationContext<'_>,
    ) -> Result<StagedAnimations, SetupError> {
        let mut staged = self.base.stage(context)?;
        match self.color {
            Some(color) => staged.insert_opt(
                "backgroundColor",
                context.property_animation("Color", &Property::fixed(color), |c: &Vec4| {
                    CurveValue::Color(*c)
                })?,
            ),
            None => context.assert_compatible(
                false,
                format!(
                    "solid color {:?} is not a #rrggbb value",
                    self.base.model().color.as_deref().unwrap_or_default()
                ),
            )?,
        }
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(parse_hex_color("00ff00"), Some(Vec4::new(0.0, 1.0, 0.0, 1.0)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
