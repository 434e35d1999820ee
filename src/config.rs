// Widget configuration. The defaults reproduce the stock hover effect.

use crate::error::{HoverError, Result};
use crate::field::FitMode;

/// Scale used by [`FitMode::AspectFit`] when the host does not pass one.
pub const DEFAULT_FIT_SCALE: f64 = 1.2;

/// How the drawing surface gets its pixel dimensions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Sizing {
    Fixed { width: u32, height: u32 },
    FillParent,
}

impl Default for Sizing {
    fn default() -> Self {
        Sizing::FillParent
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sampling {
    /// Pixels skipped between samples, along both axes.
    pub stride: u32,
    /// Samples with an alpha strictly above this become particles.
    pub alpha_threshold: u8,
}

impl Sampling {
    pub const STRIDE: u32 = 4;
    pub const ALPHA_THRESHOLD: u8 = 128;
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling {
            stride: Sampling::STRIDE,
            alpha_threshold: Sampling::ALPHA_THRESHOLD,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Physics {
    pub friction: f64,
    pub attraction: f64,
    pub particle_size: f64,
    pub effect_radius: f64,
    pub impulse_strength: f64,
}

impl Physics {
    pub const FRICTION: f64 = 0.85;
    pub const ATTRACTION: f64 = 0.04;
    pub const PARTICLE_SIZE: f64 = 3.0;
    pub const EFFECT_RADIUS: f64 = 80.0;
    pub const IMPULSE_STRENGTH: f64 = 6.0;
}

impl Default for Physics {
    fn default() -> Self {
        Physics {
            friction: Physics::FRICTION,
            attraction: Physics::ATTRACTION,
            particle_size: Physics::PARTICLE_SIZE,
            effect_radius: Physics::EFFECT_RADIUS,
            impulse_strength: Physics::IMPULSE_STRENGTH,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct WidgetConfig {
    pub sizing: Sizing,
    pub fit: FitMode,
    pub sampling: Sampling,
    pub physics: Physics,
}

impl WidgetConfig {
    pub fn validate(&self) -> Result<()> {
        if let FitMode::AspectFit { scale } = self.fit {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(HoverError::InvalidScale(scale));
            }
        }
        if self.sampling.stride == 0 {
            return Err(HoverError::Config("sampling stride must be at least 1"));
        }
        if let Sizing::Fixed { width, height } = self.sizing {
            if width == 0 || height == 0 {
                return Err(HoverError::EmptySurface { width, height });
            }
        }
        let p = &self.physics;
        if !(p.particle_size > 0.0 && p.effect_radius > 0.0) {
            return Err(HoverError::Config(
                "particle size and effect radius must be positive",
            ));
        }
        if !(0.0..1.0).contains(&p.friction) {
            return Err(HoverError::Config("friction must be in [0, 1)"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_effect() {
        let config = WidgetConfig::default();
        assert_eq!(config.sizing, Sizing::FillParent);
        assert_eq!(config.fit, FitMode::Stretch);
        assert_eq!(config.sampling.stride, 4);
        assert_eq!(config.sampling.alpha_threshold, 128);
        assert_eq!(config.physics.friction, 0.85);
        assert_eq!(config.physics.attraction, 0.04);
        assert_eq!(config.physics.particle_size, 3.0);
        assert_eq!(config.physics.effect_radius, 80.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_scale() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = WidgetConfig {
                fit: FitMode::AspectFit { scale },
                ..WidgetConfig::default()
            };
            assert!(matches!(config.validate(), Err(HoverError::InvalidScale(_))));
        }
    }

    #[test]
    fn rejects_zero_stride_and_empty_fixed_size() {
        let mut config = WidgetConfig::default();
        config.sampling.stride = 0;
        assert!(config.validate().is_err());

        let config = WidgetConfig {
            sizing: Sizing::Fixed { width: 0, height: 10 },
            ..WidgetConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HoverError::EmptySurface { width: 0, height: 10 })
        ));
    }
}
