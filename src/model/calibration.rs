use serde::{Deserialize, Serialize};

/// Value-transform functions, numbered as in ImageJ's curve fitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationFunction {
    StraightLine,
    Poly2,
    Poly3,
    Poly4,
    Exponential,
    Power,
    Log,
    Rodbard,
    GammaVariate,
    Log2,
    Rodbard2,
    #[default]
    None,
    UncalibratedOd,
    /// A function code this crate cannot evaluate; kept so it survives a save.
    Other(i32),
}

impl CalibrationFunction {
    pub fn code(self) -> i32 {
        match self {
            CalibrationFunction::StraightLine => 0,
            CalibrationFunction::Poly2 => 1,
            CalibrationFunction::Poly3 => 2,
            CalibrationFunction::Poly4 => 3,
            CalibrationFunction::Exponential => 4,
            CalibrationFunction::Power => 5,
            CalibrationFunction::Log => 6,
            CalibrationFunction::Rodbard => 7,
            CalibrationFunction::GammaVariate => 8,
            CalibrationFunction::Log2 => 9,
            CalibrationFunction::Rodbard2 => 10,
            CalibrationFunction::None => 20,
            CalibrationFunction::UncalibratedOd => 21,
            CalibrationFunction::Other(code) => code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => CalibrationFunction::StraightLine,
            1 => CalibrationFunction::Poly2,
            2 => CalibrationFunction::Poly3,
            3 => CalibrationFunction::Poly4,
            4 => CalibrationFunction::Exponential,
            5 => CalibrationFunction::Power,
            6 => CalibrationFunction::Log,
            7 => CalibrationFunction::Rodbard,
            8 => CalibrationFunction::GammaVariate,
            9 => CalibrationFunction::Log2,
            10 => CalibrationFunction::Rodbard2,
            20 => CalibrationFunction::None,
            21 => CalibrationFunction::UncalibratedOd,
            other => CalibrationFunction::Other(other),
        }
    }

    /// Number of coefficients the function reads.
    pub fn coefficient_count(self) -> usize {
        match self {
            CalibrationFunction::StraightLine
            | CalibrationFunction::Exponential
            | CalibrationFunction::Power
            | CalibrationFunction::Log => 2,
            CalibrationFunction::Poly2 | CalibrationFunction::Log2 => 3,
            CalibrationFunction::Poly3
            | CalibrationFunction::Rodbard
            | CalibrationFunction::GammaVariate
            | CalibrationFunction::Rodbard2 => 4,
            CalibrationFunction::Poly4 => 5,
            CalibrationFunction::None
            | CalibrationFunction::UncalibratedOd
            | CalibrationFunction::Other(_) => 0,
        }
    }

    fn evaluate(self, p: &[f64], x: f64) -> f64 {
        match self {
            CalibrationFunction::StraightLine
            | CalibrationFunction::Poly2
            | CalibrationFunction::Poly3
            | CalibrationFunction::Poly4 => p[..self.coefficient_count()]
                .iter()
                .rev()
                .fold(0.0, |acc, c| acc * x + c),
            CalibrationFunction::Exponential => p[0] * (p[1] * x).exp(),
            CalibrationFunction::Power => {
                if x == 0.0 {
                    0.0
                } else {
                    p[0] * (p[1] * x.ln()).exp()
                }
            }
            CalibrationFunction::Log => {
                if x == 0.0 {
                    -1e100
                } else {
                    p[0] * (p[1] * x).ln()
                }
            }
            CalibrationFunction::Rodbard => {
                let ratio = (x / p[2]).powf(p[1]);
                p[3] + (p[0] - p[3]) / (1.0 + ratio)
            }
            CalibrationFunction::GammaVariate => {
                if p[0] >= x {
                    return 0.0;
                }
                if p[1] <= 0.0 || p[2] <= 0.0 || p[3] <= 0.0 {
                    return f64::NAN;
                }
                let shifted = x - p[0];
                p[1] * shifted.powf(p[2]) * (-shifted / p[3]).exp()
            }
            CalibrationFunction::Log2 => {
                let shifted = x - p[2];
                if shifted <= 0.0 {
                    f64::NAN
                } else {
                    p[0] + p[1] * shifted.ln()
                }
            }
            CalibrationFunction::Rodbard2 => {
                if p[3] - x < 2.0 * f64::MIN_POSITIVE || x < p[0] {
                    0.0
                } else {
                    ((x - p[0]) / (p[3] - x)).powf(1.0 / p[1]) * p[2]
                }
            }
            CalibrationFunction::UncalibratedOd => {
                let v = x.min(254.5);
                (255.0 / (255.0 - v)).log10()
            }
            CalibrationFunction::None | CalibrationFunction::Other(_) => x,
        }
    }
}

/// Per-channel calibration: label plus a value-transform function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChannelCalibration {
    label: String,
    function: CalibrationFunction,
    coefficients: Vec<f64>,
    value_unit: String,
    zero_clip: bool,
}

impl ChannelCalibration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn function(&self) -> CalibrationFunction {
        self.function
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn coefficients_mut(&mut self) -> &mut Vec<f64> {
        &mut self.coefficients
    }

    pub fn value_unit(&self) -> &str {
        &self.value_unit
    }

    pub fn is_zero_clip(&self) -> bool {
        self.zero_clip
    }

    /// Replaces the function. The coefficients are copied out of the caller's slice.
    pub fn set_function(
        &mut self,
        function: CalibrationFunction,
        coefficients: &[f64],
        value_unit: impl Into<String>,
        zero_clip: bool,
    ) {
        self.function = function;
        self.coefficients = coefficients.to_vec();
        self.value_unit = value_unit.into();
        self.zero_clip = zero_clip;
    }

    /// Copies function, coefficients, unit and zero-clip from `other`, keeping the label.
    pub fn set_function_from(&mut self, other: &ChannelCalibration) {
        self.set_function(
            other.function,
            &other.coefficients,
            other.value_unit.clone(),
            other.zero_clip,
        );
    }

    pub fn disable_density_calibration(&mut self) {
        self.function = CalibrationFunction::None;
        self.coefficients.clear();
        self.value_unit.clear();
        self.zero_clip = false;
    }

    pub fn is_calibrated(&self) -> bool {
        self.function != CalibrationFunction::None
    }

    /// Maps a raw sample value to calibrated units.
    ///
    /// Functions lacking coefficients behave as the identity. With zero-clip set,
    /// negative results are clamped to zero.
    pub fn apply(&self, raw: f64) -> f64 {
        if self.coefficients.len() < self.function.coefficient_count() {
            return raw;
        }
        let value = self.function.evaluate(&self.coefficients, raw);
        if self.zero_clip && value < 0.0 {
            0.0
        } else {
            value
        }
    }
}

/// Physical scaling of the spatial and temporal axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialCalibration {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub pixel_depth: f64,
    pub frame_interval: f64,
    pub unit: String,
}

impl Default for SpatialCalibration {
    fn default() -> Self {
        Self {
            pixel_width: 1.0,
            pixel_height: 1.0,
            pixel_depth: 1.0,
            frame_interval: 0.0,
            unit: "pixel".to_string(),
        }
    }
}

impl SpatialCalibration {
    pub fn is_scaled(&self) -> bool {
        self.unit != "pixel" && self.unit != "pixels" && !self.unit.is_empty()
    }
}
