use anyhow::{bail, Context, Result};
use glam::Vec3;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/app.json";

/// Linear RGB color parsed from a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct HexColor(pub Vec3);

impl HexColor {
    pub const WHITE: HexColor = HexColor(Vec3::ONE);

    pub fn from_srgb_u32(rgb: u32) -> Self {
        HexColor(srgb_to_linear(Vec3::new(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )))
    }

    pub fn linear(self) -> Vec3 {
        self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        parse_hex_color(&value)
    }
}

/// Parses `#rrggbb` (sRGB) into a linear color.
pub fn parse_hex_color(text: &str) -> Result<HexColor> {
    let Some(digits) = text.trim().strip_prefix('#') else {
        bail!("Color '{text}' must start with '#'");
    };
    if digits.len() != 6 {
        bail!("Color '{text}' must have six hex digits");
    }
    let rgb = u32::from_str_radix(digits, 16).with_context(|| format!("Color '{text}' is not valid hex"))?;
    Ok(HexColor::from_srgb_u32(rgb))
}

fn srgb_to_linear(c: Vec3) -> Vec3 {
    let channel = |v: f32| if v <= 0.04045 { v / 12.92 } else { ((v + 0.055) / 1.055).powf(2.4) };
    Vec3::new(channel(c.x), channel(c.y), channel(c.z))
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_title")]
    pub title: String,
    #[serde(default = "WindowConfig::default_width")]
    pub width: u32,
    #[serde(default = "WindowConfig::default_height")]
    pub height: u32,
    #[serde(default = "WindowConfig::default_vsync")]
    pub vsync: bool,
}

impl WindowConfig {
    fn default_title() -> String {
        "Shapeyard".to_string()
    }

    const fn default_width() -> u32 {
        1280
    }

    const fn default_height() -> u32 {
        720
    }

    const fn default_vsync() -> bool {
        true
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
            vsync: Self::default_vsync(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "CameraConfig::default_near")]
    pub near: f32,
    #[serde(default = "CameraConfig::default_far")]
    pub far: f32,
    #[serde(default = "CameraConfig::default_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
}

impl CameraConfig {
    const fn default_fov() -> f32 {
        75.0
    }

    const fn default_near() -> f32 {
        1.0
    }

    const fn default_far() -> f32 {
        500.0
    }

    const fn default_position() -> [f32; 3] {
        [0.0, 10.0, -30.0]
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: Self::default_fov(),
            near: Self::default_near(),
            far: Self::default_far(),
            position: Self::default_position(),
            target: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub size: f32,
    pub divisions: u32,
    pub center_color: HexColor,
    pub line_color: HexColor,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 60.0,
            divisions: 10,
            center_color: HexColor::from_srgb_u32(0x444444),
            line_color: HexColor::from_srgb_u32(0x888888),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmbientLightConfig {
    pub color: HexColor,
    pub intensity: f32,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self { color: HexColor::WHITE, intensity: 0.5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    pub color: HexColor,
    pub intensity: f32,
    pub position: [f32; 3],
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self { color: HexColor::WHITE, intensity: 10.0, position: [-10.0, 10.0, 0.0] }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrbitConfig {
    #[serde(default)]
    pub damping: bool,
    #[serde(default = "OrbitConfig::default_damping_factor")]
    pub damping_factor: f32,
    #[serde(default = "OrbitConfig::default_speed")]
    pub rotate_speed: f32,
    #[serde(default = "OrbitConfig::default_speed")]
    pub zoom_speed: f32,
    #[serde(default = "OrbitConfig::default_speed")]
    pub pan_speed: f32,
}

impl OrbitConfig {
    const fn default_damping_factor() -> f32 {
        0.05
    }

    const fn default_speed() -> f32 {
        1.0
    }
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping: false,
            damping_factor: Self::default_damping_factor(),
            rotate_speed: Self::default_speed(),
            zoom_speed: Self::default_speed(),
            pan_speed: Self::default_speed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "ViewportConfig::default_background")]
    pub background: HexColor,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub ambient: AmbientLightConfig,
    #[serde(default)]
    pub directional: DirectionalLightConfig,
    #[serde(default)]
    pub orbit: OrbitConfig,
}

impl ViewportConfig {
    fn default_background() -> HexColor {
        HexColor::from_srgb_u32(0xa9a9aa)
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            background: Self::default_background(),
            camera: CameraConfig::default(),
            grid: GridConfig::default(),
            ambient: AmbientLightConfig::default(),
            directional: DirectionalLightConfig::default(),
            orbit: OrbitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundsConfig {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for BoundsConfig {
    fn default() -> Self {
        let bounds = crate::viewport::SPAWN_BOUNDS;
        Self { min: bounds.min.to_array(), max: bounds.max.to_array() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnConfig {
    #[serde(default)]
    pub bounds: BoundsConfig,
    /// Fixed RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "SpawnConfig::default_scale")]
    pub default_scale: f32,
}

impl SpawnConfig {
    const fn default_scale() -> f32 {
        1.0
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self { bounds: BoundsConfig::default(), seed: None, default_scale: Self::default_scale() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub spawn: SpawnConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub config_path: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub vsync: Option<bool>,
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: AppConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        cfg.validate().with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:#}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        crate::viewport::SpawnBounds::from_config(&self.spawn.bounds)?;
        if !self.spawn.default_scale.is_finite() || self.spawn.default_scale <= 0.0 {
            bail!("spawn.default_scale must be positive, got {}", self.spawn.default_scale);
        }
        let camera = &self.viewport.camera;
        if camera.near <= 0.0 || camera.far <= camera.near {
            bail!("viewport.camera near/far must satisfy 0 < near < far");
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(vsync) = overrides.vsync {
            self.window.vsync = vsync;
        }
        if let Some(seed) = overrides.seed {
            self.spawn.seed = Some(seed);
        }
    }
}

impl AppConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.applied_fields().is_empty() && self.config_path.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.vsync.is_some() {
            fields.push("vsync");
        }
        if self.seed.is_some() {
            fields.push("seed");
        }
        fields
    }

    pub fn config_path(&self) -> &str {
        self.config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }
}
