use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::color::SeverityBucket;
use crate::export::DEFAULT_FILE_PREFIX;
use crate::inference::{ColumnType, ColumnTypeInferer, HeaderOverride, DEFAULT_SAMPLE_SIZE};
use crate::paginate::DEFAULT_PAGE_SIZE;
use crate::ExportFormat;

const CONFIG_FILE: &str = "config.toml";

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file within the config directory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path(CONFIG_FILE);

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub display: DisplayConfig,
    pub inference: InferenceConfig,
    pub coloring: ColoringConfig,
    pub export: ExportConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub delimiter: Option<char>,
    /// 0-based index or sheet name
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub page_size: usize,
    pub row_numbers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub sample_size: usize,
    pub header_overrides: Vec<HeaderOverrideConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderOverrideConfig {
    /// Regular expression matched against the header name
    pub pattern: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoringConfig {
    /// Color plain numeric columns relative to their min/max
    pub numeric: bool,
    pub color_mode: String,
    pub colors: BucketColorConfig,
}

/// One color string per severity bucket, plus table chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketColorConfig {
    pub darkest_good: String,
    pub light_good: String,
    pub mid: String,
    pub warn: String,
    pub light_bad: String,
    pub bad: String,
    pub worst: String,
    pub header: String,
    pub row_numbers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: String,
    pub file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            file_loading: FileLoadingConfig::default(),
            display: DisplayConfig::default(),
            inference: InferenceConfig::default(),
            coloring: ColoringConfig::default(),
            export: ExportConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            row_numbers: false,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            header_overrides: Vec::new(),
        }
    }
}

impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            numeric: true,
            color_mode: "auto".to_string(),
            colors: BucketColorConfig::default(),
        }
    }
}

impl Default for BucketColorConfig {
    fn default() -> Self {
        Self {
            darkest_good: "#1e7b34".to_string(),
            light_good: "#8fd19e".to_string(),
            mid: "#ffe066".to_string(),
            warn: "#ffa94d".to_string(),
            light_bad: "#ffa8a8".to_string(),
            bad: "#f03e3e".to_string(),
            worst: "#a61e1e".to_string(),
            header: "cyan".to_string(),
            row_numbers: "dark_gray".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: "csv".to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        Self::load_from(&ConfigManager::new(app_name)?)
    }

    /// Load configuration with the user layer read from `manager`'s directory
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        if let Some(user_config) = Self::load_user_config(manager)? {
            config.merge(user_config);
        }
        config.validate()?;
        Ok(config)
    }

    fn load_user_config(manager: &ConfigManager) -> Result<Option<AppConfig>> {
        let config_path = manager.config_path(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map(Some).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.file_loading.merge(other.file_loading);
        self.display.merge(other.display);
        self.inference.merge(other.inference);
        self.coloring.merge(other.coloring);
        self.export.merge(other.export);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.display.page_size == 0 {
            return Err(eyre!("display.page_size must be greater than 0"));
        }

        if self.inference.sample_size == 0 {
            return Err(eyre!("inference.sample_size must be greater than 0"));
        }
        self.inference.inferer()?;

        match self.coloring.color_mode.as_str() {
            "auto" | "always" | "never" => {}
            _ => {
                return Err(eyre!(
                    "Invalid coloring.color_mode: {}. Must be 'auto', 'always', or 'never'",
                    self.coloring.color_mode
                ))
            }
        }

        let parser = ColorParser::with_capabilities(true, true, false);
        self.coloring.colors.validate(&parser)?;

        self.export.export_format()?;

        Ok(())
    }
}

impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.sheet.is_some() {
            self.sheet = other.sheet;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.page_size != default.page_size {
            self.page_size = other.page_size;
        }
        if other.row_numbers != default.row_numbers {
            self.row_numbers = other.row_numbers;
        }
    }
}

impl InferenceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = InferenceConfig::default();
        if other.sample_size != default.sample_size {
            self.sample_size = other.sample_size;
        }
        if !other.header_overrides.is_empty() {
            self.header_overrides = other.header_overrides;
        }
    }

    /// Build the inferer, compiling every header override pattern
    pub fn inferer(&self) -> Result<ColumnTypeInferer> {
        let overrides = self
            .header_overrides
            .iter()
            .map(|o| {
                HeaderOverride::new(&o.pattern, o.column_type).map_err(|e| {
                    eyre!(
                        "Invalid inference.header_overrides pattern '{}': {}",
                        o.pattern,
                        e
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ColumnTypeInferer::new(self.sample_size, overrides))
    }
}

impl ColoringConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ColoringConfig::default();
        if other.numeric != default.numeric {
            self.numeric = other.numeric;
        }
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl BucketColorConfig {
    fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("darkest_good", self.darkest_good.as_str()),
            ("light_good", self.light_good.as_str()),
            ("mid", self.mid.as_str()),
            ("warn", self.warn.as_str()),
            ("light_bad", self.light_bad.as_str()),
            ("bad", self.bad.as_str()),
            ("worst", self.worst.as_str()),
            ("header", self.header.as_str()),
            ("row_numbers", self.row_numbers.as_str()),
        ]
    }

    /// Color string configured for a severity bucket
    pub fn for_bucket(&self, bucket: SeverityBucket) -> &str {
        match bucket {
            SeverityBucket::DarkestGood => &self.darkest_good,
            SeverityBucket::LightGood => &self.light_good,
            SeverityBucket::Mid => &self.mid,
            SeverityBucket::Warn => &self.warn,
            SeverityBucket::LightBad => &self.light_bad,
            SeverityBucket::Bad => &self.bad,
            SeverityBucket::Worst => &self.worst,
        }
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser.parse(value).map_err(|e| {
                eyre!("Invalid color value for 'coloring.colors.{}': {}", name, e)
            })?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = BucketColorConfig::default();

        macro_rules! merge_color {
            ($($field:ident),+) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )+
            };
        }

        merge_color!(
            darkest_good,
            light_good,
            mid,
            warn,
            light_bad,
            bad,
            worst,
            header,
            row_numbers
        );
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        if other.format != default.format {
            self.format = other.format;
        }
        if other.file_prefix != default.file_prefix {
            self.file_prefix = other.file_prefix;
        }
    }

    pub fn export_format(&self) -> Result<ExportFormat> {
        ExportFormat::from_extension(&self.format).ok_or_else(|| {
            eyre!(
                "Invalid export.format: {}. Must be 'csv', 'tsv', 'json', or 'xlsx'",
                self.format
            )
        })
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        Self::for_mode("auto")
    }

    /// Parser for a `coloring.color_mode` value.
    ///
    /// `never` disables color, `always` colors even when stdout is not a
    /// terminal, and `auto` honors `NO_COLOR` and stdout detection.
    pub fn for_mode(mode: &str) -> Self {
        let support = supports_color::on(Stream::Stdout);
        let true_color = support.as_ref().map(|s| s.has_16m).unwrap_or(false);
        let has_256 = support.as_ref().map(|s| s.has_256).unwrap_or(false);
        match mode {
            "never" => Self::with_capabilities(false, false, true),
            "always" => Self::with_capabilities(true_color, has_256 || support.is_none(), false),
            _ => {
                let no_color = std::env::var("NO_COLOR").is_ok() || support.is_none();
                Self::with_capabilities(true_color, has_256, no_color)
            }
        }
    }

    /// Create a parser with fixed capabilities (for tests and forced modes)
    pub fn with_capabilities(supports_true_color: bool, supports_256: bool, no_color: bool) -> Self {
        Self {
            supports_true_color,
            supports_256,
            no_color,
        }
    }

    pub fn colors_enabled(&self) -> bool {
        !self.no_color
    }

    /// Parse a color string (hex or named) and convert to appropriate terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        // Hex format: "#ff0000" or "#FF0000" (6-character hex)
        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        // Indexed colors: "indexed(236)" for explicit 256-color palette
        let lower = trimmed.to_lowercase();
        if let Some(num_str) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let num = num_str.trim().parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::AnsiValue(num));
        }

        // Named colors (case-insensitive). crossterm's Dark* variants are the
        // normal ANSI colors 0-7 and the plain names are the bright 8-15.
        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::DarkRed),
            "green" => Ok(Color::DarkGreen),
            "yellow" => Ok(Color::DarkYellow),
            "blue" => Ok(Color::DarkBlue),
            "magenta" => Ok(Color::DarkMagenta),
            "cyan" => Ok(Color::DarkCyan),
            "white" => Ok(Color::Grey),

            "bright_black" | "bright black" => Ok(Color::DarkGrey),
            "bright_red" | "bright red" => Ok(Color::Red),
            "bright_green" | "bright green" => Ok(Color::Green),
            "bright_yellow" | "bright yellow" => Ok(Color::Yellow),
            "bright_blue" | "bright blue" => Ok(Color::Blue),
            "bright_magenta" | "bright magenta" => Ok(Color::Magenta),
            "bright_cyan" | "bright cyan" => Ok(Color::Cyan),
            "bright_white" | "bright white" => Ok(Color::White),

            "gray" | "grey" | "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => {
                Ok(Color::DarkGrey)
            }
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Grey),

            "reset" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), indexed(n), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    /// Convert RGB values to appropriate terminal color based on capabilities
    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb { r, g, b }
        } else if self.supports_256 {
            Color::AnsiValue(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse hex color string (#ff0000) to RGB components
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 || !s.is_ascii() {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}

/// Convert RGB to nearest 256-color palette index
/// Uses standard xterm 256-color palette
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    // Gray shade (r ≈ g ≈ b) maps to the grayscale ramp (232-255)
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let r_bright = r > 128;
    let g_bright = g > 128;
    let b_bright = b > 128;

    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::Grey };
    }

    match (r_bright, g_bright, b_bright) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::DarkRed,
        (false, true, false) => Color::DarkGreen,
        (true, true, false) => Color::DarkYellow,
        (false, false, true) => Color::DarkBlue,
        (true, false, true) => Color::DarkMagenta,
        (false, true, true) => Color::DarkCyan,
        (true, true, true) => Color::Grey,
    }
}

/// Parsed bucket and table colors ready for rendering
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
    enabled: bool,
}

impl Theme {
    /// Create a Theme from a ColoringConfig, detecting terminal capabilities
    /// according to its color mode
    pub fn from_config(config: &ColoringConfig) -> Result<Self> {
        Self::with_parser(config, &ColorParser::for_mode(&config.color_mode))
    }

    pub fn with_parser(config: &ColoringConfig, parser: &ColorParser) -> Result<Self> {
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self {
            colors,
            enabled: parser.colors_enabled(),
        })
    }

    /// Theme that renders everything uncolored
    pub fn plain() -> Self {
        Self {
            colors: HashMap::new(),
            enabled: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    pub fn bucket(&self, bucket: SeverityBucket) -> Color {
        self.get(bucket.as_str())
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
