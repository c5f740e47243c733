use plotters::style::RGBColor;

/// Colour and display name used for one runtime in every chart and table
#[derive(Debug, Clone, Copy)]
pub struct RuntimeStyle {
    pub runtime: &'static str,
    pub label: &'static str,
    pub color: RGBColor,
}

/// Dark colour scheme shared by all charts
#[derive(Debug, Clone)]
pub struct Theme {
    /// Figure background
    pub background: RGBColor,
    /// Plotting area background
    pub panel: RGBColor,
    /// Axis lines, bar outlines and legend border
    pub edge: RGBColor,
    pub text: RGBColor,
    /// Colour for runtimes without an entry in `runtimes`
    pub fallback: RGBColor,
    pub runtimes: &'static [RuntimeStyle],
}

pub const RUNTIME_STYLES: &[RuntimeStyle] = &[
    RuntimeStyle {
        runtime: "bare",
        label: "Bare Metal",
        color: RGBColor(0x6c, 0x75, 0x7d),
    },
    RuntimeStyle {
        runtime: "docker",
        label: "Docker",
        color: RGBColor(0x0d, 0xb7, 0xed),
    },
    RuntimeStyle {
        runtime: "podman",
        label: "Podman",
        color: RGBColor(0x89, 0x2c, 0xa0),
    },
];

pub const DARK: Theme = Theme {
    background: RGBColor(0x1a, 0x1a, 0x2e),
    panel: RGBColor(0x16, 0x21, 0x3e),
    edge: RGBColor(0x33, 0x33, 0x33),
    text: RGBColor(0xff, 0xff, 0xff),
    fallback: RGBColor(0xaa, 0xaa, 0xaa),
    runtimes: RUNTIME_STYLES,
};

impl Default for Theme {
    fn default() -> Self {
        DARK
    }
}

impl Theme {
    fn style(&self, runtime: &str) -> Option<&RuntimeStyle> {
        self.runtimes.iter().find(|s| s.runtime == runtime)
    }

    pub fn color(&self, runtime: &str) -> RGBColor {
        self.style(runtime).map_or(self.fallback, |s| s.color)
    }

    /// Display name, or the raw runtime key when it isn't known
    pub fn label<'a>(&self, runtime: &'a str) -> &'a str {
        self.style(runtime).map_or(runtime, |s| s.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_runtimes() {
        let theme = Theme::default();
        assert_eq!(theme.label("docker"), "Docker");
        assert_eq!(theme.label("bare"), "Bare Metal");
        assert_eq!(theme.color("podman"), RGBColor(0x89, 0x2c, 0xa0));
    }

    #[test]
    fn test_unknown_runtime_falls_back() {
        let theme = Theme::default();
        assert_eq!(theme.label("kata"), "kata");
        assert_eq!(theme.color("kata"), theme.fallback);
    }
}
