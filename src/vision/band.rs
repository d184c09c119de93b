use image::Rgb;

/// A reference color with a squared-RGB-distance tolerance.
/// The minimap draws from a restricted palette, so a band per color is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub name: &'static str,
    pub rgb: [u8; 3],
    pub tolerance: u32,
}

impl Band {
    pub const fn new(name: &'static str, rgb: [u8; 3], tolerance: u32) -> Self {
        Self {
            name,
            rgb,
            tolerance,
        }
    }
    pub fn distance(&self, px: &Rgb<u8>) -> u32 {
        px.0.iter()
            .zip(self.rgb.iter())
            .map(|(a, b)| (*a as i32 - *b as i32).pow(2) as u32)
            .sum()
    }
    pub fn contains(&self, px: &Rgb<u8>) -> bool {
        self.distance(px) <= self.tolerance
    }
    pub fn pixel(&self) -> Rgb<u8> {
        Rgb(self.rgb)
    }
}

/// Per-pixel classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Edge,
    Floor,
    Marker,
    Arrow,
    Enemy,
    Background,
}

/// The named bands of the minimap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Wall outlines.
    pub edge: Band,
    /// Walkable blocks.
    pub floor: Band,
    /// Interaction points.
    pub marker: Band,
    /// Player heading indicator.
    pub arrow: Band,
    /// Enemies and danger points.
    pub enemy: Band,
}

impl Palette {
    /// Tolerances used while the player is moving.
    pub const fn live() -> Self {
        Self {
            edge: Band::new("edge", [210, 210, 210], 4800),
            floor: Band::new("floor", [55, 55, 55], 4800),
            marker: Band::new("marker", [220, 192, 145], 1600),
            arrow: Band::new("arrow", [4, 191, 234], 1200),
            enemy: Band::new("enemy", [226, 60, 60], 512),
        }
    }
    /// Tighter tolerances for still frames such as recorded references.
    pub const fn still() -> Self {
        Self {
            edge: Band::new("edge", [210, 210, 210], 3200),
            floor: Band::new("floor", [55, 55, 55], 3200),
            ..Self::live()
        }
    }
    /// Markers and the arrow are checked first: their bands are the narrowest.
    pub fn classify(&self, px: &Rgb<u8>) -> Class {
        if self.arrow.contains(px) {
            Class::Arrow
        } else if self.marker.contains(px) {
            Class::Marker
        } else if self.enemy.contains(px) {
            Class::Enemy
        } else if self.edge.contains(px) {
            Class::Edge
        } else if self.floor.contains(px) {
            Class::Floor
        } else {
            Class::Background
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_anti_aliasing() {
        let palette = Palette::live();
        assert_eq!(palette.classify(&Rgb([210, 210, 210])), Class::Edge);
        assert_eq!(palette.classify(&Rgb([190, 200, 215])), Class::Edge);
        assert_eq!(palette.classify(&Rgb([60, 50, 58])), Class::Floor);
        assert_eq!(palette.classify(&Rgb([10, 185, 230])), Class::Arrow);
    }

    #[test]
    fn foreign_colors_are_background() {
        let palette = Palette::live();
        assert_eq!(palette.classify(&Rgb([0, 255, 0])), Class::Background);
        assert_eq!(palette.classify(&Rgb([140, 20, 200])), Class::Background);
        assert_eq!(palette.classify(&Rgb([130, 130, 130])), Class::Background);
    }

    #[test]
    fn still_palette_is_stricter() {
        let px = Rgb([175, 175, 175]);
        assert!(Palette::live().edge.contains(&px));
        assert!(!Palette::still().edge.contains(&px));
    }
}
