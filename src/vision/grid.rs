use crate::Degrees;
use crate::Pixels;

/// A 2D position. Minimap and map space share the image convention:
/// x grows right, y grows down.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Pixels,
    pub y: Pixels,
}

impl Point {
    pub const fn new(x: Pixels, y: Pixels) -> Self {
        Self { x, y }
    }
    pub fn distance(&self, other: &Point) -> Pixels {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
    /// Bearing to `other` in [0, 360): 0° points along +y, 90° along +x.
    pub fn bearing(&self, other: &Point) -> Degrees {
        let angle = (other.x - self.x).atan2(other.y - self.y).to_degrees();
        angle.rem_euclid(360.0)
    }
    /// Point reached by travelling `distance` along `bearing`.
    pub fn toward(&self, bearing: Degrees, distance: Pixels) -> Point {
        let radians = bearing.to_radians();
        Point::new(
            self.x + distance * radians.sin(),
            self.y + distance * radians.cos(),
        )
    }
    pub fn rounded(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x as Pixels, y as Pixels)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Signed difference `a - b` folded into [-180, 180].
pub fn wrap(angle: Degrees) -> Degrees {
    let folded = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if folded == -180.0 { 180.0 } else { folded }
}

/// Binary pixel mask. Reads outside the bounds are `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn centre(&self) -> Point {
        Point::new(self.width as Pixels / 2.0, self.height as Pixels / 2.0)
    }
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(false)
    }
    pub fn set(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = true;
        }
    }
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
    /// Set cells in row-major order.
    pub fn points(&self) -> Vec<(i32, i32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(i, _)| {
                (
                    (i % self.width as usize) as i32,
                    (i / self.width as usize) as i32,
                )
            })
            .collect()
    }
    /// Square dilation by `reach` cells, via a summed-area table.
    pub fn dilate(&self, reach: i32) -> Grid {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut table = vec![0u32; (w + 1) * (h + 1)];
        for y in 0..h {
            let mut row = 0u32;
            for x in 0..w {
                row += self.cells[y * w + x] as u32;
                table[(y + 1) * (w + 1) + x + 1] = table[y * (w + 1) + x + 1] + row;
            }
        }
        let mut grid = Grid::new(self.width, self.height);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let x0 = (x - reach).max(0) as usize;
                let y0 = (y - reach).max(0) as usize;
                let x1 = ((x + reach + 1) as usize).min(w);
                let y1 = ((y + reach + 1) as usize).min(h);
                let sum = table[y1 * (w + 1) + x1] + table[y0 * (w + 1) + x0]
                    - table[y0 * (w + 1) + x1]
                    - table[y1 * (w + 1) + x0];
                if sum > 0 {
                    grid.cells[y as usize * w + x as usize] = true;
                }
            }
        }
        grid
    }
    /// Cells set in both grids (dimensions of `self`).
    pub fn and(&self, other: &Grid) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        for (x, y) in self.points() {
            if other.get(x, y) {
                grid.set(x, y);
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_convention() {
        let o = Point::new(0.0, 0.0);
        assert!((o.bearing(&Point::new(0.0, 5.0)) - 0.0).abs() < 1e-4);
        assert!((o.bearing(&Point::new(5.0, 0.0)) - 90.0).abs() < 1e-4);
        assert!((o.bearing(&Point::new(0.0, -5.0)) - 180.0).abs() < 1e-4);
        assert!((o.bearing(&Point::new(-5.0, 0.0)) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn toward_inverts_bearing() {
        let o = Point::new(3.0, 4.0);
        let p = o.toward(37.0, 10.0);
        assert!((o.bearing(&p) - 37.0).abs() < 1e-3);
        assert!((o.distance(&p) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn wrap_folds_angles() {
        assert_eq!(wrap(190.0), -170.0);
        assert_eq!(wrap(-190.0), 170.0);
        assert_eq!(wrap(540.0), 180.0);
        assert_eq!(wrap(15.0), 15.0);
    }

    #[test]
    fn dilate_matches_naive() {
        let mut grid = Grid::new(9, 7);
        grid.set(1, 1);
        grid.set(6, 5);
        let wide = grid.dilate(1);
        assert_eq!(wide.count(), 9 + 9);
        assert!(wide.get(0, 0));
        assert!(wide.get(7, 6));
        assert!(!wide.get(3, 3));
    }

    #[test]
    fn outside_reads_false() {
        let mut grid = Grid::new(2, 2);
        grid.set(5, 5);
        assert_eq!(grid.count(), 0);
        assert!(!grid.get(-1, 0));
    }
}
