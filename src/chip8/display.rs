use std::fmt;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Monochrome 64x32 framebuffer. Sprites wrap around both edges.
#[derive(Clone, PartialEq, Eq)]
pub struct Display {
    pixels: [[bool; WIDTH]; HEIGHT],
}

impl Display {
    pub fn new() -> Self {
        Self {
            pixels: [[false; WIDTH]; HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[false; WIDTH]; HEIGHT];
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y % HEIGHT][x % WIDTH]
    }

    pub fn rows(&self) -> &[[bool; WIDTH]; HEIGHT] {
        &self.pixels
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().flatten().all(|p| !p)
    }

    /// XORs an 8 pixel wide sprite onto the screen at (x, y), one byte per row.
    /// Returns true if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let (x, y) = (x as usize, y as usize);
        let mut collision = false;
        for (row, bits) in sprite.iter().enumerate() {
            let py = (y + row) % HEIGHT;
            for col in 0..8 {
                // iter bit shift across sprite pixel from memory
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let px = (x + col) % WIDTH;
                let pixel = &mut self.pixels[py][px];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }
        collision
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

/// Text dump of the screen, one glyph per pixel.
impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.pixels.iter() {
            for &p in row.iter() {
                f.write_str(if p { "⬜" } else { "⬛" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Display {}x{}", WIDTH, HEIGHT)?;
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_blank() {
        assert!(Display::new().is_blank());
    }

    #[test]
    fn test_draw_sets_pixels() {
        let mut d = Display::new();
        let collision = d.draw_sprite(2, 3, &[0b1010_0000]);
        assert!(!collision);
        assert!(d.pixel(2, 3));
        assert!(!d.pixel(3, 3));
        assert!(d.pixel(4, 3));
    }

    #[test]
    fn test_double_draw_restores_screen() {
        let mut d = Display::new();
        d.draw_sprite(10, 10, &[0xFF]);
        let before = d.clone();
        let glyph = [0xF0, 0x90, 0xF0, 0x90, 0xF0];
        assert!(!d.draw_sprite(30, 20, &glyph));
        assert!(d.draw_sprite(30, 20, &glyph));
        assert_eq!(d, before);
    }

    #[test]
    fn test_double_draw_over_lit_pixels_restores_screen() {
        let mut d = Display::new();
        d.draw_sprite(10, 10, &[0xFF]);
        let before = d.clone();
        // glyph row 2 lands on the lit row at y = 10
        let glyph = [0xF0, 0x90, 0xF0, 0x90, 0xF0];
        assert!(d.draw_sprite(12, 8, &glyph));
        assert!(!d.pixel(12, 10));
        d.draw_sprite(12, 8, &glyph);
        assert_eq!(d, before);
    }

    #[test]
    fn test_wraps_horizontally() {
        let mut d = Display::new();
        d.draw_sprite(63, 0, &[0xFF]);
        assert!(d.pixel(63, 0));
        for x in 0..=6 {
            assert!(d.pixel(x, 0), "column {} should be lit", x);
        }
        assert!(!d.pixel(7, 0));
        assert!(!d.pixel(62, 0));
    }

    #[test]
    fn test_wraps_vertically() {
        let mut d = Display::new();
        d.draw_sprite(0, 31, &[0x80, 0x80, 0x80]);
        assert!(d.pixel(0, 31));
        assert!(d.pixel(0, 0));
        assert!(d.pixel(0, 1));
        assert!(!d.pixel(0, 2));
    }

    #[test]
    fn test_coordinates_past_screen_wrap() {
        let mut d = Display::new();
        d.draw_sprite(64 + 5, 32 + 1, &[0x80]);
        assert!(d.pixel(5, 1));
    }

    #[test]
    fn test_collision_only_on_overlap() {
        let mut d = Display::new();
        d.draw_sprite(0, 0, &[0xF0]);
        assert!(!d.draw_sprite(4, 0, &[0xF0]));
        assert!(d.draw_sprite(3, 0, &[0x80]));
        assert!(!d.pixel(3, 0));
    }

    #[test]
    fn test_clear() {
        let mut d = Display::new();
        d.draw_sprite(0, 0, &[0xFF, 0xFF]);
        assert!(!d.is_blank());
        d.clear();
        assert!(d.is_blank());
    }

    #[test]
    fn test_text_dump() {
        let mut d = Display::new();
        d.draw_sprite(0, 0, &[0x80]);
        let dump = d.to_string();
        assert_eq!(dump.lines().count(), HEIGHT);
        assert!(dump.lines().next().unwrap().starts_with("⬜⬛"));
    }
}
