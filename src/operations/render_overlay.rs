use crate::raster::Raster;
use crate::topology::Network;

/// Colour of skeleton pixels that belong to no line.
const SKELETON: [u8; 3] = [96, 96, 96];

/// Colour of intersection centres.
const INTERSECTION: [u8; 3] = [255, 255, 0];

/// An RGB image over the `x`/`z` plane, rows along `z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    width: usize,
    depth: usize,
    pixels: Vec<[u8; 3]>,
}

impl Overlay {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    /// Colour at `(x, z)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: i64, z: i64) -> Option<[u8; 3]> {
        let x = usize::try_from(x).ok().filter(|&v| v < self.width)?;
        let z = usize::try_from(z).ok().filter(|&v| v < self.depth)?;
        self.pixels.get(z * self.width + x).copied()
    }

    /// Encodes the image as a binary PPM (`P6`).
    #[must_use]
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{} {}\n255\n", self.width, self.depth).into_bytes();
        out.extend(self.pixels.iter().flatten());
        out
    }

    fn paint(&mut self, x: i64, z: i64, colour: [u8; 3]) {
        let Some(x) = usize::try_from(x).ok().filter(|&v| v < self.width) else {
            return;
        };
        let Some(z) = usize::try_from(z).ok().filter(|&v| v < self.depth) else {
            return;
        };
        self.pixels[z * self.width + x] = colour;
    }
}

/// Renders a parsed network over its skeleton for inspection.
///
/// Each line gets its own colour; intersection centres are yellow. Volumes
/// are flattened along `y`.
#[derive(Debug)]
pub struct RenderOverlay<'a> {
    skeleton: &'a Raster,
    network: &'a Network,
}

impl<'a> RenderOverlay<'a> {
    /// Creates a new overlay rendering.
    #[must_use]
    pub fn new(skeleton: &'a Raster, network: &'a Network) -> Self {
        Self { skeleton, network }
    }

    /// Executes the rendering.
    #[must_use]
    pub fn execute(&self) -> Overlay {
        let [width, _, depth] = self.skeleton.dims();
        let mut overlay = Overlay {
            width,
            depth,
            pixels: vec![[0; 3]; width * depth],
        };

        for v in self.skeleton.foreground() {
            overlay.paint(v.x, v.z, SKELETON);
        }
        for (i, (_, line)) in self.network.lines().enumerate() {
            let colour = line_colour(i);
            for p in &line.points {
                overlay.paint(p.x, p.z, colour);
            }
        }
        for (_, intersection) in self.network.intersections() {
            overlay.paint(intersection.position.x, intersection.position.z, INTERSECTION);
        }
        overlay
    }
}

/// A saturated colour for the `index`-th line. Hues step by the golden
/// angle so neighbouring indices stay far apart.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn line_colour(index: usize) -> [u8; 3] {
    const GOLDEN: f64 = 0.618_033_988_749_895;
    let hue = (index as f64 * GOLDEN).fract() * 6.0;
    let x = 1.0 - (hue % 2.0 - 1.0).abs();
    let (r, g, b) = match hue as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    // The floor keeps every channel above zero, so no line is pure yellow.
    let scale = |c: f64| (55.0 + c * 200.0) as u8;
    [scale(r), scale(g), scale(b)]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::{AdjacencyGraph, TopologyParser};

    fn cross() -> (Raster, Network) {
        let raster = Raster::from_ascii(
            "..#..\n\
             ..#..\n\
             #####\n\
             ..#..\n\
             ..#..\n",
        )
        .unwrap();
        let graph = AdjacencyGraph::from_raster(&raster);
        let network = TopologyParser::new(&graph).parse(false).unwrap();
        (raster, network)
    }

    #[test]
    fn intersections_are_yellow() {
        let (raster, network) = cross();
        let overlay = RenderOverlay::new(&raster, &network).execute();
        assert_eq!(overlay.width(), 5);
        assert_eq!(overlay.depth(), 5);
        assert_eq!(overlay.pixel(2, 2), Some(INTERSECTION));
        assert_eq!(overlay.pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(overlay.pixel(5, 0), None);
    }

    #[test]
    fn lines_get_distinct_colours() {
        let (raster, network) = cross();
        let overlay = RenderOverlay::new(&raster, &network).execute();
        let arms = [(2, 0), (0, 2), (4, 2), (2, 4)].map(|(x, z)| overlay.pixel(x, z).unwrap());
        for (i, a) in arms.iter().enumerate() {
            assert_ne!(*a, INTERSECTION);
            assert_ne!(*a, SKELETON);
            for b in &arms[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn ppm_header_and_size() {
        let (raster, network) = cross();
        let ppm = RenderOverlay::new(&raster, &network).execute().to_ppm();
        let header = b"P6\n5 5\n255\n";
        assert!(ppm.starts_with(header));
        assert_eq!(ppm.len(), header.len() + 5 * 5 * 3);
    }

    #[test]
    fn colours_are_deterministic() {
        assert_eq!(line_colour(3), line_colour(3));
        assert!((0..32).all(|i| line_colour(i) != INTERSECTION));
    }
}
