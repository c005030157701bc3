use crate::error::{OperationError, Result};

use super::Raster;

/// Neighbour offsets `(dx, dz)` in Zhang-Suen order P2..P9, starting north
/// (`-z`) and going clockwise.
const RING: [(i64, i64); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Thins a planar mask to a one-pixel-wide skeleton (Zhang-Suen).
///
/// The raster must be planar (`ny == 1`); rows run along `z`.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` for rasters with more than one
/// vertical layer.
pub fn thin(raster: &Raster) -> Result<Raster> {
    let [nx, ny, nz] = raster.dims();
    if ny > 1 {
        return Err(OperationError::InvalidInput(format!(
            "thinning needs a planar raster, got {ny} layers"
        ))
        .into());
    }

    let mut out = raster.clone();
    if out.is_empty() {
        return Ok(out);
    }

    #[allow(clippy::cast_possible_wrap)]
    let (w, d) = (nx as i64, nz as i64);
    let mut removed = Vec::new();
    loop {
        let mut changed = false;
        for pass in 0..2 {
            removed.clear();
            for z in 0..d {
                for x in 0..w {
                    if out.get(x, 0, z) && should_remove(&out, x, z, pass) {
                        removed.push((x, z));
                    }
                }
            }
            changed |= !removed.is_empty();
            for &(x, z) in &removed {
                out.set(x, 0, z, false);
            }
        }
        if !changed {
            break;
        }
    }

    tracing::trace!(before = raster.count(), after = out.count(), "thinned raster");
    Ok(out)
}

fn should_remove(raster: &Raster, x: i64, z: i64, pass: usize) -> bool {
    let p: [bool; 8] = RING.map(|(dx, dz)| raster.get(x + dx, 0, z + dz));

    let neighbours = p.iter().filter(|&&v| v).count();
    if !(2..=6).contains(&neighbours) {
        return false;
    }

    let transitions = (0..8).filter(|&i| !p[i] && p[(i + 1) % 8]).count();
    if transitions != 1 {
        return false;
    }

    // P2, P4, P6, P8 are indices 0, 2, 4, 6.
    if pass == 0 {
        !(p[0] && p[2] && p[4]) && !(p[2] && p[4] && p[6])
    } else {
        !(p[0] && p[2] && p[6]) && !(p[0] && p[4] && p[6])
    }
}
