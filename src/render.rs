use rayon::prelude::*;

use crate::simulation::GridSimulation;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub background: [u8; 4],
    pub cell: [u8; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0x11, 0x11, 0x11, 255],
            cell: [0xEE, 0xEE, 0xEE, 255],
        }
    }
}

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Render the grid as an RGBA8 image of `cols * cell_size` by
/// `rows * cell_size` pixels. Each cell is the background blended toward
/// the cell color by its alpha.
pub fn render_frame(sim: &GridSimulation, cell_size: usize, palette: &Palette) -> Vec<u8> {
    let w = sim.cols() * cell_size;
    let h = sim.rows() * cell_size;
    let mut rgba = vec![0u8; w * h * 4];
    if w == 0 || h == 0 {
        return rgba;
    }
    let alpha = sim.alpha_grid();

    rgba.par_chunks_mut(w * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let r = y / cell_size;
            for x in 0..w {
                let color = lerp_color(palette.background, palette.cell, alpha.get(r, x / cell_size));
                let out = &mut row[x * 4..x * 4 + 4];
                out.copy_from_slice(&color);
            }
        });

    rgba
}
