//! Bitmap collision mask
//!
//! A small window of the playfield rasterized to one bit per pixel. Used by
//! the ship bounce integrator to compare terrain overlap with and without
//! bounce walls. Writes outside the window are clipped; reads outside it are
//! a caller bug and fail with `PointOutOfBounds`.

use bitvec::prelude::*;
use glam::IVec2;

use super::geometry::in_distance_bounded;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionMap {
    /// World position of the top-left pixel
    origin: IVec2,
    width: i32,
    height: i32,
    bits: BitVec,
}

impl CollisionMap {
    pub fn new(origin: IVec2, width: i32, height: i32) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        Self {
            origin,
            width,
            height,
            bits: BitVec::repeat(false, (width * height) as usize),
        }
    }

    /// Square window of half-size `radius` centered on `center`
    pub fn around(center: IVec2, radius: i32) -> Self {
        let size = radius * 2 + 1;
        Self::new(center - IVec2::splat(radius), size, size)
    }

    pub fn origin(&self) -> IVec2 {
        self.origin
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, p: IVec2) -> bool {
        let local = p - self.origin;
        local.x >= 0 && local.y >= 0 && local.x < self.width && local.y < self.height
    }

    fn index(&self, p: IVec2) -> Option<usize> {
        self.contains(p).then(|| {
            let local = p - self.origin;
            (local.y * self.width + local.x) as usize
        })
    }

    /// Query one pixel
    pub fn get(&self, p: IVec2) -> Result<bool> {
        let idx = self
            .index(p)
            .ok_or(SimError::PointOutOfBounds { x: p.x, y: p.y })?;
        Ok(self.bits[idx])
    }

    /// Set one pixel (clipped)
    pub fn set(&mut self, p: IVec2) {
        if let Some(idx) = self.index(p) {
            self.bits.set(idx, true);
        }
    }

    /// Clear one pixel (clipped)
    pub fn clear(&mut self, p: IVec2) {
        if let Some(idx) = self.index(p) {
            self.bits.set(idx, false);
        }
    }

    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Rasterize a line (Bresenham), clipped to the window
    pub fn draw_line(&mut self, a: IVec2, b: IVec2) {
        let dx = (b.x - a.x).abs();
        let dy = -(b.y - a.y).abs();
        let sx = if a.x < b.x { 1 } else { -1 };
        let sy = if a.y < b.y { 1 } else { -1 };
        let mut err = dx + dy;
        let mut p = a;
        loop {
            self.set(p);
            if p == b {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                p.x += sx;
            }
            if e2 <= dx {
                err += dx;
                p.y += sy;
            }
        }
    }

    /// Does any set pixel fall inside the disk? The disk must lie in the window.
    pub fn overlaps_disk(&self, center: IVec2, radius: i32) -> Result<bool> {
        let r = radius as i16;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if in_distance_bounded(dx as i16, dy as i16, r)
                    && self.get(center + IVec2::new(dx, dy))?
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Clear every pixel inside the disk (clipped)
    pub fn clear_disk(&mut self, center: IVec2, radius: i32) {
        let r = radius as i16;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if in_distance_bounded(dx as i16, dy as i16, r) {
                    self.clear(center + IVec2::new(dx, dy));
                }
            }
        }
    }
}
