//! Scanline rasterizer.
//!
//! Runs once per visible line at the end of pixel transfer and produces
//! 160 shades. Addresses below are offsets into video RAM (0x8000 = 0).

use super::frame::WIDTH;
use super::registers::PpuRegisters;

const TILE_BYTES: usize = 16;
/// Base of the 0x8000 (unsigned index) tile data block.
const UNSIGNED_TILE_BASE: usize = 0x0000;
/// Tile 0 of the 0x8800 (signed index) tile data block, at 0x9000.
const SIGNED_TILE_BASE: usize = 0x1000;
const MAP_LOW: usize = 0x1800;
const MAP_HIGH: usize = 0x1C00;
const MAP_WIDTH: usize = 32;

const SPRITE_COUNT: usize = 40;
const SPRITES_PER_LINE: usize = 10;

/// Sprite attribute bits (OAM byte 3).
mod attr {
    pub const PALETTE_1: u8 = 0x10;
    pub const FLIP_X: u8 = 0x20;
    pub const FLIP_Y: u8 = 0x40;
    pub const BEHIND_BG: u8 = 0x80;
}

/// Shade for a 2-bit color index through a palette register.
#[must_use]
pub fn shade(palette: u8, index: u8) -> u8 {
    (palette >> (index * 2)) & 0x03
}

/// Color index of pixel `column` (0 = leftmost) in one tile row.
fn tile_pixel(vram: &[u8], row_address: usize, column: u8) -> u8 {
    let low = vram[row_address];
    let high = vram[row_address + 1];
    let bit = 7 - column;
    ((high >> bit) & 1) << 1 | (low >> bit) & 1
}

/// Background or window tile map lookup.
struct TileMap<'a> {
    vram: &'a [u8],
    map_base: usize,
    unsigned_tiles: bool,
}

impl TileMap<'_> {
    /// Color index at (x, y) within the 256x256 map.
    fn pixel(&self, x: u8, y: u8) -> u8 {
        let entry = self.map_base + usize::from(y / 8) * MAP_WIDTH + usize::from(x / 8);
        let index = self.vram[entry];
        let tile = if self.unsigned_tiles {
            UNSIGNED_TILE_BASE + usize::from(index) * TILE_BYTES
        } else {
            SIGNED_TILE_BASE.wrapping_add_signed(isize::from(index as i8) * TILE_BYTES as isize)
        };
        tile_pixel(self.vram, tile + usize::from(y % 8) * 2, x % 8)
    }
}

/// An OAM entry selected for the current line.
#[derive(Debug, Clone, Copy)]
struct Sprite {
    y: i16,
    x: i16,
    tile: u8,
    flags: u8,
}

/// Draw line `regs.ly` into `line`. Returns true if the window covered
/// part of the line, in which case the caller advances the window line.
pub fn draw_line(line: &mut [u8; WIDTH], vram: &[u8], oam: &[u8], regs: &PpuRegisters) -> bool {
    // Raw background/window color indices, for sprite priority.
    let mut bg_index = [0u8; WIDTH];
    let window_drawn = draw_background(&mut bg_index, vram, regs);
    for (out, &index) in line.iter_mut().zip(&bg_index) {
        *out = shade(regs.bgp, index);
    }
    if regs.sprites_on {
        draw_sprites(line, &bg_index, vram, oam, regs);
    }
    window_drawn
}

fn draw_background(bg_index: &mut [u8; WIDTH], vram: &[u8], regs: &PpuRegisters) -> bool {
    // On this model LCDC bit 0 blanks both background and window.
    if !regs.bg_on {
        return false;
    }

    let background = TileMap {
        vram,
        map_base: if regs.bg_map_high { MAP_HIGH } else { MAP_LOW },
        unsigned_tiles: regs.unsigned_tile_data,
    };
    let y = regs.ly.wrapping_add(regs.scy);
    for (x, out) in bg_index.iter_mut().enumerate() {
        *out = background.pixel((x as u8).wrapping_add(regs.scx), y);
    }

    let window_visible = regs.window_on && regs.ly >= regs.wy && regs.wx <= 166;
    if !window_visible {
        return false;
    }
    let window = TileMap {
        vram,
        map_base: if regs.window_map_high { MAP_HIGH } else { MAP_LOW },
        unsigned_tiles: regs.unsigned_tile_data,
    };
    // WX is the window's left edge plus 7.
    let left = usize::from(regs.wx).saturating_sub(7);
    let skipped = 7usize.saturating_sub(usize::from(regs.wx));
    for (column, out) in bg_index.iter_mut().enumerate().skip(left) {
        let window_x = column - left + skipped;
        *out = window.pixel(window_x as u8, regs.window_line);
    }
    left < WIDTH
}

/// OAM scan for the current line: first ten hits in OAM order, then
/// ordered by X with OAM order breaking ties.
fn select_sprites(oam: &[u8], ly: u8, height: i16) -> Vec<Sprite> {
    let line = i16::from(ly);
    let mut selected: Vec<Sprite> = oam
        .chunks_exact(4)
        .take(SPRITE_COUNT)
        .map(|entry| Sprite {
            y: i16::from(entry[0]) - 16,
            x: i16::from(entry[1]) - 8,
            tile: entry[2],
            flags: entry[3],
        })
        .filter(|sprite| (sprite.y..sprite.y + height).contains(&line))
        .take(SPRITES_PER_LINE)
        .collect();
    selected.sort_by_key(|sprite| sprite.x);
    selected
}

fn draw_sprites(line: &mut [u8; WIDTH], bg_index: &[u8; WIDTH], vram: &[u8], oam: &[u8], regs: &PpuRegisters) {
    let height: i16 = if regs.tall_sprites { 16 } else { 8 };
    let sprites = select_sprites(oam, regs.ly, height);
    let mut claimed = [false; WIDTH];

    for sprite in sprites {
        let mut row = i16::from(regs.ly) - sprite.y;
        if sprite.flags & attr::FLIP_Y != 0 {
            row = height - 1 - row;
        }
        let tile = if regs.tall_sprites { sprite.tile & 0xFE } else { sprite.tile };
        let row_address = UNSIGNED_TILE_BASE + usize::from(tile) * TILE_BYTES + row as usize * 2;
        let palette = if sprite.flags & attr::PALETTE_1 != 0 { regs.obp1 } else { regs.obp0 };

        for column in 0..8i16 {
            let x = sprite.x + column;
            if !(0..WIDTH as i16).contains(&x) {
                continue;
            }
            let x = x as usize;
            if claimed[x] {
                continue;
            }
            let pixel_column = if sprite.flags & attr::FLIP_X != 0 { 7 - column } else { column };
            let index = tile_pixel(vram, row_address, pixel_column as u8);
            if index == 0 {
                continue;
            }
            // An opaque pixel hides lower-priority sprites even when the
            // background then covers it.
            claimed[x] = true;
            if sprite.flags & attr::BEHIND_BG != 0 && bg_index[x] != 0 {
                continue;
            }
            line[x] = shade(palette, index);
        }
    }
}
