//! Bit-packed color and dye rows
//!
//! Both row types keep their on-disk representation and expose typed
//! accessors over it, so reading a material and writing it back never
//! re-rounds a lane the caller did not touch.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use half::f16;

/// One color set row: sixteen binary16 lanes in 32 bytes.
///
/// Lane map: 0-2 diffuse RGB, 3 specular strength, 4-6 specular RGB,
/// 7 gloss, 8-10 emissive RGB, 11 tile set, 12-13 material repeat,
/// 14-15 material skew.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ColorSetRow(pub [u8; 32]);

impl ColorSetRow {
    fn lane(&self, i: usize) -> f16 {
        f16::from_le_bytes([self.0[i * 2], self.0[i * 2 + 1]])
    }

    fn set_lane(&mut self, i: usize, v: f16) {
        self.0[i * 2..i * 2 + 2].copy_from_slice(&v.to_le_bytes());
    }

    fn vec3(&self, base: usize) -> Vec3 {
        Vec3::new(
            self.lane(base).to_f32(),
            self.lane(base + 1).to_f32(),
            self.lane(base + 2).to_f32(),
        )
    }

    fn set_vec3(&mut self, base: usize, v: Vec3) {
        self.set_lane(base, f16::from_f32(v.x));
        self.set_lane(base + 1, f16::from_f32(v.y));
        self.set_lane(base + 2, f16::from_f32(v.z));
    }

    pub fn diffuse(&self) -> Vec3 {
        self.vec3(0)
    }

    pub fn set_diffuse(&mut self, v: Vec3) {
        self.set_vec3(0, v);
    }

    pub fn specular_strength(&self) -> f32 {
        self.lane(3).to_f32()
    }

    pub fn set_specular_strength(&mut self, v: f32) {
        self.set_lane(3, f16::from_f32(v));
    }

    pub fn specular(&self) -> Vec3 {
        self.vec3(4)
    }

    pub fn set_specular(&mut self, v: Vec3) {
        self.set_vec3(4, v);
    }

    pub fn gloss(&self) -> f32 {
        self.lane(7).to_f32()
    }

    pub fn set_gloss(&mut self, v: f32) {
        self.set_lane(7, f16::from_f32(v));
    }

    pub fn emissive(&self) -> Vec3 {
        self.vec3(8)
    }

    pub fn set_emissive(&mut self, v: Vec3) {
        self.set_vec3(8, v);
    }

    /// Tile texture index, stored as a half of `(index + 0.5) / 64`.
    pub fn tile_set(&self) -> u16 {
        (self.lane(11).to_f32() * 64.0) as u16
    }

    /// The +0.5 bias keeps the index stable through the half-float
    /// truncation in [`tile_set`](Self::tile_set) for indices up to 1023.
    pub fn set_tile_set(&mut self, index: u16) {
        self.set_lane(11, f16::from_f32((index as f32 + 0.5) / 64.0));
    }

    pub fn material_repeat(&self) -> Vec2 {
        Vec2::new(self.lane(12).to_f32(), self.lane(13).to_f32())
    }

    pub fn set_material_repeat(&mut self, v: Vec2) {
        self.set_lane(12, f16::from_f32(v.x));
        self.set_lane(13, f16::from_f32(v.y));
    }

    pub fn material_skew(&self) -> Vec2 {
        Vec2::new(self.lane(14).to_f32(), self.lane(15).to_f32())
    }

    pub fn set_material_skew(&mut self, v: Vec2) {
        self.set_lane(14, f16::from_f32(v.x));
        self.set_lane(15, f16::from_f32(v.y));
    }
}

/// One dye row: a u16 bitfield of five channel-applies flags (bits 0-4)
/// and an 11-bit dye template id (bits 5-15).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DyeSetRow(pub u16);

impl DyeSetRow {
    const DIFFUSE: u16 = 0x01;
    const SPECULAR: u16 = 0x02;
    const EMISSIVE: u16 = 0x04;
    const GLOSS: u16 = 0x08;
    const SPECULAR_STRENGTH: u16 = 0x10;

    pub fn template(&self) -> u16 {
        self.0 >> 5
    }

    pub fn set_template(&mut self, template: u16) {
        self.0 = (self.0 & 0x1F) | (template & 0x7FF) << 5;
    }

    fn flag(&self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    fn set_flag(&mut self, bit: u16, on: bool) {
        if on {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn dyes_diffuse(&self) -> bool {
        self.flag(Self::DIFFUSE)
    }

    pub fn set_dyes_diffuse(&mut self, on: bool) {
        self.set_flag(Self::DIFFUSE, on);
    }

    pub fn dyes_specular(&self) -> bool {
        self.flag(Self::SPECULAR)
    }

    pub fn set_dyes_specular(&mut self, on: bool) {
        self.set_flag(Self::SPECULAR, on);
    }

    pub fn dyes_emissive(&self) -> bool {
        self.flag(Self::EMISSIVE)
    }

    pub fn set_dyes_emissive(&mut self, on: bool) {
        self.set_flag(Self::EMISSIVE, on);
    }

    pub fn dyes_gloss(&self) -> bool {
        self.flag(Self::GLOSS)
    }

    pub fn set_dyes_gloss(&mut self, on: bool) {
        self.set_flag(Self::GLOSS, on);
    }

    pub fn dyes_specular_strength(&self) -> bool {
        self.flag(Self::SPECULAR_STRENGTH)
    }

    pub fn set_dyes_specular_strength(&mut self, on: bool) {
        self.set_flag(Self::SPECULAR_STRENGTH, on);
    }
}
