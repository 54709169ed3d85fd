use super::{Furniture, FurnitureKind};
use crate::{
    color::Color,
    gfx::geometry::{generate_box, generate_cylinder, GeometryData},
};

const CYLINDER_SEGMENTS: u32 = 16;

/// Box of the given size whose center sits at `center`
fn part(size: [f32; 3], center: [f32; 3]) -> GeometryData {
    generate_box(size[0], size[1], size[2]).translated(center)
}

fn assemble(parts: impl IntoIterator<Item = GeometryData>) -> GeometryData {
    parts.into_iter().fold(GeometryData::new(), |mut acc, p| {
        acc.append(&p);
        acc
    })
}

/// Four legs inset from the corners of a `width` by `depth` top
fn legs(width: f32, depth: f32, thickness: f32, height: f32) -> Vec<GeometryData> {
    let x = width * 0.5 - thickness;
    let z = depth * 0.5 - thickness;
    [(-x, -z), (x, -z), (-x, z), (x, z)]
        .into_iter()
        .map(|(lx, lz)| part([thickness, height, thickness], [lx, height * 0.5, lz]))
        .collect()
}

pub struct Chair;

impl Furniture for Chair {
    fn kind(&self) -> FurnitureKind {
        FurnitureKind::Chair
    }

    fn footprint(&self) -> (f32, f32) {
        (0.6, 0.6)
    }

    fn target_height(&self) -> f32 {
        1.0
    }

    fn base_color(&self) -> Color {
        Color::rgb(0x46, 0x82, 0xB4)
    }

    fn placeholder_geometry(&self) -> GeometryData {
        let mut parts = legs(0.6, 0.6, 0.05, 0.41);
        parts.push(part([0.6, 0.08, 0.6], [0.0, 0.45, 0.0]));
        parts.push(part([0.6, 0.51, 0.06], [0.0, 0.745, -0.27]));
        assemble(parts)
    }
}

pub struct Table;

impl Furniture for Table {
    fn kind(&self) -> FurnitureKind {
        FurnitureKind::Table
    }

    fn footprint(&self) -> (f32, f32) {
        (2.0, 1.0)
    }

    fn target_height(&self) -> f32 {
        0.75
    }

    fn base_color(&self) -> Color {
        Color::rgb(0x8B, 0x45, 0x13)
    }

    fn placeholder_geometry(&self) -> GeometryData {
        let mut parts = legs(2.0, 1.0, 0.08, 0.69);
        parts.push(part([2.0, 0.06, 1.0], [0.0, 0.72, 0.0]));
        assemble(parts)
    }
}

pub struct Sofa;

impl Furniture for Sofa {
    fn kind(&self) -> FurnitureKind {
        FurnitureKind::Sofa
    }

    fn footprint(&self) -> (f32, f32) {
        (2.5, 1.0)
    }

    fn target_height(&self) -> f32 {
        0.9
    }

    fn base_color(&self) -> Color {
        Color::rgb(0x41, 0x69, 0xE1)
    }

    fn placeholder_geometry(&self) -> GeometryData {
        assemble([
            part([2.5, 0.45, 1.0], [0.0, 0.225, 0.0]),
            part([2.5, 0.45, 0.25], [0.0, 0.675, -0.375]),
            part([0.2, 0.2, 0.75], [-1.15, 0.55, 0.125]),
            part([0.2, 0.2, 0.75], [1.15, 0.55, 0.125]),
        ])
    }
}

pub struct Bed;

impl Furniture for Bed {
    fn kind(&self) -> FurnitureKind {
        FurnitureKind::Bed
    }

    fn footprint(&self) -> (f32, f32) {
        (2.0, 3.0)
    }

    fn target_height(&self) -> f32 {
        0.6
    }

    fn base_color(&self) -> Color {
        Color::WHITE
    }

    fn placeholder_geometry(&self) -> GeometryData {
        assemble([
            part([2.0, 0.3, 3.0], [0.0, 0.15, 0.0]),
            part([1.9, 0.15, 2.8], [0.0, 0.375, 0.05]),
            part([2.0, 0.6, 0.1], [0.0, 0.3, -1.45]),
            part([0.6, 0.1, 0.4], [-0.45, 0.5, -1.1]),
            part([0.6, 0.1, 0.4], [0.45, 0.5, -1.1]),
        ])
    }
}

pub struct Lamp;

impl Furniture for Lamp {
    fn kind(&self) -> FurnitureKind {
        FurnitureKind::Lamp
    }

    fn footprint(&self) -> (f32, f32) {
        (0.4, 0.4)
    }

    fn target_height(&self) -> f32 {
        1.6
    }

    fn base_color(&self) -> Color {
        Color::rgb(0xFF, 0xF8, 0xDC)
    }

    fn placeholder_geometry(&self) -> GeometryData {
        assemble([
            generate_cylinder(0.15, 0.04, CYLINDER_SEGMENTS).translated([0.0, 0.02, 0.0]),
            generate_cylinder(0.02, 1.2, CYLINDER_SEGMENTS).translated([0.0, 0.64, 0.0]),
            generate_cylinder(0.2, 0.36, CYLINDER_SEGMENTS).translated([0.0, 1.42, 0.0]),
        ])
    }
}
