//! # Furniture Catalog
//!
//! Every placeable kind of furniture, with its default color, footprint and
//! target height. [`create`] is the single entry point that maps a
//! [`FurnitureKind`] to its [`Furniture`] description.
//!
//! ```rust
//! use furnish::furniture::{self, FurnitureKind};
//!
//! let table = furniture::create(FurnitureKind::Table);
//! assert_eq!(table.footprint(), (2.0, 1.0));
//! assert_eq!(table.base_color().to_hex(), "#8B4513");
//! ```

mod placeholders;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use placeholders::{Bed, Chair, Lamp, Sofa, Table};

use crate::{
    color::Color,
    gfx::{geometry::GeometryData, scene::Model},
};

/// Kinds of furniture that can be placed in the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FurnitureKind {
    Chair,
    Table,
    Sofa,
    Bed,
    Lamp,
}

impl FurnitureKind {
    pub const ALL: [FurnitureKind; 5] = [
        FurnitureKind::Chair,
        FurnitureKind::Table,
        FurnitureKind::Sofa,
        FurnitureKind::Bed,
        FurnitureKind::Lamp,
    ];

    /// Human-readable name, used for item names and the panel
    pub fn label(&self) -> &'static str {
        match self {
            FurnitureKind::Chair => "Chair",
            FurnitureKind::Table => "Table",
            FurnitureKind::Sofa => "Sofa",
            FurnitureKind::Bed => "Bed",
            FurnitureKind::Lamp => "Lamp",
        }
    }

    /// Lowercase identifier, also the model file stem
    pub fn slug(&self) -> &'static str {
        match self {
            FurnitureKind::Chair => "chair",
            FurnitureKind::Table => "table",
            FurnitureKind::Sofa => "sofa",
            FurnitureKind::Bed => "bed",
            FurnitureKind::Lamp => "lamp",
        }
    }
}

impl fmt::Display for FurnitureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown furniture kind `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for FurnitureKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FurnitureKind::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Static description of a kind of furniture
pub trait Furniture: Send + Sync {
    fn kind(&self) -> FurnitureKind;

    /// Width (x) and depth (z) in meters
    fn footprint(&self) -> (f32, f32);

    /// Height every loaded model of this kind is scaled to
    fn target_height(&self) -> f32;

    fn base_color(&self) -> Color;

    fn display_name(&self) -> &'static str {
        self.kind().label()
    }

    /// Model file name inside the model directory
    fn asset_file(&self) -> String {
        format!("{}.obj", self.kind().slug())
    }

    /// Box-and-cylinder stand-in, base on `y = 0` and centered on the Y axis
    fn placeholder_geometry(&self) -> GeometryData;

    fn placeholder_model(&self) -> Model {
        Model::from_geometry(&self.placeholder_geometry()).normalize_to_height(self.target_height())
    }
}

pub fn create(kind: FurnitureKind) -> Box<dyn Furniture> {
    match kind {
        FurnitureKind::Chair => Box::new(Chair),
        FurnitureKind::Table => Box::new(Table),
        FurnitureKind::Sofa => Box::new(Sofa),
        FurnitureKind::Bed => Box::new(Bed),
        FurnitureKind::Lamp => Box::new(Lamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_returns_matching_kind() {
        for kind in FurnitureKind::ALL {
            assert_eq!(create(kind).kind(), kind);
        }
    }

    #[test]
    fn placeholders_match_footprint_and_height() {
        for kind in FurnitureKind::ALL {
            let furniture = create(kind);
            let bounds = furniture.placeholder_model().local_bounds();
            let size = bounds.size();
            let (width, depth) = furniture.footprint();

            assert!((size.x - width).abs() < 1e-3, "{kind} width {}", size.x);
            assert!((size.z - depth).abs() < 1e-3, "{kind} depth {}", size.z);
            assert!((size.y - furniture.target_height()).abs() < 1e-3, "{kind} height {}", size.y);
            assert!(bounds.min.y.abs() < 1e-4, "{kind} must rest on the floor");
        }
    }

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!("Sofa".parse::<FurnitureKind>(), Ok(FurnitureKind::Sofa));
        assert_eq!(" lamp ".parse::<FurnitureKind>(), Ok(FurnitureKind::Lamp));
        assert!("wardrobe".parse::<FurnitureKind>().is_err());
    }

    #[test]
    fn asset_file_uses_slug() {
        assert_eq!(create(FurnitureKind::Bed).asset_file(), "bed.obj");
    }
}
