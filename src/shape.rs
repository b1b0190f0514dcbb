use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::mesh::Mesh;

/// The primitive shapes the editor can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Box,
    Capsule,
    Circle,
    Cone,
    Cylinder,
    Dodecahedron,
    Icosahedron,
    Lathe,
    Octahedron,
    Ring,
    Sphere,
    Tetrahedron,
    Torus,
    TorusKnot,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shape '{0}'")]
pub struct UnknownShape(pub String);

impl ShapeKind {
    pub const ALL: [ShapeKind; 14] = [
        ShapeKind::Box,
        ShapeKind::Capsule,
        ShapeKind::Circle,
        ShapeKind::Cone,
        ShapeKind::Cylinder,
        ShapeKind::Dodecahedron,
        ShapeKind::Icosahedron,
        ShapeKind::Lathe,
        ShapeKind::Octahedron,
        ShapeKind::Ring,
        ShapeKind::Sphere,
        ShapeKind::Tetrahedron,
        ShapeKind::Torus,
        ShapeKind::TorusKnot,
    ];

    /// Stable key, as offered by the shape selector.
    pub fn key(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Capsule => "capsule",
            ShapeKind::Circle => "circle",
            ShapeKind::Cone => "cone",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Dodecahedron => "dodecahedron",
            ShapeKind::Icosahedron => "icosahedron",
            ShapeKind::Lathe => "lathe",
            ShapeKind::Octahedron => "octahedron",
            ShapeKind::Ring => "ring",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Tetrahedron => "tetrahedron",
            ShapeKind::Torus => "torus",
            ShapeKind::TorusKnot => "torus-knot",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Box => "Box",
            ShapeKind::Capsule => "Capsule",
            ShapeKind::Circle => "Circle",
            ShapeKind::Cone => "Cone",
            ShapeKind::Cylinder => "Cylinder",
            ShapeKind::Dodecahedron => "Dodecahedron",
            ShapeKind::Icosahedron => "Icosahedron",
            ShapeKind::Lathe => "Lathe",
            ShapeKind::Octahedron => "Octahedron",
            ShapeKind::Ring => "Ring",
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Tetrahedron => "Tetrahedron",
            ShapeKind::Torus => "Torus",
            ShapeKind::TorusKnot => "Torus knot",
        }
    }

    /// Builds the geometry with the default dimensions for this kind.
    pub fn build_mesh(self) -> Mesh {
        match self {
            ShapeKind::Box => Mesh::cube(1.0),
            ShapeKind::Capsule => Mesh::capsule(1.0, 1.0, 4, 8),
            ShapeKind::Circle => Mesh::circle(1.0, 32),
            ShapeKind::Cone => Mesh::cone(1.0, 1.0, 32),
            ShapeKind::Cylinder => Mesh::cylinder(1.0, 1.0, 1.0, 32),
            ShapeKind::Dodecahedron => Mesh::dodecahedron(1.0),
            ShapeKind::Icosahedron => Mesh::icosahedron(1.0),
            ShapeKind::Lathe => Mesh::lathe(&crate::mesh::DEFAULT_LATHE_PROFILE, 12),
            ShapeKind::Octahedron => Mesh::octahedron(1.0),
            ShapeKind::Ring => Mesh::ring(0.5, 1.0, 32, 1),
            ShapeKind::Sphere => Mesh::sphere(1.0, 32, 16),
            ShapeKind::Tetrahedron => Mesh::tetrahedron(1.0),
            ShapeKind::Torus => Mesh::torus(1.0, 0.4, 12, 48),
            ShapeKind::TorusKnot => Mesh::torus_knot(1.0, 0.4, 64, 8, 2, 3),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ShapeKind {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL.iter().copied().find(|kind| kind.key() == s).ok_or_else(|| UnknownShape(s.to_string()))
    }
}
