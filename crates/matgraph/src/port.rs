// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin types, pin directions and the connection compatibility matrix.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Input pin
    In,
    /// Output pin
    Out,
}

/// Data type that can flow through a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinType {
    /// Scalar value
    Float,
    /// 2D vector
    Float2,
    /// 3D vector / RGB color
    Float3,
    /// 4D vector / RGBA color
    Float4,
    /// Boolean switch
    Bool,
    /// Opaque texture reference
    Texture,
    /// Full material attribute set
    MaterialAttributes,
    /// Substrate BSDF data
    Substrate,
    /// Accepts and feeds any type (generic math pins)
    Wildcard,
}

impl PinType {
    /// Every registered pin type
    pub const ALL: [PinType; 9] = [
        Self::Float,
        Self::Float2,
        Self::Float3,
        Self::Float4,
        Self::Bool,
        Self::Texture,
        Self::MaterialAttributes,
        Self::Substrate,
        Self::Wildcard,
    ];

    /// Canonical lower-case name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Bool => "bool",
            Self::Texture => "texture",
            Self::MaterialAttributes => "materialattributes",
            Self::Substrate => "substrate",
            Self::Wildcard => "wildcard",
        }
    }

    /// Number of numeric components, 0 for opaque/reference types
    pub fn component_count(&self) -> usize {
        match self {
            Self::Float | Self::Bool => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
            Self::Texture | Self::MaterialAttributes | Self::Substrate | Self::Wildcard => 0,
        }
    }

    /// Whether this is a member of the float/floatN family
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float | Self::Float2 | Self::Float3 | Self::Float4)
    }

    /// Get the color for this pin type (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Float => [80, 200, 80],
            Self::Float2 => [200, 200, 80],
            Self::Float3 => [200, 150, 80],
            Self::Float4 => [200, 100, 200],
            Self::Bool => [200, 80, 80],
            Self::Texture => [100, 150, 200],
            Self::MaterialAttributes => [200, 100, 150],
            Self::Substrate => [120, 220, 220],
            Self::Wildcard => [150, 150, 150],
        }
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown pin type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown pin type: {0}")]
pub struct UnknownPinType(pub String);

impl FromStr for PinType {
    type Err = UnknownPinType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_type_name(s);
        PinType::ALL
            .into_iter()
            .find(|t| t.name() == normalized)
            .ok_or(UnknownPinType(normalized))
    }
}

/// Normalize a type name for matching
pub fn normalize_type_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Directed compatibility relation: target type -> set of source types allowed to feed it.
#[derive(Debug, Clone)]
pub struct CompatibilityMatrix {
    sources: IndexMap<PinType, IndexSet<PinType>>,
}

impl CompatibilityMatrix {
    /// Create a matrix in which every type accepts only itself
    pub fn reflexive() -> Self {
        let sources = PinType::ALL
            .into_iter()
            .map(|t| (t, IndexSet::from([t])))
            .collect();
        Self { sources }
    }

    /// The standard material matrix
    pub fn standard() -> Self {
        let mut matrix = Self::reflexive();

        // Scalar broadcasts into every vector of the family
        for vector in [PinType::Float2, PinType::Float3, PinType::Float4] {
            matrix.allow(PinType::Float, vector);
        }

        // Wildcard is a universal sink and source
        for t in PinType::ALL {
            matrix.allow(t, PinType::Wildcard);
            matrix.allow(PinType::Wildcard, t);
        }

        matrix
    }

    /// Allow `source` to feed `target`
    pub fn allow(&mut self, source: PinType, target: PinType) {
        self.sources.entry(target).or_default().insert(source);
    }

    /// Sources declared for a target type
    pub fn sources_for(&self, target: PinType) -> impl Iterator<Item = PinType> + '_ {
        self.sources.get(&target).into_iter().flat_map(|s| s.iter().copied())
    }

    /// Whether `target`'s declared source set contains `source`
    pub fn declares(&self, target: PinType, source: PinType) -> bool {
        self.sources.get(&target).is_some_and(|s| s.contains(&source))
    }

    /// Check whether a `source` output can feed a `target` input.
    ///
    /// Same types always connect. A numeric vector never feeds a narrower
    /// numeric type. Otherwise the table is consulted in both directions.
    pub fn can_connect(&self, source: PinType, target: PinType) -> bool {
        if source == target {
            return true;
        }

        if source.is_numeric()
            && target.is_numeric()
            && source.component_count() > target.component_count()
        {
            return false;
        }

        self.declares(target, source) || self.declares(source, target)
    }

    /// Name-based variant of [`Self::can_connect`]; unknown names only match themselves
    pub fn can_connect_names(&self, source: &str, target: &str) -> bool {
        match (source.parse::<PinType>(), target.parse::<PinType>()) {
            (Ok(s), Ok(t)) => self.can_connect(s, t),
            _ => normalize_type_name(source) == normalize_type_name(target),
        }
    }

    /// Check a connection between two pins, rejecting same-direction pairs first
    pub fn can_connect_pins(
        &self,
        a: (PinDirection, PinType),
        b: (PinDirection, PinType),
    ) -> bool {
        if a.0 == b.0 {
            return false;
        }
        let (source, target) = if a.0 == PinDirection::Out { (a.1, b.1) } else { (b.1, a.1) };
        self.can_connect(source, target)
    }
}

impl Default for CompatibilityMatrix {
    fn default() -> Self {
        Self::standard()
    }
}
