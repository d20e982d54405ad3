//! Table-driven rules for the heuristic damage extractor
//!
//! Keyword vocabularies, per-disaster defaults, and record templates live
//! here so the extraction logic stays a pure lookup over data.

use crate::model::{BoundingRegion, DamageRecord, DisasterType};

/// Fixed vocabulary of recognizable affected-area names, tested by
/// case-insensitive substring membership, in this discovery order
pub const AREA_VOCABULARY: &[&str] = &[
    "buildings",
    "roads",
    "bridges",
    "vegetation",
    "residential",
    "commercial",
    "infrastructure",
    "agricultural",
    "waterways",
    "power lines",
];

/// Confidence assigned to records emitted from keyword presence alone
pub const KEYWORD_CONFIDENCE: f32 = 0.5;

/// Default affected areas per disaster type, used to pad sparse extractions
pub fn default_areas(disaster_type: DisasterType) -> &'static [&'static str] {
    match disaster_type {
        DisasterType::Hurricane => &["buildings", "roads", "power lines"],
        DisasterType::Flood => &["residential", "roads", "waterways"],
        DisasterType::Earthquake => &["buildings", "bridges", "infrastructure"],
        DisasterType::Wildfire => &["vegetation", "residential", "agricultural"],
        DisasterType::Tornado => &["buildings", "power lines", "vegetation"],
        DisasterType::Landslide => &["roads", "residential", "infrastructure"],
    }
}

/// Default recommendations per disaster type, used when the narrative
/// yields fewer than three
pub fn default_recommendations(disaster_type: DisasterType) -> &'static [&'static str] {
    match disaster_type {
        DisasterType::Hurricane => &[
            "Inspect roofs and building envelopes for wind damage",
            "Check for water intrusion through damaged roofs and windows",
            "Assess trees and overhead hazards around structures",
        ],
        DisasterType::Flood => &[
            "Assess water contamination levels before reoccupation",
            "Check electrical systems for water damage before restoring power",
            "Monitor for mold growth in affected structures",
        ],
        DisasterType::Earthquake => &[
            "Inspect for structural damage, particularly to load-bearing walls",
            "Check for gas leaks and damaged utility lines",
            "Monitor for aftershock impacts to already-damaged structures",
        ],
        DisasterType::Wildfire => &[
            "Evaluate structural integrity of fire-damaged buildings",
            "Assess soil erosion risk in burned areas",
            "Implement erosion control measures before rainy season",
        ],
        DisasterType::Tornado => &[
            "Survey the damage path for structural failures",
            "Clear debris from access routes and utility corridors",
            "Inspect remaining structures for compromised roofs",
        ],
        DisasterType::Landslide => &[
            "Monitor slope stability for continuing movement",
            "Assess drainage patterns that may contribute to further slides",
            "Evaluate neighboring areas for similar risk factors",
        ],
    }
}

/// One template for a representative damage record
pub struct RecordTemplate {
    pub label: &'static str,
    pub confidence: f32,
    pub region: BoundingRegion,
    pub note: Option<&'static str>,
}

impl RecordTemplate {
    pub fn instantiate(&self, id: u32) -> DamageRecord {
        DamageRecord {
            id,
            region: self.region.clone(),
            label: self.label.to_string(),
            confidence: self.confidence,
            note: self.note.map(str::to_string),
        }
    }
}

/// Keyword set that, when present in the narrative, emits the listed
/// representative records. Regions are illustrative, not authoritative.
pub struct RecordRule {
    pub keywords: &'static [&'static str],
    pub templates: &'static [RecordTemplate],
}

pub const BUILDING_RULE: RecordRule = RecordRule {
    keywords: &["collapsed building", "building damage", "structural damage"],
    templates: &[
        RecordTemplate {
            label: "severe",
            confidence: 0.85,
            region: BoundingRegion::new(120, 80, 160, 140),
            note: Some("Collapsed or heavily damaged structure"),
        },
        RecordTemplate {
            label: "moderate",
            confidence: 0.72,
            region: BoundingRegion::new(300, 150, 120, 100),
            note: None,
        },
    ],
};

pub const ROAD_RULE: RecordRule = RecordRule {
    keywords: &["road damage", "damaged road", "impassable"],
    templates: &[RecordTemplate {
        label: "blocked",
        confidence: 0.78,
        region: BoundingRegion::new(40, 260, 320, 60),
        note: Some("Obstructed or damaged roadway"),
    }],
};

pub const FLOOD_RULE: RecordRule = RecordRule {
    keywords: &["flood", "submerged", "inundat"],
    templates: &[
        RecordTemplate {
            label: "submerged",
            confidence: 0.8,
            region: BoundingRegion::new(0, 220, 400, 180),
            note: Some("Standing water coverage"),
        },
        RecordTemplate {
            label: "partial",
            confidence: 0.65,
            region: BoundingRegion::new(180, 120, 140, 90),
            note: None,
        },
    ],
};

pub const VEGETATION_RULE: RecordRule = RecordRule {
    keywords: &["vegetation", "forest", "trees"],
    templates: &[RecordTemplate {
        label: "loss",
        confidence: 0.7,
        region: BoundingRegion::new(220, 40, 170, 130),
        note: Some("Vegetation cover change"),
    }],
};

/// Emitted when no building keyword matches, so the report always carries
/// at least one building record
pub const BUILDING_FALLBACK: RecordTemplate = RecordTemplate {
    label: "minor",
    confidence: KEYWORD_CONFIDENCE,
    region: BoundingRegion::new(150, 100, 100, 80),
    note: Some("No explicit building damage described"),
};
