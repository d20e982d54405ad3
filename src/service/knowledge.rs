//! Static knowledge base: built-in disaster assessment documents,
//! pre-embedded at process start

use std::sync::Arc;

use crate::model::{DisasterType, KnowledgeDoc, KnowledgeEntry, KnowledgeMetadata, Language};
use crate::service::embedding::Embedder;

const BUILTIN_SOURCE: &str = "builtin";

struct BuiltinDoc {
    title: &'static str,
    content: &'static str,
    disaster_type: Option<DisasterType>,
    region: Option<&'static str>,
    language: Language,
}

const BUILTIN_DOCS: &[BuiltinDoc] = &[
    BuiltinDoc {
        title: "Flood damage assessment",
        content: "When assessing flood damage, look for water lines on buildings, debris accumulation, and structural damage. Key metrics include water depth, duration, flow velocity, and affected area size. Satellite imagery comparison can help determine the extent of inundation.",
        disaster_type: Some(DisasterType::Flood),
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "Wildfire burn severity",
        content: "Wildfire assessment involves mapping burn severity, vegetation loss, and structural damage. Imagery can identify areas with complete, partial, or minimal vegetation loss. Soil erosion risk and regrowth potential guide recovery prioritization.",
        disaster_type: Some(DisasterType::Wildfire),
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "Earthquake structural screening",
        content: "Earthquake damage assessment evaluates structural integrity using rapid visual screening. Buildings are categorized as safe, restricted use, or unsafe. Document structural failures, ground displacement, infrastructure damage, and secondary hazards such as landslides or fires.",
        disaster_type: Some(DisasterType::Earthquake),
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "Hurricane impact evaluation",
        content: "Hurricane assessment documents wind damage, flooding, storm surge impacts, and infrastructure disruption. Compare pre and post event imagery to identify affected structures, vegetation loss, and coastal erosion. Categorize damage from wind, flooding, and surge separately.",
        disaster_type: Some(DisasterType::Hurricane),
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "Tornado damage survey",
        content: "Tornado surveys trace the damage path to estimate intensity. Roof loss, wall collapse, and debris fields indicate wind speeds. Narrow, elongated damage corridors distinguish tornado impact from straight-line wind events.",
        disaster_type: Some(DisasterType::Tornado),
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "Landslide stability monitoring",
        content: "Landslide assessment monitors slope stability for continuing movement, documents displaced material volume, and evaluates drainage patterns that may contribute to further slides. Neighboring slopes with similar risk factors deserve inspection.",
        disaster_type: Some(DisasterType::Landslide),
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "Assessment phases",
        content: "Disaster assessment typically follows three phases: initial assessment within 24 to 48 hours, detailed assessment over one to two weeks, and ongoing recovery assessment. Each phase requires different data collection methods.",
        disaster_type: None,
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "Remote sensing methods",
        content: "Key disaster assessment methods include remote sensing with satellite or aerial imagery, field surveys, social media analysis, and community reporting. Modern workflows combine field surveys with automated image comparison of pre and post disaster conditions.",
        disaster_type: None,
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "Recovery planning",
        content: "Disaster recovery planning begins with a detailed damage assessment, followed by prioritization of critical infrastructure, housing needs, and environmental restoration. The build back better approach focuses on resilience and reducing future vulnerability.",
        disaster_type: None,
        region: None,
        language: Language::English,
    },
    BuiltinDoc {
        title: "बाढ़ क्षति आकलन",
        content: "बाढ़ क्षति का आकलन करते समय इमारतों पर पानी के निशान, मलबे का जमाव और संरचनात्मक क्षति देखें। पानी की गहराई, अवधि और प्रभावित क्षेत्र का आकार मुख्य मापदंड हैं।",
        disaster_type: Some(DisasterType::Flood),
        region: Some("south-asia"),
        language: Language::Hindi,
    },
    BuiltinDoc {
        title: "भूकंप क्षति निरीक्षण",
        content: "भूकंप के बाद इमारतों की संरचनात्मक अखंडता की जांच करें। इमारतों को सुरक्षित, सीमित उपयोग या असुरक्षित श्रेणियों में वर्गीकृत किया जाता है। भूस्खलन जैसे द्वितीयक खतरों का भी दस्तावेजीकरण करें।",
        disaster_type: Some(DisasterType::Earthquake),
        region: Some("south-asia"),
        language: Language::Hindi,
    },
    BuiltinDoc {
        title: "मानसून तैयारी",
        content: "मानसून के मौसम में बाढ़ और भूस्खलन की संभावना बढ़ जाती है। जल निकासी व्यवस्था की जांच, चेतावनी प्रणाली और निकासी मार्गों की योजना पहले से तैयार रखें।",
        disaster_type: None,
        region: Some("south-asia"),
        language: Language::Hindi,
    },
];

/// Fixed set of pre-embedded domain documents, loaded once at process start
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Build the knowledge base from the built-in documents plus any
    /// supplemental documents from the config file
    pub fn load(embedder: &Arc<dyn Embedder>, extra: &[KnowledgeDoc]) -> Self {
        let mut entries = Vec::with_capacity(BUILTIN_DOCS.len() + extra.len());

        for doc in BUILTIN_DOCS {
            let id = entries.len() as u32;
            entries.push(KnowledgeEntry {
                id,
                content: doc.content.to_string(),
                embedding: embedder.embed(doc.content),
                metadata: KnowledgeMetadata {
                    title: doc.title.to_string(),
                    source: BUILTIN_SOURCE.to_string(),
                    disaster_type: doc.disaster_type,
                    region: doc.region.map(str::to_string),
                    language: doc.language,
                },
            });
        }

        for doc in extra {
            let id = entries.len() as u32;
            entries.push(KnowledgeEntry {
                id,
                content: doc.content.clone(),
                embedding: embedder.embed(&doc.content),
                metadata: KnowledgeMetadata {
                    title: doc.title.clone(),
                    source: doc
                        .source
                        .clone()
                        .unwrap_or_else(|| "config".to_string()),
                    disaster_type: doc.disaster_type.as_deref().and_then(parse_disaster_type),
                    region: doc.region.clone(),
                    language: match doc.language.as_deref() {
                        Some("hindi") | Some("hi") => Language::Hindi,
                        _ => Language::English,
                    },
                },
            });
        }

        tracing::info!(entries = entries.len(), "Knowledge base loaded");
        Self { entries }
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_disaster_type(s: &str) -> Option<DisasterType> {
    match s {
        "hurricane" => Some(DisasterType::Hurricane),
        "flood" => Some(DisasterType::Flood),
        "earthquake" => Some(DisasterType::Earthquake),
        "wildfire" => Some(DisasterType::Wildfire),
        "tornado" => Some(DisasterType::Tornado),
        "landslide" => Some(DisasterType::Landslide),
        _ => None,
    }
}
