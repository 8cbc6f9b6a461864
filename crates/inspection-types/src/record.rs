//! Inspection records for a single rack defect

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidRecord;

/// Maximum number of photos attached to one record
pub const MAX_PHOTOS: usize = 3;

/// Defect urgency, ordered from harmless to critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Ok, Severity::Warning, Severity::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = InvalidRecord;

    /// Accepts the canonical names as well as the traffic-light labels used
    /// on the inspection form (green / yellow / red, also in German).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ok" | "green" | "grün" | "gruen" => Ok(Severity::Ok),
            "warning" | "yellow" | "amber" | "gelb" => Ok(Severity::Warning),
            "critical" | "red" | "rot" => Ok(Severity::Critical),
            _ => Err(InvalidRecord::UnknownSeverity(s.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = InvalidRecord;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

/// Rack component a defect was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Component {
    Upright,
    Beam,
    Guard,
    Bracing,
    Shelf,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::Upright,
        Component::Beam,
        Component::Guard,
        Component::Bracing,
        Component::Shelf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Upright => "upright",
            Component::Beam => "beam",
            Component::Guard => "guard",
            Component::Bracing => "bracing",
            Component::Shelf => "shelf",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = InvalidRecord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upright" | "post" | "stütze" | "stuetze" => Ok(Component::Upright),
            "beam" | "traverse" => Ok(Component::Beam),
            "guard" | "rammschutz" => Ok(Component::Guard),
            "bracing" | "aussteifung" => Ok(Component::Bracing),
            "shelf" | "fachboden" => Ok(Component::Shelf),
            _ => Err(InvalidRecord::UnknownComponent(s.to_string())),
        }
    }
}

impl TryFrom<String> for Component {
    type Error = InvalidRecord;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Component> for String {
    fn from(component: Component) -> Self {
        component.as_str().to_string()
    }
}

/// Preset defect categories offered by the inspection form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectCategory {
    ForkliftImpact,
    MissingSafetyPin,
    LooseFloorAnchor,
    Overload,
    Other,
}

impl DefectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectCategory::ForkliftImpact => "Forklift impact",
            DefectCategory::MissingSafetyPin => "Safety pin missing",
            DefectCategory::LooseFloorAnchor => "Floor anchor loose",
            DefectCategory::Overload => "Overload",
            DefectCategory::Other => "Other",
        }
    }

    /// Category plus the inspector's free-text comment
    pub fn describe(&self, comment: &str) -> String {
        let comment = comment.trim();
        if comment.is_empty() {
            self.as_str().to_string()
        } else {
            format!("{}: {}", self.as_str(), comment)
        }
    }
}

impl fmt::Display for DefectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preset remedies offered by the inspection form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remedy {
    Monitor,
    ReplaceWithinFourWeeks,
    LockImmediately,
    ReplacePin,
}

impl Remedy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Remedy::Monitor => "Monitor",
            Remedy::ReplaceWithinFourWeeks => "Replace within 4 weeks",
            Remedy::LockImmediately => "LOCK IMMEDIATELY",
            Remedy::ReplacePin => "Replace pin",
        }
    }
}

impl fmt::Display for Remedy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a photo, resolved to image bytes at render time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoRef {
    /// File on the local filesystem
    Path(PathBuf),
    /// Encoded image already held in memory (base64 in JSON)
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl PhotoRef {
    /// Short description for log lines
    pub fn label(&self) -> String {
        match self {
            PhotoRef::Path(path) => path.display().to_string(),
            PhotoRef::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for PhotoRef {
    fn from(path: PathBuf) -> Self {
        PhotoRef::Path(path)
    }
}

impl From<Vec<u8>> for PhotoRef {
    fn from(bytes: Vec<u8>) -> Self {
        PhotoRef::Bytes(bytes)
    }
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Unvalidated form state for one record
///
/// Severity and component are kept as the raw form values; they are parsed
/// when the draft is turned into an [`InspectionRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub rack_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack_type: Option<String>,
    pub component: String,
    pub position: String,
    pub severity: String,
    pub defect_description: String,
    pub remedy: String,
    pub photos: Vec<PhotoRef>,
}

impl RecordDraft {
    pub fn new(rack_id: impl Into<String>, component: Component, severity: Severity) -> Self {
        Self {
            rack_id: rack_id.into(),
            component: component.into(),
            severity: severity.into(),
            ..Self::default()
        }
    }

    pub fn with_rack_type(mut self, rack_type: impl Into<String>) -> Self {
        self.rack_type = Some(rack_type.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_defect(mut self, description: impl Into<String>) -> Self {
        self.defect_description = description.into();
        self
    }

    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remedy = remedy.into();
        self
    }

    pub fn with_photo(mut self, photo: impl Into<PhotoRef>) -> Self {
        self.photos.push(photo.into());
        self
    }

    /// Validate the draft
    pub fn build(self) -> Result<InspectionRecord, InvalidRecord> {
        InspectionRecord::try_from(self)
    }
}

/// A validated defect entry; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordDraft", into = "RecordDraft")]
pub struct InspectionRecord {
    rack_id: String,
    rack_type: Option<String>,
    component: Component,
    position: String,
    severity: Severity,
    defect_description: String,
    remedy: String,
    photos: Vec<PhotoRef>,
}

impl InspectionRecord {
    pub fn rack_id(&self) -> &str {
        &self.rack_id
    }

    pub fn rack_type(&self) -> Option<&str> {
        self.rack_type.as_deref()
    }

    pub fn component(&self) -> Component {
        self.component
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn defect_description(&self) -> &str {
        &self.defect_description
    }

    pub fn remedy(&self) -> &str {
        &self.remedy
    }

    pub fn photos(&self) -> &[PhotoRef] {
        &self.photos
    }
}

impl TryFrom<RecordDraft> for InspectionRecord {
    type Error = InvalidRecord;

    fn try_from(draft: RecordDraft) -> Result<Self, Self::Error> {
        let rack_id = draft.rack_id.trim();
        if rack_id.is_empty() {
            return Err(InvalidRecord::MissingRackId);
        }
        if draft.photos.len() > MAX_PHOTOS {
            return Err(InvalidRecord::TooManyPhotos {
                count: draft.photos.len(),
                max: MAX_PHOTOS,
            });
        }
        let severity = draft.severity.parse()?;
        let component = draft.component.parse()?;
        let rack_type = draft
            .rack_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            rack_id: rack_id.to_string(),
            rack_type,
            component,
            position: draft.position,
            severity,
            defect_description: draft.defect_description,
            remedy: draft.remedy,
            photos: draft.photos,
        })
    }
}

impl From<InspectionRecord> for RecordDraft {
    fn from(record: InspectionRecord) -> Self {
        Self {
            rack_id: record.rack_id,
            rack_type: record.rack_type,
            component: record.component.into(),
            position: record.position,
            severity: record.severity.into(),
            defect_description: record.defect_description,
            remedy: record.remedy,
            photos: record.photos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft() -> RecordDraft {
        RecordDraft::new("R-22", Component::Upright, Severity::Critical)
            .with_position("front right post")
            .with_defect(DefectCategory::ForkliftImpact.describe("dent > 5mm"))
            .with_remedy(Remedy::LockImmediately.to_string())
    }

    #[test]
    fn test_build_valid_record() {
        let record = draft().build().unwrap();
        assert_eq!(record.rack_id(), "R-22");
        assert_eq!(record.component(), Component::Upright);
        assert_eq!(record.severity(), Severity::Critical);
        assert_eq!(record.defect_description(), "Forklift impact: dent > 5mm");
        assert_eq!(record.remedy(), "LOCK IMMEDIATELY");
        assert!(record.photos().is_empty());
    }

    #[test]
    fn test_missing_rack_id_rejected() {
        let mut d = draft();
        d.rack_id = "   ".to_string();
        assert_eq!(d.build().unwrap_err(), InvalidRecord::MissingRackId);
    }

    #[test]
    fn test_rack_id_is_trimmed() {
        let mut d = draft();
        d.rack_id = "  R-7 ".to_string();
        assert_eq!(d.build().unwrap().rack_id(), "R-7");
    }

    #[test]
    fn test_too_many_photos_rejected() {
        let d = draft()
            .with_photo(vec![1u8])
            .with_photo(vec![2u8])
            .with_photo(vec![3u8])
            .with_photo(vec![4u8]);
        assert_eq!(
            d.build().unwrap_err(),
            InvalidRecord::TooManyPhotos { count: 4, max: 3 }
        );
    }

    #[test]
    fn test_three_photos_accepted() {
        let d = draft()
            .with_photo(PathBuf::from("a.jpg"))
            .with_photo(PathBuf::from("b.jpg"))
            .with_photo(vec![0xFFu8, 0xD8]);
        assert_eq!(d.build().unwrap().photos().len(), 3);
    }

    #[test]
    fn test_unknown_severity_fails_closed() {
        let mut d = draft();
        d.severity = "purple".to_string();
        assert_eq!(
            d.build().unwrap_err(),
            InvalidRecord::UnknownSeverity("purple".to_string())
        );
    }

    #[test]
    fn test_unknown_component_rejected() {
        let mut d = draft();
        d.component = "roof".to_string();
        assert!(matches!(
            d.build(),
            Err(InvalidRecord::UnknownComponent(_))
        ));
    }

    #[test]
    fn test_severity_accepts_form_labels() {
        assert_eq!("Grün".parse::<Severity>().unwrap(), Severity::Ok);
        assert_eq!("Gelb".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("ROT".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
    }

    #[test]
    fn test_severity_is_ordered() {
        assert!(Severity::Ok < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn test_component_accepts_german_labels() {
        assert_eq!("Stütze".parse::<Component>().unwrap(), Component::Upright);
        assert_eq!("Traverse".parse::<Component>().unwrap(), Component::Beam);
        assert_eq!("Rammschutz".parse::<Component>().unwrap(), Component::Guard);
        assert_eq!(
            "Aussteifung".parse::<Component>().unwrap(),
            Component::Bracing
        );
    }

    #[test]
    fn test_empty_rack_type_becomes_none() {
        let d = draft().with_rack_type("  ");
        assert_eq!(d.build().unwrap().rack_type(), None);
        let d = draft().with_rack_type("cantilever rack");
        assert_eq!(d.build().unwrap().rack_type(), Some("cantilever rack"));
    }

    #[test]
    fn test_defect_category_without_comment() {
        assert_eq!(DefectCategory::Overload.describe("  "), "Overload");
    }

    #[test]
    fn test_deserialize_validates_record() {
        let json = r#"{"rack_id":"","component":"beam","severity":"OK"}"#;
        let result: Result<InspectionRecord, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let json = r#"{"rack_id":"R-1","component":"beam","severity":"BLUE"}"#;
        let result: Result<InspectionRecord, _> = serde_json::from_str(json);
        assert!(result.unwrap_err().to_string().contains("Unknown severity"));
    }

    #[test]
    fn test_deserialize_record_with_photos() {
        let json = r#"{
            "rack_id": "R-3",
            "component": "Traverse",
            "severity": "Gelb",
            "photos": [{"path": "/tmp/a.jpg"}, {"bytes": "AQID"}]
        }"#;
        let record: InspectionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.component(), Component::Beam);
        assert_eq!(record.severity(), Severity::Warning);
        assert_eq!(
            record.photos(),
            &[
                PhotoRef::Path(PathBuf::from("/tmp/a.jpg")),
                PhotoRef::Bytes(vec![1, 2, 3]),
            ]
        );
    }

    #[test]
    fn test_serialize_uses_canonical_names() {
        let record = draft().build().unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["severity"], "CRITICAL");
        assert_eq!(value["component"], "upright");
    }

    #[test]
    fn test_photo_label() {
        assert_eq!(PhotoRef::Bytes(vec![0; 12]).label(), "<12 bytes>");
        assert_eq!(PhotoRef::Path(PathBuf::from("x.png")).label(), "x.png");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn severity_strategy() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Ok),
            Just(Severity::Warning),
            Just(Severity::Critical),
        ]
    }

    proptest! {
        /// Property: canonical names parse back to the same severity
        #[test]
        fn severity_display_parses_back(severity in severity_strategy()) {
            prop_assert_eq!(severity.to_string().parse::<Severity>().unwrap(), severity);
        }

        /// Property: anything outside the known labels is rejected
        #[test]
        fn unknown_severity_never_defaults(s in "[a-z]{1,12}") {
            let known = [
                "ok", "green", "gruen", "warning", "yellow", "amber", "gelb",
                "critical", "red", "rot",
            ];
            let parsed = s.parse::<Severity>();
            if known.contains(&s.as_str()) {
                prop_assert!(parsed.is_ok());
            } else {
                prop_assert_eq!(parsed, Err(InvalidRecord::UnknownSeverity(s.clone())));
            }
        }

        /// Property: any non-blank rack id with <= 3 photos builds
        #[test]
        fn valid_drafts_build(
            rack_id in "[A-Z]-[0-9]{1,4}",
            photo_count in 0usize..=3,
            severity in severity_strategy(),
        ) {
            let mut d = RecordDraft::new(rack_id.clone(), Component::Beam, severity);
            for i in 0..photo_count {
                d = d.with_photo(vec![i as u8]);
            }
            let record = d.build().unwrap();
            prop_assert_eq!(record.rack_id(), rack_id.as_str());
            prop_assert_eq!(record.photos().len(), photo_count);
        }

        /// Property: JSON roundtrip keeps validated records intact
        #[test]
        fn json_roundtrip(
            rack_id in "[A-Z]-[0-9]{1,4}",
            position in "[a-z ]{0,20}",
            severity in severity_strategy(),
        ) {
            let record = RecordDraft::new(rack_id, Component::Shelf, severity)
                .with_position(position)
                .with_photo(vec![9u8, 8, 7])
                .build()
                .unwrap();
            let json = serde_json::to_string(&record).unwrap();
            let restored: InspectionRecord = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(restored, record);
        }
    }
}
