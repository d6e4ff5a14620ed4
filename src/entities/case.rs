//! Case entity type

use serde::{Deserialize, Serialize};

use crate::core::dates::DisplayDate;
use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::Stage;
use crate::entities::report::Report;
use crate::storage::Collection;

/// Workflow stage of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStage {
    #[default]
    Investigation,
    Prosecution,
    Trial,
    Completed,
    Discontinued,
    TemporarilySuspended,
    Transferred,
}

impl CaseStage {
    pub fn label(&self) -> &'static str {
        match self {
            CaseStage::Investigation => "Investigation",
            CaseStage::Prosecution => "Prosecution",
            CaseStage::Trial => "Trial",
            CaseStage::Completed => "Completed",
            CaseStage::Discontinued => "Discontinued",
            CaseStage::TemporarilySuspended => "Temporarily suspended",
            CaseStage::Transferred => "Transferred",
        }
    }
}

impl std::fmt::Display for CaseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStage::Investigation => write!(f, "investigation"),
            CaseStage::Prosecution => write!(f, "prosecution"),
            CaseStage::Trial => write!(f, "trial"),
            CaseStage::Completed => write!(f, "completed"),
            CaseStage::Discontinued => write!(f, "discontinued"),
            CaseStage::TemporarilySuspended => write!(f, "suspended"),
            CaseStage::Transferred => write!(f, "transferred"),
        }
    }
}

impl std::str::FromStr for CaseStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "investigation" => Ok(CaseStage::Investigation),
            "prosecution" => Ok(CaseStage::Prosecution),
            "trial" => Ok(CaseStage::Trial),
            "completed" => Ok(CaseStage::Completed),
            "discontinued" => Ok(CaseStage::Discontinued),
            "suspended" | "temporarily_suspended" => Ok(CaseStage::TemporarilySuspended),
            "transferred" => Ok(CaseStage::Transferred),
            _ => Err(format!("Unknown case stage: {}", s)),
        }
    }
}

/// Preventive measure applied to a defendant
///
/// The detention deadline lives inside `Detained`, so releasing a defendant
/// always drops the deadline with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "preventive_measure", rename_all = "snake_case")]
pub enum PreventiveMeasure {
    #[default]
    AtLarge,
    Detained { detention_deadline: DisplayDate },
}

impl PreventiveMeasure {
    pub fn detention_deadline(&self) -> Option<DisplayDate> {
        match self {
            PreventiveMeasure::AtLarge => None,
            PreventiveMeasure::Detained { detention_deadline } => Some(*detention_deadline),
        }
    }

    pub fn is_detained(&self) -> bool {
        matches!(self, PreventiveMeasure::Detained { .. })
    }
}

impl std::fmt::Display for PreventiveMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreventiveMeasure::AtLarge => write!(f, "at large"),
            PreventiveMeasure::Detained { detention_deadline } => {
                write!(f, "detained until {}", detention_deadline)
            }
        }
    }
}

/// A defendant within a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defendant {
    pub id: EntityId,

    pub name: String,

    #[serde(default)]
    pub charges: String,

    #[serde(flatten)]
    pub measure: PreventiveMeasure,
}

impl Defendant {
    /// Release the defendant; any detention deadline is discarded
    pub fn set_at_large(&mut self) {
        self.measure = PreventiveMeasure::AtLarge;
    }

    /// Detain the defendant until `deadline`
    pub fn detain(&mut self, deadline: DisplayDate) {
        self.measure = PreventiveMeasure::Detained {
            detention_deadline: deadline,
        };
    }

    pub fn detention_deadline(&self) -> Option<DisplayDate> {
        self.measure.detention_deadline()
    }
}

/// Defendant data as entered, before an id is assigned
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefendantDraft {
    pub name: String,

    #[serde(default)]
    pub charges: String,

    #[serde(flatten)]
    pub measure: PreventiveMeasure,
}

impl DefendantDraft {
    pub fn into_defendant(self) -> Defendant {
        Defendant {
            id: EntityId::new(EntityPrefix::Def),
            name: self.name,
            charges: self.charges,
            measure: self.measure,
        }
    }
}

/// Parses `NAME[;CHARGES][;DD/MM/YYYY]`; a third field means detained until that date
impl std::str::FromStr for DefendantDraft {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';').map(str::trim);
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(format!("Defendant '{}' has no name", s));
        }
        let charges = parts.next().unwrap_or_default().to_string();
        let measure = match parts.next() {
            None | Some("") => PreventiveMeasure::AtLarge,
            Some(date) => PreventiveMeasure::Detained {
                detention_deadline: date.parse().map_err(|e| format!("{}", e))?,
            },
        };
        if parts.next().is_some() {
            return Err(format!(
                "Defendant '{}' has too many fields; use NAME;CHARGES;DD/MM/YYYY",
                s
            ));
        }
        Ok(Self {
            name: name.to_string(),
            charges,
            measure,
        })
    }
}

/// Case data as entered, before id, stage and creation date are assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDraft {
    pub name: String,
    pub charges: String,
    pub investigation_deadline: DisplayDate,
    pub prosecutor: Option<EntityId>,
    pub notes: String,
    pub defendants: Vec<DefendantDraft>,
}

/// Placeholder used when a derived case name has no charges yet
pub const UNDETERMINED_CHARGES: &str = "Charges not determined";

impl CaseDraft {
    pub fn new(name: impl Into<String>, investigation_deadline: DisplayDate) -> Self {
        Self {
            name: name.into(),
            charges: String::new(),
            investigation_deadline,
            prosecutor: None,
            notes: String::new(),
            defendants: Vec::new(),
        }
    }

    /// Payload for turning a report into a case
    ///
    /// The investigation deadline starts at `today` and defendants are added later.
    pub fn from_report(report: &Report, today: DisplayDate) -> Self {
        Self {
            name: report.name.clone(),
            charges: report.charges.clone(),
            investigation_deadline: today,
            prosecutor: report.prosecutor.clone(),
            notes: report.notes.clone(),
            defendants: Vec::new(),
        }
    }

    /// Fill a blank name and blank charges from the first defendant
    pub fn with_derived_defaults(mut self) -> Self {
        if let Some(first) = self.defendants.first() {
            if self.name.trim().is_empty() && !first.name.trim().is_empty() {
                let charges = if first.charges.trim().is_empty() {
                    UNDETERMINED_CHARGES
                } else {
                    first.charges.trim()
                };
                self.name = format!("{} - {}", first.name.trim(), charges);
            }
            if self.charges.trim().is_empty() && !first.charges.trim().is_empty() {
                self.charges = first.charges.trim().to_string();
            }
        }
        self
    }
}

/// A criminal case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: EntityId,

    pub name: String,

    #[serde(default)]
    pub charges: String,

    pub investigation_deadline: DisplayDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosecutor: Option<EntityId>,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub stage: CaseStage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosecution_transfer_date: Option<DisplayDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_transfer_date: Option<DisplayDate>,

    #[serde(default)]
    pub defendants: Vec<Defendant>,

    pub created_at: DisplayDate,
}

impl Case {
    /// Build a new case from a draft: fresh ids, initial stage, creation stamp
    pub fn from_draft(draft: CaseDraft, today: DisplayDate) -> Self {
        Self {
            id: EntityId::new(Self::PREFIX),
            name: draft.name,
            charges: draft.charges,
            investigation_deadline: draft.investigation_deadline,
            prosecutor: draft.prosecutor,
            notes: draft.notes,
            stage: CaseStage::initial(),
            prosecution_transfer_date: None,
            trial_transfer_date: None,
            defendants: draft
                .defendants
                .into_iter()
                .map(DefendantDraft::into_defendant)
                .collect(),
            created_at: today,
        }
    }

    pub fn defendant(&self, query: &str) -> Option<&Defendant> {
        find_defendant(&self.defendants, query).map(|i| &self.defendants[i])
    }

    pub fn defendant_mut(&mut self, query: &str) -> Option<&mut Defendant> {
        find_defendant(&self.defendants, query).map(|i| &mut self.defendants[i])
    }

    /// Detained defendants with their detention deadlines
    pub fn detentions(&self) -> impl Iterator<Item = (&Defendant, DisplayDate)> {
        self.defendants
            .iter()
            .filter_map(|d| d.detention_deadline().map(|deadline| (d, deadline)))
    }
}

/// Index of the defendant whose id equals or starts with `query`, or whose name matches exactly
fn find_defendant(defendants: &[Defendant], query: &str) -> Option<usize> {
    let by_id: Vec<usize> = defendants
        .iter()
        .enumerate()
        .filter(|(_, d)| d.id.matches_prefix(query))
        .map(|(i, _)| i)
        .collect();
    if by_id.len() == 1 {
        return Some(by_id[0]);
    }
    let by_name: Vec<usize> = defendants
        .iter()
        .enumerate()
        .filter(|(_, d)| d.name.eq_ignore_ascii_case(query.trim()))
        .map(|(i, _)| i)
        .collect();
    if by_name.len() == 1 {
        Some(by_name[0])
    } else {
        None
    }
}

impl Record for Case {
    type Stage = CaseStage;

    const PREFIX: EntityPrefix = EntityPrefix::Case;
    const COLLECTION: Collection = Collection::Cases;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn stage(&self) -> CaseStage {
        self.stage
    }

    fn prosecutor(&self) -> Option<&EntityId> {
        self.prosecutor.as_ref()
    }

    fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&term);
        hit(&self.name)
            || hit(&self.charges)
            || self
                .defendants
                .iter()
                .any(|d| hit(&d.name) || hit(&d.charges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> DisplayDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_case_serde_roundtrip_keeps_layout() {
        let mut draft = CaseDraft::new("Theft at market", d("01/12/2026"));
        draft.defendants.push("Nguyen Van A;Article 173;20/11/2026".parse().unwrap());
        draft.defendants.push("Tran Thi B".parse().unwrap());
        let case = Case::from_draft(draft, d("17/10/2026"));

        let json = serde_json::to_string(&case).unwrap();
        assert!(json.contains("\"investigation_deadline\":\"01/12/2026\""));
        assert!(json.contains("\"preventive_measure\":\"detained\""));
        assert!(json.contains("\"detention_deadline\":\"20/11/2026\""));
        assert!(json.contains("\"preventive_measure\":\"at_large\""));
        assert!(!json.contains("prosecution_transfer_date"));

        let back: Case = serde_json::from_str(&json).unwrap();
        assert_eq!(back, case);
    }

    #[test]
    fn test_from_draft_assigns_ids_and_initial_stage() {
        let mut draft = CaseDraft::new("Case", d("01/12/2026"));
        draft.defendants.push("A".parse().unwrap());
        draft.defendants.push("B".parse().unwrap());
        let case = Case::from_draft(draft, d("17/10/2026"));

        assert_eq!(case.stage, CaseStage::Investigation);
        assert_eq!(case.stage, CaseStage::initial());
        assert_eq!(CaseStage::default(), CaseStage::initial());
        assert_eq!(case.created_at, d("17/10/2026"));
        assert_eq!(case.id.prefix(), Case::PREFIX);
        assert!(case.id.to_string().starts_with("CASE-"));
        assert_ne!(case.defendants[0].id, case.defendants[1].id);
        assert!(case.defendants[0].id.to_string().starts_with("DEF-"));
    }

    #[test]
    fn test_set_at_large_clears_detention() {
        let mut def = DefendantDraft::default().into_defendant();
        def.detain(d("05/11/2026"));
        assert_eq!(def.detention_deadline(), Some(d("05/11/2026")));
        def.set_at_large();
        assert_eq!(def.detention_deadline(), None);
        def.set_at_large();
        assert_eq!(def.detention_deadline(), None);
    }

    #[test]
    fn test_parse_defendant_draft() {
        let draft: DefendantDraft = "Le Van C; Article 134 ; 01/01/2027".parse().unwrap();
        assert_eq!(draft.name, "Le Van C");
        assert_eq!(draft.charges, "Article 134");
        assert_eq!(draft.measure.detention_deadline(), Some(d("01/01/2027")));

        let draft: DefendantDraft = "Le Van C;;".parse().unwrap();
        assert_eq!(draft.measure, PreventiveMeasure::AtLarge);

        assert!("".parse::<DefendantDraft>().is_err());
        assert!("X;Y;2027-01-01".parse::<DefendantDraft>().is_err());
        assert!("X;Y;01/01/2027;extra".parse::<DefendantDraft>().is_err());
    }

    #[test]
    fn test_derived_defaults_from_first_defendant() {
        let mut draft = CaseDraft::new("", d("01/12/2026"));
        draft.defendants.push("Pham D;Article 174".parse().unwrap());
        let draft = draft.with_derived_defaults();
        assert_eq!(draft.name, "Pham D - Article 174");
        assert_eq!(draft.charges, "Article 174");

        let mut draft = CaseDraft::new("", d("01/12/2026"));
        draft.defendants.push("Pham D".parse().unwrap());
        let draft = draft.with_derived_defaults();
        assert_eq!(draft.name, format!("Pham D - {}", UNDETERMINED_CHARGES));
        assert_eq!(draft.charges, "");

        let mut draft = CaseDraft::new("Given", d("01/12/2026"));
        draft.charges = "Given charges".to_string();
        draft.defendants.push("Pham D;Article 174".parse().unwrap());
        let draft = draft.with_derived_defaults();
        assert_eq!(draft.name, "Given");
        assert_eq!(draft.charges, "Given charges");
    }

    #[test]
    fn test_stage_parse_and_display() {
        for stage in [
            CaseStage::Investigation,
            CaseStage::Prosecution,
            CaseStage::Trial,
            CaseStage::Completed,
            CaseStage::Discontinued,
            CaseStage::TemporarilySuspended,
            CaseStage::Transferred,
        ] {
            assert_eq!(stage.to_string().parse::<CaseStage>().unwrap(), stage);
        }
        assert_eq!(
            "temporarily-suspended".parse::<CaseStage>().unwrap(),
            CaseStage::TemporarilySuspended
        );
        assert!("closed".parse::<CaseStage>().is_err());
    }

    #[test]
    fn test_matches_search_covers_defendants() {
        let mut draft = CaseDraft::new("Market theft", d("01/12/2026"));
        draft.defendants.push("Hoang E;Robbery".parse().unwrap());
        let case = Case::from_draft(draft, d("17/10/2026"));
        assert!(case.matches_search("MARKET"));
        assert!(case.matches_search("hoang"));
        assert!(case.matches_search("robb"));
        assert!(!case.matches_search("fraud"));
    }

    #[test]
    fn test_find_defendant_by_id_prefix_or_name() {
        let mut draft = CaseDraft::new("Case", d("01/12/2026"));
        draft.defendants.push("Alpha".parse().unwrap());
        draft.defendants.push("Beta".parse().unwrap());
        let case = Case::from_draft(draft, d("17/10/2026"));
        let beta_id = case.defendants[1].id.to_string();

        assert_eq!(case.defendant(&beta_id).unwrap().name, "Beta");
        assert_eq!(case.defendant("alpha").unwrap().name, "Alpha");
        assert!(case.defendant("DEF-").is_none());
        assert!(case.defendant("Gamma").is_none());
    }
}
