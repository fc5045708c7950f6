use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::IngestError;

/// The categorical field a factor label came from.
///
/// Variants are declared in chain order: consecutive variants are linked
/// by a co-occurrence edge when both values appear in one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorType {
    ProjectScale,
    AccidentType,
    MajorCause,
    MediumCause,
    MinorCause,
    IndustryType,
    OccupationType,
    Age,
    Gender,
    Experience,
    Weekday,
    Time,
    Facility,
    WorkerCount,
}

impl FactorType {
    pub const CHAIN: [FactorType; 14] = [
        FactorType::ProjectScale,
        FactorType::AccidentType,
        FactorType::MajorCause,
        FactorType::MediumCause,
        FactorType::MinorCause,
        FactorType::IndustryType,
        FactorType::OccupationType,
        FactorType::Age,
        FactorType::Gender,
        FactorType::Experience,
        FactorType::Weekday,
        FactorType::Time,
        FactorType::Facility,
        FactorType::WorkerCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FactorType::ProjectScale => "ProjectScale",
            FactorType::AccidentType => "AccidentType",
            FactorType::MajorCause => "MajorCause",
            FactorType::MediumCause => "MediumCause",
            FactorType::MinorCause => "MinorCause",
            FactorType::IndustryType => "IndustryType",
            FactorType::OccupationType => "OccupationType",
            FactorType::Age => "Age",
            FactorType::Gender => "Gender",
            FactorType::Experience => "Experience",
            FactorType::Weekday => "Weekday",
            FactorType::Time => "Time",
            FactorType::Facility => "Facility",
            FactorType::WorkerCount => "WorkerCount",
        }
    }

    /// Fill colour used when drawing nodes of this type.
    pub fn color(self) -> &'static str {
        match self {
            FactorType::ProjectScale => "#66c2a5",
            FactorType::AccidentType => "#fc8d62",
            FactorType::MajorCause => "#8da0cb",
            FactorType::MediumCause => "#e78ac3",
            FactorType::MinorCause => "#a6d854",
            FactorType::IndustryType => "#ffd92f",
            FactorType::OccupationType => "#e5c494",
            FactorType::Age => "#b3b3b3",
            FactorType::Gender => "#1f78b4",
            FactorType::Experience => "#33a02c",
            FactorType::Weekday => "#6a3d9a",
            FactorType::Time => "#b15928",
            FactorType::Facility => "#ff7f00",
            FactorType::WorkerCount => "#cab2d6",
        }
    }

    /// Whether a record without this field is discarded.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            FactorType::ProjectScale
                | FactorType::AccidentType
                | FactorType::MajorCause
                | FactorType::IndustryType
        )
    }
}

impl fmt::Display for FactorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the accident dataset as it appears on disk.
///
/// Headers follow the published Korean column names; the English
/// snake_case names are accepted as aliases. Extra columns are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawIncident {
    #[serde(rename = "공사규모", alias = "project_scale")]
    pub project_scale: Option<String>,
    #[serde(rename = "발생형태", alias = "accident_type")]
    pub accident_type: Option<String>,
    #[serde(rename = "기인물(대)", alias = "major_cause")]
    pub major_cause: Option<String>,
    #[serde(rename = "기인물(중)", alias = "medium_cause")]
    pub medium_cause: Option<String>,
    #[serde(rename = "기인물(소)", alias = "minor_cause")]
    pub minor_cause: Option<String>,
    #[serde(rename = "소업종명", alias = "industry_type")]
    pub industry_type: Option<String>,
    #[serde(rename = "직종", alias = "occupation_type")]
    pub occupation_type: Option<String>,
    #[serde(rename = "연령", alias = "age")]
    pub age: Option<String>,
    #[serde(rename = "성별", alias = "gender")]
    pub gender: Option<String>,
    #[serde(rename = "근속기간", alias = "experience")]
    pub experience: Option<String>,
    #[serde(rename = "재해요일", alias = "weekday")]
    pub weekday: Option<String>,
    #[serde(rename = "재해시간", alias = "time")]
    pub time: Option<String>,
    #[serde(rename = "시설물(대)", alias = "facility")]
    pub facility: Option<String>,
    #[serde(rename = "근로자수", alias = "worker_count")]
    pub worker_count: Option<String>,
}

/// A validated incident: the four required fields are always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentRecord {
    pub project_scale: String,
    pub accident_type: String,
    pub major_cause: String,
    pub medium_cause: Option<String>,
    pub minor_cause: Option<String>,
    pub industry_type: String,
    pub occupation_type: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub experience: Option<String>,
    pub weekday: Option<String>,
    pub time: Option<String>,
    pub facility: Option<String>,
    pub worker_count: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(value: Option<String>, field: FactorType) -> Result<String, IngestError> {
    clean(value).ok_or(IngestError::MissingField(field))
}

impl TryFrom<RawIncident> for IncidentRecord {
    type Error = IngestError;

    fn try_from(raw: RawIncident) -> Result<Self, Self::Error> {
        Ok(IncidentRecord {
            project_scale: require(raw.project_scale, FactorType::ProjectScale)?,
            accident_type: require(raw.accident_type, FactorType::AccidentType)?,
            major_cause: require(raw.major_cause, FactorType::MajorCause)?,
            medium_cause: clean(raw.medium_cause),
            minor_cause: clean(raw.minor_cause),
            industry_type: require(raw.industry_type, FactorType::IndustryType)?,
            occupation_type: clean(raw.occupation_type),
            age: clean(raw.age),
            gender: clean(raw.gender),
            experience: clean(raw.experience),
            weekday: clean(raw.weekday),
            time: clean(raw.time),
            facility: clean(raw.facility),
            worker_count: clean(raw.worker_count),
        })
    }
}

impl IncidentRecord {
    /// Build a record from 14 values given in chain order.
    ///
    /// Returns `None` if one of the required positions is blank.
    pub fn from_chain(values: [&str; 14]) -> Option<Self> {
        let v = values.map(|s| Some(s.to_string()));
        let raw = RawIncident {
            project_scale: v[0].clone(),
            accident_type: v[1].clone(),
            major_cause: v[2].clone(),
            medium_cause: v[3].clone(),
            minor_cause: v[4].clone(),
            industry_type: v[5].clone(),
            occupation_type: v[6].clone(),
            age: v[7].clone(),
            gender: v[8].clone(),
            experience: v[9].clone(),
            weekday: v[10].clone(),
            time: v[11].clone(),
            facility: v[12].clone(),
            worker_count: v[13].clone(),
        };
        IncidentRecord::try_from(raw).ok()
    }

    /// Field values paired with their type, in chain order.
    pub fn factors(&self) -> [(FactorType, Option<&str>); 14] {
        [
            (FactorType::ProjectScale, Some(self.project_scale.as_str())),
            (FactorType::AccidentType, Some(self.accident_type.as_str())),
            (FactorType::MajorCause, Some(self.major_cause.as_str())),
            (FactorType::MediumCause, self.medium_cause.as_deref()),
            (FactorType::MinorCause, self.minor_cause.as_deref()),
            (FactorType::IndustryType, Some(self.industry_type.as_str())),
            (FactorType::OccupationType, self.occupation_type.as_deref()),
            (FactorType::Age, self.age.as_deref()),
            (FactorType::Gender, self.gender.as_deref()),
            (FactorType::Experience, self.experience.as_deref()),
            (FactorType::Weekday, self.weekday.as_deref()),
            (FactorType::Time, self.time.as_deref()),
            (FactorType::Facility, self.facility.as_deref()),
            (FactorType::WorkerCount, self.worker_count.as_deref()),
        ]
    }
}

/// Records that survived validation, plus how many rows were discarded.
#[derive(Debug, Default)]
pub struct Ingested {
    pub records: Vec<IncidentRecord>,
    pub dropped: usize,
}

/// Read the accident dataset at `path`.
///
/// Rows missing a required field are counted and skipped; only I/O and
/// CSV framing problems are errors.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_records(path: impl AsRef<Path>) -> Result<Ingested, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IngestError::Open {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    read_from(file)
}

/// Same as [`read_records`] over any reader.
pub fn read_from<R: std::io::Read>(reader: R) -> Result<Ingested, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut ingested = Ingested::default();
    for (line, row) in reader.deserialize::<RawIncident>().enumerate() {
        match IncidentRecord::try_from(row?) {
            Ok(record) => ingested.records.push(record),
            Err(e) => {
                debug!(row = line + 1, "dropping row: {e}");
                ingested.dropped += 1;
            }
        }
    }

    info!(
        records = ingested.records.len(),
        dropped = ingested.dropped,
        "loaded incident records"
    );
    Ok(ingested)
}
