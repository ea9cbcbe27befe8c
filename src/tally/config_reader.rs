use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "periodName")]
    pub period_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "periodDate")]
    pub period_date: Option<String>,
    #[serde(rename = "organizationUnit")]
    pub organization_unit: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub period: String,
    pub date: Option<String>,
    pub unit: Option<String>,
    #[serde(rename = "totalVotes")]
    pub total_votes: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PeriodConfig {
    pub id: u32,
    pub label: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CriterionConfig {
    pub id: u32,
    pub name: String,
    pub weight: u32,
    pub order: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: u32,
    pub name: String,
    pub criteria: Vec<CriterionConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeConfig {
    pub id: u32,
    pub name: String,
    pub category: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VoteFileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceFileSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub month: u32,
    pub year: i32,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub period: PeriodConfig,
    pub categories: Vec<CategoryConfig>,
    pub employees: Vec<EmployeeConfig>,
    #[serde(rename = "voteFileSources", default)]
    pub vote_file_sources: Vec<VoteFileSource>,
    #[serde(rename = "attendanceFileSources", default)]
    pub attendance_file_sources: Vec<AttendanceFileSource>,
}

pub fn read_config(path: String) -> TallyResult<EvalConfig> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let config: EvalConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Reads a previously written summary for comparison against the current run.
pub fn read_reference(path: String) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
