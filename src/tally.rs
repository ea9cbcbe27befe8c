use log::{debug, info, warn};

use merit_scoring::*;
use snafu::{prelude::*, Snafu};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
pub mod io_attendance;
pub mod io_common;
pub mod io_votes;

use crate::tally::config_reader::*;
use crate::tally::io_common::fallback_employee_name;
use crate::tally::io_votes::ParsedVote;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningWorkbook {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no readable worksheet"))]
    EmptyWorkbook { path: String },
    #[snafu(display("Could not read cell at line {lineno} of {path}: {content}"))]
    WorkbookCell {
        path: String,
        lineno: u64,
        content: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration path has no parent directory"))]
    MissingParentDir {},

    #[snafu(display("Employee {employee} is not in the roster"))]
    UnknownEmployee { employee: u32 },
    #[snafu(display("Category {category} is not declared in the configuration"))]
    UnknownCategory { category: u32 },
    #[snafu(display("Scoring error: {source}"))]
    Scoring { source: ScoringErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// The display name and category of a registered employee.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RosterEntry {
    name: String,
    category: u32,
}

fn validate_config(config: &EvalConfig) -> TallyResult<()> {
    if config.vote_file_sources.is_empty() && config.attendance_file_sources.is_empty() {
        whatever!("no input file sources detected");
    }

    let mut category_ids: HashSet<u32> = HashSet::new();
    let mut criterion_ids: HashSet<u32> = HashSet::new();
    for category in config.categories.iter() {
        if !category_ids.insert(category.id) {
            whatever!("duplicate category id {} in the configuration", category.id);
        }
        for criterion in category.criteria.iter() {
            if !criterion_ids.insert(criterion.id) {
                whatever!(
                    "duplicate criterion id {} in the configuration",
                    criterion.id
                );
            }
        }
        let total: u32 = category.criteria.iter().map(|c| c.weight).sum();
        if total != 100 {
            warn!(
                "category {}: criterion weights add up to {}, not 100. The weighted scores are capped accordingly",
                category.name, total
            );
        }
    }

    for employee in config.employees.iter() {
        if !category_ids.contains(&employee.category) {
            return UnknownCategorySnafu {
                category: employee.category,
            }
            .fail();
        }
    }

    for afs in config.attendance_file_sources.iter() {
        if afs.month < 1 || afs.month > 12 {
            whatever!(
                "month {} out of range in attendance source {}",
                afs.month,
                afs.file_path
            );
        }
    }
    Ok(())
}

fn build_roster(config: &EvalConfig) -> TallyResult<HashMap<u32, RosterEntry>> {
    let mut roster: HashMap<u32, RosterEntry> = HashMap::new();
    for employee in config.employees.iter() {
        let previous = roster.insert(
            employee.id,
            RosterEntry {
                name: employee.name.clone(),
                category: employee.category,
            },
        );
        if previous.is_some() {
            whatever!("duplicate employee id {} in the roster", employee.id);
        }
    }
    Ok(roster)
}

fn validate_votes(
    parsed_votes: &[ParsedVote],
    roster: &HashMap<u32, RosterEntry>,
    period: PeriodId,
    source_name: &str,
) -> TallyResult<Vec<Vote>> {
    let mut res: Vec<Vote> = Vec::new();
    for pv in parsed_votes.iter() {
        let entry = roster.get(&pv.employee).context(UnknownEmployeeSnafu {
            employee: pv.employee,
        })?;
        for s in pv.scores.iter() {
            if s.score < 1 || s.score > 100 {
                whatever!(
                    "score {} out of range 1-100 in {} (voter {}, employee {}, criterion {})",
                    s.score,
                    source_name,
                    pv.voter,
                    pv.employee,
                    s.criterion
                );
            }
        }
        res.push(Vote {
            period,
            category: CategoryId(entry.category),
            employee: EmployeeId(pv.employee),
            voter: VoterId(pv.voter),
            scores: pv
                .scores
                .iter()
                .map(|s| CriterionScore {
                    criterion: CriterionId(s.criterion),
                    score: s.score,
                })
                .collect(),
        });
    }
    Ok(res)
}

fn read_vote_data(
    root_p: &Path,
    vfs: &VoteFileSource,
    roster: &HashMap<u32, RosterEntry>,
    period: PeriodId,
) -> TallyResult<Vec<Vote>> {
    let p = root_p.join(vfs.file_path.as_str());
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read vote file {:?}", p2);
    let parsed_votes = match vfs.provider.as_str() {
        "json" => io_votes::read_vote_file(p2)?,
        x => whatever!("Vote provider not implemented {:?}", x),
    };
    validate_votes(&parsed_votes, roster, period, vfs.file_path.as_str())
}

fn read_attendance_data(
    root_p: &Path,
    afs: &AttendanceFileSource,
) -> TallyResult<Vec<io_attendance::AttendanceRow>> {
    let p = root_p.join(afs.file_path.as_str());
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read attendance file {:?}", p2);
    io_attendance::read_attendance_file(p2, afs)
}

fn score_rows_to_json(rows: &[ScoreRow], names: &HashMap<u32, String>) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for row in rows.iter() {
        let mut details: JSMap<String, JSValue> = JSMap::new();
        for (criterion, avg) in row.score_details.iter() {
            details.insert(criterion.0.to_string(), json!(format!("{:.2}", avg)));
        }
        let name = names
            .get(&row.employee.0)
            .cloned()
            .unwrap_or_else(|| fallback_employee_name(row.employee.0));
        l.push(json!({
            "employee": name,
            "employeeId": row.employee.0,
            "weightedScore": format!("{:.2}", row.weighted_score),
            "rank": row.rank,
            "isWinner": row.is_winner,
            "details": details,
        }));
    }
    l
}

fn discipline_to_json(records: &[DisciplineRecord], names: &HashMap<u32, String>) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for record in records.iter() {
        let name = names
            .get(&record.employee.0)
            .cloned()
            .unwrap_or_else(|| fallback_employee_name(record.employee.0));
        l.push(json!({
            "employee": name,
            "employeeId": record.employee.0,
            "month": record.month,
            "year": record.year,
            "scores": {
                "presence": format!("{:.2}", record.score_1),
                "punctuality": format!("{:.2}", record.score_2),
                "permission": format!("{:.2}", record.score_3),
            },
            "finalScore": format!("{:.2}", record.final_score),
            "rank": record.rank,
            "isWinner": record.is_winner,
        }));
    }
    l
}

fn build_summary_js(
    config: &EvalConfig,
    total_votes: usize,
    results: Vec<JSValue>,
    discipline: Vec<JSValue>,
) -> JSValue {
    let c = OutputConfig {
        period: config.output_settings.period_name.clone(),
        date: config.output_settings.period_date.clone(),
        unit: config.output_settings.organization_unit.clone(),
        total_votes: Some(total_votes.to_string()),
    };
    json!({
        "config": c,
        "results": results,
        "discipline": discipline,
    })
}

fn write_summary(
    config: &EvalConfig,
    root_p: &Path,
    out_path: Option<String>,
    pretty_js_stats: &str,
) -> TallyResult<()> {
    let target = match out_path {
        Some(p) => Some(p),
        None => config
            .output_settings
            .output_directory
            .clone()
            .map(|dir| root_p.join(dir).join("summary.json").display().to_string()),
    };
    match target {
        Some(p) if p == "stdout" => println!("stats:{}", pretty_js_stats),
        Some(p) => {
            if let Some(parent) = Path::new(p.as_str()).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .context(WritingSummarySnafu { path: p.clone() })?;
                }
            }
            info!("Writing summary to {:?}", p);
            fs::write(p.as_str(), pretty_js_stats)
                .context(WritingSummarySnafu { path: p.clone() })?;
        }
        None => println!("stats:{}", pretty_js_stats),
    }
    Ok(())
}

pub fn run_evaluation(
    config_path: String,
    check_summary_path: Option<String>,
    out_path: Option<String>,
) -> TallyResult<()> {
    let config_p = Path::new(config_path.as_str());
    let config = read_config(config_path.clone())?;
    info!("config: {:?}", config);

    validate_config(&config)?;
    let roster = build_roster(&config)?;
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;

    let period = PeriodId(config.period.id);
    let mut board = ScoreBoard::new();
    board
        .register_period(period, config.period.label.as_str())
        .context(ScoringSnafu {})?;
    for category in config.categories.iter() {
        for criterion in category.criteria.iter() {
            board.add_criterion(Criterion {
                id: CriterionId(criterion.id),
                category: CategoryId(category.id),
                weight: criterion.weight,
                order: criterion.order.unwrap_or(0),
            });
        }
    }

    board.open_voting(period).context(ScoringSnafu {})?;
    for vfs in config.vote_file_sources.iter() {
        let votes = read_vote_data(root_p, vfs, &roster, period)?;
        debug!("{}: {:?} votes", vfs.file_path, votes.len());
        for vote in votes {
            board.record_vote(vote).context(ScoringSnafu {})?;
        }
    }
    board.close_voting(period).context(ScoringSnafu {})?;

    let mut names: HashMap<u32, String> = roster
        .iter()
        .map(|(id, entry)| (*id, entry.name.clone()))
        .collect();

    let mut total_votes: usize = 0;
    let mut results_js: Vec<JSValue> = Vec::new();
    for category in config.categories.iter() {
        let cat = CategoryId(category.id);
        let rows = board.aggregate_category(period, cat).to_vec();
        let votes = board.recorded_votes(period, cat).len();
        total_votes += votes;
        results_js.push(json!({
            "category": category.name,
            "categoryId": category.id,
            "votes": votes.to_string(),
            "scores": score_rows_to_json(&rows, &names),
        }));
    }

    // The attendance months, in file order with duplicates collapsed.
    let mut months: Vec<(u32, i32)> = Vec::new();
    for afs in config.attendance_file_sources.iter() {
        let attendance_rows = read_attendance_data(root_p, afs)?;
        for row in attendance_rows {
            if !row.name.is_empty() {
                names.entry(row.employee).or_insert_with(|| row.name.clone());
            }
            board.import_attendance(EmployeeId(row.employee), afs.month, afs.year, row.counters);
        }
        if !months.contains(&(afs.month, afs.year)) {
            months.push((afs.month, afs.year));
        }
    }
    let mut discipline_js: Vec<JSValue> = Vec::new();
    for (month, year) in months {
        let ranked = board.rank_discipline(month, year);
        discipline_js.extend(discipline_to_json(&ranked, &names));
    }

    board.announce(period).context(ScoringSnafu {})?;

    // Assemble the final json
    let result_js = build_summary_js(&config, total_votes, results_js, discipline_js);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    write_summary(&config, root_p, out_path, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_reference(summary_p)?;
        debug!("summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;

    const CONFIG: &str = r#"{
        "outputSettings": { "periodName": "2024 semester 1" },
        "period": { "id": 1, "label": "2024 semester 1" },
        "categories": [
            { "id": 1, "name": "Staff", "criteria": [
                { "id": 1, "name": "Quality of work", "weight": 60, "order": 1 },
                { "id": 2, "name": "Cooperation", "weight": 40, "order": 2 } ] }
        ],
        "employees": [
            { "id": 7, "name": "Ana", "category": 1 },
            { "id": 8, "name": "Bruno", "category": 1 }
        ],
        "voteFileSources": [ { "provider": "json", "filePath": "votes.json" } ]
    }"#;

    const VOTES: &str = r#"[
        { "voter": 3, "employee": 7, "scores": [ { "criterion": 1, "score": 90 }, { "criterion": 2, "score": 80 } ] },
        { "voter": 4, "employee": 7, "scores": [ { "criterion": 1, "score": 80 }, { "criterion": 2, "score": 90 } ] },
        { "voter": 3, "employee": 8, "scores": [ { "criterion": 1, "score": 95 }, { "criterion": 2, "score": 85 } ] }
    ]"#;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("merittally-test-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> String {
        let p = dir.join(name);
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn evaluation_end_to_end() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = temp_dir("e2e");
        write_file(&dir, "votes.json", VOTES);
        let config_path = write_file(&dir, "config.json", CONFIG);
        let out_path = dir.join("summary.json").display().to_string();

        run_evaluation(config_path, None, Some(out_path.clone())).unwrap();

        let js = read_reference(out_path).unwrap();
        assert_eq!(js["config"]["period"], "2024 semester 1");
        assert_eq!(js["config"]["totalVotes"], "3");
        let results = js["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["category"], "Staff");
        assert_eq!(results[0]["votes"], "3");
        let scores = results[0]["scores"].as_array().unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0]["employee"], "Bruno");
        assert_eq!(scores[0]["weightedScore"], "91.00");
        assert_eq!(scores[0]["rank"], 1);
        assert_eq!(scores[0]["isWinner"], true);
        assert_eq!(scores[0]["details"]["1"], "95.00");
        assert_eq!(scores[0]["details"]["2"], "85.00");
        assert_eq!(scores[1]["employee"], "Ana");
        assert_eq!(scores[1]["weightedScore"], "85.00");
        assert_eq!(scores[1]["rank"], 2);
        assert_eq!(scores[1]["isWinner"], false);
        assert!(js["discipline"].as_array().unwrap().is_empty());
    }

    #[test]
    fn reference_check_accepts_own_summary() {
        let dir = temp_dir("ref-ok");
        write_file(&dir, "votes.json", VOTES);
        let config_path = write_file(&dir, "config.json", CONFIG);
        let out_path = dir.join("summary.json").display().to_string();

        run_evaluation(config_path.clone(), None, Some(out_path.clone())).unwrap();
        run_evaluation(config_path, Some(out_path.clone()), Some(out_path)).unwrap();
    }

    #[test]
    fn reference_check_detects_drift() {
        let dir = temp_dir("ref-drift");
        write_file(&dir, "votes.json", VOTES);
        let config_path = write_file(&dir, "config.json", CONFIG);
        let out_path = dir.join("summary.json").display().to_string();

        run_evaluation(config_path.clone(), None, Some(out_path.clone())).unwrap();
        let summary = fs::read_to_string(&out_path).unwrap();
        let drifted = summary.replace("\"91.00\"", "\"90.00\"");
        assert_ne!(summary, drifted);
        let ref_path = write_file(&dir, "reference.json", &drifted);

        let err = run_evaluation(config_path, Some(ref_path), Some(out_path)).unwrap_err();
        assert!(matches!(err, TallyError::Whatever { .. }));
    }

    #[test]
    fn duplicate_vote_fails_the_run() {
        let dir = temp_dir("dup");
        let votes = r#"[
            { "voter": 3, "employee": 7, "scores": [ { "criterion": 1, "score": 90 } ] },
            { "voter": 3, "employee": 7, "scores": [ { "criterion": 1, "score": 70 } ] }
        ]"#;
        write_file(&dir, "votes.json", votes);
        let config_path = write_file(&dir, "config.json", CONFIG);

        let err = run_evaluation(config_path, None, None).unwrap_err();
        assert!(matches!(
            err,
            TallyError::Scoring {
                source: ScoringErrors::DuplicateVote { .. }
            }
        ));
    }

    #[test]
    fn vote_for_unknown_employee_fails_the_run() {
        let dir = temp_dir("unknown-emp");
        let votes = r#"[
            { "voter": 3, "employee": 99, "scores": [ { "criterion": 1, "score": 90 } ] }
        ]"#;
        write_file(&dir, "votes.json", votes);
        let config_path = write_file(&dir, "config.json", CONFIG);

        let err = run_evaluation(config_path, None, None).unwrap_err();
        assert!(matches!(err, TallyError::UnknownEmployee { employee: 99 }));
    }

    #[test]
    fn out_of_range_score_fails_the_run() {
        let dir = temp_dir("bad-score");
        let votes = r#"[
            { "voter": 3, "employee": 7, "scores": [ { "criterion": 1, "score": 0 } ] }
        ]"#;
        write_file(&dir, "votes.json", votes);
        let config_path = write_file(&dir, "config.json", CONFIG);

        let err = run_evaluation(config_path, None, None).unwrap_err();
        assert!(matches!(err, TallyError::Whatever { .. }));
    }

    #[test]
    fn employee_with_unknown_category_is_rejected() {
        let dir = temp_dir("unknown-cat");
        let config = CONFIG.replace("\"category\": 1 }", "\"category\": 5 }");
        write_file(&dir, "votes.json", VOTES);
        let config_path = write_file(&dir, "config.json", config.as_str());

        let err = run_evaluation(config_path, None, None).unwrap_err();
        assert!(matches!(err, TallyError::UnknownCategory { category: 5 }));
    }

    #[test]
    fn attendance_month_is_validated_before_reading() {
        let dir = temp_dir("bad-month");
        let config = r#"{
            "outputSettings": { "periodName": "p" },
            "period": { "id": 1, "label": "p" },
            "categories": [],
            "employees": [],
            "attendanceFileSources": [ { "filePath": "never_read.xlsx", "month": 13, "year": 2024 } ]
        }"#;
        let config_path = write_file(&dir, "config.json", config);

        let err = run_evaluation(config_path, None, None).unwrap_err();
        assert!(matches!(err, TallyError::Whatever { .. }));
    }

    #[test]
    fn missing_workbook_is_reported() {
        let dir = temp_dir("no-workbook");
        let config = r#"{
            "outputSettings": { "periodName": "p" },
            "period": { "id": 1, "label": "p" },
            "categories": [],
            "employees": [],
            "attendanceFileSources": [ { "filePath": "absent.xlsx", "month": 3, "year": 2024 } ]
        }"#;
        let config_path = write_file(&dir, "config.json", config);

        let err = run_evaluation(config_path, None, None).unwrap_err();
        assert!(matches!(err, TallyError::OpeningWorkbook { .. }));
    }
}
