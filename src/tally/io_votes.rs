use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs;

use crate::tally::*;

/// A score on a single criterion, as found in the vote files.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ParsedScore {
    pub criterion: u32,
    pub score: u32,
}

/// One reviewer vote as found in the vote files, before any validation
/// against the roster.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ParsedVote {
    pub voter: u32,
    pub employee: u32,
    pub scores: Vec<ParsedScore>,
}

pub fn read_vote_file(path: String) -> TallyResult<Vec<ParsedVote>> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let votes: Vec<ParsedVote> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(votes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_files_parse() {
        let content = r#"[
            { "voter": 3, "employee": 7, "scores": [
                { "criterion": 1, "score": 90 }, { "criterion": 2, "score": 80 } ] }
        ]"#;
        let votes: Vec<ParsedVote> = serde_json::from_str(content).unwrap();
        assert_eq!(
            votes,
            vec![ParsedVote {
                voter: 3,
                employee: 7,
                scores: vec![
                    ParsedScore {
                        criterion: 1,
                        score: 90
                    },
                    ParsedScore {
                        criterion: 2,
                        score: 80
                    }
                ],
            }]
        );
    }
}
