/*!

# Quick start

This example runs a small evaluation campaign end to end: two employees in
one category, three reviewers, one month of attendance.

**Describing the campaign** Create a file `evaluation.json`:

```text
{
  "outputSettings": { "periodName": "2024 semester 1" },
  "period": { "id": 1, "label": "2024 semester 1" },
  "categories": [
    {
      "id": 1,
      "name": "Staff",
      "criteria": [
        { "id": 1, "name": "Quality of work", "weight": 60, "order": 1 },
        { "id": 2, "name": "Cooperation", "weight": 40, "order": 2 }
      ]
    }
  ],
  "employees": [
    { "id": 7, "name": "Ana", "category": 1 },
    { "id": 8, "name": "Bruno", "category": 1 }
  ],
  "voteFileSources": [ { "provider": "json", "filePath": "votes.json" } ]
}
```

**Collecting the votes** Export the reviewer scores from your form
provider to a file `votes.json`, next to the configuration file:

```text
[
  { "voter": 3, "employee": 7, "scores": [ { "criterion": 1, "score": 90 }, { "criterion": 2, "score": 80 } ] },
  { "voter": 4, "employee": 7, "scores": [ { "criterion": 1, "score": 80 }, { "criterion": 2, "score": 90 } ] },
  { "voter": 3, "employee": 8, "scores": [ { "criterion": 1, "score": 95 }, { "criterion": 2, "score": 85 } ] }
]
```

**Running the tally**

```bash
merittally --config evaluation.json
```

After running this command, you should see the tabulation unfold:

```text
[2024-07-01T09:55:59Z INFO  merit_scoring::board] register_period: 1 (2024 semester 1)
[2024-07-01T09:55:59Z INFO  merit_scoring::board] period 1: Draft -> Open
[2024-07-01T09:55:59Z INFO  merit_scoring::board] period 1: Open -> Closed
[2024-07-01T09:55:59Z INFO  merit_scoring] run_scoring_stats: processing 3 votes for period 1 category 1
[2024-07-01T09:55:59Z INFO  merit_scoring] run_scoring_stats: 2 employees tallied, 1 winner(s) at 91.0 points
[2024-07-01T09:55:59Z INFO  merit_scoring::board] aggregate_category: period 1 category 1: replacing scores with 2 rows
[2024-07-01T09:55:59Z INFO  merit_scoring::board] period 1: Closed -> Announced
```

and the summary printed as JSON, with `Bruno` winning the `Staff` category
at 91.00 points against 85.00 for `Ana`. The weighted score of each
employee is 60% of the `Quality of work` average plus 40% of the
`Cooperation` average, and ties (after rounding to 2 decimal places) share
the rank.

**Writing the summary to a file** Use the `--out` flag (or the
`outputDirectory` key of `outputSettings`):

```bash
merittally --config evaluation.json --out results.json
```

**Checking against a reference** When migrating from another tabulation
system, pass the summary it produced to compare outcomes:

```bash
merittally --config evaluation.json --reference their_summary.json
```

The program prints a diff and fails if the two summaries do not agree.

**Attendance** To also tally the monthly discipline scores, fill an
attendance workbook as described in the [manual](../manual/index.html)
and declare it under `attendanceFileSources`. The discipline track does
not depend on the votes: employees of every category are ranked together,
one cohort per month.

*/
