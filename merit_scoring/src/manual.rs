/*!

This is the long-form manual for `merit_scoring` and `merittally`.

## Input formats

The following inputs are supported:
* `json` vote files exported from the evaluation form frontend
* attendance workbooks in Excel (.xlsx) format with a fixed column layout

### Vote files (`json`)

A vote file is a JSON array with one entry per (reviewer, employee) pair:

```text
[
  {
    "voter": 3,
    "employee": 7,
    "scores": [
      { "criterion": 1, "score": 88 },
      { "criterion": 2, "score": 75 }
    ]
  },
  { "voter": 4, "employee": 7, "scores": [ { "criterion": 1, "score": 70 } ] }
]
```

Notes:
- scores are integers between 1 and 100.
- a reviewer may leave criteria out. A skipped criterion is not counted as
  a zero: the average of that criterion is taken over the reviewers who did
  score it.
- the category of a vote is looked up from the employee roster of the
  configuration file. A reviewer scores a given employee at most once per
  period and category.

### Attendance workbooks

Attendance is read from .xlsx workbooks with one row per employee and the
following fixed columns:

| employee id | employee name | work days | present on time | leave on time | late minutes | early leave minutes | excess permissions |
|-------------|---------------|-----------|-----------------|---------------|--------------|---------------------|--------------------|
| 7           | Ana           | 22        | 20              | 21            | 15           | 0                   | 0                  |

The first row is a header and is skipped. The counters must be
non-negative numbers. Empty cells are read as 0. `late minutes` and
`early leave minutes` are cumulated over the whole month.

By default the first worksheet of the workbook is read. Use
`worksheetName` in the file source to pick another one.

## Configuration

`merittally` is driven by a JSON configuration file that describes the
period, the categories with their weighted criteria, the employee roster
and the input files:

```text
{
  "outputSettings": {
    "periodName": "2024 semester 1",
    "periodDate": "2024-06-30",
    "organizationUnit": "Head office",
    "outputDirectory": "results"
  },
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
  "voteFileSources": [
    { "provider": "json", "filePath": "votes_staff.json" }
  ],
  "attendanceFileSources": [
    { "filePath": "attendance_march.xlsx", "month": 3, "year": 2024 }
  ]
}
```

Notes:
- criterion weights are percentages of the category total. They are used
  as given, without renormalization: weights of 30 and 30 cap the weighted
  score at 60 points.
- `filePath` entries are resolved relative to the directory of the
  configuration file.
- `outputDirectory` (optional): where the summary file is written. The
  `--out` flag takes precedence. The value `stdout` on the `--out` flag
  prints the summary to standard output, which is also the fallback when
  neither is given.
- `attendanceFileSources` is optional: a campaign can tally votes alone.
  One source covers one calendar month.

## Scoring rules

For every (period, category) pool, each criterion of the category is
averaged over the reviewers who scored it, and the weighted total is

```text
weighted_score = sum((weight / 100) * criterion_average)
```

rounded to 2 decimal places. Employees are ranked by descending weighted
score with competition ranking: employees tied after rounding share a
rank and the next distinct score gets its 1-based position (95, 95, 90,
80 ranks as 1, 1, 3, 4). Every employee at rank 1 is a winner of the
pool.

The monthly discipline score is independent from the vote pools and is
built from the attendance counters:

```text
presence   = (present_on_time + leave_on_time) / (work_days * 2) * 50
punctuality = max(0, (100 - late_minutes - early_leave_minutes) * 0.35)
permission = 15 if excess_permissions == 0 else 0
```

The final discipline score is the sum of the three components rounded to
2 decimal places, and the employees of a month are ranked with the same
competition rule.

*/
