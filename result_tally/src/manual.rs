/*!

This is the long-form manual for `result_tally` and `eltally`.

## Input formats

The following formats are supported:
* `json` election snapshots
* `csv` Comma Separated Values, one row per candidate
* `xlsx` Excel spreadsheets, with the same layout as `csv`

### `json`

A file containing a single election, or an array of elections:

```json
{
  "id": "general-2024",
  "registeredVoters": 2500,
  "ballotsCast": 1834,
  "positions": [
    {
      "id": "mayor",
      "title": "Mayor",
      "totalVotes": 1834,
      "candidates": [
        { "id": "alice", "name": "Alice", "votes": 892 },
        { "id": "bob", "name": "Bob", "votes": 654 },
        { "id": "charlie", "name": "Charlie", "votes": 288 }
      ]
    }
  ]
}
```

`ballotsCast` and `totalVotes` are optional. When `totalVotes` is present, it must
be equal to the sum of the votes of the candidates. When `ballotsCast` is missing,
the largest position total is used.

### `csv`

One row per candidate, with the following columns:

| election     | position | position title | candidate | candidate name | votes |
|--------------|----------|----------------|-----------|----------------|-------|
| general-2024 | mayor    | Mayor          | alice     | Alice          | 892   |
| general-2024 | mayor    | Mayor          | bob       | Bob            | 654   |

The first row is expected to be a header. This can be changed with the
`firstDataRowIndex` option of the file source (the index starts at 1).
Positions and candidates are reported in the order of the rows.

The number of registered voters and the number of ballots cast are not part of the
file: they are set with the `registeredVoters` and `ballotsCast` options of the
configuration.

### `xlsx`

Same layout as `csv`, read from an Excel worksheet. The worksheet is chosen with the
`worksheetName` option (or the `--excel-worksheet-name` flag). By default, the first
worksheet is used.

## Configuration

The configuration file is a JSON file:

```json
{
  "outputSettings": {
    "electionId": "general-2024",
    "electionTitle": "General election",
    "electionDate": "2024-11-05",
    "jurisdiction": "Springfield"
  },
  "fileSources": [
    { "provider": "csv", "filePath": "results.csv" }
  ],
  "rules": {
    "tiebreakMode": "allTied",
    "decimalPlaces": 1
  },
  "registeredVoters": 2500,
  "ballotsCast": 1834
}
```

File paths are relative to the directory of the configuration file.

### Tiebreak modes

Winners are decided on the vote counts and never on the rounded percentages.
With 845 votes against 844, the first candidate wins even if both show 50.0%.
When several candidates share the highest count:

* `allTied` (default) all of them are winners
* `useCandidateOrder` the first one in the order of the position wins
* `random` a reproducible draw based on a cryptographic hash of the `randomSeed`
  option and of the identifiers
* `noWinner` nobody wins this position

A position in which nobody voted has no winner.

## Output

The summary is a JSON document:

```json
{
  "config": {
    "election": "general-2024",
    "title": "General election",
    "date": "2024-11-05",
    "jurisdiction": "Springfield",
    "tiebreakMode": "allTied"
  },
  "results": {
    "registeredVoters": 2500,
    "ballotsCast": 1834,
    "turnoutPercentage": 73.4,
    "positions": [
      {
        "position": "mayor",
        "title": "Mayor",
        "totalVotes": 1834,
        "tiebreak": "clean",
        "winners": ["alice"],
        "tally": [
          { "candidate": "alice", "name": "Alice", "votes": 892, "percentage": 48.6, "isWinner": true }
        ]
      }
    ]
  }
}
```

If the requested election is not present in the inputs, `results` is `null`.

*/
