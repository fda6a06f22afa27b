//! Review prompt rendering.
//!
//! The prompt is a fixed template. Submission fields are embedded verbatim,
//! so whatever the user sends reaches the model unfiltered.

use std::fmt::Write;

use crate::models::{Submission, TestCase};

const NOT_AVAILABLE: &str = "N/A";

const INSTRUCTIONS: &str = "Now provide structured feedback in the following format **ONLY**:

1)  Correctness Summary
- Is the code correct overall? Why?

2)  Test Case Analysis
- Identify failing test cases and explain failure reasons.

3)  Time Complexity
- Estimate Big-O complexity

4)  Space Complexity
- Estimate Big-O complexity

5)  Code Quality & Style
- Identify bad naming, formatting, unnecessary logic, or anti-patterns
- Reference best-practice context with citations

6)  Fixes
- Show improved / corrected code
- Explain changes

7)  Summary
- Score code quality 1–10
";

/// Render the review prompt for `submission` with retrieved `context`.
pub fn build_prompt(context: &str, submission: &Submission) -> String {
    let problem = submission.problem.as_ref();
    let meta = submission.meta.as_ref();

    let title = or_na(problem.and_then(|p| p.title.as_deref()));
    let difficulty = or_na(problem.and_then(|p| p.difficulty.as_deref()));
    let description = or_na(problem.and_then(|p| p.description.as_deref()));

    let submission_id = or_na(meta.and_then(|m| m.id.as_deref()));
    let verdict = or_na(meta.and_then(|m| m.verdict.as_deref()));
    let passed_tests = count_or_na(meta.and_then(|m| m.passed_tests));
    let total_tests = count_or_na(meta.and_then(|m| m.total_tests));

    let test_cases = render_test_cases(submission.test_cases.as_deref().unwrap_or_default());

    format!(
        "
You are an expert code reviewer. Think step-by-step ,don't include emojis in output act like professional.

Use ONLY the retrieved best-practice context below. Do NOT hallucinate.

=== BEST PRACTICES CONTEXT ===
{context}

=== PROBLEM DESCRIPTION ===
Title: {title}
Difficulty: {difficulty}

Description:
{description}

=== USER SUBMISSION ===
Language: {language}

Code:
{code}

Program Output:
{output}

Expected Output:
{expected_output}

Submission Stats:
ID: {submission_id}
Verdict: {verdict}
Passed Tests: {passed_tests}
Total Tests: {total_tests}

=== TEST CASE RESULTS ===
{test_cases}


{INSTRUCTIONS}",
        language = submission.language,
        code = submission.code,
        output = submission.output,
        expected_output = submission.expected_output,
    )
}

/// One block per test case, numbered from 1. Empty when there are none.
fn render_test_cases(cases: &[TestCase]) -> String {
    let mut out = String::new();
    for (i, case) in cases.iter().enumerate() {
        let passed = match case.passed {
            Some(true) => "True",
            Some(false) => "False",
            None => NOT_AVAILABLE,
        };
        let _ = write!(
            out,
            "\nTest Case {}:\nInput: {}\nExpected Output: {}\nActual Output: {}\nPassed: {}\n",
            i + 1,
            or_na(case.input.as_deref()),
            or_na(case.expected_output.as_deref()),
            or_na(case.actual_output.as_deref()),
            passed,
        );
    }
    out
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

fn count_or_na(value: Option<i64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string())
}
