//! Output formatting utilities

use anyhow::Result;
use serde::Serialize;

use crate::runner::StepReport;

/// Print step reports as plain text, one line per step and one per solution.
pub fn print_reports(reports: &[StepReport]) {
    for line in render(reports) {
        println!("{line}");
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("✓ {message}");
}

fn render(reports: &[StepReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for report in reports {
        let proof = report
            .proof_index
            .map(|index| format!(" -> {index}"))
            .unwrap_or_default();
        lines.push(format!(
            "[{}] {} {}{}  (cost {})",
            report.index, report.op, report.step, proof, report.cost
        ));
        for (position, solution) in report.solutions.iter().enumerate() {
            lines.push(format!(
                "    #{position} {} {}",
                solution.member, solution.weight
            ));
        }
    }
    let total: u64 = reports.iter().map(|report| report.cost).sum();
    lines.push(format!("total cost {total}"));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Solution;
    use rt_engine::{Principal, ProofIndex, Weight};

    #[test]
    fn renders_steps_and_solutions() {
        let reports = vec![
            StepReport {
                index: 0,
                op: "new_role",
                step: "Alice.friend".into(),
                cost: 20_000,
                proof_index: None,
                solutions: vec![],
            },
            StepReport {
                index: 1,
                op: "search",
                step: "Alice.friend".into(),
                cost: 2_600,
                proof_index: Some(ProofIndex(0)),
                solutions: vec![Solution {
                    member: "Bob".into(),
                    address: Principal::from_label("Bob"),
                    weight: Weight::new(80),
                }],
            },
        ];

        assert_eq!(
            render(&reports),
            vec![
                "[0] new_role Alice.friend  (cost 20000)",
                "[1] search Alice.friend -> proof:0  (cost 2600)",
                "    #0 Bob 80",
                "total cost 22600",
            ]
        );
    }

    #[test]
    fn json_skips_empty_fields() {
        let report = StepReport {
            index: 0,
            op: "new_role",
            step: "Alice.friend".into(),
            cost: 1,
            proof_index: None,
            solutions: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("proof_index").is_none());
        assert!(json.get("solutions").is_none());
        assert_eq!(json["op"], "new_role");
    }
}
