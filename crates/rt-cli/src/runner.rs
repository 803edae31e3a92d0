//! Replays a policy script against an engine.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use rt_engine::{
    Principal, ProofIndex, QueryReceipt, RoleName, RtEngine, SearchMode, Weight,
};
use serde::Serialize;
use tracing::info;

use crate::script::{Script, Step};

/// Outcome of one script step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub step: String,
    pub cost: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_index: Option<ProofIndex>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub solutions: Vec<Solution>,
}

/// One member of a queried role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub member: String,
    pub address: Principal,
    pub weight: Weight,
}

/// Run every step in order, stopping at the first failure.
pub fn run(script: &Script, engine: &mut RtEngine) -> Result<Vec<StepReport>> {
    let labels = script.labels();
    let mut reports = Vec::with_capacity(script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        let report = run_step(script, &labels, engine, index, step)
            .with_context(|| format!("step {index} ({}: {})", step.op(), step.describe()))?;
        reports.push(report);
    }

    let total: u64 = reports.iter().map(|report| report.cost).sum();
    info!(steps = reports.len(), total_cost = total, "Script complete");
    Ok(reports)
}

fn run_step(
    script: &Script,
    labels: &HashMap<Principal, String>,
    engine: &mut RtEngine,
    index: usize,
    step: &Step,
) -> Result<StepReport> {
    let mut report = StepReport {
        index,
        op: step.op(),
        step: step.describe(),
        cost: 0,
        proof_index: None,
        solutions: Vec::new(),
    };

    let receipt = match step {
        Step::NewRole { owner, role } => {
            engine.new_role(script.principal(owner), script.role_name(role)?)?
        }
        Step::SimpleMember {
            owner,
            role,
            member,
            weight,
        } => engine.add_simple_member(
            script.principal(owner),
            script.role_name(role)?,
            script.principal(member),
            *weight,
        )?,
        Step::SimpleInclusion {
            owner,
            role,
            target_owner,
            target_role,
            weight,
        } => engine.add_simple_inclusion(
            script.principal(owner),
            script.role_name(role)?,
            script.principal(target_owner),
            script.role_name(target_role)?,
            *weight,
        )?,
        Step::LinkedInclusion {
            owner,
            role,
            base_owner,
            base_role,
            linked_role,
            weight,
        } => engine.add_linked_inclusion(
            script.principal(owner),
            script.role_name(role)?,
            script.principal(base_owner),
            script.role_name(base_role)?,
            script.role_name(linked_role)?,
            *weight,
        )?,
        Step::IntersectionInclusion {
            owner,
            role,
            left_owner,
            left_role,
            right_owner,
            right_role,
            weight,
        } => engine.add_intersection_inclusion(
            script.principal(owner),
            script.role_name(role)?,
            script.principal(left_owner),
            script.role_name(left_role)?,
            script.principal(right_owner),
            script.role_name(right_role)?,
            *weight,
        )?,
        Step::Search {
            owner,
            role,
            expect_count,
            budget,
        }
        | Step::BackwardSearch {
            owner,
            role,
            expect_count,
            budget,
        } => {
            let mode = step.mode().unwrap_or(SearchMode::Forward);
            let (owner, name) = (script.principal(owner), script.role_name(role)?);
            let receipt = query(engine, owner, name, mode, *budget)?;
            let solutions = solutions(engine, labels, receipt.proof_index)?;
            if let Some(expected) = expect_count {
                if solutions.len() != *expected {
                    bail!(
                        "expected {expected} solutions, found {}",
                        solutions.len()
                    );
                }
            }
            report.cost = receipt.cost;
            report.proof_index = Some(receipt.proof_index);
            report.solutions = solutions;
            return Ok(report);
        }
    };

    report.cost = receipt.cost;
    Ok(report)
}

fn query(
    engine: &mut RtEngine,
    owner: Principal,
    name: RoleName,
    mode: SearchMode,
    budget: Option<u64>,
) -> Result<QueryReceipt> {
    let receipt = match (mode, budget) {
        (SearchMode::Forward, None) => engine.search(owner, name)?,
        (SearchMode::Forward, Some(limit)) => engine.search_with_budget(owner, name, limit)?,
        (SearchMode::Backward, None) => engine.backward_search(owner, name)?,
        (SearchMode::Backward, Some(limit)) => {
            engine.backward_search_with_budget(owner, name, limit)?
        }
    };
    Ok(receipt)
}

fn solutions(
    engine: &RtEngine,
    labels: &HashMap<Principal, String>,
    proof_index: ProofIndex,
) -> Result<Vec<Solution>> {
    let count = engine.proof_solution_count(proof_index)?;
    (0..count)
        .map(|position| {
            let (address, weight) = engine.proof_solution(proof_index, position)?;
            let member = labels
                .get(&address)
                .cloned()
                .unwrap_or_else(|| address.to_string());
            Ok(Solution {
                member,
                address,
                weight,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRIENDS: &str = r#"
        [roles]
        friend = "0x20"
        filmClub = "0x21"
        accessMovies = "0x22"
        accessPictures = "0x23"

        [[step]]
        op = "new_role"
        owner = "Bob"
        role = "friend"

        [[step]]
        op = "new_role"
        owner = "Alice"
        role = "friend"

        [[step]]
        op = "new_role"
        owner = "Charles"
        role = "friend"

        [[step]]
        op = "new_role"
        owner = "Johan"
        role = "friend"

        [[step]]
        op = "new_role"
        owner = "Charles"
        role = "filmClub"

        [[step]]
        op = "new_role"
        owner = "Charles"
        role = "accessMovies"

        [[step]]
        op = "new_role"
        owner = "Charles"
        role = "accessPictures"

        [[step]]
        op = "simple_member"
        owner = "Johan"
        role = "friend"
        member = "Sandro"
        weight = 70

        [[step]]
        op = "simple_member"
        owner = "Bob"
        role = "friend"
        member = "Johan"
        weight = 60

        [[step]]
        op = "simple_member"
        owner = "Alice"
        role = "friend"
        member = "Jeffrey"
        weight = 80

        [[step]]
        op = "simple_member"
        owner = "Charles"
        role = "filmClub"
        member = "Johan"
        weight = 90

        [[step]]
        op = "simple_member"
        owner = "Charles"
        role = "friend"
        member = "Bob"
        weight = 90

        [[step]]
        op = "simple_member"
        owner = "Charles"
        role = "friend"
        member = "Alice"
        weight = 100

        [[step]]
        op = "linked_inclusion"
        owner = "Charles"
        role = "friend"
        base_owner = "Charles"
        base_role = "friend"
        linked_role = "friend"
        weight = 70

        [[step]]
        op = "simple_inclusion"
        owner = "Charles"
        role = "accessPictures"
        target_owner = "Charles"
        target_role = "friend"
        weight = 100

        [[step]]
        op = "intersection_inclusion"
        owner = "Charles"
        role = "accessMovies"
        left_owner = "Charles"
        left_role = "friend"
        right_owner = "Charles"
        right_role = "filmClub"
        weight = 100

        [[step]]
        op = "search"
        owner = "Charles"
        role = "accessMovies"
        expect_count = 1

        [[step]]
        op = "backward_search"
        owner = "Charles"
        role = "accessPictures"
        expect_count = 5
    "#;

    #[test]
    fn replays_friends_policy() {
        let script = Script::parse(FRIENDS).unwrap();
        let mut engine = RtEngine::default();
        let reports = run(&script, &mut engine).unwrap();

        assert_eq!(reports.len(), script.steps.len());
        let movies = &reports[16];
        assert_eq!(movies.proof_index, Some(ProofIndex(0)));
        assert_eq!(
            movies.solutions,
            vec![Solution {
                member: "Johan".into(),
                address: Principal::from_label("Johan"),
                weight: Weight::new(60),
            }]
        );

        let pictures = &reports[17];
        assert_eq!(pictures.proof_index, Some(ProofIndex(1)));
        let mut names: Vec<_> = pictures.solutions.iter().map(|s| s.member.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Alice", "Bob", "Jeffrey", "Johan", "Sandro"]);
    }

    #[test]
    fn replays_discount_script() {
        let script = Script::parse(include_str!("../scripts/discount.toml")).unwrap();
        script.validate().unwrap();
        let mut engine = RtEngine::default();
        let reports = run(&script, &mut engine).unwrap();
        let last = reports.last().unwrap();
        assert_eq!(last.op, "backward_search");
        assert_eq!(last.solutions.len(), 1);
        assert_eq!(last.solutions[0].member, "Alice");
    }

    #[test]
    fn mismatched_expectation_fails() {
        let script = Script::parse(&FRIENDS.replace("expect_count = 1", "expect_count = 2")).unwrap();
        let mut engine = RtEngine::default();
        let err = run(&script, &mut engine).unwrap_err();
        assert!(format!("{err:#}").contains("expected 2 solutions, found 1"));
    }

    #[test]
    fn engine_errors_name_the_step() {
        let script = Script::parse(
            r#"
            [[step]]
            op = "simple_member"
            owner = "Alice"
            role = "friend"
            member = "Bob"
            weight = 10
            "#,
        )
        .unwrap();
        let mut engine = RtEngine::default();
        let err = run(&script, &mut engine).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("step 0 (simple_member"));
        assert!(message.contains("unknown role"));
    }

    #[test]
    fn budget_is_passed_through() {
        let script = Script::parse(
            r#"
            [[step]]
            op = "new_role"
            owner = "Alice"
            role = "friend"

            [[step]]
            op = "search"
            owner = "Alice"
            role = "friend"
            budget = 1
            "#,
        )
        .unwrap();
        let mut engine = RtEngine::default();
        let err = run(&script, &mut engine).unwrap_err();
        assert!(format!("{err:#}").contains("resource budget exhausted"));
        assert!(engine.proofs().is_empty());
    }
}
