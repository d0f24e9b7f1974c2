//! Strategist stage — extracts skills from the job description and picks the
//! portfolio projects to feature.
//!
//! The language model is tried first. A missing gateway, a failed call and an
//! unparseable reply all degrade to the keyword fallback below; none of them
//! fails the run. Whatever path is taken, the stage always ends with at least
//! one selected project.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::llm_client::extract::{extract_json_object, string_list};
use crate::llm_client::LanguageModelGateway;
use crate::models::application::{ApplicationStatus, ApplicationUpdate};
use crate::workflow::prompts::strategist_prompt;
use crate::workflow::{Stage, WorkflowEngine, WorkflowError, WorkflowState};

/// Skills recognised without a language model, in output order.
pub const FALLBACK_VOCABULARY: &[&str] = &[
    "python",
    "fastapi",
    "react",
    "sql",
    "llm",
    "langgraph",
    "playwright",
];

/// (skills that trigger the theme, project theme), checked in order.
const PROJECT_RULES: &[(&[&str], &str)] = &[
    (&["fastapi", "python"], "Backend APIs with Python/FastAPI"),
    (&["react"], "Frontend dashboard with React/Tailwind"),
    (&["llm"], "LLM workflow automation projects"),
];

pub const DEFAULT_PROJECT: &str = "General software engineering projects";

static VOCABULARY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FALLBACK_VOCABULARY
        .iter()
        .filter_map(|term| {
            Regex::new(&format!(r"\b{}\b", regex::escape(term)))
                .ok()
                .map(|re| (*term, re))
        })
        .collect()
});

/// Skills and projects chosen for one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailoringPlan {
    pub extracted_skills: Vec<String>,
    pub selected_projects: Vec<String>,
}

impl WorkflowEngine {
    pub(super) async fn strategist(
        &self,
        mut state: WorkflowState,
    ) -> Result<WorkflowState, WorkflowError> {
        if state.job_description.trim().is_empty() {
            return Err(WorkflowError::stage(
                Stage::Strategist,
                "job description is empty",
            ));
        }

        let suggested = request_plan(self.gateway.as_deref(), &state.job_description).await;
        let plan = complete_plan(suggested, &state.job_description);
        info!(
            "Tailoring with {} skills and {} projects",
            plan.extracted_skills.len(),
            plan.selected_projects.len()
        );

        state.extracted_skills = plan.extracted_skills;
        state.selected_projects = plan.selected_projects;
        self.checkpoint(
            Stage::Strategist,
            state,
            ApplicationUpdate::status(ApplicationStatus::Tailored),
        )
        .await
    }
}

/// Asks the gateway for a plan. Never fails: every problem yields an empty plan.
pub async fn request_plan(
    gateway: Option<&dyn LanguageModelGateway>,
    job_description: &str,
) -> TailoringPlan {
    let Some(gateway) = gateway else {
        debug!("No LLM gateway configured; using keyword fallback");
        return TailoringPlan::default();
    };

    let text = match gateway.generate(&strategist_prompt(job_description)).await {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "LLM call via {} failed, using keyword fallback: {e}",
                gateway.provider()
            );
            return TailoringPlan::default();
        }
    };

    let parsed = extract_json_object(&text);
    if parsed.is_empty() {
        warn!("LLM reply held no usable JSON object, using keyword fallback");
    }

    TailoringPlan {
        extracted_skills: string_list(&parsed, "extracted_skills"),
        selected_projects: string_list(&parsed, "selected_projects"),
    }
}

/// Fills whatever the model left empty with the deterministic heuristics.
pub fn complete_plan(mut plan: TailoringPlan, job_description: &str) -> TailoringPlan {
    if plan.extracted_skills.is_empty() {
        plan.extracted_skills = fallback_skills(job_description);
    }
    if plan.selected_projects.is_empty() {
        plan.selected_projects = projects_for_skills(&plan.extracted_skills);
    }
    plan
}

/// Whole-word vocabulary matches against the lower-cased description, in
/// vocabulary order.
pub fn fallback_skills(job_description: &str) -> Vec<String> {
    let text = job_description.to_lowercase();
    VOCABULARY_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&text))
        .map(|(term, _)| term.to_string())
        .collect()
}

/// Maps skills to project themes; never returns an empty list.
pub fn projects_for_skills(skills: &[String]) -> Vec<String> {
    let has = |wanted: &str| skills.iter().any(|s| s.eq_ignore_ascii_case(wanted));

    let projects: Vec<String> = PROJECT_RULES
        .iter()
        .filter(|(triggers, _)| triggers.iter().any(|&t| has(t)))
        .map(|(_, project)| project.to_string())
        .collect();

    if projects.is_empty() {
        vec![DEFAULT_PROJECT.to_string()]
    } else {
        projects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ApplicationStore;
    use crate::workflow::scout::PLACEHOLDER_JOB_DESCRIPTION;
    use crate::workflow::testing::{engine_with, RecordingStore, ScriptedGateway};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fallback_matches_placeholder_description() {
        assert_eq!(
            fallback_skills(PLACEHOLDER_JOB_DESCRIPTION),
            strings(&["python", "fastapi", "react", "sql", "llm"])
        );
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let jd = "LLM tooling with React and Python; Playwright for e2e, SQL everywhere.";
        let first = fallback_skills(jd);
        let second = fallback_skills(jd);
        assert_eq!(first, second);
        assert_eq!(
            first,
            strings(&["python", "react", "sql", "llm", "playwright"])
        );
    }

    #[test]
    fn test_fallback_requires_word_boundaries() {
        let jd = "PostgreSQL and mysql, reactive streams, pythonic code";
        assert!(fallback_skills(jd).is_empty());
        assert_eq!(fallback_skills("sql-first, (react)"), strings(&["react", "sql"]));
    }

    #[test]
    fn test_projects_follow_rule_table_order() {
        let projects = projects_for_skills(&strings(&["llm", "react", "python"]));
        assert_eq!(
            projects,
            strings(&[
                "Backend APIs with Python/FastAPI",
                "Frontend dashboard with React/Tailwind",
                "LLM workflow automation projects"
            ])
        );
    }

    #[test]
    fn test_python_and_fastapi_share_one_project() {
        let projects = projects_for_skills(&strings(&["python", "fastapi"]));
        assert_eq!(projects, strings(&["Backend APIs with Python/FastAPI"]));
    }

    #[test]
    fn test_projects_match_case_insensitively() {
        let projects = projects_for_skills(&strings(&["React"]));
        assert_eq!(projects, strings(&["Frontend dashboard with React/Tailwind"]));
    }

    #[test]
    fn test_unmatched_skills_get_default_project() {
        assert_eq!(projects_for_skills(&[]), strings(&[DEFAULT_PROJECT]));
        assert_eq!(
            projects_for_skills(&strings(&["cobol"])),
            strings(&[DEFAULT_PROJECT])
        );
    }

    #[test]
    fn test_complete_plan_keeps_model_output() {
        let plan = TailoringPlan {
            extracted_skills: strings(&["rust"]),
            selected_projects: strings(&["Async job runner"]),
        };
        assert_eq!(complete_plan(plan.clone(), "python"), plan);
    }

    #[test]
    fn test_complete_plan_fills_projects_from_model_skills() {
        let plan = TailoringPlan {
            extracted_skills: strings(&["llm"]),
            selected_projects: vec![],
        };
        let completed = complete_plan(plan, "irrelevant");
        assert_eq!(completed.extracted_skills, strings(&["llm"]));
        assert_eq!(
            completed.selected_projects,
            strings(&["LLM workflow automation projects"])
        );
    }

    #[tokio::test]
    async fn test_request_plan_without_gateway_is_empty() {
        assert_eq!(
            request_plan(None, PLACEHOLDER_JOB_DESCRIPTION).await,
            TailoringPlan::default()
        );
    }

    #[tokio::test]
    async fn test_request_plan_parses_reply_with_commentary() {
        let gateway = ScriptedGateway::reply(
            "Here you go:\n{\"extracted_skills\": [\"rust\", \"tokio\"], \
             \"selected_projects\": [\"Async job runner\"]}\nThanks!",
        );
        let plan = request_plan(Some(&*gateway as &dyn LanguageModelGateway), "jd").await;
        assert_eq!(plan.extracted_skills, strings(&["rust", "tokio"]));
        assert_eq!(plan.selected_projects, strings(&["Async job runner"]));
    }

    #[tokio::test]
    async fn test_garbage_reply_falls_back() {
        let store = RecordingStore::new().await;
        let record = store.create("https://example.com/job/1").await.unwrap();
        let gateway = ScriptedGateway::reply("I cannot help with that.");
        let engine = engine_with(store.clone(), Some(gateway.clone()));

        let mut state = WorkflowState::new(record.id, record.job_url.clone());
        state.job_description = PLACEHOLDER_JOB_DESCRIPTION.to_string();
        state.application_status = ApplicationStatus::Found;

        let state = engine.strategist(state).await.unwrap();
        assert_eq!(gateway.calls(), 1);
        assert_eq!(
            state.extracted_skills,
            strings(&["python", "fastapi", "react", "sql", "llm"])
        );
        assert_eq!(state.application_status, ApplicationStatus::Tailored);
        assert_eq!(store.statuses_for(record.id), vec![ApplicationStatus::Tailored]);
    }

    #[tokio::test]
    async fn test_description_without_known_skills_uses_default_project() {
        let store = RecordingStore::new().await;
        let record = store.create("https://example.com/job/1").await.unwrap();
        let engine = engine_with(store.clone(), None);

        let mut state = WorkflowState::new(record.id, record.job_url.clone());
        state.job_description = "Looking for a COBOL mainframe specialist.".to_string();
        state.application_status = ApplicationStatus::Found;

        let state = engine.strategist(state).await.unwrap();
        assert!(state.extracted_skills.is_empty());
        assert_eq!(state.selected_projects, strings(&[DEFAULT_PROJECT]));
    }

    #[tokio::test]
    async fn test_empty_description_is_stage_error() {
        let store = RecordingStore::new().await;
        let record = store.create("https://example.com/job/1").await.unwrap();
        let engine = engine_with(store.clone(), None);

        let err = engine
            .strategist(WorkflowState::new(record.id, record.job_url.clone()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("job description is empty"));
        assert!(store.updates_for(record.id).is_empty());
    }
}
