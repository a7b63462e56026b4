// hiveforge-orchestrator/src/pipeline/planner.rs
// ============================================================================
// Module: Task Planner
// Description: LLM-driven task decomposition with DAG validation (§4.6).
// Dependencies: hiveforge_llm::LlmClient, hiveforge_core::TaskId
// ============================================================================

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::VecDeque;

use hiveforge_core::TaskId;
use hiveforge_llm::LlmClient;
use serde::Deserialize;

use crate::error::OrchestratorError;
use crate::ra::call_structured;

/// Per-plan cap on tasks (§4.6).
const MAX_TASKS: usize = 10;

const SYSTEM_PROMPT: &str = "\
You decompose a goal into an ordered set of executable tasks. Respond with \
a single JSON object: {\"tasks\": [{\"id\": string|null, \"goal\": string, \
\"depends_on\": [string]|null}], \"reasoning\": string}. Respond with JSON \
only.";

#[derive(Debug, Deserialize)]
struct RawTask {
    id: Option<String>,
    goal: String,
    #[serde(default)]
    depends_on: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    tasks: Vec<RawTask>,
    reasoning: String,
}

/// A single planned task (§4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    /// Task identifier, generated if the LLM omitted one.
    pub id: TaskId,
    /// Task goal statement.
    pub goal: String,
    /// Ids of tasks that must complete first.
    pub depends_on: Vec<TaskId>,
}

/// A validated, acyclic task plan (§4.6).
#[derive(Debug, Clone)]
pub struct TaskPlan {
    /// Tasks in the plan, in planner output order.
    pub tasks: Vec<PlannedTask>,
    /// Free-form rationale from the planner.
    pub reasoning: String,
}

impl TaskPlan {
    /// Returns the plan's dependency layers via Kahn's algorithm: each layer
    /// is independently dispatchable once every prior layer has completed
    /// (§4.6 `execution_order`).
    #[must_use]
    pub fn execution_order(&self) -> Vec<Vec<TaskId>> {
        let mut indegree: HashMap<&TaskId, usize> = self.tasks.iter().map(|t| (&t.id, t.depends_on.len())).collect();
        let mut dependents: HashMap<&TaskId, Vec<&TaskId>> = HashMap::new();
        for task in &self.tasks {
            for dep in &task.depends_on {
                dependents.entry(dep).or_default().push(&task.id);
            }
        }

        let mut layers = Vec::new();
        let mut frontier: VecDeque<&TaskId> =
            indegree.iter().filter(|(_, &deg)| deg == 0).map(|(id, _)| *id).collect();

        while !frontier.is_empty() {
            let layer: Vec<TaskId> = frontier.iter().map(|id| (*id).clone()).collect();
            let mut next_frontier = VecDeque::new();
            for id in &frontier {
                if let Some(next_ids) = dependents.get(id) {
                    for next_id in next_ids {
                        if let Some(deg) = indegree.get_mut(next_id) {
                            *deg -= 1;
                            if *deg == 0 {
                                next_frontier.push_back(*next_id);
                            }
                        }
                    }
                }
            }
            layers.push(layer);
            frontier = next_frontier;
        }
        layers
    }
}

/// Decomposes goals into validated [`TaskPlan`]s (§4.6).
pub struct TaskPlanner;

impl TaskPlanner {
    /// Calls the LLM to decompose `goal`, then validates and normalizes the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::InvalidPlan`] on an unknown dependency, a
    /// cycle, or a duplicate goal. Propagates [`OrchestratorError::Llm`] and
    /// [`OrchestratorError::MalformedResponse`].
    pub async fn plan(llm: &dyn LlmClient, goal: &str) -> Result<TaskPlan, OrchestratorError> {
        let raw: RawPlan = call_structured(llm, SYSTEM_PROMPT, goal).await?;

        if raw.tasks.is_empty() {
            return Ok(TaskPlan {
                tasks: vec![PlannedTask { id: TaskId::new("task-1"), goal: goal.to_string(), depends_on: Vec::new() }],
                reasoning: raw.reasoning,
            });
        }

        let mut raw_tasks = raw.tasks;
        raw_tasks.truncate(MAX_TASKS);

        let mut seen_goals = BTreeSet::new();
        let mut known_ids = BTreeSet::new();
        let mut tasks = Vec::with_capacity(raw_tasks.len());
        for (index, raw_task) in raw_tasks.into_iter().enumerate() {
            if !seen_goals.insert(raw_task.goal.clone()) {
                return Err(OrchestratorError::InvalidPlan(format!("duplicate goal: {}", raw_task.goal)));
            }
            let id = raw_task.id.map_or_else(|| format!("task-{}", index + 1), |id| id);
            known_ids.insert(id.clone());
            tasks.push((id, raw_task.goal, raw_task.depends_on));
        }

        let mut planned = Vec::with_capacity(tasks.len());
        for (id, goal, depends_on) in tasks {
            for dep in &depends_on {
                if !known_ids.contains(dep) {
                    return Err(OrchestratorError::InvalidPlan(format!("unknown dependency: {dep}")));
                }
            }
            planned.push(PlannedTask {
                id: TaskId::new(id),
                goal,
                depends_on: depends_on.into_iter().map(TaskId::new).collect(),
            });
        }

        let plan = TaskPlan { tasks: planned, reasoning: raw.reasoning };
        if plan.execution_order().iter().map(Vec::len).sum::<usize>() != plan.tasks.len() {
            return Err(OrchestratorError::InvalidPlan("task plan contains a cycle".to_string()));
        }
        Ok(plan)
    }
}
