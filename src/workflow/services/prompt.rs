//! Prompt rendering for routing, planning and progress traces.

use crate::task::domain::TaskList;
use crate::workflow::domain::{ConversationEntry, preview};
use crate::workflow::services::WorkerRegistry;
use minijinja::{Environment, context};
use serde::Serialize;

const ROUTE_TEMPLATE: &str = "\
You coordinate a team of workers. Decide who handles the request.

Available workers:
{% for worker in workers %}- {{ worker.name }}: {{ worker.description }}\
{% if worker.capabilities %} (capabilities: {{ worker.capabilities | join(\", \") }}){% endif %}
{% endfor %}
Route to a worker when one can answer directly, to \"planner\" when the request \
needs several steps, or to \"__end__\" when nothing needs doing.
Reply with JSON only: {\"next_worker\": one of [{{ names }}, \"planner\", \"__end__\"], \"reasoning\": \"...\"}
{% if history %}
Previous conversation:
{% for entry in history %}Q{{ loop.index }}: {{ entry.request }}
{% if entry.result %}A{{ loop.index }}: {{ entry.result }}
{% endif %}{% endfor %}{% endif %}
Request: {{ request }}";

const PLAN_TEMPLATE: &str = "\
Break the request into an ordered list of tasks for these workers:
{% for worker in workers %}
## {{ worker.name }}
{{ worker.description }}
{% if worker.capabilities %}Capabilities: {{ worker.capabilities | join(\", \") }}
{% endif %}{% if worker.use_cases %}Use cases: {{ worker.use_cases | join(\"; \") }}
{% endif %}{% endfor %}
Reply with JSON only: {\"tasks\": [{\"worker\": one of [{{ names }}], \"description\": \"...\"}], \"reasoning\": \"...\"}
{% if previous_error %}
Your previous reply could not be used: {{ previous_error }}
{% endif %}{% if history %}
=== Previous conversation ===
{% for entry in history %}Previous question {{ loop.index }}: {{ entry.request }}
{% if entry.result %}Previous answer {{ loop.index }}: {{ entry.result }}
{% endif %}{% endfor %}=== End of conversation ===
The request may follow up on earlier answers.
{% endif %}
Request: {{ request }}";

const PROGRESS_TEMPLATE: &str = "\
{% for task in tasks %}{{ task.marker }} {{ task.worker }}: {{ task.description }}
{% endfor %}{% if next %}Next: {{ next.worker }}: {{ next.description }}{% else %}All tasks settled.{% endif %}";

/// Result preview length in routing prompts.
const ROUTE_PREVIEW_CHARS: usize = 200;

/// Result preview length in planning prompts.
const PLAN_PREVIEW_CHARS: usize = 300;

#[derive(Serialize)]
struct CatalogEntry<'a> {
    name: &'a str,
    description: &'a str,
    capabilities: &'a [String],
    use_cases: &'a [String],
}

#[derive(Serialize)]
struct HistoryLine<'a> {
    request: &'a str,
    result: Option<String>,
}

#[derive(Serialize)]
struct TaskLine<'a> {
    marker: &'a str,
    worker: &'a str,
    description: &'a str,
}

/// Renders oracle prompts from the worker catalog and session history.
pub struct PromptRenderer {
    environment: Environment<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    /// Creates a renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
        }
    }

    /// Renders the routing prompt.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn route(
        &self,
        registry: &WorkerRegistry,
        history: &[ConversationEntry],
        request: &str,
    ) -> Result<String, minijinja::Error> {
        self.environment.render_str(
            ROUTE_TEMPLATE,
            context! {
                workers => catalog(registry),
                names => quoted_names(registry),
                history => history_lines(history, ROUTE_PREVIEW_CHARS),
                request => request,
            },
        )
    }

    /// Renders the planning prompt.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn plan(
        &self,
        registry: &WorkerRegistry,
        history: &[ConversationEntry],
        request: &str,
        previous_error: Option<&str>,
    ) -> Result<String, minijinja::Error> {
        self.environment.render_str(
            PLAN_TEMPLATE,
            context! {
                workers => catalog(registry),
                names => quoted_names(registry),
                history => history_lines(history, PLAN_PREVIEW_CHARS),
                previous_error => previous_error,
                request => request,
            },
        )
    }

    /// Renders the plan with status markers and the next open task.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn progress(&self, task_list: &TaskList) -> Result<String, minijinja::Error> {
        let tasks: Vec<TaskLine<'_>> = task_list
            .tasks()
            .iter()
            .map(|task| TaskLine {
                marker: task.status().marker(),
                worker: task.worker().as_str(),
                description: task.description(),
            })
            .collect();
        let next = task_list
            .next_open()
            .and_then(|index| tasks.get(index));
        self.environment.render_str(
            PROGRESS_TEMPLATE,
            context! {
                tasks => &tasks,
                next => next,
            },
        )
    }
}

fn catalog(registry: &WorkerRegistry) -> Vec<CatalogEntry<'_>> {
    registry
        .iter()
        .map(|entry| CatalogEntry {
            name: entry.name().as_str(),
            description: entry.profile().description(),
            capabilities: entry.profile().capabilities(),
            use_cases: entry.profile().use_cases(),
        })
        .collect()
}

fn quoted_names(registry: &WorkerRegistry) -> String {
    registry
        .iter()
        .map(|entry| format!("\"{}\"", entry.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn history_lines(history: &[ConversationEntry], limit: usize) -> Vec<HistoryLine<'_>> {
    history
        .iter()
        .map(|entry| HistoryLine {
            request: entry.request(),
            result: entry.result().map(|result| preview(result, limit)),
        })
        .collect()
}
