//! Test infrastructure for integration tests
//!
//! Provides isolated temp directories for input, output and configuration
//! files, plus builders for the CLI commands. Each test gets its own
//! directory so tests never share files.

use std::path::PathBuf;

use roadmap_cli::commands::{PlanCommand, RenderCommand, YearArgs};
use roadmap_layout::LayoutConfig;
use serde_json::{Value, json};

/// Test context owning a unique temp directory
pub struct TestContext {
    pub temp_dir: PathBuf,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// Each call creates a uniquely named temp directory using process ID,
    /// thread ID, and nanosecond timestamp to guarantee isolation.
    pub fn new() -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "roadmap-integration-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&temp_dir).unwrap();
        Self { temp_dir }
    }

    /// Path of a file inside the context directory
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.join(name)
    }

    /// Write JSON Lines input built from `records` and return its path.
    pub fn write_input(&self, name: &str, records: &[Value]) -> PathBuf {
        let text: Vec<String> = records.iter().map(Value::to_string).collect();
        self.write_text(name, &text.join("\n"))
    }

    /// Write raw text and return its path.
    pub fn write_text(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    /// Read a render output file back as parsed JSON lines.
    pub fn read_output(&self, name: &str) -> Vec<Value> {
        let text = std::fs::read_to_string(self.path(name)).unwrap();
        text.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        // Auto-cleanup on drop
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}

// =============================================================================
// Record Builders
// =============================================================================

/// A milestone record in the canonical field names.
pub fn milestone(
    category: &str,
    workstream: &str,
    title: &str,
    date: &str,
    status: &str,
    kind: &str,
) -> Value {
    json!({
        "category": category,
        "workstream": workstream,
        "title": title,
        "date": date,
        "status": status,
        "kind": kind,
    })
}

/// A regular, on-track milestone.
pub fn simple(category: &str, workstream: &str, title: &str, date: &str) -> Value {
    milestone(category, workstream, title, date, "On Track", "Regular")
}

// =============================================================================
// Command Builder Helpers
// =============================================================================

/// Create a RenderCommand with no year filter and no today line.
pub fn render_cmd(input: PathBuf, output: PathBuf) -> RenderCommand {
    RenderCommand {
        input: Some(input),
        output: Some(output),
        years: YearArgs::default(),
        today: None,
        no_today: true,
    }
}

/// Create a RenderCommand limited to the given years.
#[allow(dead_code)]
pub fn render_cmd_for_years(input: PathBuf, output: PathBuf, years: &[i32]) -> RenderCommand {
    RenderCommand {
        years: YearArgs {
            years: years.to_vec(),
            ..Default::default()
        },
        ..render_cmd(input, output)
    }
}

/// Create a PlanCommand with no year filter.
pub fn plan_cmd(input: PathBuf) -> PlanCommand {
    PlanCommand {
        input: Some(input),
        years: YearArgs::default(),
    }
}

/// Layout configuration with a small page capacity.
pub fn config_with_capacity(rows_per_page: usize) -> LayoutConfig {
    LayoutConfig {
        rows_per_page,
        ..Default::default()
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Page header lines from a render output.
pub fn page_headers(lines: &[Value]) -> Vec<&Value> {
    lines.iter().filter(|l| l["type"] == "page").collect()
}

/// Draw requests of one page, selected by 0-based page position in the output.
pub fn page_requests(lines: &[Value], index: usize) -> Vec<&Value> {
    let mut seen = None;
    let mut requests = Vec::new();
    for line in lines {
        if line["type"] == "page" {
            seen = Some(seen.map_or(0, |n| n + 1));
            continue;
        }
        if seen == Some(index) {
            requests.push(line);
        }
    }
    requests
}

/// Requests of the given type.
pub fn of_type<'a>(requests: &[&'a Value], kind: &str) -> Vec<&'a Value> {
    requests
        .iter()
        .copied()
        .filter(|r| r["type"] == kind)
        .collect()
}
