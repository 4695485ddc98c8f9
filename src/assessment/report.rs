use serde_json::Value;

/// Renders a backend report verbatim as pretty-printed JSON.
///
/// No schema is assumed; whatever structure the backend sent is shown.
pub fn render_report(report: &Value) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| report.to_string())
}
