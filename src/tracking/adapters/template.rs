//! Text tracker rendered with `minijinja` and emitted through `tracing`.

use crate::tracking::{
    domain::ProgressSnapshot,
    ports::{PublisherError, PublisherResult, SnapshotPublisher},
};
use minijinja::{Environment, context};

const BAR_WIDTH: u16 = 24;

/// Default tracker layout: header, status line, progress bar, step list.
pub const DEFAULT_TRACKER_TEMPLATE: &str = "\
Track your order {{ order_ref }}
Status: {{ status_line }}
[{{ bar }}] {{ percent }}%
{% for step in steps -%}
{{ \"x\" if step.isCompleted else (\">\" if step.isActive else \" \") }} {{ step.name }}
{% endfor %}";

/// Publisher that renders each snapshot as a text tracker and logs it.
#[derive(Debug, Clone)]
pub struct TemplateSnapshotRenderer {
    template: String,
}

impl TemplateSnapshotRenderer {
    /// Creates a renderer using [`DEFAULT_TRACKER_TEMPLATE`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_template(DEFAULT_TRACKER_TEMPLATE)
    }

    /// Creates a renderer using a custom template.
    ///
    /// The template sees `order_ref`, `stage`, `name`, `description`,
    /// `status_line`, `percent`, `bar` and `steps` (camelCase step views).
    #[must_use]
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Renders `snapshot` to text.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::Render`] when the template fails to
    /// render.
    pub fn render(&self, snapshot: &ProgressSnapshot) -> PublisherResult<String> {
        let environment = Environment::new();
        let percent = snapshot.progress_percent();
        let ctx = context! {
            order_ref => snapshot.order_ref().as_str(),
            stage => snapshot.current_stage().as_str(),
            name => snapshot.name(),
            description => snapshot.description(),
            status_line => snapshot.status_line(),
            percent => percent,
            bar => progress_bar(percent),
            steps => snapshot.steps(),
        };
        environment
            .render_str(&self.template, ctx)
            .map_err(|error| PublisherError::Render {
                reason: error.to_string(),
            })
    }
}

impl Default for TemplateSnapshotRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher for TemplateSnapshotRenderer {
    fn publish(&self, snapshot: &ProgressSnapshot) -> PublisherResult<()> {
        let rendered = self.render(snapshot)?;
        tracing::info!(
            order_ref = %snapshot.order_ref(),
            stage = %snapshot.current_stage(),
            "\n{rendered}"
        );
        Ok(())
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = (u16::from(percent) * BAR_WIDTH)
        .checked_div(100)
        .unwrap_or(BAR_WIDTH)
        .min(BAR_WIDTH);
    let empty = BAR_WIDTH - filled;
    format!(
        "{}{}",
        "#".repeat(usize::from(filled)),
        "-".repeat(usize::from(empty))
    )
}

#[cfg(test)]
mod tests {
    use super::progress_bar;
    use rstest::rstest;

    #[rstest]
    #[case(0, "------------------------")]
    #[case(33, "#######-----------------")]
    #[case(67, "################--------")]
    #[case(100, "########################")]
    fn progress_bar_fills_proportionally(#[case] percent: u8, #[case] expected: &str) {
        assert_eq!(progress_bar(percent), expected);
    }
}
