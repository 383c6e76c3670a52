//! Plain-text rendering of a report

use crate::report::VerboseReport;
use handlebars::{handlebars_helper, Handlebars, RenderError};

const TEMPLATE: &str = "\
Impact breakdown over {{num duration_years}} year(s)
{{#each components}}
{{label}} x{{units}}{{#if units_attribute}} [{{units_attribute.status}}]{{/if}}
{{#each attributes}}  {{name}} = {{value}} {{unit}} [{{status}}]
{{/each}}{{#each impacts}}  {{@key}}: {{num value}} {{unit}} ({{num min}} .. {{num max}})
{{/each}}{{/each}}
USAGE
{{#each usage}}  {{@key}}: {{num value}} {{unit}} ({{num min}} .. {{num max}})
{{/each}}";

handlebars_helper!(num: |v: f64| format_number(v));

/// Four significant digits, scientific notation outside `1e-3..1e6`
fn format_number(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if v.abs() < 1e-3 || v.abs() >= 1e6 {
        format!("{:.3e}", v)
    } else {
        let decimals = (3 - v.abs().log10().floor() as i32).max(0) as usize;
        format!("{:.*}", decimals, v)
    }
}

impl VerboseReport {
    /// Human-readable summary, one block per component
    pub fn render_text(&self) -> Result<String, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("num", Box::new(num));
        handlebars.render_template(TEMPLATE, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ComponentEntry, ImpactSummary};
    use hwimpact_core::{AttributeValue, AttributeView, Status};
    use std::collections::BTreeMap;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(43.3824), "43.38");
        assert_eq!(format_number(1234.4), "1234");
        assert_eq!(format_number(0.000123), "1.230e-4");
    }

    #[test]
    fn test_render_text() {
        let impacts = BTreeMap::from([(
            "gwp".to_string(),
            ImpactSummary {
                value: 150.0,
                min: 150.0,
                max: 150.0,
                unit: "kgCO2eq".to_string(),
            },
        )]);
        let case_type = Some(AttributeValue::new(Status::Default, "rack".to_string()));
        let report = VerboseReport {
            components: vec![ComponentEntry {
                label: "CASE-1".to_string(),
                units: 1,
                units_attribute: None,
                attributes: AttributeView::of("case_type", "none", &case_type)
                    .into_iter()
                    .collect(),
                impacts: impacts.clone(),
            }],
            usage: impacts,
            duration_years: 1.0,
        };

        let text = report.render_text().unwrap();
        assert!(text.starts_with("Impact breakdown over 1.000 year(s)"));
        assert!(text.contains("CASE-1 x1\n"));
        assert!(text.contains("  case_type = rack none [DEFAULT]"));
        assert!(text.contains("  gwp: 150.0 kgCO2eq (150.0 .. 150.0)"));
        assert!(text.contains("USAGE\n"));
    }
}
